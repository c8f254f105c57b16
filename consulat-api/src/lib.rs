//! # Consulat API Server Library
//!
//! This library provides the core functionality for the consular-services
//! portal API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `assistant`: LLM bridge (chat and document analysis)
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Route guard and security headers
//! - `routes`: API route handlers

pub mod app;
pub mod assistant;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
