/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: OTP authentication endpoints (register, request, verify, refresh)
/// - `profile`: Caller's civil-status profile
/// - `consulates`: Consulate directory
/// - `procedures`: Procedure catalog (citizen view)
/// - `requests`: Citizen request lifecycle and message threads
/// - `documents`: Upload with LLM analysis
/// - `notifications`: Visible notifications and read state
/// - `chat`: AI assistant
/// - `agent`: Staff request handling and internal notes
/// - `admin`: Procedure/consulate management and notification fan-out

pub mod admin;
pub mod agent;
pub mod auth;
pub mod chat;
pub mod consulates;
pub mod documents;
pub mod health;
pub mod notifications;
pub mod procedures;
pub mod profile;
pub mod requests;
