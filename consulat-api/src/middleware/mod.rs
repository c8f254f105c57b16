/// Middleware modules for the API server
///
/// This module contains custom middleware for:
/// - Role-based route guard (redirecting browser navigation)
/// - Security headers

pub mod route_guard;
pub mod security;
