/// Role-based route guard
///
/// Every incoming path is classified before any handler runs, in this
/// order:
///
/// 1. Public routes pass through before any auth evaluation (the
///    short-circuit matters: `/v1/auth/*` must work without a token).
/// 2. Everything else requires a valid access token; without one the guard
///    redirects (303) the browser to `/login?callbackUrl=<path>`.
/// 3. Restricted prefixes carry an allowed-role set; an authenticated user
///    outside the set is redirected (303) to `/unauthorized`.
///
/// Successful authentication injects an [`AuthContext`] into request
/// extensions for handlers to extract.
///
/// The token is read from the `Authorization: Bearer` header or, for
/// browser navigation, from the `access_token` cookie.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use consulat_shared::{
    auth::{jwt, middleware::AuthContext},
    models::user::UserRole,
};

use crate::app::AppState;

/// Routes reachable without a token
///
/// Exact paths, except entries ending in `/` which match as prefixes.
const PUBLIC_ROUTES: &[&str] = &[
    "/",
    "/health",
    "/login",
    "/register",
    "/unauthorized",
    "/v1/auth/",
];

/// Allowed roles per restricted path prefix (first match wins)
const RESTRICTED_PREFIXES: &[(&str, &[UserRole])] = &[
    ("/v1/admin", &[UserRole::Admin, UserRole::Superadmin]),
    (
        "/v1/agent",
        &[UserRole::Agent, UserRole::Admin, UserRole::Superadmin],
    ),
];

/// Access classification for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// No authentication required
    Public,

    /// Any authenticated user
    Authenticated,

    /// Authenticated user with one of the listed roles
    Restricted(&'static [UserRole]),
}

/// Classifies a request path
///
/// Pure function so the ordering rules are unit-testable without a
/// router: public matching short-circuits before the restricted table is
/// consulted.
pub fn route_access(path: &str) -> RouteAccess {
    for route in PUBLIC_ROUTES {
        let matched = if let Some(prefix) = route.strip_suffix('/') {
            // Prefix entry: match the bare path and anything nested under it
            !prefix.is_empty() && (path == prefix || path.starts_with(*route))
        } else {
            path == *route
        };
        if matched {
            return RouteAccess::Public;
        }
    }

    for (prefix, roles) in RESTRICTED_PREFIXES {
        if path == *prefix || path.starts_with(&format!("{}/", prefix)) {
            return RouteAccess::Restricted(roles);
        }
    }

    RouteAccess::Authenticated
}

/// Route guard middleware
///
/// Layered over the whole router; see module docs for the check order.
pub async fn route_guard(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    let access = route_access(&path);
    if access == RouteAccess::Public {
        return next.run(req).await;
    }

    // Token required from here on
    let token = match extract_token(&req) {
        Some(token) => token,
        None => return login_redirect(&state, &path),
    };

    let claims = match jwt::validate_access_token(&token, state.jwt_secret()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(path = %path, error = %e, "Rejected access token");
            return login_redirect(&state, &path);
        }
    };

    if let RouteAccess::Restricted(allowed) = access {
        if !allowed.contains(&claims.role) {
            tracing::debug!(
                path = %path,
                role = claims.role.as_str(),
                "Role not allowed for route"
            );
            return Redirect::to(&format!("{}/unauthorized", state.site_url()))
                .into_response();
        }
    }

    req.extensions_mut().insert(AuthContext::from_claims(&claims));

    next.run(req).await
}

/// Reads the access token from the Authorization header or cookie
fn extract_token(req: &Request) -> Option<String> {
    if let Some(value) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = value.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    let cookies = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == "access_token" {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Builds the 303 redirect to the login page with a return path
fn login_redirect(state: &AppState, path: &str) -> Response {
    let url = format!(
        "{}/login?callbackUrl={}",
        state.site_url(),
        encode_query_component(path)
    );
    Redirect::to(&url).into_response()
}

/// Percent-encodes a string for use as a query value
fn encode_query_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_routes_short_circuit() {
        assert_eq!(route_access("/"), RouteAccess::Public);
        assert_eq!(route_access("/health"), RouteAccess::Public);
        assert_eq!(route_access("/login"), RouteAccess::Public);
        assert_eq!(route_access("/unauthorized"), RouteAccess::Public);

        // Prefix entry matches the bare path and everything nested
        assert_eq!(route_access("/v1/auth"), RouteAccess::Public);
        assert_eq!(route_access("/v1/auth/register"), RouteAccess::Public);
        assert_eq!(route_access("/v1/auth/otp/verify"), RouteAccess::Public);
    }

    #[test]
    fn test_restricted_prefixes() {
        match route_access("/v1/admin/notifications") {
            RouteAccess::Restricted(roles) => {
                assert!(roles.contains(&UserRole::Admin));
                assert!(roles.contains(&UserRole::Superadmin));
                assert!(!roles.contains(&UserRole::Agent));
                assert!(!roles.contains(&UserRole::Citizen));
            }
            other => panic!("expected restricted, got {:?}", other),
        }

        match route_access("/v1/agent/requests") {
            RouteAccess::Restricted(roles) => {
                assert!(roles.contains(&UserRole::Agent));
                assert!(!roles.contains(&UserRole::Citizen));
            }
            other => panic!("expected restricted, got {:?}", other),
        }
    }

    #[test]
    fn test_prefix_matching_is_segment_aware() {
        // "/v1/administrators" must not inherit the admin restriction
        assert_eq!(route_access("/v1/administrators"), RouteAccess::Authenticated);
        assert_eq!(route_access("/v1/admin"), RouteAccess::Restricted(RESTRICTED_PREFIXES[0].1));
    }

    #[test]
    fn test_default_is_authenticated() {
        assert_eq!(route_access("/v1/profile"), RouteAccess::Authenticated);
        assert_eq!(route_access("/v1/requests"), RouteAccess::Authenticated);
        assert_eq!(route_access("/v1/chat"), RouteAccess::Authenticated);
    }

    #[test]
    fn test_encode_query_component() {
        assert_eq!(encode_query_component("/v1/profile"), "%2Fv1%2Fprofile");
        assert_eq!(
            encode_query_component("/a b?c=d"),
            "%2Fa%20b%3Fc%3Dd"
        );
        assert_eq!(encode_query_component("plain-path_1.2~"), "plain-path_1.2~");
    }
}
