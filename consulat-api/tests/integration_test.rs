/// Integration tests for the portal API
///
/// These tests drive the full router and verify everything that happens
/// before a handler touches the database:
/// - Route guard ordering (public list → token → role table)
/// - Login and unauthorized redirects
/// - Token extraction from header and cookie
/// - Request body validation on public routes
/// - Security headers and health degradation

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{TestContext, SITE_URL};
use consulat_shared::models::user::UserRole;
use serde_json::json;
use tower::Service as _;

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// A protected route without a token redirects to login with the original
/// path in the callback, before any handler logic runs.
#[tokio::test]
async fn test_missing_token_redirects_to_login() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/requests")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        location(&response),
        format!("{}/login?callbackUrl=%2Fv1%2Frequests", SITE_URL)
    );
}

/// A malformed token is treated like a missing one
#[tokio::test]
async fn test_invalid_token_redirects_to_login() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/profile")
        .header("authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with(&format!("{}/login?callbackUrl=", SITE_URL)));
}

/// A citizen token on an admin route is redirected to the unauthorized
/// page, never reaching the handler
#[tokio::test]
async fn test_citizen_blocked_from_admin_routes() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/admin/procedures")
        .header("authorization", ctx.auth_header(UserRole::Citizen))
        .header("content-type", "application/json")
        .body(Body::from(json!({"title": "Passport renewal"}).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("{}/unauthorized", SITE_URL));
}

/// Agents are blocked from admin routes but allowed on agent routes
#[tokio::test]
async fn test_agent_role_boundaries() {
    let ctx = TestContext::new();

    let blocked = Request::builder()
        .method("POST")
        .uri("/v1/admin/consulates")
        .header("authorization", ctx.auth_header(UserRole::Agent))
        .header("content-type", "application/json")
        .body(Body::from(json!({"name": "Montreal"}).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(blocked).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("{}/unauthorized", SITE_URL));

    // Same role on /v1/agent passes the guard; the handler then fails on
    // the unreachable database, which proves the redirect did not happen
    let allowed = Request::builder()
        .method("GET")
        .uri("/v1/agent/requests")
        .header("authorization", ctx.auth_header(UserRole::Agent))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(allowed).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

/// The access token is also read from the `access_token` cookie
#[tokio::test]
async fn test_cookie_token_passes_guard() {
    let ctx = TestContext::new();
    let token = ctx.token_for(UserRole::Citizen, None);

    let request = Request::builder()
        .method("GET")
        .uri("/v1/profile")
        .header("cookie", format!("session=abc; access_token={}", token))
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();

    // Past the guard: the handler fails on the database, not on auth
    assert_ne!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

/// Auth routes are public: a bad OTP format is rejected by the handler
/// (400), not bounced to login by the guard
#[tokio::test]
async fn test_auth_routes_are_public() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/otp/verify")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"identifier": "citizen@example.com", "code": "12ab56"}).to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Security headers are set on every response, including guard redirects
#[tokio::test]
async fn test_security_headers_present() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/requests")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    let headers = response.headers();

    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert!(headers.contains_key("content-security-policy"));
    // Not production: no HSTS
    assert!(!headers.contains_key("strict-transport-security"));
}

/// Health stays reachable without auth and reports the database as down
#[tokio::test]
async fn test_health_reports_database_state() {
    let ctx = TestContext::new();

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "degraded");
    assert_eq!(json["database"], "disconnected");
}
