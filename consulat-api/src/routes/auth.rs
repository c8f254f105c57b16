/// OTP authentication endpoints
///
/// The portal is passwordless. Signing in is a two-step flow: request a
/// 6-digit code for an email or phone identifier, then exchange the code
/// for JWT tokens. Code delivery (email/SMS dispatch) happens outside this
/// service; the backend only persists the hash.
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register a new citizen account
/// - `POST /v1/auth/otp/request` - Issue a login code
/// - `POST /v1/auth/otp/verify` - Exchange code for tokens
/// - `POST /v1/auth/refresh` - Refresh access token

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{extract::State, Json};
use chrono::Utc;
use consulat_shared::{
    auth::{jwt, otp},
    models::{
        profile::Profile,
        user::{CreateUser, User, UserRole},
        verification_token::VerificationToken,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Optional phone number in E.164 form
    #[validate(length(max = 32, message = "Phone number must be at most 32 characters"))]
    pub phone: Option<String>,

    /// Consulate the citizen registers with
    pub consulate_id: Uuid,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// User ID
    pub user_id: String,

    /// Consulate ID the account is attached to
    pub consulate_id: String,
}

/// OTP request body
#[derive(Debug, Deserialize, Validate)]
pub struct OtpRequest {
    /// Email address or phone number
    #[validate(length(min = 3, max = 255, message = "Invalid identifier"))]
    pub identifier: String,
}

/// OTP request response
#[derive(Debug, Serialize)]
pub struct OtpRequestResponse {
    /// When the issued code expires
    pub expires_at: chrono::DateTime<Utc>,
}

/// OTP verify body
#[derive(Debug, Deserialize, Validate)]
pub struct OtpVerifyRequest {
    /// Email address or phone number the code was issued for
    #[validate(length(min = 3, max = 255, message = "Invalid identifier"))]
    pub identifier: String,

    /// The 6-digit code
    pub code: String,
}

/// OTP verify response
#[derive(Debug, Serialize)]
pub struct OtpVerifyResponse {
    /// User ID
    pub user_id: String,

    /// Role of the authenticated user
    pub role: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Registers a new citizen account
///
/// Creates the user (role `citizen`, attached to the chosen consulate)
/// together with an empty profile. No tokens are issued; the citizen logs
/// in via the OTP flow afterwards.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "citizen@example.com",
///   "phone": "+14385550123",
///   "consulate_id": "uuid"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `404 Not Found`: Unknown consulate
/// - `409 Conflict`: Email or phone already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    req.validate().map_err(validation_error)?;

    // The consulate must exist before an account is attached to it
    let consulate = consulat_shared::models::consulate::Consulate::find_by_id(
        &state.db,
        req.consulate_id,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Consulate not found".to_string()))?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            phone: req.phone,
            role: UserRole::Citizen,
            consulate_id: Some(consulate.id),
        },
    )
    .await?;

    Profile::create_empty(&state.db, user.id).await?;

    tracing::info!(user_id = %user.id, consulate_id = %consulate.id, "Citizen registered");

    Ok(Json(RegisterResponse {
        user_id: user.id.to_string(),
        consulate_id: consulate.id.to_string(),
    }))
}

/// Issues a 6-digit login code
///
/// Stores the SHA-256 hash with a 10-minute expiry; any outstanding code
/// for the same identifier is invalidated. The plaintext code is handed to
/// the delivery provider out of band and never returned by this endpoint.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/otp/request
/// Content-Type: application/json
///
/// { "identifier": "citizen@example.com" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `404 Not Found`: No account for this identifier
pub async fn request_otp(
    State(state): State<AppState>,
    Json(req): Json<OtpRequest>,
) -> ApiResult<Json<OtpRequestResponse>> {
    req.validate().map_err(validation_error)?;

    let user = find_by_identifier(&state, &req.identifier)
        .await?
        .ok_or_else(|| ApiError::NotFound("No account for this identifier".to_string()))?;

    let code = otp::generate_code();
    let code_hash = otp::hash_code(&code);
    let expires_at = Utc::now() + otp::code_ttl();

    VerificationToken::issue(&state.db, &req.identifier, &code_hash, expires_at).await?;

    tracing::info!(user_id = %user.id, "Login code issued");

    Ok(Json(OtpRequestResponse { expires_at }))
}

/// Exchanges a login code for JWT tokens
///
/// Consumes the token (single use), stamps `last_login_at`, marks the
/// email verified, and issues access + refresh tokens carrying the user's
/// role and consulate.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/otp/verify
/// Content-Type: application/json
///
/// { "identifier": "citizen@example.com", "code": "042137" }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Validation failed
/// - `401 Unauthorized`: Wrong, expired, or already-used code
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<OtpVerifyRequest>,
) -> ApiResult<Json<OtpVerifyResponse>> {
    req.validate().map_err(validation_error)?;

    if !otp::validate_code_format(&req.code) {
        return Err(ApiError::BadRequest("Code must be 6 digits".to_string()));
    }

    let code_hash = otp::hash_code(&req.code);
    let consumed = VerificationToken::consume(&state.db, &req.identifier, &code_hash).await?;
    if consumed.is_none() {
        return Err(ApiError::Unauthorized(
            "Invalid or expired code".to_string(),
        ));
    }

    let user = find_by_identifier(&state, &req.identifier)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired code".to_string()))?;

    User::record_login(&state.db, user.id).await?;

    let access_claims = jwt::Claims::new(
        user.id,
        user.role,
        user.consulate_id,
        jwt::TokenType::Access,
    );
    let refresh_claims = jwt::Claims::new(
        user.id,
        user.role,
        user.consulate_id,
        jwt::TokenType::Refresh,
    );

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "Login succeeded");

    Ok(Json(OtpVerifyResponse {
        user_id: user.id.to_string(),
        role: user.role.as_str().to_string(),
        access_token,
        refresh_token,
    }))
}

/// Token refresh endpoint
///
/// Exchanges a refresh token for a new access token.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Looks up a user by email or phone identifier
async fn find_by_identifier(
    state: &AppState,
    identifier: &str,
) -> Result<Option<User>, sqlx::Error> {
    if identifier.contains('@') {
        User::find_by_email(&state.db, identifier).await
    } else {
        User::find_by_phone(&state.db, identifier).await
    }
}
