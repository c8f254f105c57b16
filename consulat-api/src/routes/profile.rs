/// Profile endpoints
///
/// The caller's civil-status profile: created empty at registration and
/// filled in afterwards. Updates are partial; omitted fields keep their
/// value.
///
/// # Endpoints
///
/// - `GET /v1/profile` - Read the caller's profile
/// - `PUT /v1/profile` - Partially update the caller's profile

use crate::{
    app::AppState,
    error::{validation_error, ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use chrono::NaiveDate;
use consulat_shared::{
    auth::middleware::AuthContext,
    models::profile::{Profile, UpdateProfile},
};
use serde::Deserialize;
use validator::Validate;

/// Profile update body; omitted fields are left untouched
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100, message = "First name must be at most 100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 100, message = "Last name must be at most 100 characters"))]
    pub last_name: Option<String>,

    pub birth_date: Option<NaiveDate>,

    #[validate(length(max = 255, message = "Birth place must be at most 255 characters"))]
    pub birth_place: Option<String>,

    #[validate(length(max = 100, message = "Nationality must be at most 100 characters"))]
    pub nationality: Option<String>,

    pub address: Option<String>,

    #[validate(length(max = 100, message = "City must be at most 100 characters"))]
    pub city: Option<String>,

    #[validate(length(max = 100, message = "Country must be at most 100 characters"))]
    pub country: Option<String>,

    #[validate(length(max = 64, message = "Passport number must be at most 64 characters"))]
    pub passport_number: Option<String>,
}

/// Returns the caller's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Profile>> {
    let profile = Profile::find_by_user(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    Ok(Json(profile))
}

/// Partially updates the caller's profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<Profile>> {
    req.validate().map_err(validation_error)?;

    let profile = Profile::update_by_user(
        &state.db,
        auth.user_id,
        UpdateProfile {
            first_name: req.first_name,
            last_name: req.last_name,
            birth_date: req.birth_date,
            birth_place: req.birth_place,
            nationality: req.nationality,
            address: req.address,
            city: req.city,
            country: req.country,
            passport_number: req.passport_number,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    Ok(Json(profile))
}
