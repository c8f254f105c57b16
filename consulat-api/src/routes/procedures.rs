/// Procedure catalog endpoints (citizen view)
///
/// Citizens see the active procedures of their own consulate; staff see
/// everything their consulate offers, active or not.
///
/// # Endpoints
///
/// - `GET /v1/procedures` - List procedures of the caller's consulate
/// - `GET /v1/procedures/:id` - Procedure detail

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use consulat_shared::{auth::middleware::AuthContext, models::procedure::Procedure};
use uuid::Uuid;

/// Lists the caller's consulate procedures
///
/// Citizens only see active procedures; staff also see deactivated ones.
pub async fn list_procedures(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Procedure>>> {
    let consulate_id = auth
        .consulate_id
        .ok_or_else(|| ApiError::BadRequest("No consulate assigned".to_string()))?;

    let procedures = if auth.is_staff() {
        Procedure::list_by_consulate(&state.db, consulate_id).await?
    } else {
        Procedure::list_active_by_consulate(&state.db, consulate_id).await?
    };

    Ok(Json(procedures))
}

/// Returns one procedure of the caller's consulate
pub async fn get_procedure(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Procedure>> {
    let procedure = Procedure::find_by_id(&state.db, id)
        .await?
        .filter(|p| Some(p.consulate_id) == auth.consulate_id || auth.consulate_id.is_none())
        .ok_or_else(|| ApiError::NotFound("Procedure not found".to_string()))?;

    // Citizens cannot inspect deactivated procedures
    if !procedure.active && !auth.is_staff() {
        return Err(ApiError::NotFound("Procedure not found".to_string()));
    }

    Ok(Json(procedure))
}
