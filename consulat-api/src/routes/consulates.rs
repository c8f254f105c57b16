/// Consulate directory endpoint
///
/// # Endpoints
///
/// - `GET /v1/consulates` - List all consulates (authenticated)

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use consulat_shared::models::consulate::Consulate;

/// Lists every consulate, alphabetically
pub async fn list_consulates(State(state): State<AppState>) -> ApiResult<Json<Vec<Consulate>>> {
    let consulates = Consulate::list(&state.db).await?;
    Ok(Json(consulates))
}
