/// Notification endpoints (recipient side)
///
/// Notifications are fanned out by admins (see the admin routes); here the
/// recipient lists what is visible and manages read state. One row is
/// shared by all recipients, so "read" means the caller's id sits in the
/// row's `read_by` array.
///
/// # Endpoints
///
/// - `GET /v1/notifications` - List visible notifications
/// - `POST /v1/notifications/:id/viewed` - Mark one viewed (idempotent)
/// - `POST /v1/notifications/read-all` - Mark everything viewed

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use consulat_shared::{auth::middleware::AuthContext, models::notification::Notification};
use serde::Serialize;
use uuid::Uuid;

use super::requests::Pagination;

/// Notification as seen by one recipient
///
/// The shared row's recipient/read arrays are collapsed into a single
/// `read` flag for the caller.
#[derive(Debug, Serialize)]
pub struct NotificationView {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub kind: String,
    pub read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl NotificationView {
    fn for_user(notification: Notification, user_id: Uuid) -> Self {
        let read = notification.is_read_by(user_id);
        Self {
            id: notification.id,
            title: notification.title,
            content: notification.content,
            kind: notification.kind,
            read,
            created_at: notification.created_at,
        }
    }
}

/// Response for the bulk read endpoint
#[derive(Debug, Serialize)]
pub struct ReadAllResponse {
    /// Number of notifications newly marked viewed
    pub marked: u64,
}

/// Lists notifications visible to the caller, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<NotificationView>>> {
    let notifications =
        Notification::list_visible(&state.db, auth.user_id, page.limit(), page.offset()).await?;

    let views = notifications
        .into_iter()
        .map(|n| NotificationView::for_user(n, auth.user_id))
        .collect();

    Ok(Json(views))
}

/// Marks one notification viewed
///
/// Idempotent: a second call leaves the viewer id present exactly once and
/// returns the same state.
///
/// # Errors
///
/// - `404 Not Found`: Unknown notification, or caller is not a recipient
pub async fn mark_viewed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<NotificationView>> {
    let notification = Notification::mark_viewed(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Notification not found".to_string()))?;

    Ok(Json(NotificationView::for_user(notification, auth.user_id)))
}

/// Marks every visible notification viewed
///
/// One write per unread notification; returns how many were newly marked.
pub async fn mark_all_viewed(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ReadAllResponse>> {
    let marked = Notification::mark_all_viewed(&state.db, auth.user_id).await?;

    Ok(Json(ReadAllResponse { marked }))
}
