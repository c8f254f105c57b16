/// Document endpoints
///
/// Multipart upload with LLM analysis. The file bytes are forwarded to the
/// assistant provider for classification; the returned metadata JSON is
/// persisted on the document row. Analysis is skipped for MIME types the
/// provider cannot read; a provider failure fails the upload (nothing is
/// retried).
///
/// # Endpoints
///
/// - `POST /v1/documents` - Upload (multipart: `file`, optional
///   `request_id` and `storage_url` fields)
/// - `GET /v1/documents` - List own documents
/// - `GET /v1/documents/:id` - Document detail
/// - `DELETE /v1/documents/:id` - Delete own document

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use consulat_shared::{
    auth::middleware::AuthContext,
    models::{
        document::{CreateDocument, Document},
        request::Request,
    },
};
use uuid::Uuid;

use super::requests::Pagination;

/// Upload size cap (10 MB)
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// MIME types the assistant can analyze
const ANALYZABLE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "application/pdf",
    "text/plain",
];

/// Uploads a document and runs LLM analysis
///
/// Multipart fields:
/// - `file` (required): the document itself
/// - `request_id` (optional): attach to one of the caller's requests
/// - `storage_url` (optional): URL at the upload provider, when the client
///   stored the bytes there
///
/// # Errors
///
/// - `400 Bad Request`: Missing file field or oversized upload
/// - `404 Not Found`: `request_id` does not name one of the caller's requests
/// - `503 Service Unavailable`: The analysis provider failed
pub async fn upload_document(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Document>)> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut request_id: Option<Uuid> = None;
    let mut storage_url: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("file") => {
                let name = field
                    .file_name()
                    .unwrap_or("document")
                    .to_string();
                let mime_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;

                if bytes.len() > MAX_UPLOAD_BYTES {
                    return Err(ApiError::BadRequest(
                        "File exceeds the 10 MB upload limit".to_string(),
                    ));
                }

                file = Some((name, mime_type, bytes.to_vec()));
            }
            Some("request_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid request_id: {}", e)))?;
                let id = text
                    .parse::<Uuid>()
                    .map_err(|_| ApiError::BadRequest("Invalid request_id".to_string()))?;
                request_id = Some(id);
            }
            Some("storage_url") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid storage_url: {}", e)))?;
                storage_url = Some(text);
            }
            _ => {}
        }
    }

    let (name, mime_type, bytes) =
        file.ok_or_else(|| ApiError::BadRequest("Missing file field".to_string()))?;

    // An attached request must belong to the caller
    if let Some(id) = request_id {
        Request::find_by_id_and_user(&state.db, id, auth.user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Request not found".to_string()))?;
    }

    let analysis = if ANALYZABLE_TYPES.contains(&mime_type.as_str()) {
        match state.assistant.analyze_document(&name, &mime_type, &bytes).await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                tracing::error!(document = %name, error = %e, "Document analysis failed");
                return Err(ApiError::ServiceUnavailable(
                    "Document analysis is currently unavailable".to_string(),
                ));
            }
        }
    } else {
        tracing::debug!(document = %name, mime_type = %mime_type, "Analysis skipped");
        None
    };

    let document = Document::create(
        &state.db,
        CreateDocument {
            user_id: auth.user_id,
            request_id,
            name,
            mime_type,
            size_bytes: bytes.len() as i64,
            storage_url,
            analysis,
        },
    )
    .await?;

    tracing::info!(document_id = %document.id, "Document uploaded");

    Ok((StatusCode::CREATED, Json(document)))
}

/// Lists the caller's documents, newest first
pub async fn list_documents(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<Document>>> {
    let documents =
        Document::list_by_user(&state.db, auth.user_id, page.limit(), page.offset()).await?;

    Ok(Json(documents))
}

/// Returns one of the caller's documents
pub async fn get_document(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Document>> {
    let document = Document::find_by_id_and_user(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Document not found".to_string()))?;

    Ok(Json(document))
}

/// Deletes one of the caller's documents
pub async fn delete_document(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = Document::delete_owned(&state.db, id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Document not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
