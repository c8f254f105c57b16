/// Document model and database operations
///
/// Uploaded documents (scans of passports, certificates, photos). The file
/// bytes live with the upload provider; this table keeps the metadata plus
/// whatever the AI analysis returned.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE documents (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     request_id UUID REFERENCES requests(id) ON DELETE SET NULL,
///     name VARCHAR(255) NOT NULL,
///     mime_type VARCHAR(100) NOT NULL,
///     size_bytes BIGINT NOT NULL DEFAULT 0,
///     storage_url VARCHAR(1024),
///     analysis JSONB,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Document model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Request the document is attached to, if any
    pub request_id: Option<Uuid>,

    /// Original file name
    pub name: String,

    /// MIME type reported at upload
    pub mime_type: String,

    /// File size in bytes
    pub size_bytes: i64,

    /// URL at the upload provider, if the client stored the file there
    pub storage_url: Option<String>,

    /// Metadata returned by the AI document analysis (None if the
    /// analysis failed or was skipped)
    pub analysis: Option<JsonValue>,

    /// When the document was uploaded
    pub created_at: DateTime<Utc>,
}

/// Input for creating a document row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocument {
    /// Owning user
    pub user_id: Uuid,

    /// Request attachment, if any
    pub request_id: Option<Uuid>,

    /// Original file name
    pub name: String,

    /// MIME type
    pub mime_type: String,

    /// File size in bytes
    pub size_bytes: i64,

    /// Upload-provider URL
    pub storage_url: Option<String>,

    /// AI analysis metadata
    pub analysis: Option<JsonValue>,
}

const DOCUMENT_COLUMNS: &str =
    "id, user_id, request_id, name, mime_type, size_bytes, storage_url, analysis, created_at";

impl Document {
    /// Creates a document row
    pub async fn create(pool: &PgPool, data: CreateDocument) -> Result<Self, sqlx::Error> {
        let document = sqlx::query_as::<_, Document>(&format!(
            r#"
            INSERT INTO documents
                (user_id, request_id, name, mime_type, size_bytes, storage_url, analysis)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(data.user_id)
        .bind(data.request_id)
        .bind(data.name)
        .bind(data.mime_type)
        .bind(data.size_bytes)
        .bind(data.storage_url)
        .bind(data.analysis)
        .fetch_one(pool)
        .await?;

        Ok(document)
    }

    /// Finds a document by ID scoped to its owner
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let document = sqlx::query_as::<_, Document>(&format!(
            "SELECT {} FROM documents WHERE id = $1 AND user_id = $2",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(document)
    }

    /// Lists a user's documents, newest first
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let documents = sqlx::query_as::<_, Document>(&format!(
            r#"
            SELECT {}
            FROM documents
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(documents)
    }

    /// Lists documents attached to a request
    pub async fn list_by_request(
        pool: &PgPool,
        request_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let documents = sqlx::query_as::<_, Document>(&format!(
            r#"
            SELECT {}
            FROM documents
            WHERE request_id = $1
            ORDER BY created_at ASC
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(request_id)
        .fetch_all(pool)
        .await?;

        Ok(documents)
    }

    /// Deletes a document owned by the given user
    pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
