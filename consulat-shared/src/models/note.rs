/// Note model: internal staff annotations on a request.
///
/// Notes are never exposed to citizens; the API only serves them on
/// staff-scoped routes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// An internal staff note
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,
    pub request_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Adds a note to a request
    pub async fn create(
        pool: &PgPool,
        request_id: Uuid,
        author_id: Uuid,
        body: String,
    ) -> Result<Self, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (request_id, author_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, request_id, author_id, body, created_at
            "#,
        )
        .bind(request_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(pool)
        .await?;

        Ok(note)
    }

    /// Lists a request's notes, oldest first
    pub async fn list_by_request(
        pool: &PgPool,
        request_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let notes = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, request_id, author_id, body, created_at
            FROM notes
            WHERE request_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(request_id)
        .fetch_all(pool)
        .await?;

        Ok(notes)
    }
}
