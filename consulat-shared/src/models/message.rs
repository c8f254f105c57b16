/// Message model: the citizen/staff thread attached to a request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A single message in a request thread
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub request_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Appends a message to a request thread
    pub async fn create(
        pool: &PgPool,
        request_id: Uuid,
        sender_id: Uuid,
        body: String,
    ) -> Result<Self, sqlx::Error> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (request_id, sender_id, body)
            VALUES ($1, $2, $3)
            RETURNING id, request_id, sender_id, body, created_at
            "#,
        )
        .bind(request_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(pool)
        .await?;

        Ok(message)
    }

    /// Lists a request's messages, oldest first
    pub async fn list_by_request(
        pool: &PgPool,
        request_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, request_id, sender_id, body, created_at
            FROM messages
            WHERE request_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(request_id)
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }
}
