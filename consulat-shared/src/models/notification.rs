/// Notification model and database operations
///
/// One notification row is shared by every recipient. The recipient set is
/// resolved once at creation time (an explicit id list, or every user of a
/// consulate) and stored in `recipient_ids`. Per-user read state is the
/// `read_by` array: viewer ids are appended and never removed.
///
/// The array model (rather than a join table) is inherited from the
/// original portal; membership checks are un-indexed and the array only
/// grows. See DESIGN.md.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE notifications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     content TEXT NOT NULL,
///     kind VARCHAR(50) NOT NULL DEFAULT 'info',
///     consulate_id UUID REFERENCES consulates(id) ON DELETE SET NULL,
///     recipient_ids UUID[] NOT NULL DEFAULT '{}',
///     read_by UUID[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Notification model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    /// Unique notification ID
    pub id: Uuid,

    /// Short title shown in the notification list
    pub title: String,

    /// Body text
    pub content: String,

    /// Category string ("info", "reminder", "alert", ...)
    pub kind: String,

    /// Consulate the notification was targeted at, when consulate-wide
    pub consulate_id: Option<Uuid>,

    /// Users who can see this notification
    pub recipient_ids: Vec<Uuid>,

    /// Users who have viewed it (append-only)
    pub read_by: Vec<Uuid>,

    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    /// Short title
    pub title: String,

    /// Body text
    pub content: String,

    /// Category string
    pub kind: String,

    /// Consulate the recipients were resolved from, if any
    pub consulate_id: Option<Uuid>,

    /// Resolved recipient ids
    pub recipient_ids: Vec<Uuid>,
}

const NOTIFICATION_COLUMNS: &str =
    "id, title, content, kind, consulate_id, recipient_ids, read_by, created_at";

impl Notification {
    /// Creates a notification row shared by all resolved recipients
    pub async fn create(pool: &PgPool, data: CreateNotification) -> Result<Self, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            INSERT INTO notifications (title, content, kind, consulate_id, recipient_ids)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(data.title)
        .bind(data.content)
        .bind(data.kind)
        .bind(data.consulate_id)
        .bind(data.recipient_ids)
        .fetch_one(pool)
        .await?;

        Ok(notification)
    }

    /// Finds a notification by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {} FROM notifications WHERE id = $1",
            NOTIFICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(notification)
    }

    /// Lists notifications visible to a user, newest first
    pub async fn list_visible(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            r#"
            SELECT {}
            FROM notifications
            WHERE $1 = ANY(recipient_ids)
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(notifications)
    }

    /// Appends a viewer id to a notification's read list
    ///
    /// The append is conditional in SQL, so repeated calls leave the id
    /// present exactly once. Only recipients can mark a notification
    /// viewed; a non-recipient id matches no row and returns None.
    pub async fn mark_viewed(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            r#"
            UPDATE notifications
            SET read_by = array_append(read_by, $2)
            WHERE id = $1
              AND $2 = ANY(recipient_ids)
              AND NOT ($2 = ANY(read_by))
            RETURNING {}
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        // Already-viewed rows match no WHERE clause; report the current
        // state instead of None so the call stays idempotent for callers.
        match notification {
            Some(n) => Ok(Some(n)),
            None => {
                let current = Self::find_by_id(pool, id).await?;
                Ok(current.filter(|n| n.recipient_ids.contains(&user_id)))
            }
        }
    }

    /// Marks every notification visible to a user as viewed
    ///
    /// Loads the visible set and appends the viewer id to each row
    /// individually: one write per notification, not a batched update.
    /// Returns the number of rows newly marked.
    pub async fn mark_all_viewed(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let visible = Self::list_visible(pool, user_id, i64::MAX, 0).await?;

        let mut marked = 0u64;
        for notification in visible {
            if notification.read_by.contains(&user_id) {
                continue;
            }

            let result = sqlx::query(
                r#"
                UPDATE notifications
                SET read_by = array_append(read_by, $2)
                WHERE id = $1 AND NOT ($2 = ANY(read_by))
                "#,
            )
            .bind(notification.id)
            .bind(user_id)
            .execute(pool)
            .await?;

            marked += result.rows_affected();
        }

        Ok(marked)
    }

    /// Checks whether a user has viewed this notification
    pub fn is_read_by(&self, user_id: Uuid) -> bool {
        self.read_by.contains(&user_id)
    }

    /// Counts unread notifications for a user
    pub async fn count_unread(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM notifications
            WHERE $1 = ANY(recipient_ids) AND NOT ($1 = ANY(read_by))
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_read_by() {
        let viewer = Uuid::new_v4();
        let other = Uuid::new_v4();

        let notification = Notification {
            id: Uuid::new_v4(),
            title: "Consulate closed".to_string(),
            content: "Closed on May 1st".to_string(),
            kind: "info".to_string(),
            consulate_id: None,
            recipient_ids: vec![viewer, other],
            read_by: vec![viewer],
            created_at: Utc::now(),
        };

        assert!(notification.is_read_by(viewer));
        assert!(!notification.is_read_by(other));
    }
}
