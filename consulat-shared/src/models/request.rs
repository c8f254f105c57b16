/// Request model and database operations
///
/// A request is a citizen-submitted workflow instance for one procedure.
/// It carries a status field, free-form form data, and owns the documents,
/// messages, and notes attached to it.
///
/// # Status lifecycle
///
/// ```text
/// draft → submitted → in_review → completed
///                               → rejected
/// ```
///
/// The lifecycle above is the intended flow; no transition table is
/// enforced, and any status may follow any other. Transitions to
/// `submitted` and `completed` stamp `submitted_at` and `completed_at`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE request_status AS ENUM (
///     'draft', 'submitted', 'in_review', 'completed', 'rejected'
/// );
///
/// CREATE TABLE requests (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     procedure_id UUID NOT NULL REFERENCES procedures(id),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     consulate_id UUID NOT NULL REFERENCES consulates(id),
///     status request_status NOT NULL DEFAULT 'draft',
///     form_data JSONB NOT NULL DEFAULT '{}',
///     submitted_at TIMESTAMPTZ,
///     completed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

/// Request workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Being filled in by the citizen, not yet visible to staff
    Draft,

    /// Handed over to the consulate
    Submitted,

    /// An agent is working on it
    InReview,

    /// Processed successfully
    Completed,

    /// Refused by the consulate
    Rejected,
}

impl RequestStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Draft => "draft",
            RequestStatus::Submitted => "submitted",
            RequestStatus::InReview => "in_review",
            RequestStatus::Completed => "completed",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// Checks if the request has reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Rejected)
    }

    /// Checks if staff can see the request
    ///
    /// Drafts stay private to the citizen until submission.
    pub fn is_visible_to_staff(&self) -> bool {
        !matches!(self, RequestStatus::Draft)
    }
}

/// Request model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Request {
    /// Unique request ID
    pub id: Uuid,

    /// Procedure this request was opened against
    pub procedure_id: Uuid,

    /// Citizen who owns the request
    pub user_id: Uuid,

    /// Consulate handling the request
    pub consulate_id: Uuid,

    /// Current workflow status
    pub status: RequestStatus,

    /// Free-form form data collected from the citizen
    pub form_data: JsonValue,

    /// When the citizen handed the request over (None while draft)
    pub submitted_at: Option<DateTime<Utc>>,

    /// When the request reached `completed` (None otherwise)
    pub completed_at: Option<DateTime<Utc>>,

    /// When the request was created
    pub created_at: DateTime<Utc>,

    /// When the request was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new draft request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequest {
    /// Procedure to open the request against
    pub procedure_id: Uuid,

    /// Owning citizen
    pub user_id: Uuid,

    /// Handling consulate (taken from the procedure)
    pub consulate_id: Uuid,

    /// Initial form data
    pub form_data: JsonValue,
}

const REQUEST_COLUMNS: &str = "id, procedure_id, user_id, consulate_id, status, form_data, \
     submitted_at, completed_at, created_at, updated_at";

impl Request {
    /// Creates a new request in draft status
    pub async fn create(pool: &PgPool, data: CreateRequest) -> Result<Self, sqlx::Error> {
        let request = sqlx::query_as::<_, Request>(&format!(
            r#"
            INSERT INTO requests (procedure_id, user_id, consulate_id, form_data)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        ))
        .bind(data.procedure_id)
        .bind(data.user_id)
        .bind(data.consulate_id)
        .bind(data.form_data)
        .fetch_one(pool)
        .await?;

        Ok(request)
    }

    /// Finds a request by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let request = sqlx::query_as::<_, Request>(&format!(
            "SELECT {} FROM requests WHERE id = $1",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(request)
    }

    /// Finds a request by ID scoped to its owner
    ///
    /// The preferred lookup for citizen-facing endpoints: a request that
    /// exists but belongs to someone else is indistinguishable from one
    /// that does not exist.
    pub async fn find_by_id_and_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let request = sqlx::query_as::<_, Request>(&format!(
            "SELECT {} FROM requests WHERE id = $1 AND user_id = $2",
            REQUEST_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(request)
    }

    /// Finds a request by ID scoped to a consulate
    ///
    /// Staff-facing lookup; drafts are excluded.
    pub async fn find_by_id_and_consulate(
        pool: &PgPool,
        id: Uuid,
        consulate_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let request = sqlx::query_as::<_, Request>(&format!(
            r#"
            SELECT {}
            FROM requests
            WHERE id = $1 AND consulate_id = $2 AND status <> 'draft'
            "#,
            REQUEST_COLUMNS
        ))
        .bind(id)
        .bind(consulate_id)
        .fetch_optional(pool)
        .await?;

        Ok(request)
    }

    /// Lists a citizen's requests, newest first
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let requests = sqlx::query_as::<_, Request>(&format!(
            r#"
            SELECT {}
            FROM requests
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            REQUEST_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(requests)
    }

    /// Lists a consulate's non-draft requests, oldest first
    ///
    /// Optionally filtered to a single status.
    pub async fn list_by_consulate(
        pool: &PgPool,
        consulate_id: Uuid,
        status: Option<RequestStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let requests = match status {
            Some(status) => {
                sqlx::query_as::<_, Request>(&format!(
                    r#"
                    SELECT {}
                    FROM requests
                    WHERE consulate_id = $1 AND status = $2
                    ORDER BY created_at ASC
                    LIMIT $3 OFFSET $4
                    "#,
                    REQUEST_COLUMNS
                ))
                .bind(consulate_id)
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Request>(&format!(
                    r#"
                    SELECT {}
                    FROM requests
                    WHERE consulate_id = $1 AND status <> 'draft'
                    ORDER BY created_at ASC
                    LIMIT $2 OFFSET $3
                    "#,
                    REQUEST_COLUMNS
                ))
                .bind(consulate_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(requests)
    }

    /// Updates form data and optionally moves the request to a new status
    ///
    /// Scoped to the owning user: a non-owned id updates nothing and
    /// returns None. Moving to `submitted` stamps `submitted_at`; moving
    /// to `completed` stamps `completed_at`. Already-set stamps are kept.
    pub async fn update_owned(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        form_data: Option<JsonValue>,
        status: Option<RequestStatus>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE requests SET updated_at = NOW()");
        let mut bind_count = 2;

        if form_data.is_some() {
            bind_count += 1;
            query.push_str(&format!(", form_data = ${}", bind_count));
        }
        if status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        match status {
            Some(RequestStatus::Submitted) => {
                query.push_str(", submitted_at = COALESCE(submitted_at, NOW())");
            }
            Some(RequestStatus::Completed) => {
                query.push_str(", completed_at = COALESCE(completed_at, NOW())");
            }
            _ => {}
        }

        query.push_str(&format!(
            " WHERE id = $1 AND user_id = $2 RETURNING {}",
            REQUEST_COLUMNS
        ));

        let mut q = sqlx::query_as::<_, Request>(&query).bind(id).bind(user_id);

        if let Some(data) = form_data {
            q = q.bind(data);
        }
        if let Some(status) = status {
            q = q.bind(status);
        }

        let request = q.fetch_optional(pool).await?;

        Ok(request)
    }

    /// Moves a request to a new status, scoped to a consulate
    ///
    /// Staff-side counterpart of [`Request::update_owned`]; same
    /// timestamping rules, no transition table. Drafts match no row.
    pub async fn set_status_for_consulate(
        pool: &PgPool,
        id: Uuid,
        consulate_id: Uuid,
        status: RequestStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let stamp = match status {
            RequestStatus::Submitted => ", submitted_at = COALESCE(submitted_at, NOW())",
            RequestStatus::Completed => ", completed_at = COALESCE(completed_at, NOW())",
            _ => "",
        };

        let query = format!(
            r#"
            UPDATE requests
            SET status = $3, updated_at = NOW(){}
            WHERE id = $1 AND consulate_id = $2 AND status <> 'draft'
            RETURNING {}
            "#,
            stamp, REQUEST_COLUMNS
        );

        let request = sqlx::query_as::<_, Request>(&query)
            .bind(id)
            .bind(consulate_id)
            .bind(status)
            .fetch_optional(pool)
            .await?;

        Ok(request)
    }

    /// Deletes a request owned by the given user
    pub async fn delete_owned(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM requests WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts a consulate's requests in a given status
    pub async fn count_by_consulate_and_status(
        pool: &PgPool,
        consulate_id: Uuid,
        status: RequestStatus,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM requests WHERE consulate_id = $1 AND status = $2",
        )
        .bind(consulate_id)
        .bind(status)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str() {
        assert_eq!(RequestStatus::Draft.as_str(), "draft");
        assert_eq!(RequestStatus::Submitted.as_str(), "submitted");
        assert_eq!(RequestStatus::InReview.as_str(), "in_review");
        assert_eq!(RequestStatus::Completed.as_str(), "completed");
        assert_eq!(RequestStatus::Rejected.as_str(), "rejected");
    }

    #[test]
    fn test_status_is_terminal() {
        assert!(!RequestStatus::Draft.is_terminal());
        assert!(!RequestStatus::Submitted.is_terminal());
        assert!(!RequestStatus::InReview.is_terminal());
        assert!(RequestStatus::Completed.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
    }

    #[test]
    fn test_status_staff_visibility() {
        assert!(!RequestStatus::Draft.is_visible_to_staff());
        assert!(RequestStatus::Submitted.is_visible_to_staff());
        assert!(RequestStatus::Rejected.is_visible_to_staff());
    }

    #[test]
    fn test_status_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::InReview).unwrap(),
            "\"in_review\""
        );
        let parsed: RequestStatus = serde_json::from_str("\"in_review\"").unwrap();
        assert_eq!(parsed, RequestStatus::InReview);
    }
}
