/// Procedure model and database operations
///
/// A procedure is a consular service definition (passport renewal, civil
/// registry extract, visa application) offered by one consulate. Citizens
/// open requests against active procedures.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE procedures (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     consulate_id UUID NOT NULL REFERENCES consulates(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     required_documents TEXT[] NOT NULL DEFAULT '{}',
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Deletion rule
///
/// A procedure with no requests is removed outright. Once at least one
/// request references it, deletion only clears `active` so existing
/// requests keep a valid foreign key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Outcome of a delete-or-deactivate call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcedureRemoval {
    /// Row was deleted (no requests referenced it)
    Deleted,

    /// Row was kept and deactivated (requests exist)
    Deactivated,

    /// No procedure with that id
    NotFound,
}

/// Procedure model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Procedure {
    /// Unique procedure ID
    pub id: Uuid,

    /// Owning consulate
    pub consulate_id: Uuid,

    /// Display title
    pub title: String,

    /// Longer description shown to citizens
    pub description: Option<String>,

    /// Names of documents the citizen must attach
    pub required_documents: Vec<String>,

    /// Whether citizens may open new requests
    pub active: bool,

    /// When the procedure was created
    pub created_at: DateTime<Utc>,

    /// When the procedure was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a procedure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProcedure {
    /// Owning consulate
    pub consulate_id: Uuid,

    /// Display title
    pub title: String,

    /// Longer description
    pub description: Option<String>,

    /// Required document names
    pub required_documents: Vec<String>,
}

/// Input for updating a procedure; only non-None fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProcedure {
    /// New title
    pub title: Option<String>,

    /// New description (use Some(None) to clear)
    pub description: Option<Option<String>>,

    /// New required document list (replaces the previous one)
    pub required_documents: Option<Vec<String>>,

    /// Activate or deactivate
    pub active: Option<bool>,
}

const PROCEDURE_COLUMNS: &str =
    "id, consulate_id, title, description, required_documents, active, created_at, updated_at";

impl Procedure {
    /// Creates a new active procedure
    pub async fn create(pool: &PgPool, data: CreateProcedure) -> Result<Self, sqlx::Error> {
        let procedure = sqlx::query_as::<_, Procedure>(&format!(
            r#"
            INSERT INTO procedures (consulate_id, title, description, required_documents)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            PROCEDURE_COLUMNS
        ))
        .bind(data.consulate_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.required_documents)
        .fetch_one(pool)
        .await?;

        Ok(procedure)
    }

    /// Finds a procedure by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let procedure = sqlx::query_as::<_, Procedure>(&format!(
            "SELECT {} FROM procedures WHERE id = $1",
            PROCEDURE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(procedure)
    }

    /// Lists active procedures for a consulate
    pub async fn list_active_by_consulate(
        pool: &PgPool,
        consulate_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let procedures = sqlx::query_as::<_, Procedure>(&format!(
            r#"
            SELECT {}
            FROM procedures
            WHERE consulate_id = $1 AND active = TRUE
            ORDER BY title ASC
            "#,
            PROCEDURE_COLUMNS
        ))
        .bind(consulate_id)
        .fetch_all(pool)
        .await?;

        Ok(procedures)
    }

    /// Lists every procedure of a consulate, active or not
    pub async fn list_by_consulate(
        pool: &PgPool,
        consulate_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let procedures = sqlx::query_as::<_, Procedure>(&format!(
            r#"
            SELECT {}
            FROM procedures
            WHERE consulate_id = $1
            ORDER BY title ASC
            "#,
            PROCEDURE_COLUMNS
        ))
        .bind(consulate_id)
        .fetch_all(pool)
        .await?;

        Ok(procedures)
    }

    /// Updates a procedure
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProcedure,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE procedures SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.required_documents.is_some() {
            bind_count += 1;
            query.push_str(&format!(", required_documents = ${}", bind_count));
        }
        if data.active.is_some() {
            bind_count += 1;
            query.push_str(&format!(", active = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {}", PROCEDURE_COLUMNS));

        let mut q = sqlx::query_as::<_, Procedure>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description_opt) = data.description {
            q = q.bind(description_opt);
        }
        if let Some(documents) = data.required_documents {
            q = q.bind(documents);
        }
        if let Some(active) = data.active {
            q = q.bind(active);
        }

        let procedure = q.fetch_optional(pool).await?;

        Ok(procedure)
    }

    /// Removes a procedure, or deactivates it when requests reference it
    ///
    /// Two round-trips: the request count check and the delete/deactivate
    /// are separate statements.
    pub async fn delete_or_deactivate(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<ProcedureRemoval, sqlx::Error> {
        let (request_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM requests WHERE procedure_id = $1")
                .bind(id)
                .fetch_one(pool)
                .await?;

        if request_count == 0 {
            let result = sqlx::query("DELETE FROM procedures WHERE id = $1")
                .bind(id)
                .execute(pool)
                .await?;

            if result.rows_affected() > 0 {
                return Ok(ProcedureRemoval::Deleted);
            }
            return Ok(ProcedureRemoval::NotFound);
        }

        let result = sqlx::query(
            "UPDATE procedures SET active = FALSE, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            Ok(ProcedureRemoval::Deactivated)
        } else {
            Ok(ProcedureRemoval::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_serialization() {
        assert_eq!(
            serde_json::to_string(&ProcedureRemoval::Deleted).unwrap(),
            "\"deleted\""
        );
        assert_eq!(
            serde_json::to_string(&ProcedureRemoval::Deactivated).unwrap(),
            "\"deactivated\""
        );
    }

    #[test]
    fn test_update_procedure_default() {
        let update = UpdateProcedure::default();
        assert!(update.title.is_none());
        assert!(update.description.is_none());
        assert!(update.required_documents.is_none());
        assert!(update.active.is_none());
    }
}
