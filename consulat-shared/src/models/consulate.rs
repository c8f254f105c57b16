/// Consulate model and database operations
///
/// A consulate is an administrative unit tied to a set of countries. It
/// owns users, procedures, and requests.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE consulates (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     country_codes TEXT[] NOT NULL DEFAULT '{}',
///     address TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Consulate model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Consulate {
    /// Unique consulate ID
    pub id: Uuid,

    /// Display name (e.g., "Consulate General in Montreal")
    pub name: String,

    /// ISO 3166-1 alpha-2 codes of the countries this consulate serves
    pub country_codes: Vec<String>,

    /// Postal address
    pub address: Option<String>,

    /// When the consulate was created
    pub created_at: DateTime<Utc>,

    /// When the consulate was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a consulate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConsulate {
    /// Display name
    pub name: String,

    /// Served country codes
    pub country_codes: Vec<String>,

    /// Postal address
    pub address: Option<String>,
}

/// Input for updating a consulate; only non-None fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateConsulate {
    /// New display name
    pub name: Option<String>,

    /// New country code list (replaces the previous list)
    pub country_codes: Option<Vec<String>>,

    /// New address (use Some(None) to clear)
    pub address: Option<Option<String>>,
}

impl Consulate {
    /// Creates a new consulate
    pub async fn create(pool: &PgPool, data: CreateConsulate) -> Result<Self, sqlx::Error> {
        let consulate = sqlx::query_as::<_, Consulate>(
            r#"
            INSERT INTO consulates (name, country_codes, address)
            VALUES ($1, $2, $3)
            RETURNING id, name, country_codes, address, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.country_codes)
        .bind(data.address)
        .fetch_one(pool)
        .await?;

        Ok(consulate)
    }

    /// Finds a consulate by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let consulate = sqlx::query_as::<_, Consulate>(
            r#"
            SELECT id, name, country_codes, address, created_at, updated_at
            FROM consulates
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(consulate)
    }

    /// Lists all consulates, alphabetically
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let consulates = sqlx::query_as::<_, Consulate>(
            r#"
            SELECT id, name, country_codes, address, created_at, updated_at
            FROM consulates
            ORDER BY name ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(consulates)
    }

    /// Updates a consulate
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateConsulate,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE consulates SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.country_codes.is_some() {
            bind_count += 1;
            query.push_str(&format!(", country_codes = ${}", bind_count));
        }
        if data.address.is_some() {
            bind_count += 1;
            query.push_str(&format!(", address = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, name, country_codes, address, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Consulate>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(codes) = data.country_codes {
            q = q.bind(codes);
        }
        if let Some(address_opt) = data.address {
            q = q.bind(address_opt);
        }

        let consulate = q.fetch_optional(pool).await?;

        Ok(consulate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_consulate_default() {
        let update = UpdateConsulate::default();
        assert!(update.name.is_none());
        assert!(update.country_codes.is_none());
        assert!(update.address.is_none());
    }
}
