/// Verification token model and database operations
///
/// Stores the OTP credential used for email/phone authentication. Only the
/// SHA-256 hash of the code is persisted; the plaintext exists just long
/// enough to hand to the delivery provider.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE verification_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     identifier CITEXT NOT NULL,
///     code_hash VARCHAR(64) NOT NULL,
///     expires_at TIMESTAMPTZ NOT NULL,
///     consumed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// A token is usable while `expires_at` is in the future and `consumed_at`
/// is NULL. Verification consumes the token so a code can never be replayed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Stored OTP credential
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VerificationToken {
    /// Unique token ID
    pub id: Uuid,

    /// Email address or phone number the code was issued for
    pub identifier: String,

    /// SHA-256 hex digest of the 6-digit code
    pub code_hash: String,

    /// When the code stops being valid
    pub expires_at: DateTime<Utc>,

    /// When the code was successfully used (None if never)
    pub consumed_at: Option<DateTime<Utc>>,

    /// When the code was issued
    pub created_at: DateTime<Utc>,
}

impl VerificationToken {
    /// Stores a freshly issued code hash
    ///
    /// Outstanding codes for the same identifier are invalidated first so
    /// at most one code is live per identifier.
    pub async fn issue(
        pool: &PgPool,
        identifier: &str,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE verification_tokens
            SET consumed_at = NOW()
            WHERE identifier = $1 AND consumed_at IS NULL
            "#,
        )
        .bind(identifier)
        .execute(pool)
        .await?;

        let token = sqlx::query_as::<_, VerificationToken>(
            r#"
            INSERT INTO verification_tokens (identifier, code_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, identifier, code_hash, expires_at, consumed_at, created_at
            "#,
        )
        .bind(identifier)
        .bind(code_hash)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(token)
    }

    /// Consumes a live token matching the identifier and code hash
    ///
    /// Returns the token when the hash matched an unexpired, unconsumed
    /// row; None otherwise. The match and the consumption are a single
    /// UPDATE, so a code cannot be redeemed twice.
    pub async fn consume(
        pool: &PgPool,
        identifier: &str,
        code_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let token = sqlx::query_as::<_, VerificationToken>(
            r#"
            UPDATE verification_tokens
            SET consumed_at = NOW()
            WHERE identifier = $1
              AND code_hash = $2
              AND consumed_at IS NULL
              AND expires_at > NOW()
            RETURNING id, identifier, code_hash, expires_at, consumed_at, created_at
            "#,
        )
        .bind(identifier)
        .bind(code_hash)
        .fetch_optional(pool)
        .await?;

        Ok(token)
    }

    /// Deletes expired tokens older than the given number of days
    ///
    /// Housekeeping helper; returns the number of rows removed.
    pub async fn purge_expired(pool: &PgPool, older_than_days: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM verification_tokens
            WHERE expires_at < NOW() - ($1 || ' days')::interval
            "#,
        )
        .bind(older_than_days.to_string())
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
