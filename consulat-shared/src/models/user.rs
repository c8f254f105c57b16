/// User model and database operations
///
/// Portal accounts. Every user carries a role and, except for superadmins,
/// an attachment to a consulate. Authentication is OTP-based, so there is
/// no password column; the credential lives in `verification_tokens`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('citizen', 'agent', 'admin', 'superadmin');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email CITEXT NOT NULL UNIQUE,
///     phone VARCHAR(32) UNIQUE,
///     role user_role NOT NULL DEFAULT 'citizen',
///     consulate_id UUID REFERENCES consulates(id) ON DELETE SET NULL,
///     email_verified BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```
///
/// # Roles
///
/// - **citizen**: Owns a profile, requests, and documents
/// - **agent**: Handles requests for their consulate
/// - **admin**: Manages procedures, notifications, and consulate staff
/// - **superadmin**: Cross-consulate administration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Portal roles, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Citizen using consular services
    Citizen,

    /// Consulate staff handling requests
    Agent,

    /// Consulate administrator
    Admin,

    /// Cross-consulate administrator
    Superadmin,
}

impl UserRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Citizen => "citizen",
            UserRole::Agent => "agent",
            UserRole::Admin => "admin",
            UserRole::Superadmin => "superadmin",
        }
    }

    /// Staff roles can see requests beyond their own
    pub fn is_staff(&self) -> bool {
        matches!(
            self,
            UserRole::Agent | UserRole::Admin | UserRole::Superadmin
        )
    }

    /// Checks if this role meets or exceeds the required role
    ///
    /// Hierarchy: Superadmin > Admin > Agent > Citizen
    pub fn has_permission(&self, required: &UserRole) -> bool {
        self.permission_level() >= required.permission_level()
    }

    fn permission_level(&self) -> u8 {
        match self {
            UserRole::Superadmin => 4,
            UserRole::Admin => 3,
            UserRole::Agent => 2,
            UserRole::Citizen => 1,
        }
    }
}

/// User model representing a portal account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address (case-insensitive via CITEXT), unique
    pub email: String,

    /// Optional phone number in E.164 form, unique when present
    pub phone: Option<String>,

    /// Portal role
    pub role: UserRole,

    /// Consulate the user is attached to (None for superadmins)
    pub consulate_id: Option<Uuid>,

    /// Whether the email address has been verified via OTP
    pub email_verified: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address
    pub email: String,

    /// Optional phone number
    pub phone: Option<String>,

    /// Portal role
    pub role: UserRole,

    /// Consulate attachment
    pub consulate_id: Option<Uuid>,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New email address
    pub email: Option<String>,

    /// New phone number (use Some(None) to clear)
    pub phone: Option<Option<String>>,

    /// New role
    pub role: Option<UserRole>,

    /// New consulate attachment (use Some(None) to clear)
    pub consulate_id: Option<Option<Uuid>>,

    /// Update email verification status
    pub email_verified: Option<bool>,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email or phone already exists (unique
    /// constraint violation) or the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, phone, role, consulate_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, phone, role, consulate_id, email_verified,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(data.email)
        .bind(data.phone)
        .bind(data.role)
        .bind(data.consulate_id)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, phone, role, consulate_id, email_verified,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive via CITEXT)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, phone, role, consulate_id, email_verified,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by phone number
    pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, phone, role, consulate_id, email_verified,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE phone = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` are written; `updated_at` is always
    /// refreshed.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.phone.is_some() {
            bind_count += 1;
            query.push_str(&format!(", phone = ${}", bind_count));
        }
        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }
        if data.consulate_id.is_some() {
            bind_count += 1;
            query.push_str(&format!(", consulate_id = ${}", bind_count));
        }
        if data.email_verified.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email_verified = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, email, phone, role, consulate_id, \
             email_verified, created_at, updated_at, last_login_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(phone_opt) = data.phone {
            q = q.bind(phone_opt);
        }
        if let Some(role) = data.role {
            q = q.bind(role);
        }
        if let Some(consulate_opt) = data.consulate_id {
            q = q.bind(consulate_opt);
        }
        if let Some(verified) = data.email_verified {
            q = q.bind(verified);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Updates the last login timestamp and marks the email verified
    ///
    /// Called after a successful OTP verification.
    pub async fn record_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW(),
                email_verified = TRUE,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists every user attached to a consulate
    ///
    /// Used by the notification fan-out to resolve consulate-wide
    /// recipient sets.
    pub async fn list_by_consulate(
        pool: &PgPool,
        consulate_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, phone, role, consulate_id, email_verified,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE consulate_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(consulate_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Deletes a user by ID
    ///
    /// Profile, requests, and documents cascade.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_as_str() {
        assert_eq!(UserRole::Citizen.as_str(), "citizen");
        assert_eq!(UserRole::Agent.as_str(), "agent");
        assert_eq!(UserRole::Admin.as_str(), "admin");
        assert_eq!(UserRole::Superadmin.as_str(), "superadmin");
    }

    #[test]
    fn test_role_is_staff() {
        assert!(!UserRole::Citizen.is_staff());
        assert!(UserRole::Agent.is_staff());
        assert!(UserRole::Admin.is_staff());
        assert!(UserRole::Superadmin.is_staff());
    }

    #[test]
    fn test_role_hierarchy() {
        assert!(UserRole::Superadmin.has_permission(&UserRole::Admin));
        assert!(UserRole::Admin.has_permission(&UserRole::Agent));
        assert!(UserRole::Agent.has_permission(&UserRole::Citizen));
        assert!(!UserRole::Citizen.has_permission(&UserRole::Agent));
        assert!(!UserRole::Agent.has_permission(&UserRole::Admin));
        assert!(UserRole::Admin.has_permission(&UserRole::Admin));
    }

    #[test]
    fn test_update_user_default() {
        let update = UpdateUser::default();
        assert!(update.email.is_none());
        assert!(update.phone.is_none());
        assert!(update.role.is_none());
        assert!(update.consulate_id.is_none());
        assert!(update.email_verified.is_none());
    }
}
