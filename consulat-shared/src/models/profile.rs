/// Profile model and database operations
///
/// Civil-status profile, one row per user. Created empty at registration
/// and filled in by the citizen afterwards. Profile fields are also used
/// to build the context passed to the AI assistant.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE profiles (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
///     first_name VARCHAR(100),
///     last_name VARCHAR(100),
///     birth_date DATE,
///     birth_place VARCHAR(255),
///     nationality VARCHAR(100),
///     address TEXT,
///     city VARCHAR(100),
///     country VARCHAR(100),
///     passport_number VARCHAR(64),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Profile model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    /// Unique profile ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Given name
    pub first_name: Option<String>,

    /// Family name
    pub last_name: Option<String>,

    /// Date of birth
    pub birth_date: Option<NaiveDate>,

    /// Place of birth
    pub birth_place: Option<String>,

    /// Nationality
    pub nationality: Option<String>,

    /// Street address
    pub address: Option<String>,

    /// City of residence
    pub city: Option<String>,

    /// Country of residence
    pub country: Option<String>,

    /// Passport number
    pub passport_number: Option<String>,

    /// When the profile was created
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for updating a profile; only non-None fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub birth_place: Option<String>,
    pub nationality: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub passport_number: Option<String>,
}

const PROFILE_COLUMNS: &str = "id, user_id, first_name, last_name, birth_date, birth_place, \
     nationality, address, city, country, passport_number, created_at, updated_at";

impl Profile {
    /// Creates an empty profile for a user
    ///
    /// Called once at registration; the UNIQUE constraint on `user_id`
    /// rejects duplicates.
    pub async fn create_empty(pool: &PgPool, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "INSERT INTO profiles (user_id) VALUES ($1) RETURNING {}",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(profile)
    }

    /// Finds the profile belonging to a user
    pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {} FROM profiles WHERE user_id = $1",
            PROFILE_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Updates the profile belonging to a user
    ///
    /// Only non-None fields are written; `updated_at` is always refreshed.
    pub async fn update_by_user(
        pool: &PgPool,
        user_id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE profiles SET updated_at = NOW()");
        let mut bind_count = 1;

        let fields = [
            ("first_name", data.first_name.is_some()),
            ("last_name", data.last_name.is_some()),
            ("birth_date", data.birth_date.is_some()),
            ("birth_place", data.birth_place.is_some()),
            ("nationality", data.nationality.is_some()),
            ("address", data.address.is_some()),
            ("city", data.city.is_some()),
            ("country", data.country.is_some()),
            ("passport_number", data.passport_number.is_some()),
        ];

        for (column, present) in fields {
            if present {
                bind_count += 1;
                query.push_str(&format!(", {} = ${}", column, bind_count));
            }
        }

        query.push_str(&format!(
            " WHERE user_id = $1 RETURNING {}",
            PROFILE_COLUMNS
        ));

        let mut q = sqlx::query_as::<_, Profile>(&query).bind(user_id);

        if let Some(v) = data.first_name {
            q = q.bind(v);
        }
        if let Some(v) = data.last_name {
            q = q.bind(v);
        }
        if let Some(v) = data.birth_date {
            q = q.bind(v);
        }
        if let Some(v) = data.birth_place {
            q = q.bind(v);
        }
        if let Some(v) = data.nationality {
            q = q.bind(v);
        }
        if let Some(v) = data.address {
            q = q.bind(v);
        }
        if let Some(v) = data.city {
            q = q.bind(v);
        }
        if let Some(v) = data.country {
            q = q.bind(v);
        }
        if let Some(v) = data.passport_number {
            q = q.bind(v);
        }

        let profile = q.fetch_optional(pool).await?;

        Ok(profile)
    }

    /// Builds the short free-text context handed to the AI assistant
    ///
    /// Only filled-in fields are included; an untouched profile yields an
    /// empty string.
    pub fn assistant_context(&self) -> String {
        let mut parts = Vec::new();

        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => parts.push(format!("Name: {} {}", first, last)),
            (Some(first), None) => parts.push(format!("Name: {}", first)),
            (None, Some(last)) => parts.push(format!("Name: {}", last)),
            (None, None) => {}
        }
        if let Some(ref nationality) = self.nationality {
            parts.push(format!("Nationality: {}", nationality));
        }
        if let Some(ref country) = self.country {
            parts.push(format!("Country of residence: {}", country));
        }
        if let Some(ref city) = self.city {
            parts.push(format!("City: {}", city));
        }

        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_profile() -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            first_name: None,
            last_name: None,
            birth_date: None,
            birth_place: None,
            nationality: None,
            address: None,
            city: None,
            country: None,
            passport_number: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_assistant_context_empty() {
        assert_eq!(empty_profile().assistant_context(), "");
    }

    #[test]
    fn test_assistant_context_partial() {
        let mut profile = empty_profile();
        profile.first_name = Some("Awa".to_string());
        profile.last_name = Some("Diallo".to_string());
        profile.nationality = Some("Senegalese".to_string());

        let context = profile.assistant_context();
        assert!(context.contains("Name: Awa Diallo"));
        assert!(context.contains("Nationality: Senegalese"));
        assert!(!context.contains("City"));
    }
}
