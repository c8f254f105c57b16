/// Database models for the consulat portal
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Portal accounts with a role and optional consulate attachment
/// - `consulate`: Administrative units tied to a set of countries
/// - `profile`: Civil-status profile, one per user
/// - `verification_token`: Stored OTP credentials (hash + expiry)
/// - `procedure`: Consular service definitions offered to citizens
/// - `request`: Citizen-submitted workflow instances with a status lifecycle
/// - `document`: Uploaded documents with optional AI-extracted metadata
/// - `notification`: Admin notifications with array-based read tracking
/// - `message`: Citizen/staff thread attached to a request
/// - `note`: Internal staff notes attached to a request
///
/// # Example
///
/// ```no_run
/// use consulat_shared::models::user::{User, CreateUser, UserRole};
/// use consulat_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     email: "citizen@example.com".to_string(),
///     phone: None,
///     role: UserRole::Citizen,
///     consulate_id: None,
/// }).await?;
/// # Ok(())
/// # }
/// ```

pub mod consulate;
pub mod document;
pub mod message;
pub mod note;
pub mod notification;
pub mod procedure;
pub mod profile;
pub mod request;
pub mod user;
pub mod verification_token;
