/// Authentication and authorization utilities
///
/// This module provides secure authentication primitives for the portal:
///
/// # Modules
///
/// - [`otp`]: One-time login code generation and hashing
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Authenticated request context for handlers
/// - [`authorization`]: Role hierarchy and ownership checks
///
/// # Security Features
///
/// - **Login Codes**: Random 6-digit codes, stored as SHA-256 hashes
/// - **JWT Tokens**: HS256 signing with configurable expiration
/// - **Role Checks**: Hierarchical role comparison (citizen < agent < admin < superadmin)
///
/// # Example
///
/// ```no_run
/// use consulat_shared::auth::otp::{generate_code, hash_code};
/// use consulat_shared::auth::jwt::{create_token, Claims, TokenType};
/// use consulat_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // One-time login code
/// let code = generate_code();
/// let stored = hash_code(&code);
///
/// // JWT token generation
/// let claims = Claims::new(Uuid::new_v4(), UserRole::Citizen, None, TokenType::Access);
/// let token = create_token(&claims, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod otp;
pub mod jwt;
pub mod middleware;
pub mod authorization;
