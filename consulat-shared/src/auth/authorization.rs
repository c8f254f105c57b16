/// Authorization helpers and permission checks
///
/// This module provides utilities for role-based access control and
/// resource-level authorization in the portal.
///
/// # Permission Model
///
/// The portal uses a hierarchical role model:
///
/// 1. **Role hierarchy**: citizen < agent < admin < superadmin
/// 2. **Consulate scoping**: staff only act on their own consulate's data
///    (superadmins are unscoped)
/// 3. **Ownership**: citizens only act on rows whose `user_id` is theirs
///
/// # Example
///
/// ```no_run
/// use consulat_shared::auth::authorization::{require_role, require_consulate};
/// use consulat_shared::auth::middleware::AuthContext;
/// use consulat_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// fn check_permissions(auth: &AuthContext, consulate_id: Uuid) -> Result<(), String> {
///     // Check user is at least an agent
///     require_role(auth, UserRole::Agent).map_err(|e| e.to_string())?;
///
///     // Check user acts within their own consulate
///     require_consulate(auth, consulate_id).map_err(|e| e.to_string())?;
///
///     Ok(())
/// }
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User doesn't have required role
    #[error("Insufficient permissions: requires {required:?}, has {actual:?}")]
    InsufficientRole {
        required: UserRole,
        actual: UserRole,
    },

    /// Staff member acting outside their consulate
    #[error("Not authorized for consulate {0}")]
    WrongConsulate(Uuid),

    /// Staff member has no consulate assigned
    #[error("No consulate assigned")]
    NoConsulate,

    /// User doesn't own the resource
    #[error("Not authorized to access this resource")]
    NotAuthorized,
}

/// Requires the context to satisfy a minimum role
///
/// # Errors
///
/// Returns `AuthzError::InsufficientRole` if the context's role sits below
/// the required one in the hierarchy.
pub fn require_role(auth: &AuthContext, required: UserRole) -> Result<(), AuthzError> {
    if auth.has_permission(required) {
        Ok(())
    } else {
        Err(AuthzError::InsufficientRole {
            required,
            actual: auth.role,
        })
    }
}

/// Requires the context to be scoped to the given consulate
///
/// Superadmins pass regardless of scope. Other staff must carry a matching
/// `consulate_id` claim.
///
/// # Errors
///
/// - `AuthzError::NoConsulate` if the context has no consulate claim
/// - `AuthzError::WrongConsulate` if the claim doesn't match
pub fn require_consulate(auth: &AuthContext, consulate_id: Uuid) -> Result<(), AuthzError> {
    if auth.role == UserRole::Superadmin {
        return Ok(());
    }

    match auth.consulate_id {
        Some(id) if id == consulate_id => Ok(()),
        Some(_) => Err(AuthzError::WrongConsulate(consulate_id)),
        None => Err(AuthzError::NoConsulate),
    }
}

/// Requires the context to own a resource
///
/// # Errors
///
/// Returns `AuthzError::NotAuthorized` if the owner id doesn't match.
pub fn require_ownership(auth: &AuthContext, owner_id: Uuid) -> Result<(), AuthzError> {
    if auth.user_id == owner_id {
        Ok(())
    } else {
        Err(AuthzError::NotAuthorized)
    }
}

/// Requires the context to own a resource OR be staff of the given consulate
///
/// This is the common check for request detail routes: the citizen who filed
/// the request and the staff of its consulate may both see it.
pub fn require_owner_or_staff(
    auth: &AuthContext,
    owner_id: Uuid,
    consulate_id: Uuid,
) -> Result<(), AuthzError> {
    if auth.user_id == owner_id {
        return Ok(());
    }

    require_role(auth, UserRole::Agent)?;
    require_consulate(auth, consulate_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(role: UserRole, consulate_id: Option<Uuid>) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            role,
            consulate_id,
        }
    }

    #[test]
    fn test_require_role() {
        let agent = context(UserRole::Agent, None);

        assert!(require_role(&agent, UserRole::Citizen).is_ok());
        assert!(require_role(&agent, UserRole::Agent).is_ok());
        assert!(require_role(&agent, UserRole::Admin).is_err());
        assert!(require_role(&agent, UserRole::Superadmin).is_err());
    }

    #[test]
    fn test_require_consulate() {
        let consulate_id = Uuid::new_v4();

        let scoped = context(UserRole::Agent, Some(consulate_id));
        assert!(require_consulate(&scoped, consulate_id).is_ok());
        assert!(require_consulate(&scoped, Uuid::new_v4()).is_err());

        let unassigned = context(UserRole::Agent, None);
        assert!(matches!(
            require_consulate(&unassigned, consulate_id),
            Err(AuthzError::NoConsulate)
        ));

        // Superadmins pass any consulate check
        let superadmin = context(UserRole::Superadmin, None);
        assert!(require_consulate(&superadmin, consulate_id).is_ok());
    }

    #[test]
    fn test_require_ownership() {
        let auth = context(UserRole::Citizen, None);

        assert!(require_ownership(&auth, auth.user_id).is_ok());
        assert!(require_ownership(&auth, Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_require_owner_or_staff() {
        let consulate_id = Uuid::new_v4();

        // Owner passes regardless of role
        let citizen = context(UserRole::Citizen, Some(consulate_id));
        assert!(require_owner_or_staff(&citizen, citizen.user_id, consulate_id).is_ok());

        // Non-owner citizen fails
        assert!(require_owner_or_staff(&citizen, Uuid::new_v4(), consulate_id).is_err());

        // Staff of the right consulate passes
        let agent = context(UserRole::Agent, Some(consulate_id));
        assert!(require_owner_or_staff(&agent, Uuid::new_v4(), consulate_id).is_ok());

        // Staff of another consulate fails
        let other_agent = context(UserRole::Agent, Some(Uuid::new_v4()));
        assert!(require_owner_or_staff(&other_agent, Uuid::new_v4(), consulate_id).is_err());
    }
}
