/// Authenticated-request context
///
/// The API crate's route guard validates the access token and inserts an
/// [`AuthContext`] into request extensions; handlers extract it with
/// Axum's `Extension` extractor.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;
use crate::models::user::UserRole;

/// Authentication context added to request extensions
///
/// This struct is added to the request after successful authentication.
/// Handlers can extract it using Axum's `Extension` extractor.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use consulat_shared::auth::middleware::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}, role: {}", auth.user_id, auth.role.as_str())
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// Role carried by the access token
    pub role: UserRole,

    /// Consulate the user belongs to (None for superadmins)
    pub consulate_id: Option<Uuid>,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            consulate_id: claims.consulate_id,
        }
    }

    /// Checks whether this context is a staff member (agent or above)
    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }

    /// Checks whether this context satisfies a minimum role
    pub fn has_permission(&self, required: UserRole) -> bool {
        self.role.has_permission(&required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::TokenType;

    #[test]
    fn test_auth_context_from_claims() {
        let user_id = Uuid::new_v4();
        let consulate_id = Uuid::new_v4();

        let claims = Claims::new(
            user_id,
            UserRole::Agent,
            Some(consulate_id),
            TokenType::Access,
        );
        let context = AuthContext::from_claims(&claims);

        assert_eq!(context.user_id, user_id);
        assert_eq!(context.role, UserRole::Agent);
        assert_eq!(context.consulate_id, Some(consulate_id));
        assert!(context.is_staff());
    }

    #[test]
    fn test_auth_context_permission_checks() {
        let claims = Claims::new(Uuid::new_v4(), UserRole::Citizen, None, TokenType::Access);
        let context = AuthContext::from_claims(&claims);

        assert!(!context.is_staff());
        assert!(context.has_permission(UserRole::Citizen));
        assert!(!context.has_permission(UserRole::Agent));
        assert!(!context.has_permission(UserRole::Superadmin));
    }

}
