//! Coarse capability check in front of mutations.
//!
//! The application this replaces guarded edits with a shared plaintext password typed
//! into a dialog. That gate was cosmetic. Here the role travels inside a signed token
//! and is checked server-side; any confirm dialog a client shows is UX only.

use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;

/// The caller as seen by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub role: UserRole,
    pub elevated: bool,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&Claims> for Session {
    fn from(claims: &Claims) -> Self {
        Self {
            username: claims.username.clone(),
            role: claims.role,
            elevated: claims.elevated,
        }
    }
}

/// Allow `action` only for admin sessions. Denials are logged with the action name.
pub fn require_admin(session: &Session, action: &str) -> AppResult<()> {
    if session.is_admin() {
        tracing::debug!(
            user = %session.username,
            elevated = session.elevated,
            action,
            "Admin action allowed"
        );
        return Ok(());
    }

    tracing::warn!(user = %session.username, action, "Admin action denied");
    Err(AppError::Forbidden(format!(
        "Admin access required for {}",
        action
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: UserRole) -> Session {
        Session {
            username: "joao".to_string(),
            role,
            elevated: false,
        }
    }

    #[test]
    fn test_admin_passes() {
        assert!(require_admin(&session(UserRole::Admin), "DELETE /fuel-records/1").is_ok());
    }

    #[test]
    fn test_user_is_forbidden() {
        let err = require_admin(&session(UserRole::User), "DELETE /fuel-records/1").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(msg) if msg.contains("DELETE /fuel-records/1")));
    }
}
