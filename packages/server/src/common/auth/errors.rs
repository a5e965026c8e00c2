use thiserror::Error;

use super::Role;

/// Authentication and role errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("{0} access required")]
    RoleRequired(Role),

    #[error("Invalid or expired token")]
    InvalidToken,
}
