use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::common::entity_ids::UserId;

/// The two roles known to the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Artist,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Artist => write!(f, "ARTIST"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "ARTIST" => Ok(Role::Artist),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(anyhow::anyhow!("Invalid role: {}", s)),
        }
    }
}

/// Whoever is performing an operation.
///
/// `role` comes from a verified token and is trusted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn artist(user_id: UserId) -> Self {
        Self::new(user_id, Role::Artist)
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail unless the actor holds `role`.
    pub fn require(&self, role: Role) -> Result<&Self, AuthError> {
        if self.role == role {
            Ok(self)
        } else {
            Err(AuthError::RoleRequired(role))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_text_roundtrip() {
        for role in [Role::Artist, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("artist".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_is_upper_case() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        let parsed: Role = serde_json::from_str("\"ARTIST\"").unwrap();
        assert_eq!(parsed, Role::Artist);
    }

    #[test]
    fn test_require_role() {
        let artist = Actor::artist(UserId::new());
        assert!(artist.require(Role::Artist).is_ok());
        assert_eq!(
            artist.require(Role::Admin).unwrap_err(),
            AuthError::RoleRequired(Role::Admin)
        );
    }
}
