//! Caller roles as issued by the session authority.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Roles that may read the location map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    SuperUser,
    User,
}

/// Raised when a role string names none of the known roles.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("access denied: unrecognized role '{role}'")]
pub struct AccessDenied {
    pub role: String,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::SuperUser => "super-user",
            Role::User => "user",
        }
    }

    /// Number of locations this role may see, `None` meaning all of them
    pub fn location_limit(&self) -> Option<usize> {
        match self {
            Role::Admin | Role::SuperUser => None,
            Role::User => Some(USER_LOCATION_LIMIT),
        }
    }

    pub fn all() -> &'static [Role] {
        &[Role::Admin, Role::SuperUser, Role::User]
    }
}

/// Prefix length of the store handed to plain users.
pub const USER_LOCATION_LIMIT: usize = 5;

impl std::str::FromStr for Role {
    type Err = AccessDenied;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "super-user" => Ok(Role::SuperUser),
            "user" => Ok(Role::User),
            other => Err(AccessDenied {
                role: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrips_display() {
        for role in Role::all() {
            assert_eq!(role.to_string().parse::<Role>(), Ok(*role));
        }
    }

    #[test]
    fn test_unknown_role_is_denied() {
        let err = "guest".parse::<Role>().unwrap_err();
        assert_eq!(err.role, "guest");
        assert!("".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Role::SuperUser).unwrap(), "\"super-user\"");
    }
}
