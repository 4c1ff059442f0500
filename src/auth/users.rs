//! User directory backed by `users_db.json`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

/// A user entry as stored in the directory file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersFile {
    #[serde(default)]
    users: Vec<UserRecord>,
}

/// Username/password pair supplied through the environment
#[derive(Debug, Clone)]
pub struct EnvCredential {
    pub username: String,
    pub password: String,
}

impl EnvCredential {
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        Some(Self {
            username: username?,
            password: password?,
        })
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

/// Who a successful login resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub nombre: Option<String>,
    pub role: String,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("Usuario o Contraseña incorrectos")]
    InvalidCredentials,

    #[error("Usuario sin rol. Contacta a administrador")]
    MissingRole,
}

pub const ENV_ADMIN_ID: &str = "env_admin";
pub const ENV_SUPER_USER_ID: &str = "env_superuser";

#[derive(Debug, Default)]
pub struct UserDirectory {
    users: Vec<UserRecord>,
    env_admin: Option<EnvCredential>,
    env_super_user: Option<EnvCredential>,
}

impl UserDirectory {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self {
            users,
            ..Default::default()
        }
    }

    /// Load the directory file.
    ///
    /// A missing file is replaced by a development directory with one account
    /// per role, written back to `path`. An unreadable file yields no users.
    pub async fn load(path: &Path) -> Self {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => match serde_json::from_str::<UsersFile>(&text) {
                Ok(file) => {
                    info!("Loaded {} users from {}", file.users.len(), path.display());
                    Self::new(file.users)
                }
                Err(e) => {
                    warn!(
                        "{} does not contain a valid users list ({}), starting with no users",
                        path.display(),
                        e
                    );
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("{} not found, creating default users", path.display());
                let users = default_users();
                let file = UsersFile {
                    users: users.clone(),
                };
                match serde_json::to_string_pretty(&file) {
                    Ok(json) => {
                        if let Err(e) = tokio::fs::write(path, json).await {
                            error!("Failed to write default users to {}: {}", path.display(), e);
                        }
                    }
                    Err(e) => error!("Failed to serialize default users: {}", e),
                }
                Self::new(users)
            }
            Err(e) => {
                error!("Failed to read users from {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn with_env_credentials(
        mut self,
        admin: Option<EnvCredential>,
        super_user: Option<EnvCredential>,
    ) -> Self {
        self.env_admin = admin;
        self.env_super_user = super_user;
        self
    }

    /// Resolve a login. Env credentials are checked before the file.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Identity, LoginError> {
        if let Some(admin) = self.env_admin.as_ref().filter(|c| c.matches(username, password)) {
            return Ok(Identity {
                user_id: ENV_ADMIN_ID.to_string(),
                nombre: Some(admin.username.clone()),
                role: "admin".to_string(),
            });
        }

        if let Some(su) = self
            .env_super_user
            .as_ref()
            .filter(|c| c.matches(username, password))
        {
            return Ok(Identity {
                user_id: ENV_SUPER_USER_ID.to_string(),
                nombre: Some(su.username.clone()),
                role: "super-user".to_string(),
            });
        }

        let user = self
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .ok_or(LoginError::InvalidCredentials)?;

        let role = user
            .role
            .as_ref()
            .filter(|r| !r.is_empty())
            .ok_or(LoginError::MissingRole)?;

        Ok(Identity {
            user_id: user.id.clone(),
            nombre: user.nombre.clone(),
            role: role.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn default_users() -> Vec<UserRecord> {
    let user = |id: &str, username: &str, password: &str, role: &str| UserRecord {
        id: id.to_string(),
        username: username.to_string(),
        password: password.to_string(),
        role: Some(role.to_string()),
        nombre: None,
    };

    vec![
        user("json_admin_01", "adminjson", "passwordjson", "admin"),
        user("json_super_user_01", "superuserjson", "superpassjson", "super-user"),
        user("json_regular_user_01", "regularuserjson", "regularpassjson", "user"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        UserDirectory::new(vec![
            UserRecord {
                id: "u1".to_string(),
                username: "ana".to_string(),
                password: "secreto".to_string(),
                role: Some("user".to_string()),
                nombre: Some("Ana".to_string()),
            },
            UserRecord {
                id: "u2".to_string(),
                username: "sinrol".to_string(),
                password: "x".to_string(),
                role: None,
                nombre: None,
            },
        ])
        .with_env_credentials(
            EnvCredential::from_parts(Some("root".to_string()), Some("toor".to_string())),
            None,
        )
    }

    #[test]
    fn test_file_user_login() {
        let identity = directory().authenticate("ana", "secreto").unwrap();
        assert_eq!(identity.user_id, "u1");
        assert_eq!(identity.role, "user");
        assert_eq!(identity.nombre.as_deref(), Some("Ana"));
    }

    #[test]
    fn test_env_admin_takes_precedence() {
        let identity = directory().authenticate("root", "toor").unwrap();
        assert_eq!(identity.user_id, ENV_ADMIN_ID);
        assert_eq!(identity.role, "admin");
    }

    #[test]
    fn test_rejections() {
        let dir = directory();
        assert_eq!(dir.authenticate("ana", "mal"), Err(LoginError::InvalidCredentials));
        assert_eq!(dir.authenticate("sinrol", "x"), Err(LoginError::MissingRole));
    }

    #[tokio::test]
    async fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_db.json");

        let users = UserDirectory::load(&path).await;
        assert_eq!(users.len(), 3);
        assert!(path.exists());
        assert_eq!(
            users.authenticate("superuserjson", "superpassjson").unwrap().role,
            "super-user"
        );

        let reloaded = UserDirectory::load(&path).await;
        assert_eq!(reloaded.len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_file_yields_no_users() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_db.json");
        std::fs::write(&path, r#"{"users": 5}"#).unwrap();
        assert!(UserDirectory::load(&path).await.is_empty());
    }
}
