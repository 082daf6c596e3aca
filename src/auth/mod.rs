use serde::{Deserialize, Serialize};
use std::fmt;

pub mod credentials;
pub mod rbac;

pub use credentials::{CaseSensitivity, CredentialStore};

/// The two roles known to the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    /// Derives the role from a username. `Admin` in any ASCII case is the only
    /// administrator; every other name is a regular user.
    pub fn for_username(username: &str) -> Self {
        if username.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One login identity, loaded from configuration and never mutated.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    username: String,
    password: String,
}

impl Account {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// Role is computed from the username on every call, so there is no
    /// stored copy that could drift.
    pub fn role(&self) -> Role {
        Role::for_username(&self.username)
    }
}

// Keep passwords out of debug output and logs.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("role", &self.role())
            .finish()
    }
}

/// Public view of an authenticated identity, as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub username: String,
    pub role: Role,
}
