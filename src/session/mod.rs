//! Bearer-token sessions: issuing, validating, revoking and expiring them.

mod authority;
mod clock;
mod store;
mod sweeper;

pub use authority::{SessionAuthority, DEFAULT_SESSION_TTL, MAX_TOKEN_ATTEMPTS};
pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{SessionState, SessionStore};
pub use sweeper::{spawn_sweeper, DEFAULT_SWEEP_INTERVAL};

use crate::auth::{Role, UserInfo};
use chrono::{DateTime, Utc};
use std::fmt;

/// One authenticated client's login.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// A session is dead from `expires_at` onwards, inclusive.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn user(&self) -> UserInfo {
        UserInfo {
            username: self.username.clone(),
            role: self.role,
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.token.chars().take(6).collect();
        f.debug_struct("Session")
            .field("token", &format_args!("{}…", prefix))
            .field("username", &self.username)
            .field("role", &self.role)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
