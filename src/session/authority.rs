use super::{Clock, Session, SessionState, SessionStore, SystemClock};
use crate::auth::{Account, CredentialStore};
use crate::error::AuthFailure;
use crate::security::{RandomTokenGenerator, TokenGenerator};
use chrono::Duration;
use log::{debug, error, info, warn};
use std::sync::Arc;

/// Sessions live for twelve hours unless configured otherwise.
pub const DEFAULT_SESSION_TTL: Duration = Duration::hours(12);

/// Upper bound on token draws per `issue_session` call. Hitting it means the
/// random source is broken, not that the caller was unlucky.
pub const MAX_TOKEN_ATTEMPTS: usize = 8;

/// Issues, validates and expires bearer-token sessions.
///
/// Owns its `SessionStore` outright; nothing else in the crate touches it.
pub struct SessionAuthority {
    credentials: CredentialStore,
    store: SessionStore,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    tokens: Arc<dyn TokenGenerator>,
}

impl SessionAuthority {
    pub fn new(credentials: CredentialStore, ttl: Duration) -> Self {
        Self {
            credentials,
            store: SessionStore::new(),
            ttl,
            clock: Arc::new(SystemClock),
            tokens: Arc::new(RandomTokenGenerator),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_store(mut self, store: SessionStore) -> Self {
        self.store = store;
        self
    }

    pub fn with_token_generator(mut self, tokens: Arc<dyn TokenGenerator>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn active_sessions(&self) -> usize {
        self.store.len()
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Result<Account, AuthFailure> {
        self.credentials.authenticate(username, password)
    }

    /// Creates a session for `account` with an absolute expiry of now + TTL.
    pub fn issue_session(&self, account: &Account) -> Result<Session, AuthFailure> {
        let issued_at = self.clock.now();
        let expires_at = issued_at + self.ttl;

        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let session = Session {
                token: self.tokens.generate(),
                username: account.username().to_string(),
                role: account.role(),
                issued_at,
                expires_at,
            };
            if self.store.try_insert(session.clone()) {
                return Ok(session);
            }
            warn!("Session token collision, drawing a new token");
        }

        error!(
            "Gave up issuing a session for {} after {} token collisions",
            account.username(),
            MAX_TOKEN_ATTEMPTS
        );
        Err(AuthFailure::TokenGeneration)
    }

    /// `authenticate` followed by `issue_session`.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, AuthFailure> {
        let account = match self.authenticate(username, password) {
            Ok(account) => account,
            Err(failure) => {
                if failure == AuthFailure::InvalidCredentials {
                    warn!("Rejected login attempt for {:?}", username.trim());
                }
                return Err(failure);
            }
        };
        let session = self.issue_session(&account)?;
        info!("{} logged in as {}", session.username, session.role);
        Ok(session)
    }

    /// Resolves a bearer token to its session.
    ///
    /// Never extends `expires_at`. An expired entry is evicted on the spot.
    pub fn validate(&self, token: &str) -> Result<Session, AuthFailure> {
        if token.is_empty() {
            return Err(AuthFailure::Unauthenticated);
        }

        let now = self.clock.now();
        match self.store.state_of(token, now) {
            SessionState::Active(session) => Ok(session),
            SessionState::Expired(session) => {
                self.store.evict_if_expired(token, now);
                debug!("Session for {} expired at {}", session.username, session.expires_at);
                Err(AuthFailure::Expired)
            }
            SessionState::Revoked | SessionState::Unknown => Err(AuthFailure::Unauthenticated),
        }
    }

    /// Ends a session. Unknown or already-ended tokens are ignored.
    pub fn revoke(&self, token: &str) {
        if let Some(session) = self.store.revoke(token) {
            info!("{} logged out", session.username);
        }
    }

    /// Drops every session whose lifetime has elapsed. Returns the count.
    pub fn sweep_expired(&self) -> usize {
        self.store.sweep(self.clock.now())
    }

    #[cfg(test)]
    pub(crate) fn state_of(&self, token: &str) -> SessionState {
        self.store.state_of(token, self.clock.now())
    }
}
