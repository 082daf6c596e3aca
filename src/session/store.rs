use super::Session;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// What the store knows about a token at a given instant.
///
/// `Expired` and `Revoked` are both terminal. Callers outside the session
/// module only ever see them as an authentication failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Active(Session),
    Expired(Session),
    Revoked,
    Unknown,
}

/// Token -> session map owned by a single `SessionAuthority`.
///
/// Backed by `DashMap`, so every insert, lookup and removal is atomic per
/// entry and a token is never observable without its full session. Revoked
/// tokens leave a tombstone holding their original expiry until the next
/// sweep after that instant.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    revoked: DashMap<String, DateTime<Utc>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Inserts `session` unless its token is already taken.
    /// Returns `false` on collision, leaving the existing entry untouched.
    pub(crate) fn try_insert(&self, session: Session) -> bool {
        match self.sessions.entry(session.token.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(session);
                true
            }
        }
    }

    pub(crate) fn state_of(&self, token: &str, now: DateTime<Utc>) -> SessionState {
        // Clone out of the shard guard before deciding anything.
        let found = self.sessions.get(token).map(|entry| entry.value().clone());
        match found {
            Some(session) if session.is_expired_at(now) => SessionState::Expired(session),
            Some(session) => SessionState::Active(session),
            None if self.revoked.contains_key(token) => SessionState::Revoked,
            None => SessionState::Unknown,
        }
    }

    /// Removes `token` only if it is still expired at `now`.
    pub(crate) fn evict_if_expired(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.sessions
            .remove_if(token, |_, session| session.is_expired_at(now))
            .is_some()
    }

    /// Removes the session and leaves a tombstone. No-op for unknown tokens.
    pub(crate) fn revoke(&self, token: &str) -> Option<Session> {
        let (_, session) = self.sessions.remove(token)?;
        self.revoked.insert(token.to_string(), session.expires_at);
        Some(session)
    }

    /// Removes every session with `expires_at <= now` and returns how many
    /// were removed.
    ///
    /// Expired keys are snapshotted first, one shard at a time, then removed
    /// individually with a re-check, so concurrent lookups are never blocked
    /// for the length of the whole scan.
    pub(crate) fn sweep(&self, now: DateTime<Utc>) -> usize {
        let expired: Vec<String> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().is_expired_at(now))
            .map(|entry| entry.key().clone())
            .collect();

        let removed = expired
            .iter()
            .filter(|token| self.evict_if_expired(token, now))
            .count();

        self.revoked.retain(|_, expires_at| *expires_at > now);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use chrono::Duration;

    fn session(token: &str, expires_at: DateTime<Utc>) -> Session {
        Session {
            token: token.to_string(),
            username: "joao".to_string(),
            role: Role::User,
            issued_at: expires_at - Duration::hours(12),
            expires_at,
        }
    }

    #[test]
    fn test_try_insert_refuses_collisions() {
        let store = SessionStore::new();
        let now = Utc::now();
        assert!(store.try_insert(session("t1", now + Duration::hours(1))));
        assert!(!store.try_insert(session("t1", now + Duration::hours(2))));
        assert_eq!(store.len(), 1);
        match store.state_of("t1", now) {
            SessionState::Active(s) => assert_eq!(s.expires_at, now + Duration::hours(1)),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_state_of_tags() {
        let store = SessionStore::new();
        let now = Utc::now();
        store.try_insert(session("live", now + Duration::minutes(5)));
        store.try_insert(session("dead", now));
        store.try_insert(session("gone", now + Duration::minutes(5)));
        store.revoke("gone");

        assert!(matches!(store.state_of("live", now), SessionState::Active(_)));
        assert!(matches!(store.state_of("dead", now), SessionState::Expired(_)));
        assert_eq!(store.state_of("gone", now), SessionState::Revoked);
        assert_eq!(store.state_of("never", now), SessionState::Unknown);
    }

    #[test]
    fn test_evict_if_expired_leaves_live_sessions() {
        let store = SessionStore::new();
        let now = Utc::now();
        store.try_insert(session("live", now + Duration::minutes(5)));
        store.try_insert(session("dead", now - Duration::minutes(5)));

        assert!(!store.evict_if_expired("live", now));
        assert!(store.evict_if_expired("dead", now));
        assert!(!store.evict_if_expired("dead", now));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_revoke_unknown_token_is_noop() {
        let store = SessionStore::new();
        assert!(store.revoke("missing").is_none());
        assert_eq!(store.state_of("missing", Utc::now()), SessionState::Unknown);
    }

    #[test]
    fn test_sweep_removes_exactly_expired() {
        let store = SessionStore::new();
        let now = Utc::now();
        store.try_insert(session("past", now - Duration::hours(1)));
        store.try_insert(session("boundary", now));
        store.try_insert(session("future", now + Duration::seconds(1)));
        store.try_insert(session("far", now + Duration::hours(10)));

        assert_eq!(store.sweep(now), 2);
        assert_eq!(store.len(), 2);
        assert!(matches!(store.state_of("future", now), SessionState::Active(_)));
        assert!(matches!(store.state_of("far", now), SessionState::Active(_)));
        assert_eq!(store.state_of("past", now), SessionState::Unknown);
        assert_eq!(store.state_of("boundary", now), SessionState::Unknown);
    }

    #[test]
    fn test_sweep_drops_stale_tombstones() {
        let store = SessionStore::new();
        let now = Utc::now();
        store.try_insert(session("t", now + Duration::minutes(1)));
        store.revoke("t");

        store.sweep(now);
        assert_eq!(store.state_of("t", now), SessionState::Revoked);

        let later = now + Duration::minutes(1);
        store.sweep(later);
        assert_eq!(store.state_of("t", later), SessionState::Unknown);
    }
}
