// Session state: the authentication token, its owner, and its expiry.
//
// The session is replaced wholesale on every login and never patched.
// Only `CloudClient::login` writes it; every request reads it through
// `CloudClient::ensure_valid`.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;

use crate::clock::Clock;

/// Safety window subtracted from the token expiry.
pub const SESSION_SKEW: TimeDelta = TimeDelta::seconds(30);

/// Lifetime assumed when the login response carries no explicit expiry.
pub const DEFAULT_SESSION_LIFETIME: TimeDelta = TimeDelta::seconds(3600);

/// Account credentials sent to the login endpoint.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
    /// Language code sent alongside the credentials (e.g. `"en"`).
    pub language: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
            language: "en".into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("language", &self.language)
            .finish()
    }
}

/// An authenticated session with the vendor cloud.
#[derive(Debug)]
pub struct Session {
    pub(crate) token: SecretString,
    pub owner_id: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    /// A session is valid up to (and including) `expires_at - SESSION_SKEW`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at - SESSION_SKEW
    }
}

/// Owns the current [`Session`] and the clock used to judge it.
///
/// Sessions are handed out as `Arc<Session>` so a request keeps using
/// the token it validated even if a concurrent login replaces it.
pub struct SessionManager {
    credentials: Credentials,
    clock: Arc<dyn Clock>,
    current: RwLock<Option<Arc<Session>>>,
    /// Serializes logins triggered by `ensure_valid` so concurrent
    /// requests with an expired token produce a single login.
    pub(crate) renewal: tokio::sync::Mutex<()>,
}

impl SessionManager {
    pub fn new(credentials: Credentials, clock: Arc<dyn Clock>) -> Self {
        Self {
            credentials,
            clock,
            current: RwLock::new(None),
            renewal: tokio::sync::Mutex::new(()),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The current session, valid or not.
    pub fn current(&self) -> Option<Arc<Session>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The current session if it is still inside its skew-adjusted lifetime.
    pub fn valid_session(&self) -> Option<Arc<Session>> {
        let now = self.clock.now();
        self.current().filter(|s| s.is_valid_at(now))
    }

    pub fn is_valid(&self) -> bool {
        self.valid_session().is_some()
    }

    /// Build a session from a login response, defaulting the expiry.
    pub(crate) fn issue(
        &self,
        token: String,
        owner_id: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Session {
        let issued_at = self.clock.now();
        Session {
            token: SecretString::from(token),
            owner_id,
            expires_at: expires_at.unwrap_or(issued_at + DEFAULT_SESSION_LIFETIME),
            issued_at,
        }
    }

    pub(crate) fn replace(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&session));
        session
    }

    /// Drop the session if it is still the one the caller used.
    ///
    /// Called when the cloud rejects a token, so that the next request
    /// logs in instead of reusing it. A session installed by a newer
    /// login is left alone.
    pub(crate) fn invalidate(&self, rejected: &Arc<Session>) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if current.as_ref().is_some_and(|s| Arc::ptr_eq(s, rejected)) {
            *current = None;
        }
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("credentials", &self.credentials)
            .field("valid", &self.is_valid())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn manager() -> (Arc<ManualClock>, SessionManager) {
        let clock = Arc::new(ManualClock::starting_now());
        let creds = Credentials::new("user@example.com", SecretString::from("pw".to_string()));
        let manager = SessionManager::new(creds, Arc::clone(&clock) as Arc<dyn Clock>);
        (clock, manager)
    }

    #[test]
    fn no_session_is_invalid() {
        let (_, manager) = manager();
        assert!(!manager.is_valid());
        assert!(manager.current().is_none());
    }

    #[test]
    fn missing_expiry_defaults_to_one_hour() {
        let (clock, manager) = manager();
        let session = manager.issue("T".into(), Some("U".into()), None);
        assert_eq!(session.expires_at, clock.now() + TimeDelta::seconds(3600));
    }

    #[test]
    fn explicit_expiry_is_kept() {
        let (clock, manager) = manager();
        let expiry = clock.now() + TimeDelta::seconds(10);
        let session = manager.issue("T".into(), None, Some(expiry));
        assert_eq!(session.expires_at, expiry);
    }

    #[test]
    fn validity_boundary_is_inclusive_of_skew() {
        let (clock, manager) = manager();
        let expiry = clock.now() + TimeDelta::seconds(100);
        manager.replace(manager.issue("T".into(), None, Some(expiry)));

        clock.advance(TimeDelta::seconds(70));
        assert!(manager.is_valid(), "exactly expires_at - 30s is still valid");

        clock.advance(TimeDelta::seconds(1));
        assert!(!manager.is_valid());
        assert!(manager.current().is_some(), "expired session is not dropped");
    }

    #[test]
    fn invalidate_ignores_newer_sessions() {
        let (_, manager) = manager();
        let old = manager.replace(manager.issue("old".into(), None, None));
        let new = manager.replace(manager.issue("new".into(), None, None));

        manager.invalidate(&old);
        assert!(manager.current().is_some_and(|s| Arc::ptr_eq(&s, &new)));

        manager.invalidate(&new);
        assert!(manager.current().is_none());
    }
}
