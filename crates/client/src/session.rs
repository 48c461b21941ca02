//! Authenticated session and its durable persistence.
//!
//! A [`Session`] is a plain value handed to every API call. The store is only
//! consulted when the harness starts and written when the user logs in or out.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::store::{KeyValueStore, StoreError};

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "token";

/// Storage key for the user's role.
pub const ROLE_KEY: &str = "userRole";

/// Bearer token plus the role the backend reported at login.
#[derive(Clone)]
pub struct Session {
    token: SecretString,
    role: Option<String>,
}

impl Session {
    /// Create a session from a token and an optional role.
    #[must_use]
    pub fn new(token: impl Into<String>, role: Option<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            role: role.filter(|r| !r.is_empty()),
        }
    }

    /// Raw token for the `Authorization` header.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    /// Role as reported by the backend (`user`, `admin`, or anything else).
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    /// Returns `true` if the backend reported the `admin` role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// Status indicator text for the current session.
#[derive(Debug, Clone, Copy)]
pub struct AuthStatus<'a>(pub Option<&'a Session>);

impl fmt::Display for AuthStatus<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(session) => write!(
                f,
                "Authenticated ({})",
                session.role().unwrap_or("unknown")
            ),
            None => f.write_str("Not authenticated"),
        }
    }
}

/// Remembers at most one session in a [`KeyValueStore`].
pub struct SessionStore<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> SessionStore<'a> {
    /// Wrap a key/value store.
    #[must_use]
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    /// Read the remembered session, if a token is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn load(&self) -> Result<Option<Session>, StoreError> {
        let Some(token) = self.store.get(TOKEN_KEY)?.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        let role = self.store.get(ROLE_KEY)?;
        Ok(Some(Session::new(token, role)))
    }

    /// Remember `session`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.store.set(TOKEN_KEY, session.token())?;
        match session.role() {
            Some(role) => self.store.set(ROLE_KEY, role)?,
            None => self.store.remove(ROLE_KEY)?,
        }
        info!(role = session.role().unwrap_or("unknown"), "Session stored");
        Ok(())
    }

    /// Forget the remembered session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(TOKEN_KEY)?;
        self.store.remove(ROLE_KEY)?;
        info!("Session cleared");
        Ok(())
    }
}

impl fmt::Debug for SessionStore<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new("super-secret", Some("admin".to_owned()));
        let debug = format!("{session:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("admin"));
    }

    #[test]
    fn test_status_text() {
        let admin = Session::new("t", Some("admin".to_owned()));
        let anonymous_role = Session::new("t", None);

        assert_eq!(AuthStatus(Some(&admin)).to_string(), "Authenticated (admin)");
        assert_eq!(
            AuthStatus(Some(&anonymous_role)).to_string(),
            "Authenticated (unknown)"
        );
        assert_eq!(AuthStatus(None).to_string(), "Not authenticated");
    }

    #[test]
    fn test_save_load_clear() {
        let backing = MemoryStore::new();
        let sessions = SessionStore::new(&backing);

        assert!(sessions.load().unwrap().is_none());

        sessions
            .save(&Session::new("abc123", Some("user".to_owned())))
            .unwrap();
        assert_eq!(backing.get(TOKEN_KEY).unwrap().as_deref(), Some("abc123"));
        assert_eq!(backing.get(ROLE_KEY).unwrap().as_deref(), Some("user"));

        let loaded = sessions.load().unwrap().unwrap();
        assert_eq!(loaded.token(), "abc123");
        assert_eq!(loaded.role(), Some("user"));
        assert!(!loaded.is_admin());

        sessions.clear().unwrap();
        assert!(sessions.load().unwrap().is_none());
        assert!(backing.is_empty());
    }

    #[test]
    fn test_save_replaces_previous_session() {
        let backing = MemoryStore::new();
        let sessions = SessionStore::new(&backing);

        sessions
            .save(&Session::new("first", Some("admin".to_owned())))
            .unwrap();
        sessions.save(&Session::new("second", None)).unwrap();

        let loaded = sessions.load().unwrap().unwrap();
        assert_eq!(loaded.token(), "second");
        assert_eq!(loaded.role(), None);
        assert_eq!(backing.len(), 1);
    }
}
