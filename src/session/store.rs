//! Session storage trait and session types.

use serde::{Deserialize, Serialize};

use crate::code::{generate_session_token, hash_session_token};
use crate::error::{AuthError, AuthResult};
use crate::DEFAULT_SESSION_TTL_SECS;

/// Represents an authenticated session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// SHA-256 of the bearer token, base64url encoded. The raw token is only
    /// ever held by the client.
    pub token_hash: String,

    /// Application user identifier
    pub user_id: String,

    /// Email the session was issued for, if any
    #[serde(default)]
    pub email: Option<String>,

    /// When the session expires (Unix timestamp)
    pub expires_at: i64,

    /// When the session was created (Unix timestamp)
    pub created_at: i64,

    /// Optional metadata
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl Session {
    /// Create a session for `user_id` bound to the bearer `token`.
    pub fn new(token: &str, user_id: impl Into<String>, ttl_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            token_hash: hash_session_token(token),
            user_id: user_id.into(),
            email: None,
            expires_at: now + ttl_seconds,
            created_at: now,
            metadata: None,
        }
    }

    /// Check if the session has expired.
    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        now >= self.expires_at
    }

    /// Get remaining session time in seconds.
    pub fn remaining_seconds(&self) -> i64 {
        let now = chrono::Utc::now().timestamp();
        (self.expires_at - now).max(0)
    }
}

/// Trait for session storage backends.
///
/// Methods take the raw bearer token; implementations decide how to key it.
pub trait SessionStore: Send + Sync {
    /// Create or update a session.
    fn upsert(&self, session: &Session) -> AuthResult<()>;

    /// Get a session by token.
    fn get(&self, token: &str) -> AuthResult<Option<Session>>;

    /// Get a session by token, returning an error if not found or expired.
    fn get_valid(&self, token: &str) -> AuthResult<Session> {
        match self.get(token)? {
            Some(session) if session.is_expired() => Err(AuthError::SessionExpired),
            Some(session) => Ok(session),
            None => Err(AuthError::SessionNotFound),
        }
    }

    /// Delete a session by token.
    fn delete(&self, token: &str) -> AuthResult<bool>;

    /// Delete all sessions for a user.
    fn delete_by_user(&self, user_id: &str) -> AuthResult<u64>;

    /// Get all sessions for a user.
    fn get_by_user(&self, user_id: &str) -> AuthResult<Vec<Session>>;

    /// Extend a session's expiration time.
    fn extend(&self, token: &str, new_expires_at: i64) -> AuthResult<bool>;

    /// Remove all expired sessions.
    fn cleanup_expired(&self) -> AuthResult<u64>;

    /// Count active (non-expired) sessions.
    fn count_active(&self) -> AuthResult<u64>;
}

/// High-level session manager wrapping a SessionStore.
///
/// Provides convenient methods for common session operations.
pub struct SessionManager<S: SessionStore> {
    store: S,
    /// Default session duration in seconds (default: 2 hours)
    pub default_duration: i64,
    /// Whether to automatically extend sessions on access
    pub auto_extend: bool,
    /// Extension duration in seconds when auto_extend is true
    pub extension_duration: i64,
}

impl<S: SessionStore> SessionManager<S> {
    /// Create a new session manager with the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            default_duration: DEFAULT_SESSION_TTL_SECS,
            auto_extend: false,
            extension_duration: 3600, // 1 hour
        }
    }

    /// Set default session duration.
    pub fn with_default_duration(mut self, seconds: i64) -> Self {
        self.default_duration = seconds;
        self
    }

    /// Enable auto-extension of sessions on access.
    pub fn with_auto_extend(mut self, extend: bool, extension_seconds: i64) -> Self {
        self.auto_extend = extend;
        self.extension_duration = extension_seconds;
        self
    }

    /// Issue a new session for `user_id`.
    ///
    /// Returns the stored session and the raw bearer token to hand to the
    /// client (usually via the session cookie). The token is not recoverable
    /// from the store afterwards.
    pub fn create_session(
        &self,
        user_id: &str,
        email: Option<String>,
    ) -> AuthResult<(Session, String)> {
        let token = generate_session_token()?;
        let mut session = Session::new(&token, user_id, self.default_duration);
        session.email = email;
        self.store.upsert(&session)?;

        tracing::debug!(user_id = %user_id, expires_at = session.expires_at, "Session created");
        Ok((session, token))
    }

    /// Validate and optionally extend a session.
    pub fn validate(&self, token: &str) -> AuthResult<Session> {
        let mut session = self.store.get_valid(token)?;

        // Auto-extend if enabled and session is valid
        if self.auto_extend {
            let now = chrono::Utc::now().timestamp();
            let new_expires = now + self.extension_duration;
            if new_expires > session.expires_at && self.store.extend(token, new_expires)? {
                session.expires_at = new_expires;
            }
        }

        Ok(session)
    }

    /// Invalidate (delete) a session.
    pub fn invalidate(&self, token: &str) -> AuthResult<bool> {
        self.store.delete(token)
    }

    /// Invalidate all sessions for a user.
    pub fn invalidate_all_for_user(&self, user_id: &str) -> AuthResult<u64> {
        let removed = self.store.delete_by_user(user_id)?;
        tracing::debug!(user_id = %user_id, removed, "Sessions invalidated");
        Ok(removed)
    }

    /// Get all sessions for a user.
    pub fn get_user_sessions(&self, user_id: &str) -> AuthResult<Vec<Session>> {
        self.store.get_by_user(user_id)
    }

    /// Run cleanup to remove expired sessions.
    pub fn cleanup(&self) -> AuthResult<u64> {
        self.store.cleanup_expired()
    }

    /// Get underlying store reference.
    pub fn store(&self) -> &S {
        &self.store
    }
}
