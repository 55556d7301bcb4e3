//! Document-store session backend.

use std::sync::Arc;

use super::{Session, SessionStore};
use crate::code::hash_session_token;
use crate::error::{AuthError, AuthResult};
use crate::store::Store;

/// Default collection holding session documents.
pub const SESSIONS_COLLECTION: &str = "sessions";

/// Session store persisting one JSON document per session.
///
/// Documents are keyed by the token hash, so a leaked store directory does
/// not leak usable bearer tokens.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use authstore::session::{DocumentSessionStore, SessionManager};
/// use authstore::store::{Store, StoreOptions};
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = Arc::new(Store::open(dir.path(), StoreOptions::default()).unwrap());
/// let manager = SessionManager::new(DocumentSessionStore::new(store));
///
/// let (session, token) = manager.create_session("user-1", None).unwrap();
/// assert_eq!(manager.validate(&token).unwrap().user_id, session.user_id);
/// ```
#[derive(Debug, Clone)]
pub struct DocumentSessionStore {
    store: Arc<Store>,
    collection: String,
}

impl DocumentSessionStore {
    /// Create a session store over `store` using the default collection.
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_collection(store, SESSIONS_COLLECTION)
    }

    /// Create a session store over a custom collection.
    pub fn with_collection(store: Arc<Store>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn all(&self) -> AuthResult<Vec<Session>> {
        self.store.read_all(&self.collection)
    }
}

impl SessionStore for DocumentSessionStore {
    fn upsert(&self, session: &Session) -> AuthResult<()> {
        self.store.write(&self.collection, &session.token_hash, session)
    }

    fn get(&self, token: &str) -> AuthResult<Option<Session>> {
        match self.store.read(&self.collection, &hash_session_token(token)) {
            Ok(session) => Ok(Some(session)),
            Err(AuthError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn delete(&self, token: &str) -> AuthResult<bool> {
        self.store
            .remove(&self.collection, &hash_session_token(token))
    }

    fn delete_by_user(&self, user_id: &str) -> AuthResult<u64> {
        let mut removed = 0;
        for session in self.all()?.into_iter().filter(|s| s.user_id == user_id) {
            if self.store.remove(&self.collection, &session.token_hash)? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn get_by_user(&self, user_id: &str) -> AuthResult<Vec<Session>> {
        let mut sessions: Vec<Session> = self
            .all()?
            .into_iter()
            .filter(|s| s.user_id == user_id)
            .collect();
        sessions.sort_by_key(|s| std::cmp::Reverse(s.created_at));
        Ok(sessions)
    }

    fn extend(&self, token: &str, new_expires_at: i64) -> AuthResult<bool> {
        let result = self.store.update(
            &self.collection,
            &hash_session_token(token),
            |session: &mut Session| session.expires_at = new_expires_at,
        );
        match result {
            Ok(_) => Ok(true),
            Err(AuthError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut removed = 0;
        for session in self.all()?.into_iter().filter(Session::is_expired) {
            if self.store.remove(&self.collection, &session.token_hash)? {
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(removed, "Removed expired sessions");
        }
        Ok(removed)
    }

    fn count_active(&self) -> AuthResult<u64> {
        Ok(self.all()?.iter().filter(|s| !s.is_expired()).count() as u64)
    }
}
