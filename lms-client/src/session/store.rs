//! Session Store - single source of truth for who is logged in
//!
//! The store is built once at startup by [`SessionStore::initialize`], which
//! restores any session persisted by a previous run, and is then shared by
//! reference with everything that needs the current user or its token.
//!
//! The in-memory slot and its two storage keys (`token`, `user`) are only
//! ever changed together while holding the state lock, and the two keys are
//! written as a single storage batch, so neither a caller nor a later run
//! can observe a token paired with some other session's identity. The lock
//! is never held across the network exchange: concurrent logins resolve
//! last-write-wins, and a logout does not cancel a login already in flight.

use super::backend::{AuthBackend, Credentials};
use super::errors::AuthError;
use crate::storage::{KeyValueStore, TOKEN_KEY, USER_KEY};
use lms_core::{log_operation_success, Session, SessionSnapshot};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    backend: Arc<dyn AuthBackend>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Build the store, restoring a previously persisted session if one is
    /// present and well-formed. Anything else starts unauthenticated.
    pub fn initialize(storage: Arc<dyn KeyValueStore>, backend: Arc<dyn AuthBackend>) -> Self {
        let current = match restore(storage.as_ref()) {
            Ok(Some(session)) => {
                info!(user = %session.username(), role = %session.role(), "Restored session");
                Some(session)
            }
            Ok(None) => {
                debug!("No persisted session");
                None
            }
            Err(e) => {
                debug!("Discarding persisted session: {}", e);
                None
            }
        };

        Self {
            storage,
            backend,
            current: RwLock::new(current),
        }
    }

    /// Exchange credentials for a session, persist it and make it current.
    ///
    /// On failure the current session and the persisted entries are left
    /// exactly as they were. There is no automatic retry.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let credentials = Credentials::new(email, password);

        let response = self.backend.login(&credentials).await?;
        let session = response.into_session().map_err(|e| {
            warn!("Login response rejected: {}", e);
            AuthError::generic()
        })?;

        let mut current = self.write_state();
        self.persist(&session)?;
        *current = Some(session.clone());
        drop(current);

        log_operation_success!("login", user = %session.username(), role = %session.role());
        Ok(session)
    }

    /// Clear the current session and its persisted entries. Idempotent.
    pub fn logout(&self) {
        let mut current = self.write_state();
        let previous = current.take();
        self.clear_storage();
        drop(current);

        if let Some(session) = previous {
            info!(user = %session.username(), "Logged out");
        }
    }

    /// Log out only if `token` still belongs to the current session.
    ///
    /// Used when an authenticated call is refused, so that a rejection of a
    /// stale token cannot clear a newer login. Returns whether a session
    /// was cleared.
    pub fn invalidate(&self, token: &str) -> bool {
        let mut current = self.write_state();
        if !current.as_ref().is_some_and(|s| s.token() == token) {
            return false;
        }

        let previous = current.take();
        self.clear_storage();
        drop(current);

        if let Some(session) = previous {
            warn!(user = %session.username(), "Authorization expired, session cleared");
        }
        true
    }

    /// Read-only snapshot of the current session
    pub fn current_session(&self) -> Option<Session> {
        self.read_state().clone()
    }

    /// Bearer token of the current session
    pub fn token(&self) -> Option<String> {
        self.read_state().as_ref().map(|s| s.token().to_string())
    }

    pub fn is_authenticated(&self) -> bool {
        self.read_state().is_some()
    }

    /// Write both entries in one storage batch, so a crash can never leave
    /// a new token next to an old identity.
    fn persist(&self, session: &Session) -> Result<(), AuthError> {
        let snapshot = serde_json::to_string(&session.snapshot()).map_err(|e| {
            AuthError::Storage {
                message: e.to_string(),
            }
        })?;

        self.storage
            .set_many(&[(TOKEN_KEY, session.token()), (USER_KEY, &snapshot)])
            .map_err(|e| {
                e.log();
                AuthError::Storage {
                    message: e.to_string(),
                }
            })
    }

    fn clear_storage(&self) {
        if let Err(e) = self.storage.remove_many(&[TOKEN_KEY, USER_KEY]) {
            warn!("Failed to remove session entries: {}", e);
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Option<Session>> {
        self.current.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Option<Session>> {
        self.current.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Read the persisted session. `Ok(None)` when nothing is stored,
/// `StorageCorrupt` when something is stored but unusable.
fn restore(storage: &dyn KeyValueStore) -> Result<Option<Session>, AuthError> {
    let user = storage
        .get(USER_KEY)
        .map_err(|e| AuthError::storage_corrupt(e.to_string()))?;
    let token = storage
        .get(TOKEN_KEY)
        .map_err(|e| AuthError::storage_corrupt(e.to_string()))?;

    match (user, token) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(AuthError::storage_corrupt("user without token")),
        (None, Some(_)) => Err(AuthError::storage_corrupt("token without user")),
        (Some(user), Some(token)) => {
            let snapshot: SessionSnapshot = serde_json::from_str(&user)
                .map_err(|e| AuthError::storage_corrupt(e.to_string()))?;
            Session::from_snapshot(snapshot, token)
                .map(Some)
                .map_err(|e| AuthError::storage_corrupt(e.to_string()))
        }
    }
}
