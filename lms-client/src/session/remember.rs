//! "Remember me" support for the login form

use crate::storage::{KeyValueStore, REMEMBERED_EMAIL_KEY};
use lms_core::LmsResult;
use std::sync::Arc;

/// Email pre-filled on the next login. Independent of the session: logging
/// out keeps it.
pub struct RememberedEmail {
    storage: Arc<dyn KeyValueStore>,
}

impl RememberedEmail {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    pub fn get(&self) -> LmsResult<Option<String>> {
        self.storage.get(REMEMBERED_EMAIL_KEY)
    }

    /// Remember `email` when `remember` is set, forget it otherwise
    pub fn update(&self, email: &str, remember: bool) -> LmsResult<()> {
        if remember {
            self.storage.set(REMEMBERED_EMAIL_KEY, email)
        } else {
            self.storage.remove(REMEMBERED_EMAIL_KEY)
        }
    }
}
