//! Durable client-side key-value storage
//!
//! The session client keeps everything it must remember between runs in a
//! flat string-to-string store, mirroring what a browser keeps in local
//! storage.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use lms_core::LmsResult;

/// Raw bearer token of the current session
pub const TOKEN_KEY: &str = "token";
/// JSON snapshot of the current session's identity
pub const USER_KEY: &str = "user";
/// Email pre-filled on the login form
pub const REMEMBERED_EMAIL_KEY: &str = "rememberedEmail";

/// String key-value storage that outlives the process
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> LmsResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> LmsResult<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> LmsResult<()>;

    /// Write several entries as one unit: afterwards either all of them or
    /// none of them are stored.
    fn set_many(&self, entries: &[(&str, &str)]) -> LmsResult<()>;

    /// Remove several keys as one unit.
    fn remove_many(&self, keys: &[&str]) -> LmsResult<()>;
}
