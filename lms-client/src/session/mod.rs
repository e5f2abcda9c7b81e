//! Session Management Module
//!
//! Holds who is logged in, persists it across restarts, and performs the
//! login exchange with the authentication service.

pub mod backend;
pub mod errors;
pub mod remember;
pub mod store;

pub use backend::{AuthBackend, Credentials, HttpAuthBackend, LoginResponse, LoginUser};
pub use errors::AuthError;
pub use remember::RememberedEmail;
pub use store::SessionStore;
