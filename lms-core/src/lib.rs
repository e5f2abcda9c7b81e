//! LMS Core - shared data structures and infrastructure
//!
//! Domain types, error handling, logging and configuration used by the
//! session client and the command-line front-end.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tracing;
