//! Access control for role-restricted views
//!
//! The guard is a pure function of the current session and a view's
//! allowed roles; the navigator applies it to paths against the live
//! session store on every navigation.

pub mod guard;
pub mod navigator;

pub use guard::{GuardDecision, RouteGuard};
pub use navigator::{Navigation, Navigator};
