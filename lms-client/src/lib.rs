//! LMS Client - session handling and dashboard access for the LMS REST API
//!
//! This crate provides everything a front-end needs between "the user typed
//! a password" and "render this dashboard":
//!
//! - A session store that logs in, persists the session across restarts,
//!   and logs out
//! - A route guard deciding which views the current role may see
//! - An authenticated HTTP client and typed admin/teacher/student services
//!
//! ## Architecture
//!
//! - **Core types** (lms-core): roles, views, sessions, errors, config
//! - **Client** (this crate): state, access control, API calls
//! - **Presentation** (lms-cli): user interface

pub mod api;
pub mod auth;
pub mod session;
pub mod storage;

pub use api::{
    Action, AdminDashboard, ApiClient, ApiError, Course, CourseTeacher, Dashboards, NewCourse,
    NewUser, NewZoomLink, StudentDashboard, TeacherDashboard, UserAccount, UserUpdate, ZoomLink,
};
pub use auth::{GuardDecision, Navigation, Navigator, RouteGuard};
pub use session::{
    AuthBackend, AuthError, Credentials, HttpAuthBackend, LoginResponse, LoginUser,
    RememberedEmail, SessionStore,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore};

use lms_core::{LmsConfig, LmsResult};
use std::sync::Arc;

/// Everything a front-end needs, wired once at startup
pub struct ClientContext {
    pub session: Arc<SessionStore>,
    pub remembered_email: RememberedEmail,
    pub navigator: Navigator,
    pub dashboards: Dashboards,
}

impl ClientContext {
    /// Wire the client from configuration, using the file-backed store
    pub fn from_config(config: &LmsConfig) -> LmsResult<Self> {
        let storage: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::new(config.storage.resolved_path())?);
        let backend: Arc<dyn AuthBackend> = Arc::new(HttpAuthBackend::new(&config.api)?);
        Self::with_parts(config, storage, backend)
    }

    /// Wire the client around explicit storage and authentication backends
    pub fn with_parts(
        config: &LmsConfig,
        storage: Arc<dyn KeyValueStore>,
        backend: Arc<dyn AuthBackend>,
    ) -> LmsResult<Self> {
        let session = Arc::new(SessionStore::initialize(storage.clone(), backend));
        let client = ApiClient::new(&config.api, session.clone())?;

        Ok(Self {
            remembered_email: RememberedEmail::new(storage),
            navigator: Navigator::new(session.clone()),
            dashboards: Dashboards::new(client),
            session,
        })
    }
}
