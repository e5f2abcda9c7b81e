//! Path-based navigation over the route guard

use super::guard::{GuardDecision, RouteGuard};
use crate::session::SessionStore;
use lms_core::View;
use std::sync::Arc;
use tracing::debug;

/// Where a navigation ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(View),
    Redirect(View),
    NotFound,
}

/// Resolves paths to views and guards them against the current session.
///
/// Holds no state besides the store handle; every call reads a fresh
/// snapshot so logins and logouts between navigations are honoured.
#[derive(Clone)]
pub struct Navigator {
    session: Arc<SessionStore>,
}

impl Navigator {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub fn navigate(&self, path: &str) -> Navigation {
        if path.is_empty() || path == "/" {
            return Navigation::Redirect(View::Login);
        }

        let Some(view) = View::from_path(path) else {
            debug!(path, "No view for path");
            return Navigation::NotFound;
        };

        let session = self.session.current_session();
        match RouteGuard::check_view(session.as_ref(), view) {
            GuardDecision::Render => Navigation::Render(view),
            GuardDecision::RedirectToLogin => Navigation::Redirect(View::Login),
            GuardDecision::RedirectTo(target) => Navigation::Redirect(target),
        }
    }

    /// Landing view right after startup or login
    pub fn home(&self) -> View {
        self.session
            .current_session()
            .map(|s| s.role().dashboard())
            .unwrap_or(View::Login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{AuthBackend, AuthError, Credentials, LoginResponse};
    use crate::storage::{MemoryStore, TOKEN_KEY, USER_KEY};
    use async_trait::async_trait;

    struct NoBackend;

    #[async_trait]
    impl AuthBackend for NoBackend {
        async fn login(&self, _credentials: &Credentials) -> Result<LoginResponse, AuthError> {
            Err(AuthError::generic())
        }
    }

    fn navigator_for(entries: Vec<(&str, &str)>) -> (Navigator, Arc<SessionStore>) {
        let storage = Arc::new(MemoryStore::with_entries(entries));
        let store = Arc::new(SessionStore::initialize(storage, Arc::new(NoBackend)));
        (Navigator::new(store.clone()), store)
    }

    #[test]
    fn test_root_and_unknown_paths() {
        let (navigator, _) = navigator_for(vec![]);
        assert_eq!(navigator.navigate("/"), Navigation::Redirect(View::Login));
        assert_eq!(navigator.navigate("/grades"), Navigation::NotFound);
        assert_eq!(navigator.navigate("/login"), Navigation::Render(View::Login));
        assert_eq!(navigator.home(), View::Login);
    }

    #[test]
    fn test_navigation_follows_session_changes() {
        let (navigator, store) = navigator_for(vec![
            (TOKEN_KEY, "tok"),
            (
                USER_KEY,
                r#"{"id":"1","username":"s","email":"s@x.com","role":"student"}"#,
            ),
        ]);

        assert_eq!(navigator.home(), View::StudentDashboard);
        assert_eq!(
            navigator.navigate("/teacher-dashboard"),
            Navigation::Redirect(View::StudentDashboard)
        );
        assert_eq!(
            navigator.navigate("/student-dashboard"),
            Navigation::Render(View::StudentDashboard)
        );

        store.logout();
        assert_eq!(
            navigator.navigate("/student-dashboard"),
            Navigation::Redirect(View::Login)
        );
    }
}
