//! Route Guard

use lms_core::{Role, Session, View};

/// Outcome of checking a view against the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// The session may see the view
    Render,
    /// Nobody is logged in
    RedirectToLogin,
    /// Logged in, but the role may not see the view; go to the role's own
    /// dashboard instead
    RedirectTo(View),
}

impl GuardDecision {
    pub fn is_render(&self) -> bool {
        matches!(self, GuardDecision::Render)
    }

    /// Where a redirect points, if this is one
    pub fn redirect_target(&self) -> Option<View> {
        match self {
            GuardDecision::Render => None,
            GuardDecision::RedirectToLogin => Some(View::Login),
            GuardDecision::RedirectTo(view) => Some(*view),
        }
    }
}

/// Stateless access check; re-evaluate on every navigation.
pub struct RouteGuard;

impl RouteGuard {
    /// Decide whether `session` may proceed to a view open to `allowed_roles`.
    ///
    /// A missing session always redirects to login, before any role check.
    pub fn check(session: Option<&Session>, allowed_roles: &[Role]) -> GuardDecision {
        let Some(session) = session else {
            return GuardDecision::RedirectToLogin;
        };

        if allowed_roles.contains(&session.role()) {
            GuardDecision::Render
        } else {
            GuardDecision::RedirectTo(session.role().dashboard())
        }
    }

    /// Check a known view; public views always render.
    pub fn check_view(session: Option<&Session>, view: View) -> GuardDecision {
        match view.allowed_roles() {
            Some(allowed) => Self::check(session, allowed),
            None => GuardDecision::Render,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session::new("1", "a", "a@x.com", role, "tok").unwrap()
    }

    #[test]
    fn test_no_session_always_goes_to_login() {
        let role_sets: [&[Role]; 4] = [
            &[],
            &[Role::Admin],
            &[Role::Teacher, Role::Student],
            &Role::ALL,
        ];
        for allowed in role_sets {
            assert_eq!(
                RouteGuard::check(None, allowed),
                GuardDecision::RedirectToLogin
            );
        }
    }

    #[test]
    fn test_wrong_role_goes_to_own_dashboard() {
        let student = session(Role::Student);
        let decision = RouteGuard::check(Some(&student), &[Role::Admin, Role::Teacher]);

        assert_eq!(decision, GuardDecision::RedirectTo(View::StudentDashboard));
        assert_eq!(
            decision.redirect_target().map(|v| v.path()),
            Some("/student-dashboard")
        );
    }

    #[test]
    fn test_allowed_role_renders() {
        let admin = session(Role::Admin);
        assert!(RouteGuard::check(Some(&admin), &Role::ALL).is_render());
    }

    #[test]
    fn test_view_table() {
        let teacher = session(Role::Teacher);
        assert_eq!(
            RouteGuard::check_view(Some(&teacher), View::AdminDashboard),
            GuardDecision::RedirectTo(View::TeacherDashboard)
        );
        assert!(RouteGuard::check_view(Some(&teacher), View::TeacherDashboard).is_render());
        assert!(RouteGuard::check_view(Some(&teacher), View::StudentDashboard).is_render());
        assert!(RouteGuard::check_view(None, View::Login).is_render());
        assert_eq!(
            RouteGuard::check_view(None, View::StudentDashboard),
            GuardDecision::RedirectToLogin
        );
    }
}
