//! Guarded entry points to the dashboard services

use super::{AdminDashboard, ApiClient, StudentDashboard, TeacherDashboard};
use crate::auth::{GuardDecision, RouteGuard};
use lms_core::View;
use tracing::debug;

/// Hands out a dashboard service only after the route guard approves the
/// current session for that dashboard's view.
pub struct Dashboards {
    client: ApiClient,
}

impl Dashboards {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Evaluate the guard for `view` against the current session
    pub fn check(&self, view: View) -> GuardDecision {
        let session = self.client.session().current_session();
        let decision = RouteGuard::check_view(session.as_ref(), view);
        debug!(view = %view, ?decision, "Route guard");
        decision
    }

    pub fn admin(&self) -> Result<AdminDashboard<'_>, GuardDecision> {
        self.open(View::AdminDashboard).map(AdminDashboard::new)
    }

    pub fn teacher(&self) -> Result<TeacherDashboard<'_>, GuardDecision> {
        self.open(View::TeacherDashboard).map(TeacherDashboard::new)
    }

    pub fn student(&self) -> Result<StudentDashboard<'_>, GuardDecision> {
        self.open(View::StudentDashboard).map(StudentDashboard::new)
    }

    fn open(&self, view: View) -> Result<&ApiClient, GuardDecision> {
        match self.check(view) {
            GuardDecision::Render => Ok(&self.client),
            redirect => Err(redirect),
        }
    }
}
