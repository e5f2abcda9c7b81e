//! Student dashboard: enrolments and course details

use super::{Action, ApiClient, ApiError, Course};
use reqwest::Method;
use tracing::info;

pub const STUDENT_COURSES_PATH: &str = "/api/auth/student/courses";
pub const AVAILABLE_COURSES_PATH: &str = "/api/auth/student/available-courses";

/// Operations reachable from the student dashboard
pub struct StudentDashboard<'a> {
    client: &'a ApiClient,
}

impl<'a> StudentDashboard<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Courses the student is enrolled in
    pub async fn my_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.client
            .get(STUDENT_COURSES_PATH, Action::new("fetching", "courses"))
            .await
    }

    /// Courses open for enrolment
    pub async fn available_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.client
            .get(
                AVAILABLE_COURSES_PATH,
                Action::new("fetching", "available courses"),
            )
            .await
    }

    /// A single course with its zoom links
    pub async fn course_details(&self, course_id: &str) -> Result<Course, ApiError> {
        self.client
            .get(
                &course_path(course_id),
                Action::new("fetching", "course details"),
            )
            .await
    }

    pub async fn enroll(&self, course_id: &str) -> Result<(), ApiError> {
        self.client
            .command::<()>(
                Method::POST,
                &format!("{}/enroll", course_path(course_id)),
                None,
                Action::new("enrolling", "in course"),
            )
            .await?;
        info!(course_id, "Enrolled in course");
        Ok(())
    }
}

fn course_path(course_id: &str) -> String {
    format!("{}/{}", STUDENT_COURSES_PATH, urlencoding::encode(course_id))
}
