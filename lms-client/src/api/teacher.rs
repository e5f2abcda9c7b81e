//! Teacher dashboard: courses and their meeting links

use super::{Action, ApiClient, ApiError, Course, NewCourse, NewZoomLink};
use reqwest::Method;

pub const TEACHER_COURSES_PATH: &str = "/api/auth/teacher/courses";

/// Operations reachable from the teacher dashboard
pub struct TeacherDashboard<'a> {
    client: &'a ApiClient,
}

impl<'a> TeacherDashboard<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, ApiError> {
        self.client
            .get(TEACHER_COURSES_PATH, Action::new("fetching", "courses"))
            .await
    }

    pub async fn create_course(&self, course: &NewCourse) -> Result<(), ApiError> {
        self.client
            .command(
                Method::POST,
                TEACHER_COURSES_PATH,
                Some(course),
                Action::new("creating", "course"),
            )
            .await
    }

    pub async fn add_zoom_link(&self, course_id: &str, link: &NewZoomLink) -> Result<(), ApiError> {
        self.client
            .command(
                Method::POST,
                &zoom_links_path(course_id),
                Some(link),
                Action::new("adding", "zoom link"),
            )
            .await
    }

    pub async fn update_zoom_link(
        &self,
        course_id: &str,
        link_id: &str,
        link: &NewZoomLink,
    ) -> Result<(), ApiError> {
        self.client
            .command(
                Method::PUT,
                &zoom_link_path(course_id, link_id),
                Some(link),
                Action::new("updating", "zoom link"),
            )
            .await
    }

    pub async fn delete_zoom_link(&self, course_id: &str, link_id: &str) -> Result<(), ApiError> {
        self.client
            .command::<()>(
                Method::DELETE,
                &zoom_link_path(course_id, link_id),
                None,
                Action::new("deleting", "zoom link"),
            )
            .await
    }
}

fn zoom_links_path(course_id: &str) -> String {
    format!(
        "{}/{}/zoom-links",
        TEACHER_COURSES_PATH,
        urlencoding::encode(course_id)
    )
}

fn zoom_link_path(course_id: &str, link_id: &str) -> String {
    format!(
        "{}/{}",
        zoom_links_path(course_id),
        urlencoding::encode(link_id)
    )
}
