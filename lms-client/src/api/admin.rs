//! Admin dashboard: account management

use super::{Action, ApiClient, ApiError, NewUser, UserAccount, UserUpdate};
use reqwest::Method;
use tracing::info;

pub const REGISTER_PATH: &str = "/api/auth/register";
pub const ADMIN_USERS_PATH: &str = "/api/auth/admin";

/// Operations reachable from the admin dashboard
pub struct AdminDashboard<'a> {
    client: &'a ApiClient,
}

impl<'a> AdminDashboard<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<(), ApiError> {
        self.client
            .command(
                Method::POST,
                REGISTER_PATH,
                Some(user),
                Action::new("creating", "user"),
            )
            .await?;
        info!(username = %user.username, role = %user.role, "User created");
        Ok(())
    }

    pub async fn list_users(&self) -> Result<Vec<UserAccount>, ApiError> {
        self.client
            .get(ADMIN_USERS_PATH, Action::new("fetching", "users"))
            .await
    }

    pub async fn update_user(&self, id: &str, update: &UserUpdate) -> Result<(), ApiError> {
        self.client
            .command(
                Method::PUT,
                &user_path(id),
                Some(update),
                Action::new("updating", "user"),
            )
            .await
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .command::<()>(
                Method::DELETE,
                &user_path(id),
                None,
                Action::new("deleting", "user"),
            )
            .await
    }
}

fn user_path(id: &str) -> String {
    format!("{}/{}", ADMIN_USERS_PATH, urlencoding::encode(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_path_encodes_id() {
        assert_eq!(user_path("42"), "/api/auth/admin/42");
        assert_eq!(user_path("a/b"), "/api/auth/admin/a%2Fb");
    }
}
