//! The authentication service the session store logs in against

use super::errors::AuthError;
use crate::api::{create_http_client, endpoint_url, ErrorBody};
use async_trait::async_trait;
use lms_core::{ApiConfig, LmsResult, Role, Session};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const LOGIN_PATH: &str = "/api/auth/login";

/// Login form contents
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `user` object of a successful login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUser {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// Body of a successful `POST /api/auth/login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: LoginUser,
    pub token: String,
}

impl LoginResponse {
    /// Validate the response into a session; any empty field is rejected.
    pub fn into_session(self) -> LmsResult<Session> {
        Session::new(
            self.user.id,
            self.user.username,
            self.user.email,
            self.user.role,
            self.token,
        )
    }
}

/// Exchanges credentials for a login response
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError>;
}

/// Talks to the LMS REST API over HTTP
pub struct HttpAuthBackend {
    client: reqwest::Client,
    login_url: String,
}

impl HttpAuthBackend {
    pub fn new(config: &ApiConfig) -> LmsResult<Self> {
        Ok(Self {
            client: create_http_client(config)?,
            login_url: endpoint_url(&config.base_url, LOGIN_PATH),
        })
    }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        debug!(email = %credentials.email, "Sending login request");

        let response = self
            .client
            .post(&self.login_url)
            .json(credentials)
            .send()
            .await
            .map_err(|e| {
                warn!("Login request did not complete: {}", e);
                AuthError::generic()
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            warn!("Failed to read login response: {}", e);
            AuthError::generic()
        })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.trim().is_empty());
            debug!(status = status.as_u16(), "Login rejected");
            return Err(message.map_or_else(AuthError::generic, AuthError::login_failed));
        }

        serde_json::from_slice(&body).map_err(|e| {
            warn!("Unreadable login response: {}", e);
            AuthError::generic()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = Credentials::new("a@x.com", "secret");
        let rendered = format!("{:?}", credentials);
        assert!(rendered.contains("a@x.com"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_login_response_wire_format() {
        let body = r#"{"user":{"_id":"1","username":"a","email":"a@x.com","role":"teacher"},"token":"tok"}"#;
        let response: LoginResponse = serde_json::from_str(body).unwrap();
        let session = response.into_session().unwrap();
        assert_eq!(session.id(), "1");
        assert_eq!(session.role(), Role::Teacher);
        assert_eq!(session.token(), "tok");
    }

    #[test]
    fn test_login_response_with_empty_token_is_rejected() {
        let body = r#"{"user":{"_id":"1","username":"a","email":"a@x.com","role":"admin"},"token":""}"#;
        let response: LoginResponse = serde_json::from_str(body).unwrap();
        assert!(response.into_session().is_err());
    }
}
