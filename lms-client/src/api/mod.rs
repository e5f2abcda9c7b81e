//! Authenticated access to the LMS REST API
//!
//! Every dashboard call goes through [`ApiClient`], which attaches the
//! current session's bearer token and applies one policy to authorization
//! failures: a 401 or 403 clears the session and reports
//! [`ApiError::AuthorizationExpired`], so the caller can send the user back
//! to the login view.

pub mod admin;
pub mod dashboards;
pub mod student;
pub mod teacher;
pub mod types;

pub use admin::AdminDashboard;
pub use dashboards::Dashboards;
pub use student::StudentDashboard;
pub use teacher::TeacherDashboard;
pub use types::*;

use crate::session::SessionStore;
use lms_core::{ApiConfig, ErrorContext, LmsError, LmsResult};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub const PING_PATH: &str = "/api/test";

/// Failure of an authenticated call
#[derive(Debug, Error)]
pub enum ApiError {
    /// No session; the request was not sent
    #[error("Not logged in")]
    NotAuthenticated,

    /// The server refused the token; the session has been cleared
    #[error("Session expired, please log in again")]
    AuthorizationExpired { status: u16 },

    /// Any other non-2xx answer
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request failed in transit or the body could not be decoded
    #[error("{message}")]
    Request {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ApiError {
    /// Whether the caller should route to the login view
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            ApiError::NotAuthenticated | ApiError::AuthorizationExpired { .. }
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::AuthorizationExpired { status } | ApiError::Api { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// What a call is doing, for the generic "Error <verb>ing <resource>" text
#[derive(Debug, Clone, Copy)]
pub struct Action {
    pub gerund: &'static str,
    pub resource: &'static str,
}

impl Action {
    pub const fn new(gerund: &'static str, resource: &'static str) -> Self {
        Self { gerund, resource }
    }

    pub fn failure_message(&self) -> String {
        format!("Error {} {}", self.gerund, self.resource)
    }
}

/// `{ "error": "..." }` body the server sends with failures
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}

/// Join the configured base URL and an absolute API path
pub(crate) fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Build an HTTP client with the configured timeout and user agent
pub(crate) fn create_http_client(config: &ApiConfig) -> LmsResult<reqwest::Client> {
    let user_agent =
        reqwest::header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
            LmsError::Config {
                message: format!("Invalid user agent: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?;

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(reqwest::header::USER_AGENT, user_agent);

    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| LmsError::Network {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })
}

/// HTTP client bound to the session store
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> LmsResult<Self> {
        Ok(Self {
            http: create_http_client(config)?,
            base_url: config.base_url.clone(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Unauthenticated connectivity check against `GET /api/test`
    pub async fn ping(&self) -> Result<serde_json::Value, ApiError> {
        let action = Action::new("contacting", "server");
        let response = self
            .http
            .get(endpoint_url(&self.base_url, PING_PATH))
            .send()
            .await
            .map_err(|e| request_error(action, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: action.failure_message(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| request_error(action, e))
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        action: Action,
    ) -> Result<T, ApiError> {
        let response = self.send::<()>(Method::GET, path, None, action).await?;
        decode(response, action).await
    }

    /// Mutating call; the response body is not needed
    pub(crate) async fn command<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        action: Action,
    ) -> Result<(), ApiError> {
        self.send(method, path, body, action).await?;
        Ok(())
    }

    /// Send with the bearer token and map every non-2xx status to an error
    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        action: Action,
    ) -> Result<reqwest::Response, ApiError> {
        let token = self.session.token().ok_or(ApiError::NotAuthenticated)?;
        let url = endpoint_url(&self.base_url, path);

        debug!(%method, %url, "API request");

        let mut request = self.http.request(method, &url).bearer_auth(&token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| request_error(action, e))?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = status.as_u16(), %url, "Authorization refused");
            self.session.invalidate(&token);
            return Err(ApiError::AuthorizationExpired {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| action.failure_message());
            debug!(status = status.as_u16(), %message, "API call failed");
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    action: Action,
) -> Result<T, ApiError> {
    response
        .json::<T>()
        .await
        .map_err(|e| request_error(action, e))
}

fn request_error(action: Action, error: reqwest::Error) -> ApiError {
    warn!("{}: {}", action.failure_message(), error);
    ApiError::Request {
        message: action.failure_message(),
        source: Some(Box::new(error)),
    }
}
