//! HTTP client for the Zcode user backend.
//!
//! Implements [`UserClient`] over `reqwest`. The backend tracks sessions with
//! a cookie, so the underlying client keeps a cookie store for its lifetime;
//! share one `HttpUserClient` per running app.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use zcode_access::{BaseResponse, FetchError, LoginRequest, LoginUser, UserClient};
use zcode_core::Result;

/// Endpoint returning the signed-in user.
pub const CURRENT_USER_PATH: &str = "/user/get/login";
/// Endpoint accepting account and password.
pub const LOGIN_PATH: &str = "/user/login";
/// Endpoint ending the backend session.
pub const LOGOUT_PATH: &str = "/user/logout";

/// Per-request timeout applied to every call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// `UserClient` backed by the real HTTP API.
#[derive(Debug, Clone)]
pub struct HttpUserClient {
    http: Client,
    base_url: String,
}

impl HttpUserClient {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let http = Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Network {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `path` onto the base URL with exactly one slash between them.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn read_envelope<T: DeserializeOwned>(
        response: Response,
    ) -> Result<BaseResponse<T>, FetchError> {
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            }
            .into());
        }

        let body = response.text().await.map_err(|e| FetchError::Network {
            reason: e.to_string(),
        })?;
        Ok(decode_envelope(&body)?)
    }
}

/// Parses a response body as the backend's envelope.
///
/// # Errors
///
/// Returns [`FetchError::Decode`] if `body` is not a valid envelope for `T`.
pub fn decode_envelope<T: DeserializeOwned>(
    body: &str,
) -> std::result::Result<BaseResponse<T>, FetchError> {
    serde_json::from_str(body).map_err(|e| FetchError::Decode {
        reason: e.to_string(),
    })
}

fn network(e: reqwest::Error) -> FetchError {
    match e.status() {
        Some(status) => FetchError::Status {
            status: status.as_u16(),
        },
        None => FetchError::Network {
            reason: e.to_string(),
        },
    }
}

#[async_trait]
impl UserClient for HttpUserClient {
    #[instrument(skip(self))]
    async fn fetch_current_user(&self) -> Result<BaseResponse<LoginUser>, FetchError> {
        let response = self
            .http
            .get(self.url(CURRENT_USER_PATH))
            .send()
            .await
            .map_err(network)?;
        let envelope = Self::read_envelope(response).await?;
        debug!(code = envelope.code, "fetched current user");
        Ok(envelope)
    }

    #[instrument(skip(self, request), fields(account = %request.user_account))]
    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<BaseResponse<LoginUser>, FetchError> {
        let response = self
            .http
            .post(self.url(LOGIN_PATH))
            .json(request)
            .send()
            .await
            .map_err(network)?;
        let envelope = Self::read_envelope(response).await?;
        debug!(code = envelope.code, "login answered");
        Ok(envelope)
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<BaseResponse<bool>, FetchError> {
        let response = self
            .http
            .post(self.url(LOGOUT_PATH))
            .send()
            .await
            .map_err(network)?;
        Self::read_envelope(response).await
    }
}
