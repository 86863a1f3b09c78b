//! Contracts for the collaborators the access core consumes.
//!
//! The backend is reached through [`UserClient`]; user-visible notices go
//! through [`Notifier`]. Both are traits so tests can substitute in-memory
//! implementations without a network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use zcode_core::Result;

use crate::error::FetchError;
use crate::user::LoginUser;

/// Response code the backend uses for success.
pub const SUCCESS_CODE: i32 = 0;

/// Response code the backend uses when no user is signed in.
pub const NOT_LOGIN_CODE: i32 = 40100;

/// The backend's common response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseResponse<T> {
    pub code: i32,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> BaseResponse<T> {
    /// A successful envelope carrying `data`.
    #[must_use]
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            data: Some(data),
            message: Some("ok".to_string()),
        }
    }

    /// A failed envelope with no payload.
    #[must_use]
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Returns true for `code == 0`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Returns the payload only for a well-formed success: zero code and non-null data.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        if self.is_success() { self.data } else { None }
    }

    /// Returns the message, or an empty string.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or_default()
    }
}

/// Credentials for an explicit login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_account: String,
    pub user_password: String,
}

impl LoginRequest {
    #[must_use]
    pub fn new(user_account: impl Into<String>, user_password: impl Into<String>) -> Self {
        Self {
            user_account: user_account.into(),
            user_password: user_password.into(),
        }
    }
}

/// The backend operations the access core depends on.
#[async_trait]
pub trait UserClient: Send + Sync {
    /// Fetches the profile bound to the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails before a response envelope is decoded.
    async fn fetch_current_user(&self) -> Result<BaseResponse<LoginUser>, FetchError>;

    /// Signs in with an account and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails before a response envelope is decoded.
    async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<BaseResponse<LoginUser>, FetchError>;

    /// Ends the current backend session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails before a response envelope is decoded.
    async fn logout(&self) -> Result<BaseResponse<bool>, FetchError>;
}

/// User-visible notice surface.
pub trait Notifier: Send + Sync {
    /// Shows `message` to the visitor.
    fn notify(&self, message: &str);
}

/// Notifier that only records notices in the trace log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(notice = %message, "user notice");
    }
}
