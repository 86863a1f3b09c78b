//! Access-control configuration.
//!
//! Fields with defaults can be omitted when loading from environment
//! variables; the defaults match the deployed front-end.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for session resolution and the navigation guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Upper bound on the first backend session lookup, in milliseconds.
    #[serde(default = "default_resolve_timeout_ms")]
    resolve_timeout_ms: u64,
    /// Route that denied navigations are sent to.
    #[serde(default = "default_login_path")]
    login_path: String,
    /// Path segment whose routes are reserved for the `"admin"` role.
    #[serde(default = "default_admin_prefix")]
    admin_prefix: String,
    /// Query parameter carrying the originally intended path.
    #[serde(default = "default_redirect_param")]
    redirect_param: String,
    /// Notice shown when an admin route is refused.
    #[serde(default = "default_denied_notice")]
    denied_notice: String,
    /// Suffix for page titles.
    #[serde(default = "default_app_title")]
    app_title: String,
}

fn default_resolve_timeout_ms() -> u64 {
    3000
}

fn default_login_path() -> String {
    "/user/login".to_string()
}

fn default_admin_prefix() -> String {
    "/admin".to_string()
}

fn default_redirect_param() -> String {
    "redirect".to_string()
}

fn default_denied_notice() -> String {
    "No permission".to_string()
}

fn default_app_title() -> String {
    "Code Cube".to_string()
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            resolve_timeout_ms: default_resolve_timeout_ms(),
            login_path: default_login_path(),
            admin_prefix: default_admin_prefix(),
            redirect_param: default_redirect_param(),
            denied_notice: default_denied_notice(),
            app_title: default_app_title(),
        }
    }
}

impl AccessConfig {
    /// Sets the resolution timeout.
    #[must_use]
    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the login route.
    #[must_use]
    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// Sets the admin path prefix.
    #[must_use]
    pub fn with_admin_prefix(mut self, admin_prefix: impl Into<String>) -> Self {
        self.admin_prefix = admin_prefix.into();
        self
    }

    /// Returns the resolution timeout.
    #[must_use]
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Returns the admin prefix without any trailing slash.
    #[must_use]
    pub fn admin_prefix(&self) -> &str {
        self.admin_prefix.trim_end_matches('/')
    }

    #[must_use]
    pub fn redirect_param(&self) -> &str {
        &self.redirect_param
    }

    #[must_use]
    pub fn denied_notice(&self) -> &str {
        &self.denied_notice
    }

    #[must_use]
    pub fn app_title(&self) -> &str {
        &self.app_title
    }
}
