//! The visitor's identity as known to the client.
//!
//! `LoginUser` mirrors the public profile the backend returns for the
//! current session. A visitor the backend does not recognise is represented
//! by [`LoginUser::anonymous`], never by an absent value.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use zcode_core::UserId;

use crate::level::AccessLevel;

/// Display name of the anonymous placeholder.
pub const ANONYMOUS_NAME: &str = "Not logged in";

/// Role string that grants administrator access.
pub const ADMIN_ROLE: &str = "admin";

/// Public profile of the current visitor.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
    /// Backend account ID; absent for the anonymous placeholder.
    #[serde(default)]
    pub id: Option<UserId>,
    /// Login account name.
    #[serde(default)]
    pub user_account: Option<String>,
    /// Display name.
    #[serde(default)]
    pub user_name: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub user_avatar: Option<String>,
    /// Free-text profile.
    #[serde(default)]
    pub user_profile: Option<String>,
    /// `"admin"`, `"user"`, or anything else (treated as no role).
    #[serde(default)]
    pub user_role: Option<String>,
    #[serde(default)]
    pub create_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub update_time: Option<NaiveDateTime>,
}

impl LoginUser {
    /// The placeholder held while nobody is signed in.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            user_name: Some(ANONYMOUS_NAME.to_string()),
            ..Self::default()
        }
    }

    /// Creates a signed-in profile with the given role.
    #[must_use]
    pub fn new(id: UserId, user_account: impl Into<String>, user_role: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            user_account: Some(user_account.into()),
            user_role: Some(user_role.into()),
            ..Self::default()
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    /// Returns true if this is not a backend-recognised identity.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.id.is_none()
    }

    /// Returns the role string, if any.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.user_role.as_deref()
    }

    /// Returns the access level this profile holds.
    #[must_use]
    pub fn level(&self) -> AccessLevel {
        AccessLevel::from_role(self.role())
    }

    /// Returns true only when the role is exactly `"admin"`.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role() == Some(ADMIN_ROLE)
    }

    /// Name to show in headers and menus.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.user_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.user_account.as_deref())
            .unwrap_or(ANONYMOUS_NAME)
    }
}
