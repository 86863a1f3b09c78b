//! Access levels and the route permission check.
//!
//! Every route declares the level it requires and every session resolves to
//! the level it holds. Levels are totally ordered: `Admin` implies `User`,
//! which implies `NotLoggedIn`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Permission tier a route requires and a session holds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum AccessLevel {
    /// Public; also the level of an anonymous visitor.
    #[default]
    #[serde(rename = "notLogin")]
    NotLoggedIn,
    /// Any signed-in account.
    #[serde(rename = "user")]
    User,
    /// Administrators.
    #[serde(rename = "admin")]
    Admin,
}

impl AccessLevel {
    /// Derives the level held by a session from its role string.
    ///
    /// Only the exact strings `"admin"` and `"user"` grant anything.
    #[must_use]
    pub fn from_role(role: Option<&str>) -> Self {
        match role {
            Some("admin") => Self::Admin,
            Some("user") => Self::User,
            _ => Self::NotLoggedIn,
        }
    }

    /// Returns the wire name of this level.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotLoggedIn => "notLogin",
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Returns true if a session at this level may enter a route requiring `required`.
    #[must_use]
    pub fn satisfies(self, required: AccessLevel) -> bool {
        is_allowed(required, self)
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAccessLevelError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for ParseAccessLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown access level: {:?}", self.input)
    }
}

impl std::error::Error for ParseAccessLevelError {}

impl FromStr for AccessLevel {
    type Err = ParseAccessLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notLogin" => Ok(Self::NotLoggedIn),
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(ParseAccessLevelError {
                input: other.to_string(),
            }),
        }
    }
}

/// Decides whether a session holding `actual` may enter a route requiring `required`.
///
/// Pure and total over all nine combinations; anything not listed as allowed is denied.
#[must_use]
pub fn is_allowed(required: AccessLevel, actual: AccessLevel) -> bool {
    use AccessLevel::{Admin, NotLoggedIn, User};

    match (required, actual) {
        (NotLoggedIn, _) => true,
        (_, NotLoggedIn) => false,
        (User, User | Admin) => true,
        (Admin, Admin) => true,
        (Admin, User) => false,
    }
}
