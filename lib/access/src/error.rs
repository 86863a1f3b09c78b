//! Error types for the access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `FetchError`: transport failures talking to the backend
//! - `AuthError`: explicit login and logout failures surfaced to callers
//!
//! Session resolution never returns either of these to navigation code; every
//! failure there collapses into the anonymous session instead.

use std::fmt;

/// Transport-level failures of a backend call.
///
/// Business failures (`code != 0`) are not errors at this layer; they travel
/// inside the response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never produced a response.
    Network { reason: String },
    /// The backend answered with an HTTP error status.
    Status { status: u16 },
    /// The response body was not the expected envelope.
    Decode { reason: String },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network { reason } => write!(f, "network error: {reason}"),
            Self::Status { status } => write!(f, "backend returned HTTP {status}"),
            Self::Decode { reason } => write!(f, "malformed response: {reason}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Failures of explicit authentication actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The backend could not be reached or answered garbage.
    Unavailable,
    /// The backend refused the request.
    Rejected { code: i32, message: String },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "authentication service unavailable"),
            Self::Rejected { code, message } => {
                write!(f, "authentication rejected ({code}): {message}")
            }
        }
    }
}

impl std::error::Error for AuthError {}
