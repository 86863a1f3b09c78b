//! Core domain types and utilities for the Zcode front-end.
//!
//! This crate provides the foundational types and error handling shared by
//! the access-control core and the backend client.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ParseIdError, UserId};
