//! Error handling foundation for the Zcode front-end.
//!
//! Only the `Result` alias lives here. Each crate owns plain error enums for
//! its own failures and returns them wrapped in a rootcause `Report`; a bare
//! error converts into its report with `?` or `.into()`.

use rootcause::Report;

/// Result whose error is a rootcause report over the context `C`.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
