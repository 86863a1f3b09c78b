//! Route access control for the Zcode front-end.
//!
//! This crate provides:
//! - The three-level access model (`AccessLevel`) and its rule (`is_allowed`)
//! - The shared, observable session cache (`SessionStore`)
//! - At-most-once, bounded reconciliation with the backend (`LoginResolver`)
//! - Route declarations with access metadata (`RouteTable`)
//! - The per-navigation guard (`NavigationGuard`) and its pure decision (`decide`)
//! - An injectable bundle wiring them together (`AccessContext`)
//!
//! # Access Model
//!
//! Levels are strictly ordered: `NotLoggedIn < User < Admin`. Only the exact
//! role strings `"admin"` and `"user"` grant anything.
//! Every failure while looking up the session fails closed to `NotLoggedIn`.
//! Paths under the admin prefix additionally require the `"admin"` role,
//! whatever the route itself declares.
//!
//! # Example
//!
//! ```
//! use zcode_access::{AccessConfig, Decision, DenyReason, LoginUser, RouteTable, decide};
//! use zcode_core::UserId;
//!
//! let routes = RouteTable::standard();
//! let config = AccessConfig::default();
//! let alice = LoginUser::new(UserId::new(7), "alice", "user");
//!
//! assert!(decide("/user/update", &routes, &alice, &config).is_proceed());
//!
//! match decide("/admin/userManage", &routes, &alice, &config) {
//!     Decision::Redirect(redirect) => {
//!         assert_eq!(redirect.reason, DenyReason::AdminOnly);
//!         assert_eq!(redirect.location, "/user/login?redirect=/admin/userManage");
//!     }
//!     Decision::Proceed => unreachable!(),
//! }
//! ```

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod guard;
pub mod level;
pub mod resolver;
pub mod route;
pub mod session;
pub mod user;

// Re-export main types at crate root
pub use client::{
    BaseResponse, LoginRequest, NOT_LOGIN_CODE, Notifier, SUCCESS_CODE, TracingNotifier,
    UserClient,
};
pub use config::AccessConfig;
pub use context::AccessContext;
pub use error::{AuthError, FetchError};
pub use guard::{
    Decision, DenyReason, GuardPhase, NavigationGuard, Navigator, Redirect, decide, login_location,
};
pub use level::{AccessLevel, ParseAccessLevelError, is_allowed};
pub use resolver::{LoginResolver, ResolutionPhase, ResolveOutcome};
pub use route::{RouteDef, RouteMatch, RouteMeta, RouteTable};
pub use session::{RefreshOutcome, SessionStore};
pub use user::LoginUser;
