//! The navigation guard.
//!
//! Every navigation attempt runs `Resolving -> Checking -> {Proceed, Denied}`:
//! the session is reconciled with the backend (at most once, bounded), then
//! the target's requirement is compared with the level the session holds.
//!
//! The decision itself is the pure function [`decide`]; the guard only adds
//! resolution, the user notice and logging around it. Applying the decision
//! to a router is left to [`Decision::apply`].

use std::fmt;
use std::sync::Arc;

use tracing::{Span, debug, field, info, instrument};

use crate::client::Notifier;
use crate::config::AccessConfig;
use crate::level::{AccessLevel, is_allowed};
use crate::resolver::LoginResolver;
use crate::route::{RouteMatch, RouteTable, path_of};
use crate::user::LoginUser;

/// Step of a single guarded navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardPhase {
    Resolving,
    Checking,
    Proceed,
    Denied,
}

/// Why a navigation was redirected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// Admin-prefixed path and the role is not exactly `"admin"`.
    AdminOnly,
    /// The route requires a higher level than the session holds.
    InsufficientLevel,
    /// No route matches; sent to the fallback page.
    NotFound,
}

/// Where a refused navigation goes instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub location: String,
    pub reason: DenyReason,
    /// Message to show the visitor, if any.
    pub notice: Option<String>,
}

/// Outcome of guarding one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Let the navigation continue unchanged.
    Proceed,
    /// Navigate somewhere else.
    Redirect(Redirect),
}

impl Decision {
    #[must_use]
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }

    /// Redirect location, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Proceed => None,
            Self::Redirect(redirect) => Some(&redirect.location),
        }
    }

    /// Hands the decision to the router, calling exactly one of its methods once.
    pub fn apply<N: Navigator + ?Sized>(self, navigator: &mut N) {
        match self {
            Self::Proceed => navigator.proceed(),
            Self::Redirect(redirect) => navigator.redirect(&redirect.location),
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Proceed => write!(f, "proceed"),
            Self::Redirect(redirect) => {
                write!(f, "redirect to {} ({:?})", redirect.location, redirect.reason)
            }
        }
    }
}

/// The router side of a navigation.
pub trait Navigator {
    /// Continue to the original target.
    fn proceed(&mut self);
    /// Go to `location` instead.
    fn redirect(&mut self, location: &str);
}

/// Returns true if `target` lies under `prefix` as whole path segments.
///
/// `/admin` and `/admin/users` match the prefix `/admin`; `/administrator` does not.
#[must_use]
pub fn is_under_prefix(target: &str, prefix: &str) -> bool {
    let path = path_of(target);
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Login location that returns the visitor to `intended` afterwards.
///
/// Slashes stay literal; every other reserved character in a segment is
/// percent-encoded so the intended query string cannot leak into the login URL.
#[must_use]
pub fn login_location(config: &AccessConfig, intended: &str) -> String {
    let encoded = intended
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "{}?{}={}",
        config.login_path(),
        config.redirect_param(),
        encoded
    )
}

/// Decides a navigation to `target` for `user`.
///
/// The admin-prefix rule is checked first and independently of the route's
/// declared level; it is the only denial that carries a notice.
#[must_use]
pub fn decide(target: &str, routes: &RouteTable, user: &LoginUser, config: &AccessConfig) -> Decision {
    if is_under_prefix(target, config.admin_prefix()) && !user.is_admin() {
        return Decision::Redirect(Redirect {
            location: login_location(config, target),
            reason: DenyReason::AdminOnly,
            notice: Some(config.denied_notice().to_string()),
        });
    }

    let required = match routes.resolve(target) {
        RouteMatch::Route(route) => route.meta.required,
        RouteMatch::Fallback(fallback) if fallback != path_of(target) => {
            return Decision::Redirect(Redirect {
                location: fallback.to_string(),
                reason: DenyReason::NotFound,
                notice: None,
            });
        }
        RouteMatch::Fallback(_) | RouteMatch::Unmatched => AccessLevel::NotLoggedIn,
    };

    if is_allowed(required, user.level()) {
        Decision::Proceed
    } else {
        Decision::Redirect(Redirect {
            location: login_location(config, target),
            reason: DenyReason::InsufficientLevel,
            notice: None,
        })
    }
}

/// Runs before every navigation.
#[derive(Clone)]
pub struct NavigationGuard {
    resolver: LoginResolver,
    routes: Arc<RouteTable>,
    config: Arc<AccessConfig>,
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for NavigationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationGuard")
            .field("resolver", &self.resolver)
            .field("routes", &self.routes.routes().len())
            .finish_non_exhaustive()
    }
}

impl NavigationGuard {
    #[must_use]
    pub fn new(
        resolver: LoginResolver,
        routes: Arc<RouteTable>,
        config: Arc<AccessConfig>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            resolver,
            routes,
            config,
            notifier,
        }
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    #[must_use]
    pub fn config(&self) -> &AccessConfig {
        &self.config
    }

    /// Guards a navigation to `target`.
    ///
    /// Always returns: resolution is bounded, and every failure on the way has
    /// already collapsed into the anonymous session.
    #[instrument(skip(self), fields(phase = field::Empty))]
    pub async fn before_each(&self, target: &str) -> Decision {
        let span = Span::current();

        span.record("phase", field::debug(GuardPhase::Resolving));
        let resolution = self.resolver.ensure_resolved().await;

        span.record("phase", field::debug(GuardPhase::Checking));
        let decision = self
            .resolver
            .store()
            .with_current(|user| decide(target, &self.routes, user, &self.config));

        match &decision {
            Decision::Proceed => {
                span.record("phase", field::debug(GuardPhase::Proceed));
                debug!(?resolution, "navigation allowed");
            }
            Decision::Redirect(redirect) => {
                span.record("phase", field::debug(GuardPhase::Denied));
                if let Some(notice) = &redirect.notice {
                    self.notifier.notify(notice);
                }
                info!(
                    ?resolution,
                    reason = ?redirect.reason,
                    location = %redirect.location,
                    "navigation redirected"
                );
            }
        }

        decision
    }
}
