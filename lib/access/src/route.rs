//! Route declarations and their access metadata.

use serde::{Deserialize, Serialize};

use crate::level::{AccessLevel, is_allowed};

/// Access metadata attached to a route.
///
/// A route that declares nothing is public.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    /// Level a visitor must hold to enter.
    #[serde(default, rename = "access")]
    pub required: AccessLevel,
    /// Keep the route out of navigation menus.
    #[serde(default)]
    pub hide_in_menu: bool,
}

impl RouteMeta {
    #[must_use]
    pub fn requires(required: AccessLevel) -> Self {
        Self {
            required,
            hide_in_menu: false,
        }
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hide_in_menu = true;
        self
    }
}

/// A navigable route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDef {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub meta: RouteMeta,
}

impl RouteDef {
    #[must_use]
    pub fn new(path: impl Into<String>, name: impl Into<String>, meta: RouteMeta) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            meta,
        }
    }
}

/// Result of looking a path up in a [`RouteTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    /// A declared route.
    Route(&'a RouteDef),
    /// No route matched; navigation should go to this path instead.
    Fallback(&'a str),
    /// No route matched and no fallback is configured.
    Unmatched,
}

/// The application's route declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
    #[serde(default)]
    fallback: Option<String>,
}

impl RouteTable {
    /// Creates an empty table with no fallback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The front-end's own routes.
    #[must_use]
    pub fn standard() -> Self {
        use AccessLevel::{Admin, NotLoggedIn, User};

        Self::new()
            .with_route(RouteDef::new("/", "Home", RouteMeta::requires(NotLoggedIn)))
            .with_route(RouteDef::new(
                "/user/login",
                "User Login",
                RouteMeta::requires(NotLoggedIn).hidden(),
            ))
            .with_route(RouteDef::new(
                "/user/register",
                "User Registration",
                RouteMeta::requires(NotLoggedIn).hidden(),
            ))
            .with_route(RouteDef::new(
                "/user/update",
                "Edit Profile",
                RouteMeta::requires(User).hidden(),
            ))
            .with_route(RouteDef::new(
                "/admin/userManage",
                "User Management",
                RouteMeta::requires(Admin),
            ))
            .with_route(RouteDef::new(
                "/403",
                "Forbidden",
                RouteMeta::requires(NotLoggedIn).hidden(),
            ))
            .with_route(RouteDef::new(
                "/404",
                "Not Found",
                RouteMeta::requires(NotLoggedIn).hidden(),
            ))
            .with_fallback("/404")
    }

    /// Adds a route. Lookups return the first route declared for a path.
    #[must_use]
    pub fn with_route(mut self, route: RouteDef) -> Self {
        self.routes.push(route);
        self
    }

    /// Sets where unmatched paths are sent.
    #[must_use]
    pub fn with_fallback(mut self, path: impl Into<String>) -> Self {
        self.fallback = Some(path.into());
        self
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    /// Finds the route for `target`, ignoring its query string and fragment.
    #[must_use]
    pub fn resolve(&self, target: &str) -> RouteMatch<'_> {
        let path = path_of(target);
        if let Some(route) = self.routes.iter().find(|route| route.path == path) {
            return RouteMatch::Route(route);
        }
        match self.fallback.as_deref() {
            Some(fallback) => RouteMatch::Fallback(fallback),
            None => RouteMatch::Unmatched,
        }
    }

    /// Level required to enter `target`; public when no route declares one.
    #[must_use]
    pub fn required_level(&self, target: &str) -> AccessLevel {
        match self.resolve(target) {
            RouteMatch::Route(route) => route.meta.required,
            RouteMatch::Fallback(_) | RouteMatch::Unmatched => AccessLevel::NotLoggedIn,
        }
    }

    /// Menu entries a visitor at `level` should see.
    pub fn menu_for(&self, level: AccessLevel) -> impl Iterator<Item = &RouteDef> {
        self.routes
            .iter()
            .filter(move |route| !route.meta.hide_in_menu && is_allowed(route.meta.required, level))
    }

    /// Document title for `target`.
    #[must_use]
    pub fn page_title(&self, target: &str, app_title: &str) -> String {
        match self.resolve(target) {
            RouteMatch::Route(route) if !route.name.is_empty() => {
                format!("{} - {app_title}", route.name)
            }
            _ => app_title.to_string(),
        }
    }
}

/// Strips the query string and fragment from a navigation target.
#[must_use]
pub fn path_of(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}
