//! The application-wide access bundle.
//!
//! `AccessContext` owns one session store, one resolver and one guard wired
//! to the same backend client. It is constructed once at startup and passed
//! to whatever needs it; there is no global instance.

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::client::{LoginRequest, Notifier, UserClient};
use crate::config::AccessConfig;
use crate::error::AuthError;
use crate::guard::{Decision, NavigationGuard, Navigator};
use crate::level::{AccessLevel, is_allowed};
use crate::resolver::LoginResolver;
use crate::route::RouteTable;
use crate::session::SessionStore;
use crate::user::LoginUser;

/// Session, resolver and guard for one running front-end.
#[derive(Debug, Clone)]
pub struct AccessContext {
    store: SessionStore,
    resolver: LoginResolver,
    guard: NavigationGuard,
}

impl AccessContext {
    #[must_use]
    pub fn new(
        client: Arc<dyn UserClient>,
        routes: RouteTable,
        config: AccessConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let store = SessionStore::new(client);
        let resolver = LoginResolver::new(store.clone(), config.resolve_timeout());
        let guard = NavigationGuard::new(
            resolver.clone(),
            Arc::new(routes),
            Arc::new(config),
            notifier,
        );
        Self {
            store,
            resolver,
            guard,
        }
    }

    /// The shared session store.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.store
    }

    #[must_use]
    pub fn resolver(&self) -> &LoginResolver {
        &self.resolver
    }

    #[must_use]
    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Guards a navigation to `target` and hands the outcome to `navigator`.
    pub async fn navigate<N: Navigator + ?Sized>(&self, target: &str, navigator: &mut N) -> Decision {
        let decision = self.guard.before_each(target).await;
        decision.clone().apply(navigator);
        decision
    }

    /// Checks the session against `required`, resolving it first if needed.
    pub async fn check_page_access(&self, required: AccessLevel) -> bool {
        self.resolver.ensure_resolved().await;
        is_allowed(required, self.store.current_level())
    }

    #[must_use]
    pub fn current_level(&self) -> AccessLevel {
        self.store.current_level()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.store.is_admin()
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.store.is_logged_in()
    }

    /// Signs in and stores the returned profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unavailable`] if the backend cannot be reached, or
    /// [`AuthError::Rejected`] if it answers with a non-zero code or no profile.
    #[instrument(skip(self, password))]
    pub async fn login(&self, account: &str, password: &str) -> zcode_core::Result<LoginUser, AuthError> {
        let request = LoginRequest::new(account, password);
        let response = match self.store.client().login(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "login request failed");
                return Err(AuthError::Unavailable.into());
            }
        };

        let code = response.code;
        let message = response.message().to_string();
        let Some(user) = response.into_data() else {
            debug!(code, "login rejected");
            return Err(AuthError::Rejected { code, message }.into());
        };

        self.store.set_explicit(Some(user.clone()));
        self.resolver.mark_resolved();
        info!(user_id = ?user.id, level = %user.level(), "signed in");
        Ok(user)
    }

    /// Ends the session locally and on the backend.
    ///
    /// Backend failures are logged; the local session is cleared regardless
    /// and the next navigation looks the session up again.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        match self.store.client().logout().await {
            Ok(response) if response.is_success() => debug!("backend session ended"),
            Ok(response) => warn!(
                code = response.code,
                message = response.message(),
                "backend refused logout"
            ),
            Err(e) => warn!(error = %e, "logout request failed"),
        }
        self.resolver.reset();
        info!("signed out");
    }
}
