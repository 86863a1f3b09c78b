//! The client-side session cache.
//!
//! A `SessionStore` holds the single shared [`LoginUser`] for a running app.
//! Clones share the same state; observers can [`subscribe`](SessionStore::subscribe)
//! to be woken on every change. The store starts anonymous and is mutated only
//! by [`refresh`](SessionStore::refresh) and [`set_explicit`](SessionStore::set_explicit).
//!
//! Explicit writes advance an epoch. A refresh response that arrives after a
//! newer explicit write is discarded, so a slow lookup cannot undo a logout.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use crate::client::UserClient;
use crate::level::AccessLevel;
use crate::user::LoginUser;

/// What a [`SessionStore::refresh`] did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshOutcome {
    /// The backend returned a profile and it was stored.
    Authenticated,
    /// The lookup failed or reported no user; the store is anonymous.
    Anonymous,
    /// The response arrived after a newer explicit write and was dropped.
    Stale,
}

struct StoreInner {
    state: watch::Sender<LoginUser>,
    epoch: AtomicU64,
    client: Arc<dyn UserClient>,
}

/// Shared handle to the current visitor's session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &*self.inner.state.borrow())
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Creates an anonymous store backed by `client`.
    #[must_use]
    pub fn new(client: Arc<dyn UserClient>) -> Self {
        let (state, _) = watch::channel(LoginUser::anonymous());
        Self {
            inner: Arc::new(StoreInner {
                state,
                epoch: AtomicU64::new(0),
                client,
            }),
        }
    }

    /// Returns the backend client this store refreshes from.
    #[must_use]
    pub fn client(&self) -> &Arc<dyn UserClient> {
        &self.inner.client
    }

    /// Returns a snapshot of the current profile.
    #[must_use]
    pub fn current(&self) -> LoginUser {
        self.inner.state.borrow().clone()
    }

    /// Runs `f` against the current profile without cloning it.
    pub fn with_current<R>(&self, f: impl FnOnce(&LoginUser) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Returns the access level the current profile holds.
    #[must_use]
    pub fn current_level(&self) -> AccessLevel {
        self.with_current(LoginUser::level)
    }

    /// Returns true if the current role is exactly `"admin"`.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.with_current(LoginUser::is_admin)
    }

    /// Returns true if the current profile holds any level above public.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.current_level() != AccessLevel::NotLoggedIn
    }

    /// Returns a receiver that observes every subsequent change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<LoginUser> {
        self.inner.state.subscribe()
    }

    /// Replaces the profile, bypassing the network.
    ///
    /// `None` resets to the anonymous placeholder. Used after login and logout.
    pub fn set_explicit(&self, user: Option<LoginUser>) {
        let user = user.unwrap_or_else(LoginUser::anonymous);
        debug!(anonymous = user.is_anonymous(), "session set explicitly");
        self.inner.state.send_modify(|current| {
            self.inner.epoch.fetch_add(1, Ordering::SeqCst);
            *current = user;
        });
    }

    /// Reloads the profile from the backend.
    ///
    /// Never fails: a transport error, a non-zero code or a missing payload all
    /// leave the store anonymous.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> RefreshOutcome {
        let started = self.epoch();

        let fetched = match self.inner.client.fetch_current_user().await {
            Ok(response) => {
                let code = response.code;
                let user = response.into_data();
                if user.is_none() {
                    debug!(code, "backend reported no signed-in user");
                }
                user
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch current user");
                None
            }
        };

        let outcome = if fetched.is_some() {
            RefreshOutcome::Authenticated
        } else {
            RefreshOutcome::Anonymous
        };
        let user = fetched.unwrap_or_else(LoginUser::anonymous);

        let applied = self.inner.state.send_if_modified(|current| {
            if self.inner.epoch.load(Ordering::SeqCst) != started {
                return false;
            }
            *current = user;
            true
        });

        if !applied {
            debug!("discarding session response superseded by an explicit write");
            return RefreshOutcome::Stale;
        }

        debug!(?outcome, "session refreshed");
        outcome
    }

    /// Resets to anonymous without superseding an in-flight refresh.
    ///
    /// The resolver uses this when its bound elapses: the abandoned lookup may
    /// still land afterwards and its result wins. Skipped if an explicit write
    /// happened after `since`.
    pub(crate) fn mark_anonymous(&self, since: u64) -> bool {
        self.inner.state.send_if_modified(|current| {
            if self.inner.epoch.load(Ordering::SeqCst) != since {
                return false;
            }
            *current = LoginUser::anonymous();
            true
        })
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{BaseResponse, LoginRequest, NOT_LOGIN_CODE};
    use crate::error::FetchError;
    use async_trait::async_trait;
    use rootcause::prelude::Report;
    use std::sync::Mutex;
    use tokio::sync::Notify;
    use zcode_core::UserId;

    /// Serves canned responses, optionally holding each one until released.
    struct ScriptedClient {
        responses: Mutex<Vec<Result<BaseResponse<LoginUser>, FetchError>>>,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedClient {
        fn new(responses: Vec<Result<BaseResponse<LoginUser>, FetchError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                gate: None,
            }
        }

        fn gated(
            responses: Vec<Result<BaseResponse<LoginUser>, FetchError>>,
            gate: Arc<Notify>,
        ) -> Self {
            Self {
                responses: Mutex::new(responses),
                gate: Some(gate),
            }
        }
    }

    #[async_trait]
    impl UserClient for ScriptedClient {
        async fn fetch_current_user(&self) -> Result<BaseResponse<LoginUser>, Report<FetchError>> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let next = self.responses.lock().unwrap().remove(0);
            next.map_err(Report::from)
        }

        async fn login(
            &self,
            _request: &LoginRequest,
        ) -> Result<BaseResponse<LoginUser>, Report<FetchError>> {
            unimplemented!("not used by session tests")
        }

        async fn logout(&self) -> Result<BaseResponse<bool>, Report<FetchError>> {
            unimplemented!("not used by session tests")
        }
    }

    fn alice() -> LoginUser {
        LoginUser::new(UserId::new(7), "alice", "user")
    }

    fn store_with(responses: Vec<Result<BaseResponse<LoginUser>, FetchError>>) -> SessionStore {
        SessionStore::new(Arc::new(ScriptedClient::new(responses)))
    }

    #[test]
    fn starts_anonymous() {
        let store = store_with(vec![]);
        assert!(store.current().is_anonymous());
        assert_eq!(store.current_level(), AccessLevel::NotLoggedIn);
        assert!(!store.is_logged_in());
    }

    #[tokio::test]
    async fn refresh_stores_profile_on_success() {
        let store = store_with(vec![Ok(BaseResponse::success(alice()))]);

        assert_eq!(store.refresh().await, RefreshOutcome::Authenticated);
        assert_eq!(store.current(), alice());
        assert_eq!(store.current_level(), AccessLevel::User);
    }

    #[tokio::test]
    async fn refresh_fails_closed() {
        let store = store_with(vec![
            Ok(BaseResponse::success(alice())),
            Ok(BaseResponse::error(NOT_LOGIN_CODE, "not logged in")),
            Ok(BaseResponse::success(alice())),
            Err(FetchError::Network {
                reason: "connection refused".to_string(),
            }),
            Ok(BaseResponse {
                code: 0,
                data: None,
                message: None,
            }),
        ]);

        store.refresh().await;
        assert!(store.is_logged_in());
        assert_eq!(store.refresh().await, RefreshOutcome::Anonymous);
        assert!(store.current().is_anonymous());

        store.refresh().await;
        assert_eq!(store.refresh().await, RefreshOutcome::Anonymous);
        assert!(store.current().is_anonymous());

        assert_eq!(store.refresh().await, RefreshOutcome::Anonymous);
        assert_eq!(store.current_level(), AccessLevel::NotLoggedIn);
    }

    #[test]
    fn set_explicit_replaces_and_resets() {
        let store = store_with(vec![]);
        store.set_explicit(Some(alice()));
        assert_eq!(store.current(), alice());

        store.set_explicit(None);
        assert_eq!(store.current(), LoginUser::anonymous());
    }

    #[test]
    fn clones_share_state() {
        let store = store_with(vec![]);
        let view = store.clone();
        store.set_explicit(Some(alice()));
        assert_eq!(view.current(), alice());
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let store = store_with(vec![]);
        let mut rx = store.subscribe();

        store.set_explicit(Some(alice()));
        rx.changed().await.expect("sender alive");
        assert_eq!(*rx.borrow_and_update(), alice());
    }

    #[tokio::test]
    async fn late_response_after_explicit_write_is_discarded() {
        let gate = Arc::new(Notify::new());
        let store = SessionStore::new(Arc::new(ScriptedClient::gated(
            vec![Ok(BaseResponse::success(alice()))],
            gate.clone(),
        )));

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.refresh().await }
        });
        tokio::task::yield_now().await;

        store.set_explicit(None);
        gate.notify_one();

        assert_eq!(pending.await.unwrap(), RefreshOutcome::Stale);
        assert!(store.current().is_anonymous());
    }

    #[tokio::test]
    async fn late_response_after_mark_anonymous_is_applied() {
        let gate = Arc::new(Notify::new());
        let store = SessionStore::new(Arc::new(ScriptedClient::gated(
            vec![Ok(BaseResponse::success(alice()))],
            gate.clone(),
        )));

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.refresh().await }
        });
        tokio::task::yield_now().await;

        assert!(store.mark_anonymous(store.epoch()));
        gate.notify_one();

        assert_eq!(pending.await.unwrap(), RefreshOutcome::Authenticated);
        assert_eq!(store.current(), alice());
    }
}
