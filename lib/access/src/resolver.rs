//! At-most-once reconciliation of the session cache with the backend.
//!
//! The resolver is an explicit state machine:
//!
//! ```text
//! Unresolved --ensure_resolved--> Resolving(shared future) --done--> Resolved
//!     ^                                                                 |
//!     +--------------------------------- reset -------------------------+
//! ```
//!
//! Callers that arrive while a resolution is in flight await the same shared
//! future, so back-to-back navigations trigger a single backend lookup. The
//! lookup runs as its own task and is raced against a bound; when the bound
//! elapses the session is treated as anonymous and the caller proceeds, while
//! the abandoned lookup may still land later (last write wins).

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tracing::{debug, instrument, warn};

use crate::session::{RefreshOutcome, SessionStore};

/// Result of an [`LoginResolver::ensure_resolved`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveOutcome {
    /// Already resolved earlier; no backend call was made.
    Cached,
    /// The backend returned a profile.
    Authenticated,
    /// The backend reported no user or could not be reached.
    Anonymous,
    /// The lookup exceeded the bound; the session is anonymous for now.
    TimedOut,
    /// An explicit login or logout landed while the lookup was in flight and won.
    Superseded,
}

/// Observable phase of the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionPhase {
    Unresolved,
    Resolving,
    Resolved,
}

type SharedResolution = Shared<BoxFuture<'static, ResolveOutcome>>;

enum Phase {
    Unresolved,
    Resolving(SharedResolution),
    Resolved,
}

struct ResolverState {
    phase: Phase,
    /// Advanced by `reset`; a resolution started under an older generation
    /// cannot mark the state resolved.
    generation: u64,
}

/// Guarantees the session store reflects the backend at least once.
#[derive(Clone)]
pub struct LoginResolver {
    store: SessionStore,
    timeout: Duration,
    state: Arc<Mutex<ResolverState>>,
}

impl fmt::Debug for LoginResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResolver")
            .field("timeout", &self.timeout)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl LoginResolver {
    /// Creates an unresolved resolver over `store`.
    #[must_use]
    pub fn new(store: SessionStore, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            state: Arc::new(Mutex::new(ResolverState {
                phase: Phase::Unresolved,
                generation: 0,
            })),
        }
    }

    /// Returns the store this resolver populates.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> ResolutionPhase {
        match self.lock().phase {
            Phase::Unresolved => ResolutionPhase::Unresolved,
            Phase::Resolving(_) => ResolutionPhase::Resolving,
            Phase::Resolved => ResolutionPhase::Resolved,
        }
    }

    /// Ensures the session has been reconciled with the backend.
    ///
    /// The first call issues one lookup bounded by the configured timeout;
    /// concurrent callers share it; later calls return [`ResolveOutcome::Cached`]
    /// immediately. Never fails and never waits longer than the bound.
    #[instrument(skip(self))]
    pub async fn ensure_resolved(&self) -> ResolveOutcome {
        let resolution = {
            let mut state = self.lock();
            let in_flight = match &state.phase {
                Phase::Resolved => return ResolveOutcome::Cached,
                Phase::Resolving(shared) => Some(shared.clone()),
                Phase::Unresolved => None,
            };

            match in_flight {
                Some(shared) => {
                    debug!("joining in-flight session resolution");
                    shared
                }
                None => {
                    let shared = self.resolve(state.generation).boxed().shared();
                    state.phase = Phase::Resolving(shared.clone());
                    shared
                }
            }
        };

        resolution.await
    }

    /// Marks the session resolved without a lookup.
    ///
    /// Used after an explicit login already stored the profile.
    pub fn mark_resolved(&self) {
        self.lock().phase = Phase::Resolved;
    }

    /// Forgets the resolution and clears the session, typically on logout.
    ///
    /// The next [`ensure_resolved`](Self::ensure_resolved) performs a fresh lookup.
    pub fn reset(&self) {
        {
            let mut state = self.lock();
            state.generation += 1;
            state.phase = Phase::Unresolved;
        }
        self.store.set_explicit(None);
        debug!("session resolution reset");
    }

    fn resolve(&self, generation: u64) -> impl Future<Output = ResolveOutcome> + Send + 'static {
        let store = self.store.clone();
        let state = Arc::clone(&self.state);
        let bound = self.timeout;

        async move {
            let since = store.epoch();
            let lookup = tokio::spawn({
                let store = store.clone();
                async move { store.refresh().await }
            });

            let outcome = match tokio::time::timeout(bound, lookup).await {
                Ok(Ok(RefreshOutcome::Authenticated)) => ResolveOutcome::Authenticated,
                Ok(Ok(RefreshOutcome::Anonymous)) => ResolveOutcome::Anonymous,
                Ok(Ok(RefreshOutcome::Stale)) => ResolveOutcome::Superseded,
                Ok(Err(e)) => {
                    warn!(error = %e, "session lookup task failed; continuing as anonymous");
                    store.mark_anonymous(since);
                    ResolveOutcome::Anonymous
                }
                Err(_) => {
                    warn!(
                        timeout_ms = bound.as_millis() as u64,
                        "session lookup timed out; continuing as anonymous"
                    );
                    store.mark_anonymous(since);
                    ResolveOutcome::TimedOut
                }
            };

            let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.generation == generation {
                state.phase = Phase::Resolved;
            }
            debug!(?outcome, "session resolution finished");
            outcome
        }
    }

    fn lock(&self) -> MutexGuard<'_, ResolverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
