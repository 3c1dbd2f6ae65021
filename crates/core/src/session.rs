//! Session context shared by the API client, stores and router

use crate::navigation::{History, Navigator, RouteTargets};
use crate::storage::TokenStore;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Called when the session expires; returns `false` once it no longer cares
type ExpiryListener = Box<dyn Fn() -> bool + Send + Sync>;

/// Token storage plus the navigator used for forced redirects
///
/// One instance is created at startup and handed to every component that
/// needs session state; clones share the same underlying storage.
#[derive(Clone)]
pub struct Session {
    tokens: TokenStore,
    navigator: Arc<dyn Navigator>,
    routes: RouteTargets,
    listeners: Arc<Mutex<Vec<ExpiryListener>>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("tokens", &self.tokens)
            .field("location", &self.navigator.current())
            .field("routes", &self.routes)
            .finish()
    }
}

impl Session {
    #[must_use]
    pub fn new(tokens: TokenStore, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            tokens,
            navigator,
            routes: RouteTargets::default(),
            listeners: Arc::default(),
        }
    }

    /// In-memory tokens and history, starting at `/`
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(TokenStore::in_memory(), Arc::new(History::default()))
    }

    #[must_use]
    pub fn with_routes(mut self, routes: RouteTargets) -> Self {
        self.routes = routes;
        self
    }

    #[must_use]
    pub const fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    #[must_use]
    pub const fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    #[must_use]
    pub const fn routes(&self) -> &RouteTargets {
        &self.routes
    }

    /// Register interest in forced expiry
    ///
    /// Listeners run after the tokens are dropped and before the redirect.
    /// A listener returning `false` is removed.
    #[must_use]
    pub fn on_expire(&self, listener: impl Fn() -> bool + Send + Sync + 'static) {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Box::new(listener));
    }

    /// Drop both tokens, notify listeners and send the user to the login route
    pub fn expire(&self) {
        info!("Session expired, redirecting to {}", self.routes.login);
        self.discard_tokens();

        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        listeners.retain(|listener| listener());
        debug!(listeners = listeners.len(), "Expiry listeners notified");
        drop(listeners);

        self.navigator.navigate(&self.routes.login);
    }

    /// Remove persisted tokens, logging instead of failing
    pub fn discard_tokens(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!("Failed to clear stored tokens: {e}");
        }
    }
}
