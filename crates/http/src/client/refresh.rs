//! Single-flight token refresh

use super::error::RefreshFailure;
use collab_core::types::{RefreshRequest, TokenPair};
use collab_core::Session;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, info, warn};

type RefreshOutcome = Result<TokenPair, RefreshFailure>;
type InFlight = Shared<BoxFuture<'static, RefreshOutcome>>;

/// A refresh that has been started and not yet cleared
struct Pending {
    generation: u64,
    refresh_token: String,
    future: InFlight,
}

/// Ensures concurrent 401 handlers share one refresh call
///
/// The first caller starts the refresh; anyone arriving while it is still
/// pending with the same refresh token awaits the same future and sees the
/// same outcome. Token persistence and the expiry redirect happen inside that
/// future, so they run once per refresh regardless of how many requests were
/// waiting.
///
/// A pending refresh whose waiters were all dropped is only joined again for
/// the refresh token it was started with; a different stored token replaces
/// it.
#[derive(Default)]
pub struct RefreshCoordinator {
    inflight: Mutex<Option<Pending>>,
    generation: AtomicU64,
}

impl RefreshCoordinator {
    /// Refresh with `refresh_token`, joining a matching refresh in flight
    pub async fn refresh(
        &self,
        http: &reqwest::Client,
        refresh_url: &str,
        session: &Session,
        refresh_token: String,
    ) -> RefreshOutcome {
        let (generation, shared) = {
            let mut inflight = self.lock();
            match inflight.as_ref() {
                Some(pending) if pending.refresh_token == refresh_token => {
                    (pending.generation, pending.future.clone())
                }
                stale => {
                    if stale.is_some() {
                        debug!("Discarding a refresh started with an older refresh token");
                    }
                    let generation = self.generation.fetch_add(1, Ordering::Relaxed);
                    let future = refresh_tokens(
                        http.clone(),
                        refresh_url.to_string(),
                        session.clone(),
                        refresh_token.clone(),
                    )
                    .boxed()
                    .shared();
                    *inflight = Some(Pending {
                        generation,
                        refresh_token,
                        future: future.clone(),
                    });
                    (generation, future)
                }
            }
        };

        let outcome = shared.await;

        let mut inflight = self.lock();
        if inflight
            .as_ref()
            .is_some_and(|pending| pending.generation == generation)
        {
            *inflight = None;
        }
        outcome
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Pending>> {
        self.inflight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The dedicated refresh call; it bypasses the interceptors entirely
async fn refresh_tokens(
    http: reqwest::Client,
    url: String,
    session: Session,
    refresh_token: String,
) -> RefreshOutcome {
    match request_pair(&http, &url, refresh_token).await {
        Ok(pair) => {
            if let Err(e) = session.tokens().store(&pair) {
                warn!("Refreshed tokens could not be persisted: {e}");
            }
            info!("Access token refreshed");
            Ok(pair)
        }
        Err(failure) => {
            warn!("{failure}");
            session.expire();
            Err(failure)
        }
    }
}

async fn request_pair(
    http: &reqwest::Client,
    url: &str,
    refresh_token: String,
) -> RefreshOutcome {
    let response = http
        .post(url)
        .json(&RefreshRequest { refresh_token })
        .send()
        .await
        .map_err(|e| RefreshFailure(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(RefreshFailure(format!("{status}: {message}")));
    }

    response
        .json::<TokenPair>()
        .await
        .map_err(|e| RefreshFailure(format!("invalid refresh response: {e}")))
}
