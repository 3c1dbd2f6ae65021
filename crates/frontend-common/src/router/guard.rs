//! Navigation guard

use super::routes::{RouteMeta, RouteTable};
use crate::auth::{AuthStore, SessionState};
use crate::config::StoreConfig;
use collab_core::RouteTargets;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Outcome of guarding one navigation
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Too many redirects while navigating to {path}")]
    RedirectLoop { path: String },
}

/// Apply the route flags to a session
///
/// Auth is checked first, then guest, then admin.
#[must_use]
pub fn decide(meta: RouteMeta, session: &SessionState, targets: &RouteTargets) -> Decision {
    if meta.auth && !session.is_authenticated() {
        return Decision::Redirect(targets.login.clone());
    }
    if meta.guest && session.is_authenticated() {
        return Decision::Redirect(targets.landing.clone());
    }
    if meta.admin && !session.is_admin() {
        return Decision::Redirect(targets.landing.clone());
    }
    Decision::Allow
}

/// Guarded navigation over the route table
#[derive(Clone)]
pub struct Router {
    table: RouteTable,
    auth: Arc<AuthStore>,
}

impl Router {
    #[must_use]
    pub fn new(auth: Arc<AuthStore>) -> Self {
        Self::with_table(RouteTable::default(), auth)
    }

    #[must_use]
    pub fn with_table(table: RouteTable, auth: Arc<AuthStore>) -> Self {
        Self { table, auth }
    }

    #[must_use]
    pub const fn table(&self) -> &RouteTable {
        &self.table
    }

    #[must_use]
    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    /// Decide whether `to` may be entered
    ///
    /// A persisted token without a loaded user triggers a profile fetch
    /// before the route flags are checked.
    pub async fn before_each(&self, to: &str) -> Decision {
        let session = self.auth.client().session();
        if self.auth.user().is_none() && session.tokens().has_access_token() {
            debug!(to, "Restoring session before navigation");
            self.auth.fetch_user().await;
        }

        let meta = self
            .table
            .resolve(to)
            .map(|found| found.route.meta)
            .unwrap_or_default();
        decide(meta, &self.auth.session(), session.routes())
    }

    /// Navigate to `to`, following guard redirects
    ///
    /// Returns the path that was finally committed to the navigator.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::RedirectLoop`] when redirects do not settle
    pub async fn push(&self, to: &str) -> Result<String, NavigationError> {
        let mut target = to.to_string();
        for _ in 0..=StoreConfig::MAX_REDIRECTS {
            match self.before_each(&target).await {
                Decision::Allow => {
                    self.auth.client().session().navigator().navigate(&target);
                    return Ok(target);
                }
                Decision::Redirect(next) => {
                    debug!(from = %target, to = %next, "Navigation redirected");
                    target = next;
                }
            }
        }

        warn!(path = to, "Navigation abandoned after repeated redirects");
        Err(NavigationError::RedirectLoop {
            path: to.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collab_core::{Role, User};

    fn user(role: Role) -> SessionState {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": 1,
            "email": "alice@example.com",
            "username": "alice",
            "role": role.as_str(),
            "created_at": "2024-05-01T10:00:00"
        }))
        .unwrap();
        SessionState::Authenticated(user)
    }

    #[test]
    fn test_anonymous_on_auth_route_goes_to_login() {
        let targets = RouteTargets::default();
        assert_eq!(
            decide(RouteMeta::AUTH, &SessionState::Anonymous, &targets),
            Decision::Redirect("/login".into())
        );
        assert_eq!(
            decide(RouteMeta::ADMIN, &SessionState::Anonymous, &targets),
            Decision::Redirect("/login".into())
        );
    }

    #[test]
    fn test_guest_route_when_signed_in_goes_to_landing() {
        assert_eq!(
            decide(RouteMeta::GUEST, &user(Role::Student), &RouteTargets::default()),
            Decision::Redirect("/dashboard".into())
        );
        assert_eq!(
            decide(RouteMeta::GUEST, &SessionState::Anonymous, &RouteTargets::default()),
            Decision::Allow
        );
    }

    #[test]
    fn test_admin_route_for_non_admin_goes_to_landing() {
        let targets = RouteTargets::default();
        for role in [Role::Student, Role::Company, Role::Committee] {
            assert_eq!(
                decide(RouteMeta::ADMIN, &user(role), &targets),
                Decision::Redirect("/dashboard".into())
            );
        }
        assert_eq!(decide(RouteMeta::ADMIN, &user(Role::Admin), &targets), Decision::Allow);
    }

    #[test]
    fn test_public_route_always_allowed() {
        assert_eq!(
            decide(RouteMeta::PUBLIC, &SessionState::Anonymous, &RouteTargets::default()),
            Decision::Allow
        );
    }
}
