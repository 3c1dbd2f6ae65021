//! Session orchestration: login, registration, logout and restore

use super::context::{AuthAction, AuthState, SessionState};
use collab_core::types::{LoginRequest, RegisterRequest};
use collab_core::{Session, User};
use collab_http::{ApiClient, ClientError};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// How much of a logout reaches the server
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogoutMode {
    /// Revoke the token server-side first, ignoring any failure
    #[default]
    Server,
    /// Only forget the local session
    LocalOnly,
}

/// Owner of the current user and the API calls that change it
///
/// State changes are published on a watch channel so routers and views can
/// react without polling. A forced expiry of the session, such as a failed
/// token refresh, signs the store out as well.
pub struct AuthStore {
    client: ApiClient,
    state: Arc<watch::Sender<AuthState>>,
}

impl AuthStore {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let state = Arc::new(watch::channel(AuthState::default()).0);

        let observed = Arc::downgrade(&state);
        client.session().on_expire(move || {
            let Some(state) = observed.upgrade() else {
                return false;
            };
            info!("Session expired, signing out");
            state.send_modify(|current| current.reduce(AuthAction::Logout));
            true
        });

        Self { client, state }
    }

    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    fn session_context(&self) -> &Session {
        self.client.session()
    }

    fn dispatch(&self, action: AuthAction) {
        debug!(?action, "Auth action");
        self.state.send_modify(|state| state.reduce(action));
    }

    /// Receive every subsequent state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn session(&self) -> SessionState {
        self.state.borrow().session.clone()
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.state.borrow().session.user().cloned()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().session.is_authenticated()
    }

    #[must_use]
    pub fn is_student(&self) -> bool {
        self.state.borrow().session.is_student()
    }

    #[must_use]
    pub fn is_company(&self) -> bool {
        self.state.borrow().session.is_company()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state.borrow().session.is_admin()
    }

    #[must_use]
    pub fn is_committee(&self) -> bool {
        self.state.borrow().session.is_committee()
    }

    /// Restore the user from the persisted access token
    ///
    /// Does nothing without a stored token. Any failure, including a 401 the
    /// client could not recover from, signs out locally and moves to the
    /// login route.
    pub async fn fetch_user(&self) {
        if !self.session_context().tokens().has_access_token() {
            return;
        }

        self.dispatch(AuthAction::SetLoading(true));
        match self.client.me().await {
            Ok(user) => {
                info!(user_id = user.id, role = %user.role, "Session restored");
                self.dispatch(AuthAction::Login(user));
            }
            Err(e) => {
                info!("Session could not be restored: {e}");
                self.end_session();
            }
        }
    }

    /// Sign in, load the profile and move to the landing route
    ///
    /// # Errors
    ///
    /// Returns the error of the login call untouched, or a storage error when
    /// the tokens cannot be persisted. The profile fetch never fails the login.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<(), ClientError> {
        let pair = self.client.login(credentials).await?;
        self.session_context().tokens().store(&pair)?;
        self.fetch_user().await;

        let session = self.session_context();
        session.navigator().navigate(&session.routes().landing);
        Ok(())
    }

    /// Create the account and sign in with the same credentials
    ///
    /// # Errors
    ///
    /// Returns the error of the registration or the follow-up login
    pub async fn register(&self, payload: &RegisterRequest) -> Result<(), ClientError> {
        let user = self.client.register(payload).await?;
        info!(user_id = user.id, "Account registered");
        self.login(&payload.credentials()).await
    }

    /// End the session and move to the login route
    ///
    /// Local state is cleared whatever the server says.
    pub async fn logout(&self, mode: LogoutMode) {
        if mode == LogoutMode::Server {
            if let Err(e) = self.client.logout().await {
                debug!("Server-side logout failed, continuing: {e}");
            }
        }

        self.end_session();
        info!("Signed out");
    }

    fn end_session(&self) {
        self.dispatch(AuthAction::Logout);
        let session = self.session_context();
        session.discard_tokens();
        session.navigator().navigate(&session.routes().login);
    }
}
