//! Client-side stores and navigation for the collaboration platform
//!
//! [`auth::AuthStore`] owns the signed-in user, [`toast::ToastStore`] holds
//! transient messages and [`router::Router`] guards navigation using both the
//! route table and the current session.

pub mod auth;
pub mod config;
pub mod router;
pub mod toast;

pub use auth::{AuthAction, AuthState, AuthStore, LogoutMode, SessionState};
pub use config::StoreConfig;
pub use router::{Decision, NavigationError, Router, RouteTable, View};
pub use toast::{Toast, ToastKind, ToastStore};
