//! Authentication module

pub mod context;
pub mod store;

// Re-export commonly used items
pub use context::{AuthAction, AuthState, SessionState};
pub use store::{AuthStore, LogoutMode};
