//! Collab client core types and session context

pub mod config;
pub mod error;
pub mod navigation;
pub mod session;
pub mod state_dir;
pub mod storage;
pub mod types;

pub use config::{ApiConfig, ClientConfig};
pub use error::{CoreError, CoreResult};
pub use navigation::{History, Navigator, RouteTargets};
pub use session::Session;
pub use state_dir::StateDir;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, TokenStore};
pub use types::{Role, TokenPair, User};
