//! Collab HTTP client
//!
//! Typed access to the platform REST API with bearer authentication and
//! transparent one-shot token refresh.

pub mod client;

pub use client::error::{ClientError, RefreshFailure};
pub use client::{ApiClient, ApiClientBuilder, ApiRequest, FileUpload};
