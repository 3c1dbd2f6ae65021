//! Client configuration

use crate::error::{CoreError, CoreResult};
use crate::navigation::RouteTargets;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Main client configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Platform API settings
    pub api: ApiConfig,

    /// Redirect targets used by the session layer
    pub routes: RouteTargets,
}

/// Platform API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Origin of the web application, e.g. `https://collab.example.com`
    pub base_url: String,

    /// Prefix of the versioned REST API
    pub api_prefix: String,

    /// Backend port the chat websocket listens on
    pub chat_port: u16,

    /// Request timeout in seconds (0 disables the timeout)
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_prefix: "/api/v1".to_string(),
            chat_port: 8000,
            timeout_secs: 30,
            user_agent: concat!("collab-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ApiConfig {
    /// Base URL plus API prefix, without a trailing slash
    #[must_use]
    pub fn api_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.api_prefix.trim_matches('/')
        )
        .trim_end_matches('/')
        .to_string()
    }

    /// Parsed page origin
    ///
    /// # Errors
    ///
    /// Returns an error if `origin` is not an absolute URL
    pub fn origin(&self) -> CoreResult<Url> {
        Ok(Url::parse(&self.base_url)?)
    }
}

impl ClientConfig {
    /// Load configuration from file, then environment overrides
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        Self::load(Some(path.as_ref()))
    }

    /// Load configuration with defaults and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables cannot be parsed
    pub fn from_env() -> CoreResult<Self> {
        Self::load(None)
    }

    /// Defaults, then the optional file, then `COLLAB__SECTION__KEY` variables
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or a value fails validation
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.api_prefix", defaults.api.api_prefix)?
            .set_default("api.chat_port", i64::from(defaults.api.chat_port))?
            .set_default("api.timeout_secs", defaults.api.timeout_secs)?
            .set_default("api.user_agent", defaults.api.user_agent)?
            .set_default("routes.login", defaults.routes.login)?
            .set_default("routes.landing", defaults.routes.landing)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("COLLAB").separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise fail at first use
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid value
    pub fn validate(&self) -> CoreResult<()> {
        let origin = self.api.origin()?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(CoreError::invalid_config(format!(
                "base_url must be http or https, got {}",
                origin.scheme()
            )));
        }
        if !self.routes.login.starts_with('/') || !self.routes.landing.starts_with('/') {
            return Err(CoreError::invalid_config("routes must be absolute paths"));
        }
        Ok(())
    }
}
