//! Collab platform HTTP client
//!
//! Every call goes through [`ApiClient::send`], which plays the role of the
//! request/response interceptor pair: the stored access token is attached as
//! a bearer header, and a 401 triggers one refresh-and-retry before the error
//! is handed back to the caller.

pub mod admin;
pub mod applications;
pub mod auth;
pub mod chat;
pub mod error;
pub mod files;
pub mod notifications;
pub mod portfolio;
pub mod projects;
pub mod request;
pub mod reviews;
pub mod skills;
pub mod users;

mod refresh;

use collab_core::{ApiConfig, Session};
use error::ClientError;
use refresh::RefreshCoordinator;
use request::Dispatch;
pub use request::{ApiRequest, FileUpload};
use reqwest::{Client, ClientBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default prefix of the versioned REST API
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Default backend port for the chat websocket
pub const DEFAULT_CHAT_PORT: u16 = 8000;

/// Collab API client
///
/// Cheap to clone; clones share the session and the refresh coordinator.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    origin: Url,
    api_prefix: String,
    api_url: String,
    chat_port: u16,
    session: Session,
    refresh: Arc<RefreshCoordinator>,
}

impl ApiClient {
    /// Create a new client with default configuration and in-memory session
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    #[must_use]
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Build a client from loaded configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL is invalid or the HTTP client cannot be built
    pub fn from_config(config: &ApiConfig, session: Session) -> Result<Self, ClientError> {
        let mut builder = Self::builder()
            .base_url(&config.base_url)
            .api_prefix(&config.api_prefix)
            .chat_port(config.chat_port)
            .user_agent(&config.user_agent)
            .session(session);
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        builder.build()
    }

    /// Base URL including the API prefix
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Send a request through the auth interceptors
    ///
    /// Returns the response on any 2xx status. A 401 is recovered at most
    /// once: with a stored refresh token the pair is refreshed (shared with
    /// any concurrent refresh) and the request re-sent with the new access
    /// token. Every other failure, including a second 401, is returned as is.
    ///
    /// # Errors
    ///
    /// Returns the transport error or the non-success response mapped to `ClientError`
    pub async fn send(&self, request: ApiRequest) -> Result<Response, ClientError> {
        let mut dispatch = Dispatch::new(request);
        loop {
            let (sent_token, response) = self.dispatch(&dispatch).await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let error = error_from_response(response).await;
            if status != StatusCode::UNAUTHORIZED || !dispatch.can_retry() {
                return Err(error);
            }

            let Some(access_token) = self.recover(sent_token.as_deref()).await else {
                return Err(error);
            };
            dispatch = match dispatch.retry(access_token) {
                Some(next) => next,
                None => return Err(error),
            };
        }
    }

    /// Request phase: build the call and attach the bearer token if any
    async fn dispatch(&self, dispatch: &Dispatch) -> Result<(Option<String>, Response), ClientError> {
        let request = dispatch.request();
        let token = dispatch
            .bearer()
            .map(str::to_owned)
            .or_else(|| self.session.tokens().access_token());

        let mut builder = self
            .client
            .request(request.method().clone(), self.url(request.path()));
        if let Some(token) = &token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let builder = request.apply(builder)?;

        debug!(
            method = %request.method(),
            path = request.path(),
            attempt = dispatch.attempt(),
            authenticated = token.is_some(),
            "Sending API request"
        );
        let response = builder.send().await?;
        Ok((token, response))
    }

    /// Response phase for a 401: find a token worth retrying with
    async fn recover(&self, rejected: Option<&str>) -> Option<String> {
        let tokens = self.session.tokens();

        // Another request refreshed while this one was in flight
        if let Some(current) = tokens.access_token() {
            if rejected != Some(current.as_str()) {
                debug!("Retrying with an access token refreshed concurrently");
                return Some(current);
            }
        }

        let refresh_token = tokens.refresh_token()?;
        self.refresh
            .refresh(
                &self.client,
                &self.url("/auth/refresh"),
                &self.session,
                refresh_token,
            )
            .await
            .ok()
            .map(|pair| pair.access_token)
    }

    /// Execute a request and decode the JSON body
    ///
    /// # Errors
    ///
    /// Fails like [`ApiClient::send`], or when the body is not the expected JSON
    pub async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ClientError> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    /// Execute a request whose response carries no body
    ///
    /// # Errors
    ///
    /// Fails like [`ApiClient::send`]
    pub async fn execute_empty(&self, request: ApiRequest) -> Result<(), ClientError> {
        self.send(request).await?;
        Ok(())
    }
}

/// Turn a non-success response into a [`ClientError`]
///
/// The API reports failures as `{"detail": ...}`; the detail is used as the
/// message when present.
async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| match value.get("detail") {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            Some(other) => Some(other.to_string()),
            None => None,
        })
        .or_else(|| (!body.is_empty()).then_some(body))
        .unwrap_or_else(|| status.to_string());
    ClientError::from_status(status, message)
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    api_prefix: Option<String>,
    chat_port: Option<u16>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    session: Option<Session>,
}

impl ApiClientBuilder {
    /// Set the page origin the API is served from
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn chat_port(mut self, port: u16) -> Self {
        self.chat_port = Some(port);
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Share token storage and navigation with other components
    #[must_use]
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let origin = Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url {base_url}: {e}")))?;

        let api_prefix = self
            .api_prefix
            .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string());
        let api_prefix = format!("/{}", api_prefix.trim_matches('/'));
        let api_url = format!("{base_url}{api_prefix}")
            .trim_end_matches('/')
            .to_string();

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let mut client_builder = ClientBuilder::new().default_headers(headers);
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        client_builder = client_builder.user_agent(
            self.user_agent
                .unwrap_or_else(|| concat!("collab-client/", env!("CARGO_PKG_VERSION")).to_string()),
        );

        Ok(ApiClient {
            client: client_builder.build()?,
            origin,
            api_prefix,
            api_url,
            chat_port: self.chat_port.unwrap_or(DEFAULT_CHAT_PORT),
            session: self.session.unwrap_or_else(Session::in_memory),
            refresh: Arc::new(RefreshCoordinator::default()),
        })
    }
}
