//! Authentication API client methods

use super::{ApiClient, ApiRequest, ClientError};
use collab_core::types::{LoginRequest, RefreshRequest, RegisterRequest, TokenPair, User};

impl ApiClient {
    /// Create an account; the response is the new user, not a session
    pub async fn register(&self, request: &RegisterRequest) -> Result<User, ClientError> {
        self.execute(ApiRequest::post("/auth/register").json(request)?)
            .await
    }

    /// Exchange credentials for a token pair
    pub async fn login(&self, request: &LoginRequest) -> Result<TokenPair, ClientError> {
        self.execute(ApiRequest::post("/auth/login").json(request)?)
            .await
    }

    /// Current user profile
    pub async fn me(&self) -> Result<User, ClientError> {
        self.execute(ApiRequest::get("/auth/me")).await
    }

    /// Exchange a refresh token for a new pair
    ///
    /// This goes through the interceptors like any other call; the internal
    /// recovery path uses a separate, unintercepted request.
    pub async fn refresh(&self, refresh_token: impl Into<String>) -> Result<TokenPair, ClientError> {
        let body = RefreshRequest {
            refresh_token: refresh_token.into(),
        };
        self.execute(ApiRequest::post("/auth/refresh").json(&body)?)
            .await
    }

    /// Revoke the current access token server-side
    pub async fn logout(&self) -> Result<(), ClientError> {
        self.execute_empty(ApiRequest::post("/auth/logout")).await
    }
}
