//! Chat client methods and websocket endpoint construction

use super::{ApiClient, ApiRequest, ClientError};
use collab_core::types::{ChatMessage, ChatRoom, SendMessage};
use url::Url;
use urlencoding::encode;

impl ApiClient {
    /// Open (or reuse) the room between the current user and another
    /// participant of a project
    pub async fn open_chat_room(
        &self,
        project_id: i64,
        other_user_id: i64,
    ) -> Result<ChatRoom, ClientError> {
        self.execute(ApiRequest::post(format!(
            "/chat/rooms/{project_id}/{other_user_id}"
        )))
        .await
    }

    pub async fn chat_rooms(&self) -> Result<Vec<ChatRoom>, ClientError> {
        self.execute(ApiRequest::get("/chat/rooms")).await
    }

    pub async fn chat_messages(&self, room_id: &str) -> Result<Vec<ChatMessage>, ClientError> {
        self.execute(ApiRequest::get(format!(
            "/chat/rooms/{}/messages",
            encode(room_id)
        )))
        .await
    }

    pub async fn send_chat_message(
        &self,
        room_id: &str,
        content: impl Into<String>,
    ) -> Result<ChatMessage, ClientError> {
        let body = SendMessage {
            content: content.into(),
        };
        let request =
            ApiRequest::post(format!("/chat/rooms/{}/messages", encode(room_id))).json(&body)?;
        self.execute(request).await
    }

    /// Websocket endpoint for a chat room
    ///
    /// The scheme follows the page origin (`wss` behind `https`), the port is
    /// the fixed chat backend port and the stored access token travels as the
    /// `token` query parameter.
    pub fn chat_socket_url(&self, room_id: &str) -> Result<Url, ClientError> {
        let token = self
            .session
            .tokens()
            .access_token()
            .ok_or(ClientError::MissingToken)?;
        let scheme = if self.origin.scheme() == "https" {
            "wss"
        } else {
            "ws"
        };
        let host = self
            .origin
            .host_str()
            .ok_or_else(|| ClientError::Configuration("base_url has no host".into()))?;

        let mut url = Url::parse(&format!("{scheme}://{host}:{}", self.chat_port))
            .map_err(|e| ClientError::Configuration(format!("invalid chat endpoint: {e}")))?;
        url.set_path(&format!(
            "{}/chat/ws/{}",
            self.api_prefix.trim_end_matches('/'),
            encode(room_id)
        ));
        url.query_pairs_mut().append_pair("token", &token);
        Ok(url)
    }
}
