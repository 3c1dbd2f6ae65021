//! Notification client methods

use super::{ApiClient, ApiRequest, ClientError};
use collab_core::types::{Notification, UnreadCount};
use urlencoding::encode;

impl ApiClient {
    /// First page of notifications, optionally only unread ones
    pub async fn notifications(&self, unread_only: bool) -> Result<Vec<Notification>, ClientError> {
        self.execute(ApiRequest::get("/notifications/").param("unread_only", unread_only))
            .await
    }

    pub async fn notifications_page(
        &self,
        unread_only: bool,
        page: u32,
        size: u32,
    ) -> Result<Vec<Notification>, ClientError> {
        let request = ApiRequest::get("/notifications/")
            .param("unread_only", unread_only)
            .param("page", page)
            .param("size", size);
        self.execute(request).await
    }

    pub async fn unread_count(&self) -> Result<UnreadCount, ClientError> {
        self.execute(ApiRequest::get("/notifications/unread-count"))
            .await
    }

    pub async fn mark_notification_read(
        &self,
        notification_id: &str,
    ) -> Result<Notification, ClientError> {
        self.execute(ApiRequest::put(format!(
            "/notifications/{}/read",
            encode(notification_id)
        )))
        .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<(), ClientError> {
        self.execute_empty(ApiRequest::post("/notifications/read-all"))
            .await
    }
}
