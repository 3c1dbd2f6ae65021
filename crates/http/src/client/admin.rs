//! Administration client methods (admin role only)

use super::{ApiClient, ApiRequest, ClientError};
use collab_core::types::{AdminStats, AdminUserUpdate, User};

impl ApiClient {
    pub async fn admin_stats(&self) -> Result<AdminStats, ClientError> {
        self.execute(ApiRequest::get("/admin/stats")).await
    }

    /// Users ordered by the server, `limit` at most 100
    pub async fn admin_users(&self, skip: u32, limit: u32) -> Result<Vec<User>, ClientError> {
        let request = ApiRequest::get("/admin/users")
            .param("skip", skip)
            .param("limit", limit);
        self.execute(request).await
    }

    pub async fn admin_update_user(
        &self,
        user_id: i64,
        update: &AdminUserUpdate,
    ) -> Result<User, ClientError> {
        self.execute(ApiRequest::put(format!("/admin/users/{user_id}")).json(update)?)
            .await
    }
}
