//! User profile client methods

use super::{ApiClient, ApiRequest, ClientError};
use collab_core::types::{User, UserUpdate};

impl ApiClient {
    pub async fn get_user(&self, user_id: i64) -> Result<User, ClientError> {
        self.execute(ApiRequest::get(format!("/users/{user_id}")))
            .await
    }

    pub async fn update_user(&self, user_id: i64, update: &UserUpdate) -> Result<User, ClientError> {
        self.execute(ApiRequest::put(format!("/users/{user_id}")).json(update)?)
            .await
    }

    pub async fn add_user_skill(&self, user_id: i64, skill_id: i64) -> Result<(), ClientError> {
        self.execute_empty(ApiRequest::post(format!(
            "/users/{user_id}/skills/{skill_id}"
        )))
        .await
    }

    pub async fn remove_user_skill(&self, user_id: i64, skill_id: i64) -> Result<(), ClientError> {
        self.execute_empty(ApiRequest::delete(format!(
            "/users/{user_id}/skills/{skill_id}"
        )))
        .await
    }
}
