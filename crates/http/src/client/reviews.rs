//! Review client methods

use super::{ApiClient, ApiRequest, ClientError};
use collab_core::types::{Review, ReviewCreate, UserRating};

impl ApiClient {
    /// Reviews received by a user, newest first
    pub async fn user_reviews(&self, user_id: i64) -> Result<Vec<Review>, ClientError> {
        self.execute(ApiRequest::get(format!("/reviews/user/{user_id}")))
            .await
    }

    pub async fn user_rating(&self, user_id: i64) -> Result<UserRating, ClientError> {
        self.execute(ApiRequest::get(format!("/reviews/user/{user_id}/rating")))
            .await
    }

    pub async fn create_review(&self, review: &ReviewCreate) -> Result<Review, ClientError> {
        self.execute(ApiRequest::post("/reviews/").json(review)?)
            .await
    }
}
