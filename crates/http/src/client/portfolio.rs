//! Portfolio client methods

use super::{ApiClient, ApiRequest, ClientError};
use collab_core::types::{PortfolioItem, PortfolioItemCreate};

impl ApiClient {
    pub async fn user_portfolio(&self, user_id: i64) -> Result<Vec<PortfolioItem>, ClientError> {
        self.execute(ApiRequest::get(format!("/portfolio/user/{user_id}")))
            .await
    }

    pub async fn add_portfolio_item(
        &self,
        item: &PortfolioItemCreate,
    ) -> Result<PortfolioItem, ClientError> {
        self.execute(ApiRequest::post("/portfolio/").json(item)?)
            .await
    }

    pub async fn delete_portfolio_item(&self, item_id: i64) -> Result<(), ClientError> {
        self.execute_empty(ApiRequest::delete(format!("/portfolio/{item_id}")))
            .await
    }
}
