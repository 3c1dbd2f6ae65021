//! Project application client methods

use super::{ApiClient, ApiRequest, ClientError};
use collab_core::types::{Application, ApplicationCreate, ApplicationStatusUpdate};

impl ApiClient {
    /// Apply to a project as the current user
    pub async fn apply(&self, application: &ApplicationCreate) -> Result<Application, ClientError> {
        self.execute(ApiRequest::post("/applications/").json(application)?)
            .await
    }

    /// Move an application through its workflow
    pub async fn update_application_status(
        &self,
        application_id: i64,
        update: &ApplicationStatusUpdate,
    ) -> Result<Application, ClientError> {
        self.execute(
            ApiRequest::put(format!("/applications/{application_id}/status")).json(update)?,
        )
        .await
    }

    pub async fn project_applications(&self, project_id: i64) -> Result<Vec<Application>, ClientError> {
        self.execute(ApiRequest::get(format!("/applications/project/{project_id}")))
            .await
    }

    pub async fn my_applications(&self) -> Result<Vec<Application>, ClientError> {
        self.execute(ApiRequest::get("/applications/my")).await
    }
}
