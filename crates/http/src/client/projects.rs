//! Project client methods

use super::{ApiClient, ApiRequest, ClientError};
use collab_core::types::{Project, ProjectCreate, ProjectPage, ProjectQuery, ProjectUpdate};

impl ApiClient {
    /// Page through projects matching `query`
    pub async fn list_projects(&self, query: &ProjectQuery) -> Result<ProjectPage, ClientError> {
        self.execute(ApiRequest::get("/projects/").query(query)?)
            .await
    }

    pub async fn get_project(&self, project_id: i64) -> Result<Project, ClientError> {
        self.execute(ApiRequest::get(format!("/projects/{project_id}")))
            .await
    }

    pub async fn create_project(&self, project: &ProjectCreate) -> Result<Project, ClientError> {
        self.execute(ApiRequest::post("/projects/").json(project)?)
            .await
    }

    pub async fn update_project(
        &self,
        project_id: i64,
        update: &ProjectUpdate,
    ) -> Result<Project, ClientError> {
        self.execute(ApiRequest::put(format!("/projects/{project_id}")).json(update)?)
            .await
    }

    pub async fn delete_project(&self, project_id: i64) -> Result<(), ClientError> {
        self.execute_empty(ApiRequest::delete(format!("/projects/{project_id}")))
            .await
    }
}
