//! Skill catalogue client methods

use super::{ApiClient, ApiRequest, ClientError};
use collab_core::types::{Skill, SkillCreate};

impl ApiClient {
    pub async fn skills(&self) -> Result<Vec<Skill>, ClientError> {
        self.execute(ApiRequest::get("/skills/")).await
    }

    pub async fn create_skill(&self, skill: &SkillCreate) -> Result<Skill, ClientError> {
        self.execute(ApiRequest::post("/skills/").json(skill)?)
            .await
    }
}
