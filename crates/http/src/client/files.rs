//! Project file client methods

use super::{ApiClient, ApiRequest, ClientError, FileUpload};
use collab_core::types::{FileDownload, FileKind, ProjectFile};

impl ApiClient {
    /// Upload a file to a project as multipart form data
    pub async fn upload_project_file(
        &self,
        project_id: i64,
        kind: FileKind,
        upload: FileUpload,
    ) -> Result<ProjectFile, ClientError> {
        let request = ApiRequest::post(format!("/files/project/{project_id}"))
            .param("file_type", kind.as_str())
            .multipart(upload);
        self.execute(request).await
    }

    pub async fn project_files(&self, project_id: i64) -> Result<Vec<ProjectFile>, ClientError> {
        self.execute(ApiRequest::get(format!("/files/project/{project_id}")))
            .await
    }

    /// Short-lived presigned link to the file contents
    pub async fn download_file(&self, file_id: i64) -> Result<FileDownload, ClientError> {
        self.execute(ApiRequest::get(format!("/files/{file_id}/download")))
            .await
    }

    pub async fn delete_file(&self, file_id: i64) -> Result<(), ClientError> {
        self.execute_empty(ApiRequest::delete(format!("/files/{file_id}")))
            .await
    }
}
