//! Request descriptors that can be re-sent after a token refresh

use super::ClientError;
use bytes::Bytes;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

/// Number of times one request may go out: the original plus one retry
pub const MAX_ATTEMPTS: u8 = 2;

/// File contents for a multipart upload
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl FileUpload {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    fn to_form(&self) -> Result<Form, ClientError> {
        let mut part = Part::bytes(self.bytes.to_vec()).file_name(self.file_name.clone());
        if let Some(content_type) = &self.content_type {
            part = part.mime_str(content_type)?;
        }
        Ok(Form::new().part("file", part))
    }
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(FileUpload),
}

/// Everything needed to build an outbound API call
///
/// Unlike `reqwest::RequestBuilder` this can be rebuilt any number of times,
/// which the refresh-and-retry path relies on.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: RequestBody,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Attach a JSON body
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be serialized
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = RequestBody::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach a multipart body with a single `file` field
    #[must_use]
    pub fn multipart(mut self, upload: FileUpload) -> Self {
        self.body = RequestBody::Multipart(upload);
        self
    }

    /// Append one query parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append the fields of a serializable struct as query parameters
    ///
    /// `null` fields are skipped; nested values are rejected.
    ///
    /// # Errors
    ///
    /// Returns an error if `params` is not a flat object
    pub fn query<T: Serialize>(mut self, params: &T) -> Result<Self, ClientError> {
        let Value::Object(fields) = serde_json::to_value(params)? else {
            return Err(ClientError::Configuration(
                "query parameters must serialize to an object".into(),
            ));
        };
        for (key, value) in fields {
            let value = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Bool(_) | Value::Number(_) => value.to_string(),
                other => {
                    return Err(ClientError::Configuration(format!(
                        "query parameter {key} is not a scalar: {other}"
                    )));
                }
            };
            self.query.push((key, value));
        }
        Ok(self)
    }

    pub(crate) fn apply(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ClientError> {
        let builder = if self.query.is_empty() {
            builder
        } else {
            builder.query(&self.query)
        };
        Ok(match &self.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(upload) => builder.multipart(upload.to_form()?),
        })
    }
}

/// A request paired with its attempt number
///
/// Only [`Dispatch::retry`] produces a later attempt, and it refuses once
/// [`MAX_ATTEMPTS`] is reached, so a request can never loop on 401s.
#[derive(Debug)]
pub(crate) struct Dispatch {
    request: ApiRequest,
    attempt: u8,
    bearer: Option<String>,
}

impl Dispatch {
    pub(crate) fn new(request: ApiRequest) -> Self {
        Self {
            request,
            attempt: 1,
            bearer: None,
        }
    }

    pub(crate) fn request(&self) -> &ApiRequest {
        &self.request
    }

    pub(crate) fn attempt(&self) -> u8 {
        self.attempt
    }

    /// Token to send instead of the stored one
    pub(crate) fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    pub(crate) fn can_retry(&self) -> bool {
        self.attempt < MAX_ATTEMPTS
    }

    /// Next attempt carrying a fresh access token, or `None` when exhausted
    pub(crate) fn retry(self, access_token: String) -> Option<Self> {
        if !self.can_retry() {
            return None;
        }
        Some(Self {
            request: self.request,
            attempt: self.attempt + 1,
            bearer: Some(access_token),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collab_core::types::{ProjectQuery, ProjectStatus};

    #[test]
    fn test_dispatch_allows_single_retry() {
        let dispatch = Dispatch::new(ApiRequest::get("/auth/me"));
        assert!(dispatch.can_retry());
        assert_eq!(dispatch.bearer(), None);

        let retried = dispatch.retry("fresh".into()).unwrap();
        assert_eq!(retried.attempt(), 2);
        assert_eq!(retried.bearer(), Some("fresh"));
        assert!(!retried.can_retry());
        assert!(retried.retry("again".into()).is_none());
    }

    #[test]
    fn test_query_from_struct() {
        let request = ApiRequest::get("/projects/")
            .query(&ProjectQuery {
                page: Some(3),
                status: Some(ProjectStatus::Open),
                search: Some("rust api".into()),
                ..Default::default()
            })
            .unwrap();

        let mut query = request.query.clone();
        query.sort();
        assert_eq!(
            query,
            vec![
                ("page".to_string(), "3".to_string()),
                ("search".to_string(), "rust api".to_string()),
                ("status".to_string(), "open".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_rejects_non_object() {
        assert!(matches!(
            ApiRequest::get("/x").query(&vec![1, 2]),
            Err(ClientError::Configuration(_))
        ));
    }
}
