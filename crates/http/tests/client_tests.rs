//! Integration tests for the Collab HTTP client

use collab_core::types::{FileKind, ProjectQuery};
use collab_core::{History, Navigator, Session, TokenPair, TokenStore};
use collab_http::{ApiClient, ClientError, FileUpload};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn user_json(role: &str) -> Value {
    json!({
        "id": 1,
        "email": "ann@example.com",
        "username": "ann",
        "role": role,
        "full_name": "Ann Example",
        "bio": null,
        "avatar_url": null,
        "is_active": true,
        "is_blocked": false,
        "skills": [],
        "created_at": "2024-01-01T00:00:00"
    })
}

/// Client against `server` with a stored pair and an inspectable history
fn setup(server: &MockServer, tokens: Option<(&str, &str)>) -> (ApiClient, Arc<History>) {
    let history = Arc::new(History::default());
    let session = Session::new(TokenStore::in_memory(), history.clone());
    if let Some((access, refresh)) = tokens {
        session
            .tokens()
            .store(&TokenPair::new(access, refresh))
            .unwrap();
    }
    let client = ApiClient::builder()
        .base_url(server.uri())
        .session(session)
        .build()
        .unwrap();
    (client, history)
}

fn requests_to(requests: &[Request], target: &str) -> usize {
    requests.iter().filter(|r| r.url.path() == target).count()
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = ApiClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_client_builder_joins_prefix() {
    let client = ApiClient::builder()
        .base_url("http://localhost:8080/")
        .api_prefix("api/v2/")
        .build()
        .unwrap();
    assert_eq!(client.api_url(), "http://localhost:8080/api/v2");
}

#[tokio::test]
async fn test_bearer_header_attached_from_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("student")))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = setup(&server, Some(("access-1", "refresh-1")));
    let user = client.me().await.unwrap();

    assert_eq!(user.username, "ann");
    server.verify().await;
}

#[tokio::test]
async fn test_anonymous_request_has_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/skills/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Rust", "category": "backend"}
        ])))
        .mount(&server)
        .await;

    let (client, _) = setup(&server, None);
    let skills = client.skills().await.unwrap();
    assert_eq!(skills.len(), 1);

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_retried_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("company")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({"refresh_token": "refresh-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "refresh_token": "refresh-2",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, history) = setup(&server, Some(("stale", "refresh-1")));
    let user = client.me().await.unwrap();

    assert_eq!(user.id, 1);
    let tokens = client.session().tokens();
    assert_eq!(tokens.access_token().as_deref(), Some("fresh"));
    assert_eq!(tokens.refresh_token().as_deref(), Some("refresh-2"));
    assert_eq!(history.current(), "/");
    server.verify().await;
}

#[tokio::test]
async fn test_second_unauthorized_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/applications/my"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "nope"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "refresh_token": "refresh-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = setup(&server, Some(("stale", "refresh-1")));
    let result = client.my_applications().await;

    assert!(matches!(result, Err(ClientError::AuthenticationFailed(ref m)) if m == "nope"));
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests_to(&requests, "/api/v1/applications/my"), 2);
    assert_eq!(
        requests
            .iter()
            .filter(|r| r.url.path() == "/api/v1/applications/my")
            .filter_map(|r| r.headers.get("authorization"))
            .map(|v| v.to_str().unwrap().to_string())
            .collect::<Vec<_>>(),
        vec!["Bearer stale", "Bearer fresh"]
    );
    server.verify().await;
}

#[tokio::test]
async fn test_missing_refresh_token_propagates_original_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/notifications/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let history = Arc::new(History::default());
    let session = Session::new(TokenStore::in_memory(), history.clone());
    let client = ApiClient::builder()
        .base_url(server.uri())
        .session(session)
        .build()
        .unwrap();

    let result = client.notifications(false).await;

    assert!(matches!(result, Err(ClientError::AuthenticationFailed(ref m)) if m == "Unauthorized"));
    assert_eq!(history.entries(), vec!["/"]);
    server.verify().await;
}

#[tokio::test]
async fn test_refresh_failure_expires_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "revoked"})))
        .expect(1)
        .mount(&server)
        .await;

    let (client, history) = setup(&server, Some(("stale", "revoked-refresh")));
    let result = client.me().await;

    assert!(matches!(result, Err(ClientError::AuthenticationFailed(ref m)) if m == "expired"));
    assert!(client.session().tokens().access_token().is_none());
    assert!(client.session().tokens().refresh_token().is_none());
    assert_eq!(history.current(), "/login");
    server.verify().await;
}

#[tokio::test]
async fn test_concurrent_unauthorized_share_one_refresh() {
    let server = MockServer::start().await;
    for target in ["/api/v1/auth/me", "/api/v1/chat/rooms"] {
        Mock::given(method("GET"))
            .and(path(target))
            .and(header("authorization", "Bearer stale"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("student")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chat/rooms"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "fresh", "refresh_token": "refresh-2"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = setup(&server, Some(("stale", "refresh-1")));
    let other = client.clone();

    let (me, rooms) = tokio::join!(client.me(), other.chat_rooms());

    assert_eq!(me.unwrap().username, "ann");
    assert!(rooms.unwrap().is_empty());
    server.verify().await;
}

#[tokio::test]
async fn test_application_errors_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/42"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Project not found"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (client, _) = setup(&server, Some(("access", "refresh")));
    let result = client.get_project(42).await;

    assert!(matches!(result, Err(ClientError::NotFound(ref m)) if m == "Project not found"));
    server.verify().await;
}

#[tokio::test]
async fn test_project_listing_sends_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects/"))
        .and(query_param("page", "2"))
        .and(query_param("search", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": 5,
                "title": "Compiler",
                "description": "Write a compiler",
                "owner_id": 1,
                "status": "open",
                "max_participants": 2,
                "deadline": null,
                "is_student_project": false,
                "required_skills": [],
                "attachments": [],
                "created_at": "2024-01-01T00:00:00",
                "updated_at": "2024-01-02T00:00:00Z"
            }],
            "total": 21,
            "page": 2,
            "size": 20
        })))
        .mount(&server)
        .await;

    let (client, _) = setup(&server, None);
    let page = client
        .list_projects(&ProjectQuery {
            page: Some(2),
            search: Some("rust".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total, 21);
    assert_eq!(page.items[0].title, "Compiler");
}

#[tokio::test]
async fn test_upload_is_rebuilt_for_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/files/project/3"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/files/project/3"))
        .and(query_param("file_type", "submission"))
        .and(header("authorization", "Bearer fresh"))
        .and(header_exists("content-type"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 9,
            "project_id": 3,
            "uploader_id": 1,
            "filename": "report.pdf",
            "object_name": "projects/3/report.pdf",
            "file_size": 5,
            "content_type": "application/pdf",
            "file_type": "submission",
            "download_url": null,
            "created_at": "2024-05-05T12:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "fresh", "refresh_token": "refresh-2"})),
        )
        .mount(&server)
        .await;

    let (client, _) = setup(&server, Some(("stale", "refresh-1")));
    let upload = FileUpload::new("report.pdf", b"%PDF-".to_vec()).content_type("application/pdf");
    let file = client
        .upload_project_file(3, FileKind::Submission, upload)
        .await
        .unwrap();

    assert_eq!(file.file_type, FileKind::Submission);
    let requests = server.received_requests().await.unwrap();
    let retried = requests
        .iter()
        .rev()
        .find(|r| r.url.path() == "/api/v1/files/project/3")
        .unwrap();
    assert!(String::from_utf8_lossy(&retried.body).contains("%PDF-"));
    server.verify().await;
}

#[tokio::test]
async fn test_logout_accepts_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .and(header("authorization", "Bearer access"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = setup(&server, Some(("access", "refresh")));
    client.logout().await.unwrap();
    server.verify().await;
}

#[tokio::test]
async fn test_abandoned_refresh_is_not_reused_for_a_new_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer stale-1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({"refresh_token": "old"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "from-old", "refresh_token": "old-2"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer stale-2"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({"refresh_token": "new"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "fresh", "refresh_token": "newer"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("student")))
        .expect(1)
        .mount(&server)
        .await;

    let (client, history) = setup(&server, Some(("stale-1", "old")));
    let cancelled = tokio::time::timeout(Duration::from_millis(100), client.me()).await;
    assert!(cancelled.is_err());

    // a new sign-in replaced the pair while the first refresh was abandoned
    client
        .session()
        .tokens()
        .store(&TokenPair::new("stale-2", "new"))
        .unwrap();
    let user = client.me().await.unwrap();

    assert_eq!(user.username, "ann");
    let tokens = client.session().tokens();
    assert_eq!(tokens.access_token().as_deref(), Some("fresh"));
    assert_eq!(tokens.refresh_token().as_deref(), Some("newer"));
    assert_eq!(history.entries(), vec!["/"]);
    server.verify().await;
}

#[tokio::test]
async fn test_download_returns_presigned_link() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/files/12/download"))
        .and(header("authorization", "Bearer access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "download_url": "http://minio:9000/project-files/projects/3/brief.pdf?X-Amz-Signature=abc",
            "filename": "brief.pdf"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = setup(&server, Some(("access", "refresh")));
    let download = client.download_file(12).await.unwrap();

    assert_eq!(download.filename, "brief.pdf");
    assert!(download.download_url.contains("X-Amz-Signature"));
    server.verify().await;
}

#[tokio::test]
async fn test_string_ids_are_path_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chat/rooms/a%2Fb%3Fc/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/notifications/x%20y%23z/read"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "x y#z",
            "title": "Application accepted",
            "message": null,
            "is_read": true,
            "link": null,
            "created_at": "2024-06-01T09:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = setup(&server, Some(("access", "refresh")));
    assert!(client.chat_messages("a/b?c").await.unwrap().is_empty());
    assert!(client.mark_notification_read("x y#z").await.unwrap().is_read);
    server.verify().await;
}
