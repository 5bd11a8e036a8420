//! HTTP-level tests driving the router against the in-memory store.

use api_lib::config::Config;
use api_lib::web::{self, auth::Claims, state::AppState};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use summary_core::domain::{Document, NewDocument, Summary, SummaryKind, User};
use summary_core::memory::MemoryStore;
use summary_core::ports::{DatabaseService, PortError, PortResult};
use tower::ServiceExt;

const SECRET: &str = "test-secret";

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
}

fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("memory://".to_string()),
        "AUTH_JWT_SECRET" => Some(SECRET.to_string()),
        _ => None,
    })
    .unwrap()
}

fn app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(&test_config(), store.clone(), store.clone()));
    TestApp {
        router: web::router(state),
        store,
    }
}

const STORE_FAILURE: &str = "connection refused by 10.0.0.7:5432";

/// A database that fails every call, for checking that details stay server-side.
struct BrokenDatabase;

#[async_trait]
impl DatabaseService for BrokenDatabase {
    async fn find_user_by_external_id(&self, _external_id: &str) -> PortResult<Option<User>> {
        Err(PortError::Unexpected(STORE_FAILURE.to_string()))
    }
    async fn get_or_create_user(&self, _external_id: &str) -> PortResult<User> {
        Err(PortError::Unexpected(STORE_FAILURE.to_string()))
    }
    async fn find_document(&self, _document_id: i32) -> PortResult<Option<Document>> {
        Err(PortError::Unexpected(STORE_FAILURE.to_string()))
    }
    async fn list_documents_for_user(&self, _user_id: i32) -> PortResult<Vec<Document>> {
        Err(PortError::Unexpected(STORE_FAILURE.to_string()))
    }
    async fn create_document(&self, _document: NewDocument) -> PortResult<Document> {
        Err(PortError::Unexpected(STORE_FAILURE.to_string()))
    }
    async fn delete_document(&self, _document_id: i32) -> PortResult<bool> {
        Err(PortError::Unexpected(STORE_FAILURE.to_string()))
    }
    async fn list_summaries(&self, _document_id: i32) -> PortResult<Vec<Summary>> {
        Err(PortError::Unexpected(STORE_FAILURE.to_string()))
    }
}

fn broken_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(&test_config(), Arc::new(BrokenDatabase), store.clone()));
    TestApp {
        router: web::router(state),
        store,
    }
}

fn token(subject: &str) -> String {
    let claims = Claims {
        sub: subject.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

impl TestApp {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        subject: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, axum::http::HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(subject) = subject {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(subject)));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.dispatch(request).await
    }

    /// Sends `body` verbatim, with an optional content type.
    async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        subject: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, axum::http::HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(subject) = subject {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(subject)));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, headers, value)
    }

    /// Uploads a document as `subject` and returns its id.
    async fn upload(&self, subject: &str, title: &str, file_name: &str) -> i64 {
        let (status, _, body) = self
            .send(
                Method::POST,
                "/api/summaries",
                Some(subject),
                Some(json!({
                    "title": title,
                    "fileName": file_name,
                    "fileUrl": format!("https://files.example/{}", file_name),
                    "fileKey": format!("uploads/{}", file_name),
                    "fileSize": 4096,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["documentId"].as_i64().unwrap()
    }
}

#[tokio::test]
async fn upload_then_fetch_document() {
    let app = app();
    let id = app.upload("user_alice", "", "report.v2.pdf").await;

    let (status, _, body) = app
        .send(Method::GET, &format!("/api/documents/{}", id), Some("user_alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "report.v2");
    assert_eq!(body["fileName"], "report.v2.pdf");
    assert_eq!(body["fileSize"], 4096);
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn upload_response_points_at_viewer() {
    let app = app();
    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/summaries",
            Some("user_alice"),
            Some(json!({
                "fileName": "thesis.pdf",
                "fileUrl": "https://files.example/thesis.pdf",
                "fileKey": "uploads/thesis.pdf",
                "fileSize": 10,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    let id = body["documentId"].as_i64().unwrap();
    assert_eq!(body["redirectTo"], format!("/summaries/{}", id));
}

#[tokio::test]
async fn anonymous_requests_are_unauthorized() {
    let app = app();
    for (method, uri) in [
        (Method::GET, "/api/documents/1"),
        (Method::DELETE, "/api/documents/1"),
        (Method::GET, "/api/documents/not-a-number"),
        (Method::GET, "/api/summaries"),
        (Method::GET, "/api/library"),
    ] {
        let (status, _, body) = app.send(method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"], "Unauthorized");
    }
}

#[tokio::test]
async fn forged_token_is_unauthorized() {
    let app = app();
    let request = Request::builder()
        .uri("/api/documents/1")
        .header(header::AUTHORIZATION, "Bearer not.a.jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn session_cookie_is_accepted() {
    let app = app();
    let id = app.upload("user_alice", "Cookie doc", "c.pdf").await;
    let request = Request::builder()
        .uri(format!("/api/documents/{}", id))
        .header(
            header::COOKIE,
            format!("theme=dark; __session={}", token("user_alice")),
        )
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn non_numeric_identifier_is_bad_request() {
    let app = app();
    app.upload("user_alice", "Doc", "doc.pdf").await;
    let before = app.store.lookups();
    for method in [Method::GET, Method::DELETE] {
        let (status, _, body) = app
            .send(method, "/api/documents/abc", Some("user_alice"), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid document ID");
    }
    assert_eq!(app.store.lookups(), before);
}

#[tokio::test]
async fn unknown_user_and_document_are_not_found() {
    let app = app();
    app.upload("user_alice", "Doc", "doc.pdf").await;

    let (status, _, body) = app
        .send(Method::GET, "/api/documents/1", Some("user_nobody"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "User not found");

    let (status, _, body) = app
        .send(Method::GET, "/api/documents/999", Some("user_alice"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Document not found");
}

#[tokio::test]
async fn foreign_document_is_forbidden_and_survives_delete() {
    let app = app();
    let id = app.upload("user_alice", "Private", "private.pdf").await;
    app.upload("user_mallory", "Mine", "mine.pdf").await;

    let uri = format!("/api/documents/{}", id);
    let (status, _, body) = app.send(Method::GET, &uri, Some("user_mallory"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.get("title").is_none());

    let (status, _, _) = app
        .send(Method::DELETE, &uri, Some("user_mallory"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = app.send(Method::GET, &uri, Some("user_alice"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delete_removes_document_and_folder_links() {
    let app = app();
    let id = app.upload("user_alice", "Doomed", "doomed.pdf").await as i32;
    app.store.link_folder(id, 3).await;

    let uri = format!("/api/documents/{}", id);
    let (status, _, body) = app.send(Method::DELETE, &uri, Some("user_alice"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
    assert!(app.store.folders_of(id).await.is_empty());

    let (status, _, _) = app.send(Method::GET, &uri, Some("user_alice"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn summaries_are_listed_and_rendered() {
    let app = app();
    let id = app.upload("user_alice", "Book", "book.pdf").await as i32;
    let stored = [
        (SummaryKind::Chapter, "Later.", Some("Chapter 2"), Some(2)),
        (SummaryKind::Overview, "Only paragraph.", None, None),
        (SummaryKind::KeyPoints, "- Point one (high)\nPoint two\n", None, None),
        (SummaryKind::Chapter, "Earlier.\n\nWhy it matters.", Some("Chapter 1"), Some(1)),
    ];
    for (kind, content, title, order) in stored {
        app.store
            .insert_summary(Summary {
                document_id: id,
                kind,
                content: content.to_string(),
                title: title.map(str::to_string),
                order,
            })
            .await;
    }

    let (status, _, body) = app
        .send(Method::GET, &format!("/api/summaries/{}", id), Some("user_alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["document"]["id"], id);
    assert_eq!(body["summaries"].as_array().unwrap().len(), 4);
    assert_eq!(body["summaries"][2]["type"], "key_points");

    let (status, _, body) = app
        .send(
            Method::GET,
            &format!("/api/summaries/{}/view", id),
            Some("user_alice"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let panel = &body["panel"];
    assert_eq!(panel["status"], "ready");

    let overview = &panel["overview"]["overview"];
    assert_eq!(overview["state"], "content");
    assert_eq!(
        overview["value"][0]["tags"],
        json!(["introduction", "conclusion"])
    );

    let points = &panel["overview"]["keyPoints"]["value"];
    assert_eq!(points[0], json!({ "text": "Point one", "importance": "high" }));
    assert_eq!(points[1], json!({ "text": "Point two", "importance": "" }));

    let chapters = panel["chapters"]["value"].as_array().unwrap();
    assert_eq!(chapters[0]["title"], "Chapter 1");
    assert_eq!(chapters[1]["title"], "Chapter 2");
    assert_eq!(chapters[0]["paragraphs"][1]["tags"], json!(["significance"]));
}

#[tokio::test]
async fn fresh_upload_view_shows_generation_in_progress() {
    let app = app();
    let id = app.upload("user_alice", "New", "new.pdf").await;
    let (status, _, body) = app
        .send(
            Method::GET,
            &format!("/api/summaries/{}/view", id),
            Some("user_alice"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["panel"]["status"], "generating");
}

#[tokio::test]
async fn regeneration_is_queued_with_reload_hint() {
    let app = app();
    let id = app.upload("user_alice", "Book", "book.pdf").await;
    let (status, headers, body) = app
        .send(
            Method::POST,
            &format!("/api/summaries/{}/regenerate", id),
            Some("user_alice"),
            Some(json!({
                "focusChapters": ["Chapter 4"],
                "focusTopics": [],
                "customInstructions": "Emphasise the results",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
    assert_eq!(headers[header::RETRY_AFTER], "3");

    let requests = app.store.generation_requests(id as i32).await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].focus_chapters, vec!["Chapter 4".to_string()]);
    assert_eq!(requests[1].custom_instructions, "Emphasise the results");
}

#[tokio::test]
async fn listing_shows_only_callers_documents() {
    let app = app();
    app.upload("user_alice", "First", "first.pdf").await;
    app.upload("user_alice", "Second", "second.pdf").await;
    app.upload("user_bob", "Other", "other.pdf").await;

    let (status, _, body) = app
        .send(Method::GET, "/api/summaries", Some("user_alice"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"First".to_string()));
    assert!(titles.contains(&"Second".to_string()));

    let (status, _, body) = app
        .send(Method::GET, "/api/library", Some("user_bob"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["documents"][0]["title"], "Other");
    assert_eq!(body["documents"][0]["sizeKb"], 4);
    assert!(body.get("emptyMessage").is_none());
}

#[tokio::test]
async fn invalid_upload_is_bad_request() {
    let app = app();
    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/summaries",
            Some("user_alice"),
            Some(json!({
                "fileName": "x.pdf",
                "fileUrl": "",
                "fileKey": "k",
                "fileSize": 1,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "fileUrl is required");
}

#[tokio::test]
async fn health_is_public() {
    let app = app();
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn anonymous_bodies_are_unauthorized_before_parsing() {
    let app = app();
    let cases = [
        (Method::POST, "/api/summaries/abc/regenerate", None, ""),
        (Method::POST, "/api/summaries/1/regenerate", Some("application/json"), "not json"),
        (Method::POST, "/api/summaries", None, ""),
        (Method::POST, "/api/summaries", Some("application/json"), "{\"fileName\":\"x.pdf\"}"),
    ];
    for (method, uri, content_type, body) in cases {
        let (status, _, json) = app.send_raw(method, uri, None, content_type, body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} {body}");
        assert_eq!(json, json!({ "error": "Unauthorized" }));
    }
}

#[tokio::test]
async fn malformed_upload_bodies_are_bad_request() {
    let app = app();
    let cases = [
        (Some("application/json"), "{\"fileName\":\"x.pdf\"}"),
        (Some("application/json"), "not json"),
        (Some("application/json"), "{\"fileName\":\"x.pdf\",\"fileUrl\":\"u\",\"fileKey\":\"k\",\"fileSize\":\"big\"}"),
        (None, ""),
    ];
    for (content_type, body) in cases {
        let (status, _, json) = app
            .send_raw(Method::POST, "/api/summaries", Some("user_alice"), content_type, body)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(json["error"].is_string(), "{body}: {json}");
    }
    let (status, _, json) = app
        .send(Method::GET, "/api/summaries", Some("user_alice"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{json}");
}

#[tokio::test]
async fn regeneration_without_body_uses_default_options() {
    let app = app();
    let id = app.upload("user_alice", "Book", "book.pdf").await;
    let uri = format!("/api/summaries/{}/regenerate", id);

    let (status, headers, body) = app.send(Method::POST, &uri, Some("user_alice"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(headers[header::RETRY_AFTER], "3");

    let (status, _, _) = app
        .send_raw(Method::POST, &uri, Some("user_alice"), Some("application/json"), "{}")
        .await;
    assert_eq!(status, StatusCode::OK);

    let requests = app.store.generation_requests(id as i32).await;
    assert_eq!(requests.len(), 3);
    assert!(requests[1].focus_chapters.is_empty());
    assert!(requests[2].custom_instructions.is_empty());

    let (status, _, body) = app
        .send_raw(Method::POST, &uri, Some("user_alice"), Some("application/json"), "[1,")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert_eq!(app.store.generation_requests(id as i32).await.len(), 3);
}

#[tokio::test]
async fn store_failures_are_masked() {
    let app = broken_app();
    for method in [Method::GET, Method::DELETE] {
        let (status, _, body) = app
            .send(method, "/api/documents/1", Some("user_alice"), None)
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal server error" }));
        assert!(!body.to_string().contains(STORE_FAILURE));
    }

    let (status, _, body) = app
        .send(
            Method::POST,
            "/api/summaries",
            Some("user_alice"),
            Some(json!({
                "fileName": "x.pdf",
                "fileUrl": "https://files.example/x.pdf",
                "fileKey": "uploads/x.pdf",
                "fileSize": 1,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to save document" }));
    assert!(!body.to_string().contains(STORE_FAILURE));
    assert!(app.store.generation_requests(1).await.is_empty());
}
