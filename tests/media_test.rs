use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use dealhub::config::Config;
use dealhub::domain::{DomainError, RemoteStore, StoredFile};
use dealhub::infrastructure::AppState;
use dealhub::services::media::{MAX_UPLOAD_BYTES, PLACEHOLDER_SVG};
use dealhub::{db, server};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "----dealhub-test-boundary";
const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0];

/// In-memory stand-in for the FTP host
#[derive(Default)]
struct MemoryStore {
    files: Mutex<Vec<(String, usize)>>,
    fail: bool,
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn put(
        &self,
        category: &str,
        filename: &str,
        data: Vec<u8>,
    ) -> Result<StoredFile, DomainError> {
        if self.fail {
            return Err(DomainError::Storage("530 Login incorrect".into()));
        }
        let key = format!("{}/{}", category, filename);
        self.files.lock().unwrap().push((key.clone(), data.len()));
        Ok(StoredFile {
            url: format!("https://cdn.example.com/uploads/{}", key),
            key,
        })
    }
}

async fn setup_app(uploads: &tempfile::TempDir) -> Router {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    server::build_router(AppState::new(
        db,
        Config::for_uploads("sqlite::memory:", uploads.path()),
    ))
}

async fn setup_app_with_remote(uploads: &tempfile::TempDir, store: Arc<MemoryStore>) -> Router {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    server::build_router(AppState::with_remote_store(
        db,
        Config::for_uploads("sqlite::memory:", uploads.path()),
        store,
    ))
}

fn upload_request(uri: &str, category: Option<&str>, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    if let Some(category) = category {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"category\"\r\n\r\n{}\r\n",
                BOUNDARY, category
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"My Photo!.png\"\r\nContent-Type: {}\r\n\r\n",
            BOUNDARY, content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn count_files(dir: &std::path::Path) -> usize {
    walk(dir)
}

fn walk(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .map(|e| {
                    let p = e.path();
                    if p.is_dir() { walk(&p) } else { 1 }
                })
                .sum()
        })
        .unwrap_or(0)
}

#[tokio::test]
async fn test_upload_stores_file_under_category() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    let response = app
        .clone()
        .oneshot(upload_request("/api/media/upload", Some("banners"), "image/png", PNG))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["category"], "banners");
    assert_eq!(body["type"], "image/png");
    assert_eq!(body["size"], PNG.len());

    let filename = body["filename"].as_str().unwrap().to_string();
    assert!(filename.ends_with("_My_Photo_.png"));
    assert_eq!(
        body["url"],
        format!("http://localhost:8000/api/media/image/banners/{}", filename)
    );
    assert!(dir.path().join("banners").join(&filename).exists());

    // And it can be served back
    let served = app
        .oneshot(get(&format!("/api/media/image/banners/{}", filename)))
        .await
        .unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        served.headers()[header::CACHE_CONTROL],
        "public, max-age=31536000, immutable"
    );
    assert_eq!(served.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(body_bytes(served).await, PNG);
}

#[tokio::test]
async fn test_upload_defaults_to_general_category() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    let response = app
        .oneshot(upload_request("/api/media/upload", None, "image/webp", PNG))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["category"], "general");
    assert_eq!(count_files(&dir.path().join("general")), 1);
}

#[tokio::test]
async fn test_upload_rejects_disallowed_mime_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    let response = app
        .oneshot(upload_request(
            "/api/media/upload",
            Some("products"),
            "application/x-msdownload",
            b"MZ",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("Invalid file type"));
    assert_eq!(count_files(dir.path()), 0);
}

#[tokio::test]
async fn test_upload_rejects_oversized_file_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;
    let big = vec![0u8; MAX_UPLOAD_BYTES + 1];

    let response = app
        .oneshot(upload_request("/api/media/upload", None, "image/png", &big))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .contains("10MB"));
    assert_eq!(count_files(dir.path()), 0);
}

#[tokio::test]
async fn test_upload_rejects_unknown_category() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    let response = app
        .oneshot(upload_request("/api/media/upload", Some("../../etc"), "image/png", PNG))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(count_files(dir.path()), 0);
}

#[tokio::test]
async fn test_image_path_traversal_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    for uri in [
        "/api/media/image/../secret.png",
        "/api/media/image/products/%2e%2e/secret.png",
        "/api/media/image/products%5Csecret.png",
        "/api/media/image//etc/passwd",
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
    }
}

#[tokio::test]
async fn test_missing_image_serves_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    let response = app
        .oneshot(get("/api/media/image/products/nope.png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    assert_eq!(body_bytes(response).await, PLACEHOLDER_SVG.as_bytes());
}

#[tokio::test]
async fn test_proxy_passes_through_images() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(PNG),
        )
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    let response = app
        .oneshot(get(&format!(
            "/api/media/proxy?url={}/logo.png",
            mock_server.uri()
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(body_bytes(response).await, PNG);
}

#[tokio::test]
async fn test_proxy_falls_back_to_placeholder() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/page.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html></html>"),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    for target in ["/page.html", "/gone.png"] {
        let response = app
            .clone()
            .oneshot(get(&format!(
                "/api/media/proxy?url={}{}",
                mock_server.uri(),
                target
            )))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");
    }
}

#[tokio::test]
async fn test_proxy_rejects_non_http_schemes() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    let response = app
        .clone()
        .oneshot(get("/api/media/proxy?url=file:///etc/passwd"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/api/media/proxy")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_remote_upload_uses_remote_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::default());
    let app = setup_app_with_remote(&dir, store.clone()).await;

    let response = app
        .oneshot(upload_request(
            "/api/media/upload-remote",
            Some("avatars"),
            "image/gif",
            PNG,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["url"]
        .as_str()
        .unwrap()
        .starts_with("https://cdn.example.com/uploads/avatars/"));

    let files = store.files.lock().unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].0.starts_with("avatars/"));
    assert_eq!(count_files(dir.path()), 0);
}

#[tokio::test]
async fn test_remote_upload_failure_is_500_with_details() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore {
        fail: true,
        ..Default::default()
    });
    let app = setup_app_with_remote(&dir, store).await;

    let response = app
        .oneshot(upload_request("/api/media/upload-remote", None, "image/png", PNG))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Failed to upload file");
    assert!(body["details"].as_str().unwrap().contains("530"));
}

#[tokio::test]
async fn test_remote_upload_without_ftp_config_is_500() {
    let dir = tempfile::tempdir().unwrap();
    let app = setup_app(&dir).await;

    let response = app
        .oneshot(upload_request("/api/media/upload-remote", None, "image/png", PNG))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
