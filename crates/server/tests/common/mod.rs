//! Common test utilities for API testing.
//!
//! This module provides a test fixture that creates an in-process router
//! backed by temporary download and library folders, a JSON result store and
//! a mock prober in place of ffprobe.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use mediashelf_core::{
    organizer::Destinations,
    queue::QueueConfig,
    testing::MockProber,
    Config, JsonFileStore, MediaFolder, MediaVerifier, VerifyQueue,
};

/// Re-export fixtures for test convenience
pub use mediashelf_core::testing::fixtures;

/// Test fixture for API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_enqueue() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/v1/verify/queue", json!({
///         "type": "file",
///         "path": "/downloads/movie.mkv"
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock prober - configure media info per path
    pub prober: Arc<MockProber>,
    /// Scanned download folder
    pub downloads: TempDir,
    /// Organizer destination root
    pub library: TempDir,
    /// Result store location
    pub data: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new fixture with the library configured.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let downloads = TempDir::new().expect("Failed to create downloads dir");
        let library = TempDir::new().expect("Failed to create library dir");
        let data = TempDir::new().expect("Failed to create data dir");

        let mut config = Config::default();
        config.storage.results_path = data.path().join("verify-results.json");
        if !test_config.unconfigured {
            config.library.folders = vec![MediaFolder::new(downloads.path())];
            config.organizer.destinations = Destinations {
                movies: Some(library.path().join("Movies")),
                series: Some(library.path().join("TV")),
                music: Some(library.path().join("Music")),
                books: Some(library.path().join("Books")),
            };
        }

        let store = JsonFileStore::open(&config.storage.results_path)
            .await
            .expect("Failed to open result store");
        let prober = Arc::new(MockProber::new());
        let queue = VerifyQueue::new(
            QueueConfig {
                poll_interval: Duration::from_millis(20),
                ..Default::default()
            },
            Arc::new(MediaVerifier::new(Arc::clone(&prober))),
            Arc::new(store),
        );

        let state = Arc::new(mediashelf_server::state::AppState::new(config, queue));
        let router = mediashelf_server::api::create_router(state);

        Self {
            router,
            prober,
            downloads,
            library,
            data,
        }
    }

    /// Write a file under the download folder.
    pub fn write_download(&self, relative: &str, contents: &[u8]) -> PathBuf {
        let path = self.downloads.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Create a sparse file of `size` bytes under the download folder.
    pub fn sparse_download(&self, relative: &str, size: u64) -> PathBuf {
        let path = self.downloads.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::File::create(&path).unwrap().set_len(size).unwrap();
        path
    }

    /// Poll `path` until `done` accepts the body.
    pub async fn wait_until<F>(&self, path: &str, done: F) -> TestResponse
    where
        F: Fn(&Value) -> bool,
    {
        for _ in 0..300 {
            let response = self.get(path).await;
            if done(&response.body) {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition on {} not reached", path);
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body_bytes).into_owned()))
        };

        TestResponse { status, body }
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone, Default)]
pub struct TestConfig {
    /// Leave media folders and organizer destinations empty
    pub unconfigured: bool,
}

impl TestConfig {
    pub fn unconfigured() -> Self {
        Self { unconfigured: true }
    }
}
