//! Common test utilities for in-process API testing.
//!
//! Builds the real router over a temporary catalog and image directory,
//! so requests can be driven with `oneshot` without a listening socket.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use marketplace_core::{
    create_catalog, Config, ImageIngestor, ImageResolver, ImagesConfig, StorageBackend,
    StorageConfig, DEFAULT_IMAGE,
};
use marketplace_server::{api::create_router, state::AppState};

/// Bytes stored as the default image in every fixture.
pub const DEFAULT_IMAGE_BYTES: &[u8] = b"default image bytes";

pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Temporary directory holding the store, images and source fixtures
    pub temp_dir: TempDir,
    pub image_dir: PathBuf,
    pub source_dir: PathBuf,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub bytes: Bytes,
    pub body: Value,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_backend(StorageBackend::Sqlite)
    }

    pub fn with_backend(backend: StorageBackend) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let image_dir = temp_dir.path().join("images");
        let source_dir = temp_dir.path().join("sources");
        std::fs::create_dir_all(&image_dir).expect("Failed to create image dir");
        std::fs::create_dir_all(&source_dir).expect("Failed to create source dir");
        std::fs::write(image_dir.join(DEFAULT_IMAGE), DEFAULT_IMAGE_BYTES)
            .expect("Failed to write default image");

        let config = Config {
            storage: StorageConfig {
                backend,
                document_path: temp_dir.path().join("items.json"),
                database_path: temp_dir.path().join("db").join("items.db"),
            },
            images: ImagesConfig {
                dir: image_dir.clone(),
                source_dir: source_dir.clone(),
            },
            ..Default::default()
        };

        let catalog = create_catalog(&config.storage).expect("Failed to create catalog");
        let ingestor = ImageIngestor::new(&image_dir).with_source_dir(&source_dir);
        let resolver = ImageResolver::new(&image_dir).expect("Failed to create resolver");

        let state = Arc::new(AppState::new(
            config,
            Arc::from(catalog),
            ingestor,
            resolver,
        ));

        Self {
            router: create_router(state),
            temp_dir,
            image_dir,
            source_dir,
        }
    }

    /// Write a file into the source directory and return the name to submit.
    pub fn source_image(&self, name: &str, content: &[u8]) -> String {
        std::fs::write(self.source_dir.join(name), content).expect("Failed to write source image");
        name.to_string()
    }

    /// Names of the files currently in the image directory.
    pub fn stored_images(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.image_dir)
            .expect("Failed to read image dir")
            .map(|e| e.expect("Failed to read entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// POST a form-encoded body.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// POST a multipart body with text fields and an optional `image` file.
    pub async fn post_multipart(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        image: Option<&[u8]>,
    ) -> TestResponse {
        const BOUNDARY: &str = "X-TEST-BOUNDARY";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        if let Some(bytes) = image {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"upload.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
                    BOUNDARY
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            content_type,
            bytes,
            body,
        }
    }
}

/// Minimal percent-encoding for form values in tests.
fn encode(s: &str) -> String {
    s.bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
