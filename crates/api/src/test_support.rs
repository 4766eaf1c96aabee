//! In-process app for route tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use ndiambour_core::media::MediaUrlBuilder;
use ndiambour_core::storage::{StorageConfig, StorageProvider, StorageService};
use ndiambour_db::{LocalStore, StoreBackend};
use serde_json::Value;
use tower::ServiceExt;

use crate::{AppState, create_router};

const BOUNDARY: &str = "ndiambour-test-boundary";

/// Router over an in-memory store and in-memory blobs.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<StoreBackend>,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(StoreBackend::Local(LocalStore::in_memory()));
        let config = StorageConfig::new(StorageProvider::Memory)
            .with_public_base_url("https://media.test");
        let storage = Arc::new(StorageService::from_config(config).unwrap());
        let state = AppState::new(Arc::clone(&store), storage, MediaUrlBuilder::default());
        state.catalog.init().await.unwrap();
        state.settings.init().await.unwrap();

        Self {
            router: create_router(state),
            store,
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None).await
    }

    pub async fn put(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    pub async fn post_raw(&self, uri: &str, content_type: &str, body: Vec<u8>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap();
        self.call(request).await
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.call(request).await
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

/// Build a multipart form with text fields and one file part.
///
/// Returns the `Content-Type` header value and the body.
pub fn multipart_body(
    fields: &[(&str, &str)],
    filename: &str,
    content_type: &str,
    bytes: &[u8],
) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
