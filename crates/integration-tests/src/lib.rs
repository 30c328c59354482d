//! Shared harness for the end-to-end API tests: a router over a fresh
//! in-memory SQLite store, and a helper that drives one request through it.

use std::sync::Arc;

use api_adapters::{router, AppState};
use auth_adapters::Argon2Hasher;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use domains::{PlanCatalog, SystemClock};
use serde_json::Value;
use services::{Ports, Services};
use storage_adapters::SqliteStore;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let store = Arc::new(SqliteStore::in_memory().await.expect("in-memory sqlite"));
        let ports = Ports {
            users: store.clone(),
            categories: store.clone(),
            images: store.clone(),
            payments: store,
            hasher: Arc::new(Argon2Hasher::new()),
            clock: Arc::new(SystemClock),
        };
        Self::from_ports(ports)
    }

    /// Router over arbitrary adapters, e.g. mockall doubles.
    pub fn from_ports(ports: Ports) -> Self {
        Self { router: router(AppState::new(Services::new(ports, PlanCatalog::default()))) }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body)).await
    }

    /// Raw text response, for non-JSON endpoints.
    pub async fn get_text(&self, uri: &str) -> (StatusCode, String) {
        let request = Request::builder().uri(uri).body(Body::empty()).expect("request");
        let response = self.router.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }

    /// Registers a user and returns its id.
    pub async fn user(&self, username: &str) -> String {
        let (status, body) = self
            .post(
                "/api/users",
                serde_json::json!({
                    "email": format!("{username}@example.com"),
                    "username": username,
                    "password": "s3cret-pass",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    /// Creates a category and returns its id.
    pub async fn category(&self, name: &str) -> String {
        let (status, body) = self
            .post("/api/categories", serde_json::json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }

    /// Publishes an image and returns its id.
    pub async fn image(
        &self,
        title: &str,
        kind: &str,
        category_id: Option<&str>,
        tags: &[&str],
    ) -> String {
        let (status, body) = self
            .post(
                "/api/images",
                serde_json::json!({
                    "title": title,
                    "categoryId": category_id,
                    "tags": tags,
                    "type": kind,
                    "postimageUrl": format!("https://i.example/{title}.jpg"),
                    "thumbnailUrl": format!("https://i.example/{title}_t.jpg"),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        id_of(&body)
    }
}

pub fn id_of(body: &Value) -> String {
    body["id"].as_str().expect("id field").to_string()
}
