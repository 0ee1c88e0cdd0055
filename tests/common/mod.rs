#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use backend::{
    AppState,
    config::Config,
    database::{
        MemoryStore, Property, PropertyFields, PropertyQuery, PropertyRepository, StoreError,
    },
    routes,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";
pub const HOST: &str = "listings.test:5000";
const BOUNDARY: &str = "----property-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub uploads: TempDir,
}

pub fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    spawn_app_with(store.clone(), store)
}

/// Dealers live in a working memory store; properties go to `properties`.
pub fn spawn_app_with(
    dealers: Arc<MemoryStore>,
    properties: Arc<dyn PropertyRepository>,
) -> TestApp {
    let uploads = tempfile::tempdir().expect("failed to create upload dir");
    let upload_dir = uploads.path().to_string_lossy().into_owned();

    let config = Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(SECRET.into()),
        "BCRYPT_COST" => Some("4".into()),
        "UPLOAD_DIR" => Some(upload_dir.clone()),
        _ => None,
    })
    .expect("test config");

    let state = AppState::new(config, dealers, properties).expect("test state");

    TestApp {
        router: routes::router(state),
        uploads,
    }
}

impl TestApp {
    /// Sends a request and returns the status with the body parsed as JSON
    /// (or as a JSON string when it is not JSON).
    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let res = self.router.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = Request::get(uri).header(header::HOST, HOST);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    pub async fn register(&self, name: &str, email: &str) -> String {
        let (status, body) = self
            .post_json(
                "/register",
                json!({ "name": name, "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_owned()
    }

    pub async fn add_property(
        &self,
        token: &str,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
    ) -> (StatusCode, Value) {
        self.send(multipart_request("POST", "/add-property", token, fields, image))
            .await
    }

    /// Ids of the caller's properties, in insertion order.
    pub async fn my_property_ids(&self, token: &str) -> Vec<i64> {
        let (status, body) = self.get("/dealer/properties", Some(token)).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body.as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_i64().unwrap())
            .collect()
    }

    pub fn stored_upload_count(&self) -> usize {
        std::fs::read_dir(self.uploads.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Property store whose every call fails as if the database were down.
pub struct UnavailableStore;

fn unavailable<T>() -> Result<T, StoreError> {
    Err(StoreError::Database(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl PropertyRepository for UnavailableStore {
    async fn create(&self, _: i64, _: &PropertyFields, _: Option<&str>) -> Result<i64, StoreError> {
        unavailable()
    }

    async fn list_by_dealer(&self, _: i64) -> Result<Vec<Property>, StoreError> {
        unavailable()
    }

    async fn search(&self, _: &PropertyQuery) -> Result<Vec<Property>, StoreError> {
        unavailable()
    }

    async fn update(
        &self,
        _: i64,
        _: i64,
        _: &PropertyFields,
        _: Option<&str>,
    ) -> Result<(), StoreError> {
        unavailable()
    }

    async fn delete(&self, _: i64, _: i64) -> Result<(), StoreError> {
        unavailable()
    }
}

pub fn property_fields<'a>(name: &'a str, bedrooms: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("name", name),
        ("location", "Pune"),
        ("bedrooms", bedrooms),
        ("bathrooms", "1"),
    ]
}

pub fn multipart_request(
    method: &str,
    uri: &str,
    token: &str,
    fields: &[(&str, &str)],
    image: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::HOST, HOST)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
