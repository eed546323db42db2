#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

use student_records::app::{AppState, router};
use student_records::error::{Error, Result};
use student_records::login::AdminCredentials;
use student_records::store::{MemoryStore, StudentStore};

pub const BOUNDARY: &str = "student-records-test-boundary";

pub fn test_app() -> Router {
    app_with_store(Arc::new(MemoryStore::new()))
}

pub fn app_with_store(store: Arc<dyn StudentStore>) -> Router {
    router(Arc::new(AppState::new(store, AdminCredentials::default())))
}

/// A backend whose every call fails, as when Redis has gone away
pub struct UnavailableStore;

fn unavailable() -> Error {
    Error::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "store unavailable",
    ))
}

#[async_trait]
impl StudentStore for UnavailableStore {
    async fn put_fields(&self, _id: &str, _fields: &[(&'static str, String)]) -> Result<()> {
        Err(unavailable())
    }

    async fn get(&self, _id: &str) -> Result<Option<HashMap<String, String>>> {
        Err(unavailable())
    }

    async fn list(&self) -> Result<Vec<(String, HashMap<String, String>)>> {
        Err(unavailable())
    }

    async fn delete(&self, _id: &str) -> Result<()> {
        Err(unavailable())
    }

    fn backend_name(&self) -> &'static str {
        "unavailable"
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    send_for_json(app, request).await
}

/// Send a request with a raw body and content type, decoding a JSON reply
pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    content_type: Option<&str>,
    body: &str,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    send_for_json(app, request).await
}

async fn send_for_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, request).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// A multipart/form-data request carrying one `file` field
pub fn upload_request(uri: &str, filename: &str, contents: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
         Content-Type: text/csv\r\n\
         \r\n\
         {c}\r\n\
         --{b}--\r\n",
        b = BOUNDARY,
        f = filename,
        c = contents,
    );

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

pub fn student_json(id: &str, name: &str, age: u32, course: &str, gender: &str) -> Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "age": age,
        "gender": gender,
        "course": course,
        "birthdate": "2003-04-05",
        "phone": "555-0100",
        "email": format!("{}@example.com", name.to_lowercase()),
        "address": "1 Main St",
    })
}

pub async fn create(app: &Router, student: Value) {
    let (status, body) = send_json(app, "POST", "/students", Some(student)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
}
