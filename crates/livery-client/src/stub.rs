//! In-process stand-ins for the template API and object storage.

use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub const TOKEN: &str = "good-token";
pub const STORAGE_KEY: &str = "service-key";

#[derive(Clone, Default)]
struct Recorded {
    created: Arc<Mutex<Vec<Value>>>,
    uploads: Arc<Mutex<Vec<(String, String, usize)>>>,
}

pub struct StubServer {
    pub base_url: String,
    pub root_url: String,
    recorded: Recorded,
}

impl StubServer {
    /// Records POSTed to the template endpoint.
    pub fn created(&self) -> Vec<Value> {
        self.recorded.created.lock().unwrap().clone()
    }

    /// Uploaded objects as (bucket, name, size).
    pub fn uploads(&self) -> Vec<(String, String, usize)> {
        self.recorded.uploads.lock().unwrap().clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Token {}", TOKEN))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Invalid token."})),
    )
        .into_response()
}

fn stored_template() -> Value {
    json!({
        "id": 1,
        "tenant": 3,
        "tenant_name": "Acme",
        "template_name": "Stored",
        "settings": {
            "content": {
                "headerText": "Stored Co",
                "mainHeading": "Stored heading",
                "subheading": "",
                "footerText": ""
            },
            "colors": {"background": "#101010", "text": "#fafafa"},
            "images": {"background_image_url": "", "logo_url": "https://cdn.example/logo.png"}
        }
    })
}

async fn list(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([stored_template()])).into_response()
}

async fn create(
    State(recorded): State<Recorded>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if body["tenant"].as_i64().unwrap_or(-1) < 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"tenant": ["Invalid pk"]})),
        )
            .into_response();
    }

    let mut created = recorded.created.lock().unwrap();
    created.push(body.clone());
    body["id"] = json!(created.len() + 1);
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn verify(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({
        "message": "Token is valid",
        "status": "success",
        "user": {"id": 1, "username": "owner", "email": "owner@example.com", "full_name": "Owner"}
    }))
    .into_response()
}

async fn tenants(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([{"id": 9, "name": "Acme", "email": "acme@example.com", "owner": 1}])).into_response()
}

async fn upload(
    State(recorded): State<Recorded>,
    Path((bucket, name)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let key_ok = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", STORAGE_KEY));
    if !key_ok {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Invalid JWT", "message": "invalid signature"})),
        )
            .into_response();
    }

    recorded
        .uploads
        .lock()
        .unwrap()
        .push((bucket.clone(), name.clone(), body.len()));
    Json(json!({"Key": format!("{}/{}", bucket, name)})).into_response()
}

/// Serve the stub on an ephemeral port.
pub async fn spawn_api() -> StubServer {
    let recorded = Recorded::default();
    let router = Router::new()
        .route("/api/templates/", get(list).post(create))
        .route("/api/templates/my_templates/", get(list))
        .route("/api/auth/verify-token/", get(verify))
        .route("/api/tenants/", get(tenants))
        .route("/storage/v1/object/{bucket}/{name}", post(upload))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    StubServer {
        base_url: format!("http://{}/api/", addr),
        root_url: format!("http://{}", addr),
        recorded,
    }
}
