//! In-memory stand-in for the consent service, used by integration tests.
//!
//! Every route requires an `ApiKey` header matching the key the router was
//! built with. Records are stored as raw JSON objects so the server echoes
//! back whatever shape the client sends, plus the fields it assigns (`id`,
//! `timestamp`, and `verified` on new subjects).

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub type Object = Map<String, Value>;

#[derive(Default)]
pub struct Store {
    /// Insertion-ordered, like the service's listing.
    pub consents: Vec<Object>,
    pub subjects: HashMap<String, Object>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    db: Db,
}

pub fn app(api_key: &str) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        db: Db::default(),
    };
    Router::new()
        .route("/consent/", get(list_consents).post(create_consent))
        .route("/consent/{id}", get(get_consent))
        .route("/subjects/", post(create_subject))
        .route("/subjects/{id}", get(get_subject).put(update_subject))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = request.headers().get("ApiKey").and_then(|v| v.to_str().ok());
    if provided != Some(&*state.api_key) {
        tracing::warn!(uri = %request.uri(), "rejected request without a valid api key");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

fn now() -> Value {
    Value::String(chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%:z").to_string())
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Create or update a subject, returning the stored record.
fn upsert_subject(store: &mut Store, mut fields: Object) -> Object {
    let id = match fields.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => new_id(),
    };
    let subject = store.subjects.entry(id.clone()).or_insert_with(|| {
        let mut fresh = Object::new();
        fresh.insert("id".to_string(), Value::String(id));
        fresh.insert("verified".to_string(), Value::Bool(false));
        fresh.insert("timestamp".to_string(), now());
        fresh
    });
    fields.remove("id");
    for (key, value) in fields {
        subject.insert(key, value);
    }
    subject.clone()
}

async fn list_consents(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Object>> {
    let store = state.db.read().await;
    let consents = store
        .consents
        .iter()
        .filter(|consent| {
            params.iter().all(|(key, expected)| {
                let actual = match key.as_str() {
                    "subject_id" => consent.get("subject").and_then(|s| s.get("id")),
                    other => consent.get(other),
                };
                actual.and_then(Value::as_str) == Some(expected.as_str())
            })
        })
        .cloned()
        .collect();
    Json(consents)
}

async fn create_consent(
    State(state): State<AppState>,
    Json(mut consent): Json<Object>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let mut store = state.db.write().await;

    let subject = match consent.remove("subject") {
        Some(Value::Object(fields)) => upsert_subject(&mut store, fields),
        _ => return Err(StatusCode::UNPROCESSABLE_ENTITY),
    };
    let id = new_id();
    let timestamp = consent.get("timestamp").cloned().unwrap_or_else(now);
    let subject_id = subject.get("id").cloned().unwrap_or(Value::Null);

    consent.insert("id".to_string(), Value::String(id.clone()));
    consent.insert("timestamp".to_string(), timestamp.clone());
    consent.insert("subject".to_string(), Value::Object(subject));
    store.consents.push(consent);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "timestamp": timestamp, "subject_id": subject_id })),
    ))
}

async fn get_consent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Object>, StatusCode> {
    let store = state.db.read().await;
    store
        .consents
        .iter()
        .find(|consent| consent.get("id").and_then(Value::as_str) == Some(id.as_str()))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_subject(
    State(state): State<AppState>,
    Json(subject): Json<Object>,
) -> (StatusCode, Json<Object>) {
    let mut store = state.db.write().await;
    (StatusCode::CREATED, Json(upsert_subject(&mut store, subject)))
}

async fn get_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Object>, StatusCode> {
    let store = state.db.read().await;
    store.subjects.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut fields): Json<Object>,
) -> Result<Json<Object>, StatusCode> {
    let mut store = state.db.write().await;
    if !store.subjects.contains_key(&id) {
        return Err(StatusCode::NOT_FOUND);
    }
    fields.insert("id".to_string(), Value::String(id));
    Ok(Json(upsert_subject(&mut store, fields)))
}
