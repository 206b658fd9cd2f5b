//! Cluster-node additions: `/status`, `/promote_to_primary`, and the
//! replication-receive endpoints, which are accepted regardless of role.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::routes::{store_error_response, ErrorResponse};
use crate::http::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/promote_to_primary", post(promote_handler))
        .route("/replicate/set", post(replicate_set_handler))
        .route("/replicate/delete", post(replicate_delete_handler))
        .route("/replicate/bulk_set", post(replicate_bulk_set_handler))
        .with_state(state)
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let role = state.engine.role();
    Json(json!({"role": role.as_str(), "primary": role.is_primary()}))
}

async fn promote_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    state.engine.promote_to_primary();
    Json(json!({"ok": true, "role": "primary"}))
}

#[derive(Deserialize)]
pub struct ReplicateSetBody {
    key: Option<String>,
    value: Option<Value>,
}

async fn replicate_set_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReplicateSetBody>,
) -> Result<Json<Value>, ErrorResponse> {
    let key = body
        .key
        .ok_or_else(|| (StatusCode::BAD_REQUEST, Json(json!({"error": "missing key"}))))?;
    let value = body.value.unwrap_or(Value::Null);
    let applied = state
        .engine
        .apply_replicate_set(key.clone(), value.clone())
        .map(|_| true)
        .map_err(store_error_response)?;
    state.note_set(&key, &value, applied);
    Ok(Json(json!({"ok": true})))
}

#[derive(Deserialize)]
pub struct ReplicateDeleteBody {
    key: Option<String>,
}

async fn replicate_delete_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReplicateDeleteBody>,
) -> Result<Json<Value>, ErrorResponse> {
    let key = body
        .key
        .ok_or_else(|| (StatusCode::BAD_REQUEST, Json(json!({"error": "missing key"}))))?;
    state
        .engine
        .apply_replicate_delete(key.clone())
        .map_err(store_error_response)?;
    state.note_delete(&key, true);
    Ok(Json(json!({"ok": true})))
}

#[derive(Deserialize)]
pub struct ReplicateBulkSetBody {
    items: Option<Vec<(String, Value)>>,
}

async fn replicate_bulk_set_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReplicateBulkSetBody>,
) -> Result<Json<Value>, ErrorResponse> {
    let items = body
        .items
        .ok_or_else(|| (StatusCode::BAD_REQUEST, Json(json!({"error": "missing items"}))))?;
    state
        .engine
        .apply_replicate_bulk_set(items.clone())
        .map_err(store_error_response)?;
    for (key, value) in &items {
        state.note_set(key, value, true);
    }
    Ok(Json(json!({"ok": true})))
}
