//! Single-node wire endpoints: `/get`, `/set`, `/delete`, `/bulk_set`,
//! `/search`, `/search_similar`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::StoreError;
use crate::http::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/get", get(get_handler))
        .route("/set", post(set_handler))
        .route("/delete", post(delete_handler))
        .route("/bulk_set", post(bulk_set_handler))
        .route("/search", get(search_handler))
        .route("/search_similar", get(search_similar_handler))
        .with_state(state)
}

pub(crate) type ErrorResponse = (StatusCode, Json<Value>);

fn status_of(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

pub(crate) fn store_error_response(err: StoreError) -> ErrorResponse {
    let code = status_of(err.status_code());
    if err.is_fatal() {
        eprintln!("fatal store error: {err}");
    }
    (code, Json(json!({"error": err.to_string()})))
}

#[derive(Deserialize)]
pub struct GetQuery {
    key: Option<String>,
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GetQuery>,
) -> Result<Json<Value>, ErrorResponse> {
    let key = query.key.ok_or_else(|| store_error_response(StoreError::malformed("missing key")))?;
    match state.engine.get(&key) {
        Some(value) => Ok(Json(json!({"found": true, "value": value}))),
        None => Err((StatusCode::NOT_FOUND, Json(json!({"found": false})))),
    }
}

#[derive(Deserialize)]
pub struct SetBody {
    key: Option<String>,
    value: Option<Value>,
    debug_flaky: Option<f64>,
}

async fn set_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SetBody>,
) -> Result<Json<Value>, ErrorResponse> {
    let key = body.key.ok_or_else(|| store_error_response(StoreError::malformed("missing key")))?;
    let value = body.value.unwrap_or(Value::Null);
    let applied = state
        .engine
        .set(key.clone(), value.clone(), body.debug_flaky)
        .await
        .map_err(store_error_response)?;
    state.note_set(&key, &value, applied);
    Ok(Json(json!({"ok": true})))
}

#[derive(Deserialize)]
pub struct DeleteBody {
    key: Option<String>,
    debug_flaky: Option<f64>,
}

async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeleteBody>,
) -> Result<Json<Value>, ErrorResponse> {
    let key = body.key.ok_or_else(|| store_error_response(StoreError::malformed("missing key")))?;
    let applied = state
        .engine
        .delete(key.clone(), body.debug_flaky)
        .await
        .map_err(store_error_response)?;
    state.note_delete(&key, applied);
    Ok(Json(json!({"ok": true})))
}

#[derive(Deserialize)]
pub struct BulkSetBody {
    items: Option<Vec<(String, Value)>>,
    debug_flaky: Option<f64>,
}

async fn bulk_set_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BulkSetBody>,
) -> Result<Json<Value>, ErrorResponse> {
    let items = body.items.ok_or_else(|| store_error_response(StoreError::malformed("missing items")))?;
    let applied = state
        .engine
        .bulk_set(items.clone(), body.debug_flaky)
        .await
        .map_err(store_error_response)?;
    for (key, value) in &items {
        state.note_set(key, value, applied);
    }
    Ok(Json(json!({"ok": true})))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, StatusCode> {
    if !state.indexing_enabled() {
        return Err(StatusCode::NOT_FOUND);
    }
    let q = query.q.unwrap_or_default();
    let keys = state.search(&q).unwrap_or_default();
    Ok(Json(json!({"keys": keys})))
}

#[derive(Deserialize)]
pub struct SearchSimilarQuery {
    q: Option<String>,
    top_k: Option<usize>,
}

async fn search_similar_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchSimilarQuery>,
) -> Result<Json<Value>, StatusCode> {
    if !state.indexing_enabled() {
        return Err(StatusCode::NOT_FOUND);
    }
    let q = query.q.unwrap_or_default();
    let top_k = query.top_k.unwrap_or(10);
    let results: Vec<Value> = state
        .search_similar(&q, top_k)
        .unwrap_or_default()
        .into_iter()
        .map(|scored| json!({"key": scored.key, "score": scored.score}))
        .collect();
    Ok(Json(json!({"results": results})))
}
