//! Health API handler

use axum::Json;
use serde_json::{Value, json};

use crate::utils::now_millis;

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": now_millis(),
    }))
}
