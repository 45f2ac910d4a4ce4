use axum::{extract::State, response::IntoResponse};
use serde_json::json;

use crate::{responses, AppState};

pub async fn healthz() -> impl IntoResponse {
    responses::json_ok(json!({"ok": true}))
}

pub async fn about(State(state): State<AppState>) -> impl IntoResponse {
    responses::json_ok(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "title": "About",
        "endpoints": state.endpoints().as_slice(),
    }))
}
