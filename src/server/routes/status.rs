use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::{json, Value};

use crate::server::error::{ApiError, ApiResponse};

async fn am_i_up() -> Json<Value> {
    Json(json!({ "success": true }))
}

async fn metrics() -> ApiResponse<Response> {
    let encoder = TextEncoder::new();
    let metrics = prometheus::gather();
    let mut buf = vec![];
    encoder.encode(&metrics, &mut buf).map_err(|error| {
        tracing::error!(%error, "failed to encode metrics");
        ApiError::Internal
    })?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_owned())],
        buf,
    )
        .into_response())
}

pub fn status_router() -> Router {
    Router::new()
        .route("/status/am-i-up", get(am_i_up))
        .route("/metrics", get(metrics))
}
