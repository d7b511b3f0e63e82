use crate::infra::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use kitty_alloc::error::AppError;
use kitty_alloc::{allocate, AllocationConfig, AllocationInput, AllocationResult, Scorer};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

/// Allocation settings shared by every request.
#[derive(Clone)]
pub(crate) struct AllocationService {
    pub(crate) config: Arc<AllocationConfig>,
    pub(crate) scorer: Arc<dyn Scorer>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AllocateRequest {
    #[serde(default)]
    pub(crate) input: Option<Value>,
}

pub(crate) fn with_allocation_routes(service: AllocationService) -> Router {
    Router::new()
        .route("/allocate", post(allocate_endpoint))
        .route("/api/v1/allocate", post(allocate_endpoint))
        .with_state(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn allocate_endpoint(
    State(service): State<AllocationService>,
    Json(payload): Json<AllocateRequest>,
) -> Result<Json<AllocationResult>, AppError> {
    let input = AllocationInput::from_value(payload.input.unwrap_or(Value::Null))?;
    let result = allocate(&input, &service.config, Some(service.scorer.as_ref()))?;

    info!(
        agents = result.allocations.len(),
        total = result.summary.total_allocated,
        "allocation served"
    );
    Ok(Json(result))
}
