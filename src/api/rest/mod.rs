pub mod fixes;
pub mod loads;
pub mod ws;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::services::ServeDir;

use crate::models::load::LifecycleStatus;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(loads::router())
        .merge(fixes::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/ws", get(ws::ws_handler))
        .with_state(state)
        .fallback_service(ServeDir::new("static"))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    loads: usize,
    in_transit: usize,
    transitions: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let in_transit = state
        .loads
        .iter()
        .filter(|entry| entry.value().lifecycle_status == LifecycleStatus::InTransit)
        .count();

    Json(HealthResponse {
        status: "ok",
        loads: state.loads.len(),
        in_transit,
        transitions: state.transitions.len(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
