use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::queue::enqueue_fix;
use crate::error::AppError;
use crate::geo::in_bounds;
use crate::models::fix::{FixSource, GpsFix};
use crate::models::load::{GeoPoint, LifecycleStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/loads/:id/fixes", post(record_fix).get(list_fixes))
}

#[derive(Deserialize)]
pub struct RecordFixRequest {
    pub position: GeoPoint,
    pub speed_kmh: Option<f64>,
    pub accuracy_m: Option<f64>,
    pub captured_at: Option<DateTime<Utc>>,
    pub source: Option<FixSource>,
}

async fn record_fix(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordFixRequest>,
) -> Result<Json<GpsFix>, AppError> {
    if !in_bounds(&payload.position) {
        return Err(AppError::BadRequest(
            "position coordinates out of range".to_string(),
        ));
    }

    {
        let load = state
            .loads
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("load {} not found", id)))?;

        if load.lifecycle_status != LifecycleStatus::InTransit {
            return Err(AppError::Conflict(format!(
                "load {} is not in transit",
                id
            )));
        }
    }

    let fix = GpsFix {
        id: Uuid::new_v4(),
        load_id: id,
        position: payload.position,
        speed_kmh: payload.speed_kmh,
        accuracy_m: payload.accuracy_m,
        captured_at: payload.captured_at.unwrap_or_else(Utc::now),
        source: payload.source.unwrap_or(FixSource::TrackingApi),
    };

    state.fixes.entry(id).or_default().push(fix.clone());
    enqueue_fix(&state, fix.clone()).await?;

    Ok(Json(fix))
}

async fn list_fixes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<GpsFix>>, AppError> {
    if !state.loads.contains_key(&id) {
        return Err(AppError::NotFound(format!("load {} not found", id)));
    }

    let mut history = state
        .fixes
        .get(&id)
        .map(|entry| entry.value().clone())
        .unwrap_or_default();
    history.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));

    Ok(Json(history))
}
