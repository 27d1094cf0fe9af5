use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::engine::progress::estimate_progress;
use crate::engine::status::classify_deadline_status;
use crate::engine::tracker::reclassify_load;
use crate::error::AppError;
use crate::geo::in_bounds;
use crate::models::load::{DeadlineStatus, GeoPoint, LifecycleStatus, Load};
use crate::models::progress::Progress;
use crate::models::transition::StatusTransition;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/loads", post(create_load).get(list_loads))
        .route("/loads/:id", get(get_load))
        .route("/loads/:id/status", patch(update_load_status))
        .route("/loads/:id/progress", get(get_load_progress))
        .route("/transitions", get(list_transitions))
}

#[derive(Deserialize)]
pub struct CreateLoadRequest {
    pub reference: String,
    pub origin: Option<GeoPoint>,
    pub destination: Option<GeoPoint>,
    pub scheduled_pickup_at: DateTime<Utc>,
    pub scheduled_delivery_at: DateTime<Utc>,
    pub total_route_distance_km: Option<f64>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: LifecycleStatus,
}

async fn create_load(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateLoadRequest>,
) -> Result<Json<Load>, AppError> {
    if payload.reference.trim().is_empty() {
        return Err(AppError::BadRequest("reference cannot be empty".to_string()));
    }

    if let Some(origin) = &payload.origin {
        if !in_bounds(origin) {
            return Err(AppError::BadRequest("origin out of range".to_string()));
        }
    }

    if let Some(destination) = &payload.destination {
        if !in_bounds(destination) {
            return Err(AppError::BadRequest("destination out of range".to_string()));
        }
    }

    if payload.scheduled_delivery_at <= payload.scheduled_pickup_at {
        return Err(AppError::BadRequest(
            "scheduled delivery must be after scheduled pickup".to_string(),
        ));
    }

    let now = Utc::now();
    let mut load = Load {
        id: Uuid::new_v4(),
        reference: payload.reference,
        origin: payload.origin,
        destination: payload.destination,
        scheduled_pickup_at: payload.scheduled_pickup_at,
        scheduled_delivery_at: payload.scheduled_delivery_at,
        actual_delivery_at: None,
        total_route_distance_km: payload.total_route_distance_km,
        lifecycle_status: LifecycleStatus::AwaitingDriver,
        deadline_status: DeadlineStatus::OnTime,
        created_at: now,
        updated_at: now,
    };
    load.deadline_status = classify_deadline_status(&load, None, now);

    state.loads.insert(load.id, load.clone());
    Ok(Json(load))
}

async fn list_loads(State(state): State<Arc<AppState>>) -> Json<Vec<Load>> {
    let loads = state
        .loads
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    Json(loads)
}

async fn get_load(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Load>, AppError> {
    let load = state
        .loads
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("load {} not found", id)))?;

    Ok(Json(load.value().clone()))
}

async fn update_load_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Load>, AppError> {
    let mut load = state
        .loads
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("load {} not found", id)))?;

    if !transition_allowed(load.lifecycle_status, payload.status) {
        return Err(AppError::Conflict(format!(
            "cannot move load from {:?} to {:?}",
            load.lifecycle_status, payload.status
        )));
    }

    load.lifecycle_status = payload.status;
    if payload.status == LifecycleStatus::Delivered {
        load.actual_delivery_at = Some(Utc::now());
    }

    let latest = state.latest_fix(&id);
    reclassify_load(&state, &mut load, latest.as_ref());

    Ok(Json(load.clone()))
}

fn transition_allowed(from: LifecycleStatus, to: LifecycleStatus) -> bool {
    use LifecycleStatus::*;

    matches!(
        (from, to),
        (AwaitingDate, AwaitingDriver)
            | (AwaitingDate, InTransit)
            | (AwaitingDate, Cancelled)
            | (AwaitingDriver, AwaitingDate)
            | (AwaitingDriver, InTransit)
            | (AwaitingDriver, Cancelled)
            | (InTransit, Delivered)
            | (InTransit, Cancelled)
    )
}

async fn get_load_progress(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Progress>, AppError> {
    let load = state
        .loads
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("load {} not found", id)))?;

    let latest = state.latest_fix(&id);
    let progress = estimate_progress(load.value(), latest.as_ref(), Utc::now());

    Ok(Json(progress))
}

async fn list_transitions(State(state): State<Arc<AppState>>) -> Json<Vec<StatusTransition>> {
    let mut transitions: Vec<StatusTransition> = state
        .transitions
        .iter()
        .map(|entry| entry.value().clone())
        .collect();
    transitions.sort_by_key(|transition| transition.occurred_at);

    Json(transitions)
}
