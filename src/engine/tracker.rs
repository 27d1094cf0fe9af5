use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::engine::progress::estimate_progress;
use crate::engine::status::classify_deadline_status;
use crate::error::AppError;
use crate::geo::distance_km;
use crate::models::fix::GpsFix;
use crate::models::load::{LifecycleStatus, Load};
use crate::models::transition::StatusTransition;
use crate::state::AppState;

pub async fn run_tracking_engine(state: Arc<AppState>, mut fix_rx: mpsc::Receiver<GpsFix>) {
    info!("tracking engine started");

    while let Some(fix) = fix_rx.recv().await {
        state.metrics.fixes_in_queue.dec();

        let start = Instant::now();
        match process_fix(&state, fix) {
            Ok(()) => {
                let elapsed = start.elapsed().as_secs_f64();
                state
                    .metrics
                    .fix_processing_seconds
                    .with_label_values(&["success"])
                    .observe(elapsed);
                state
                    .metrics
                    .fixes_total
                    .with_label_values(&["success"])
                    .inc();
            }
            Err(err) => {
                let elapsed = start.elapsed().as_secs_f64();
                state
                    .metrics
                    .fix_processing_seconds
                    .with_label_values(&["error"])
                    .observe(elapsed);
                state
                    .metrics
                    .fixes_total
                    .with_label_values(&["error"])
                    .inc();
                error!(error = %err, "failed to process gps fix");
            }
        }
    }

    warn!("tracking engine stopped: fix channel closed");
}

fn process_fix(state: &AppState, fix: GpsFix) -> Result<(), AppError> {
    let mut load = state
        .loads
        .get_mut(&fix.load_id)
        .ok_or_else(|| AppError::NotFound(format!("load {} not found", fix.load_id)))?;

    // The fix was appended to history on ingestion; select the latest by
    // capture time rather than trusting arrival order.
    let latest = state.latest_fix(&fix.load_id);

    if load.lifecycle_status == LifecycleStatus::InTransit {
        if let (Some(latest), Some(destination)) = (latest.as_ref(), load.destination.as_ref()) {
            if distance_km(&latest.position, destination) <= state.auto_deliver_radius_km {
                load.lifecycle_status = LifecycleStatus::Delivered;
                load.actual_delivery_at = Some(latest.captured_at);
                info!(load_id = %load.id, "load delivered on arrival at destination");
            }
        }
    }

    reclassify_load(state, &mut load, latest.as_ref());

    let progress = estimate_progress(&load, latest.as_ref(), Utc::now());
    state
        .metrics
        .load_progress_percent
        .with_label_values(&[&load.id.to_string()])
        .set(f64::from(progress.percent_distance_covered));

    Ok(())
}

/// Recomputes the derived deadline status from the latest fix, writes it back
/// onto the load and, when it changed, records and broadcasts the transition.
/// Every write of the derived status flows through here so concurrent updates
/// for a load serialize on its map entry.
pub fn reclassify_load(state: &AppState, load: &mut Load, latest_fix: Option<&GpsFix>) {
    let now = Utc::now();
    let previous = load.deadline_status;
    let current = classify_deadline_status(load, latest_fix, now);

    load.deadline_status = current;
    load.updated_at = now;

    if previous == current {
        return;
    }

    let transition = StatusTransition {
        id: Uuid::new_v4(),
        load_id: load.id,
        from: previous,
        to: current,
        occurred_at: now,
    };

    state.transitions.insert(transition.id, transition.clone());
    let _ = state.status_events_tx.send(transition);

    info!(
        load_id = %load.id,
        from = ?previous,
        to = ?current,
        "deadline status changed"
    );
}
