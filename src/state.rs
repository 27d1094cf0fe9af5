use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::models::fix::GpsFix;
use crate::models::load::Load;
use crate::models::transition::StatusTransition;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub loads: DashMap<Uuid, Load>,
    pub fixes: DashMap<Uuid, Vec<GpsFix>>,
    pub transitions: DashMap<Uuid, StatusTransition>,
    pub fix_tx: mpsc::Sender<GpsFix>,
    pub status_events_tx: broadcast::Sender<StatusTransition>,
    pub auto_deliver_radius_km: f64,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        fix_queue_size: usize,
        event_buffer_size: usize,
        auto_deliver_radius_km: f64,
    ) -> (Self, mpsc::Receiver<GpsFix>) {
        let (fix_tx, fix_rx) = mpsc::channel(fix_queue_size);
        let (status_events_tx, _unused_rx) = broadcast::channel(event_buffer_size);

        (
            Self {
                loads: DashMap::new(),
                fixes: DashMap::new(),
                transitions: DashMap::new(),
                fix_tx,
                status_events_tx,
                auto_deliver_radius_km,
                metrics: Metrics::new(),
            },
            fix_rx,
        )
    }

    /// Latest known position for a load, selected by capture time. Fixes can
    /// arrive out of order, so ingestion order is not trusted.
    pub fn latest_fix(&self, load_id: &Uuid) -> Option<GpsFix> {
        self.fixes
            .get(load_id)
            .and_then(|history| history.iter().max_by_key(|fix| fix.captured_at).cloned())
    }
}
