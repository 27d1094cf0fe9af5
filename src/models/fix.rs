use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::load::GeoPoint;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FixSource {
    TrackingApi,
    Manual,
}

/// One location sample reported for a load. Immutable once recorded; the
/// latest fix is always selected by `captured_at`, not by ingestion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpsFix {
    pub id: Uuid,
    pub load_id: Uuid,
    pub position: GeoPoint,
    pub speed_kmh: Option<f64>,
    pub accuracy_m: Option<f64>,
    pub captured_at: DateTime<Utc>,
    pub source: FixSource,
}
