use chrono::Duration;
use serde::{Serialize, Serializer};

use crate::models::load::DeadlineStatus;

/// Snapshot of how far along a load is, in distance and in schedule time.
/// Percentages are already clamped to 0..=100.
#[derive(Debug, Clone, Serialize)]
pub struct Progress {
    pub percent_distance_covered: u8,
    pub percent_time_elapsed: u8,
    pub distance_covered_km: f64,
    pub distance_remaining_km: f64,
    #[serde(serialize_with = "duration_secs")]
    pub time_elapsed: Duration,
    #[serde(serialize_with = "duration_secs")]
    pub time_remaining: Duration,
    pub deadline_status: DeadlineStatus,
}

fn duration_secs<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(value.num_seconds())
}
