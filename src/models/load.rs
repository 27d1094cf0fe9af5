use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LifecycleStatus {
    AwaitingDate,
    AwaitingDriver,
    InTransit,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DeadlineStatus {
    OnTime,
    Late,
    Early,
    AwaitingDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Load {
    pub id: Uuid,
    pub reference: String,
    pub origin: Option<GeoPoint>,
    pub destination: Option<GeoPoint>,
    pub scheduled_pickup_at: DateTime<Utc>,
    pub scheduled_delivery_at: DateTime<Utc>,
    pub actual_delivery_at: Option<DateTime<Utc>>,
    pub total_route_distance_km: Option<f64>,
    pub lifecycle_status: LifecycleStatus,
    /// Derived cache of the classifier output. Never authoritative; kept for
    /// listing and audit, recomputed on every fix and lifecycle change.
    pub deadline_status: DeadlineStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
