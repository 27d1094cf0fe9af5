use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::load::DeadlineStatus;

/// Audit record for a deadline-status change, also broadcast to WebSocket
/// subscribers so callers can react (notify, re-render) on transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusTransition {
    pub id: Uuid,
    pub load_id: Uuid,
    pub from: DeadlineStatus,
    pub to: DeadlineStatus,
    pub occurred_at: DateTime<Utc>,
}
