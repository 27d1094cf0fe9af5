use chrono::{DateTime, Duration, Utc};

use crate::engine::progress::{percent_distance_covered, percent_time_elapsed};
use crate::models::fix::GpsFix;
use crate::models::load::{DeadlineStatus, LifecycleStatus, Load};

/// Width of the band, in percentage points, within which distance covered may
/// trail or lead the elapsed-time share and the load still counts as on time.
/// Landing exactly on either edge is on time.
pub const ON_TIME_TOLERANCE_PCT: i16 = 10;

/// Minimum margin before the promised delivery time for a delivered load to
/// count as early rather than merely on time.
pub const EARLY_DELIVERY_MARGIN_HOURS: i64 = 2;

/// Classifies a load against its delivery deadline.
///
/// Evaluated fresh on every call; the cached `deadline_status` on the load is
/// never consulted. Total over its input domain: missing data falls back to
/// the on-time default rather than erroring. Note that a missing route total
/// forces the covered percentage to 0, which biases in-transit loads toward
/// `Late` once more than the tolerance band of schedule time has elapsed.
pub fn classify_deadline_status(
    load: &Load,
    latest_fix: Option<&GpsFix>,
    now: DateTime<Utc>,
) -> DeadlineStatus {
    if load.lifecycle_status == LifecycleStatus::AwaitingDate {
        return DeadlineStatus::AwaitingDate;
    }

    if load.lifecycle_status == LifecycleStatus::Delivered {
        return match load.actual_delivery_at {
            Some(actual) => classify_delivered(actual, load.scheduled_delivery_at),
            None => DeadlineStatus::OnTime,
        };
    }

    // Not moving under tracking yet: no evidence to claim anything but on
    // time.
    let Some(fix) = latest_fix else {
        return DeadlineStatus::OnTime;
    };

    let covered = percent_distance_covered(load, fix) as i16;
    let elapsed = percent_time_elapsed(load, now) as i16;

    if covered > elapsed + ON_TIME_TOLERANCE_PCT {
        DeadlineStatus::Early
    } else if covered < elapsed - ON_TIME_TOLERANCE_PCT {
        DeadlineStatus::Late
    } else {
        DeadlineStatus::OnTime
    }
}

fn classify_delivered(actual: DateTime<Utc>, scheduled: DateTime<Utc>) -> DeadlineStatus {
    if actual > scheduled {
        return DeadlineStatus::Late;
    }

    if scheduled - actual >= Duration::hours(EARLY_DELIVERY_MARGIN_HOURS) {
        DeadlineStatus::Early
    } else {
        DeadlineStatus::OnTime
    }
}
