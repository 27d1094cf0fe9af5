use chrono::{DateTime, Duration, Utc};

use crate::engine::status::classify_deadline_status;
use crate::geo::distance_km;
use crate::models::fix::GpsFix;
use crate::models::load::{DeadlineStatus, Load};
use crate::models::progress::Progress;

/// Snapshot of distance and schedule progress for a load at `now`.
///
/// Total over its whole input domain: missing coordinates or route distance
/// degrade to zero-valued figures, and a load with no fix yet reports zero
/// progress and an on-time status no matter how much of the window has
/// elapsed. Progress is derived from remaining distance to the destination,
/// not from an odometer, so a later fix can lower the percentage.
pub fn estimate_progress(load: &Load, latest_fix: Option<&GpsFix>, now: DateTime<Utc>) -> Progress {
    let time_elapsed = (now - load.scheduled_pickup_at).max(Duration::zero());
    let time_remaining = (load.scheduled_delivery_at - now).max(Duration::zero());
    let pct_time = percent_time_elapsed(load, now);

    let Some(fix) = latest_fix else {
        return Progress {
            percent_distance_covered: 0,
            percent_time_elapsed: pct_time,
            distance_covered_km: 0.0,
            distance_remaining_km: effective_route_distance_km(load),
            time_elapsed,
            time_remaining,
            deadline_status: DeadlineStatus::OnTime,
        };
    };

    let distance_remaining_km = remaining_distance_km(load, fix);
    let effective_total = effective_route_distance_km(load);

    Progress {
        percent_distance_covered: percent_distance_covered(load, fix),
        percent_time_elapsed: pct_time,
        distance_covered_km: (effective_total - distance_remaining_km).max(0.0),
        distance_remaining_km,
        time_elapsed,
        time_remaining,
        deadline_status: classify_deadline_status(load, Some(fix), now),
    }
}

/// Authoritative route length when the precomputed value is present and
/// positive, else the straight-line origin-destination estimate, else 0.
pub fn effective_route_distance_km(load: &Load) -> f64 {
    match load.total_route_distance_km {
        Some(total) if total > 0.0 => total,
        _ => match (&load.origin, &load.destination) {
            (Some(origin), Some(destination)) => distance_km(origin, destination),
            _ => 0.0,
        },
    }
}

pub(crate) fn percent_time_elapsed(load: &Load, now: DateTime<Utc>) -> u8 {
    let elapsed = (now - load.scheduled_pickup_at).max(Duration::zero());
    // Denominator floored at 1ms so an equal or inverted window cannot divide
    // by zero.
    let total =
        (load.scheduled_delivery_at - load.scheduled_pickup_at).max(Duration::milliseconds(1));

    ratio_percent(
        elapsed.num_milliseconds() as f64,
        total.num_milliseconds() as f64,
    )
}

pub(crate) fn percent_distance_covered(load: &Load, fix: &GpsFix) -> u8 {
    let total = effective_route_distance_km(load);
    if total <= 0.0 {
        return 0;
    }

    ratio_percent(total - remaining_distance_km(load, fix), total)
}

fn remaining_distance_km(load: &Load, fix: &GpsFix) -> f64 {
    match &load.destination {
        Some(destination) => distance_km(&fix.position, destination),
        None => 0.0,
    }
}

fn ratio_percent(part: f64, whole: f64) -> u8 {
    ((part / whole) * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    use super::estimate_progress;
    use crate::models::fix::{FixSource, GpsFix};
    use crate::models::load::{DeadlineStatus, GeoPoint, LifecycleStatus, Load};

    const KM_PER_DEGREE_AT_EQUATOR: f64 = 111.194_926_6;

    fn pickup_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn load(route_km: Option<f64>, origin: Option<GeoPoint>, destination: Option<GeoPoint>) -> Load {
        Load {
            id: Uuid::from_u128(1),
            reference: "CARGA-0001".to_string(),
            origin,
            destination,
            scheduled_pickup_at: pickup_time(),
            scheduled_delivery_at: pickup_time() + Duration::hours(24),
            actual_delivery_at: None,
            total_route_distance_km: route_km,
            lifecycle_status: LifecycleStatus::InTransit,
            deadline_status: DeadlineStatus::OnTime,
            created_at: pickup_time(),
            updated_at: pickup_time(),
        }
    }

    fn fix_at(lat: f64, lng: f64) -> GpsFix {
        GpsFix {
            id: Uuid::from_u128(2),
            load_id: Uuid::from_u128(1),
            position: GeoPoint { lat, lng },
            speed_kmh: None,
            accuracy_m: None,
            captured_at: pickup_time() + Duration::hours(12),
            source: FixSource::TrackingApi,
        }
    }

    fn fix_km_before(destination: &GeoPoint, km: f64) -> GpsFix {
        fix_at(0.0, destination.lng - km / KM_PER_DEGREE_AT_EQUATOR)
    }

    #[test]
    fn no_fix_reports_zero_progress_and_on_time() {
        let load = load(Some(500.0), None, None);
        let long_after_deadline = pickup_time() + Duration::days(10);

        let progress = estimate_progress(&load, None, long_after_deadline);

        assert_eq!(progress.percent_distance_covered, 0);
        assert_eq!(progress.distance_covered_km, 0.0);
        assert_eq!(progress.distance_remaining_km, 500.0);
        assert_eq!(progress.percent_time_elapsed, 100);
        assert_eq!(progress.deadline_status, DeadlineStatus::OnTime);
    }

    #[test]
    fn fix_at_destination_with_fallback_distance_reaches_100_percent() {
        let origin = GeoPoint { lat: 0.0, lng: 0.0 };
        let destination = GeoPoint { lat: 0.0, lng: 1.0 };
        let load = load(None, Some(origin), Some(destination));
        let fix = fix_at(0.0, 1.0);

        let progress = estimate_progress(&load, Some(&fix), pickup_time() + Duration::hours(12));

        assert_eq!(progress.distance_remaining_km, 0.0);
        assert_eq!(progress.percent_distance_covered, 100);
        assert_eq!(progress.distance_covered_km, 111.19);
    }

    #[test]
    fn fix_beyond_destination_clamps_to_zero_not_negative() {
        let origin = GeoPoint { lat: 0.0, lng: 0.0 };
        let destination = GeoPoint { lat: 0.0, lng: 1.0 };
        let load = load(None, Some(origin), Some(destination));
        // Five degrees past the destination along the same bearing: remaining
        // distance exceeds the total, so the raw ratio is negative.
        let fix = fix_at(0.0, 6.0);

        let progress = estimate_progress(&load, Some(&fix), pickup_time() + Duration::hours(12));

        assert!(progress.distance_remaining_km > 111.19);
        assert_eq!(progress.percent_distance_covered, 0);
        assert_eq!(progress.distance_covered_km, 0.0);
    }

    #[test]
    fn zero_length_window_does_not_divide_by_zero() {
        let mut load = load(Some(500.0), None, None);
        load.scheduled_delivery_at = load.scheduled_pickup_at;

        let progress = estimate_progress(&load, None, pickup_time() + Duration::hours(1));

        assert_eq!(progress.percent_time_elapsed, 100);
        assert_eq!(progress.time_remaining, Duration::zero());
    }

    #[test]
    fn time_percent_clamps_before_pickup_and_after_deadline() {
        let load = load(Some(500.0), None, None);

        let before = estimate_progress(&load, None, pickup_time() - Duration::hours(3));
        assert_eq!(before.percent_time_elapsed, 0);
        assert_eq!(before.time_elapsed, Duration::zero());

        let after = estimate_progress(&load, None, pickup_time() + Duration::hours(48));
        assert_eq!(after.percent_time_elapsed, 100);
        assert_eq!(after.time_remaining, Duration::zero());
    }

    #[test]
    fn unknown_destination_degrades_to_zero_remaining() {
        let load = load(Some(500.0), Some(GeoPoint { lat: 0.0, lng: 0.0 }), None);
        let fix = fix_at(0.0, 0.5);

        let progress = estimate_progress(&load, Some(&fix), pickup_time() + Duration::hours(12));

        assert_eq!(progress.distance_remaining_km, 0.0);
        assert_eq!(progress.percent_distance_covered, 100);
    }

    #[test]
    fn missing_total_distance_forces_zero_percent_covered() {
        // No route figure and no origin: the effective total is 0 and the
        // covered percentage stays 0 even with a fix far from the destination.
        let load = load(None, None, Some(GeoPoint { lat: 0.0, lng: 10.0 }));
        let fix = fix_at(0.0, 5.0);

        let progress = estimate_progress(&load, Some(&fix), pickup_time() + Duration::hours(12));

        assert_eq!(progress.percent_distance_covered, 0);
        assert!(progress.distance_remaining_km > 0.0);
    }

    #[test]
    fn halfway_through_schedule_with_300_of_500_km_covered() {
        let destination = GeoPoint { lat: 0.0, lng: 10.0 };
        let load = load(
            Some(500.0),
            Some(GeoPoint { lat: 0.0, lng: 0.0 }),
            Some(destination),
        );
        let fix = fix_km_before(&destination, 200.0);

        let progress = estimate_progress(&load, Some(&fix), pickup_time() + Duration::hours(12));

        assert_eq!(progress.percent_time_elapsed, 50);
        assert_eq!(progress.distance_remaining_km, 200.0);
        assert_eq!(progress.distance_covered_km, 300.0);
        assert_eq!(progress.percent_distance_covered, 60);
        assert_eq!(progress.deadline_status, DeadlineStatus::OnTime);
    }

    #[test]
    fn later_fix_farther_away_lowers_the_percentage() {
        // Remaining-distance progress is not monotonic: an off-route or
        // backtracking fix legitimately lowers the figure.
        let destination = GeoPoint { lat: 0.0, lng: 10.0 };
        let load = load(
            Some(500.0),
            Some(GeoPoint { lat: 0.0, lng: 0.0 }),
            Some(destination),
        );
        let now = pickup_time() + Duration::hours(12);

        let close = fix_km_before(&destination, 100.0);
        let farther = fix_km_before(&destination, 250.0);

        let first = estimate_progress(&load, Some(&close), now);
        let second = estimate_progress(&load, Some(&farther), now);

        assert_eq!(first.percent_distance_covered, 80);
        assert_eq!(second.percent_distance_covered, 50);
        assert!(second.percent_distance_covered < first.percent_distance_covered);
    }
}
