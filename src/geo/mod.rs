use crate::models::load::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Great-circle distance in km, rounded to 2 decimal places.
///
/// Total over finite input: no range validation is performed here, so
/// out-of-range coordinates yield numerically valid but meaningless results.
/// Callers that accept untrusted coordinates gate them with [`in_bounds`].
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().asin();

    round_2dp(EARTH_RADIUS_KM * central_angle)
}

pub fn in_bounds(point: &GeoPoint) -> bool {
    (-90.0..=90.0).contains(&point.lat) && (-180.0..=180.0).contains(&point.lng)
}

fn round_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{distance_km, in_bounds};
    use crate::models::load::GeoPoint;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint { lat, lng }
    }

    #[test]
    fn zero_distance_for_same_point() {
        let p = point(53.5511, 9.9937);
        assert_eq!(distance_km(&p, &p), 0.0);
    }

    #[test]
    fn symmetric_in_its_arguments() {
        let sao_paulo = point(-23.5505, -46.6333);
        let curitiba = point(-25.4284, -49.2733);
        assert_eq!(
            distance_km(&sao_paulo, &curitiba),
            distance_km(&curitiba, &sao_paulo)
        );
    }

    #[test]
    fn london_to_paris_is_around_343_km() {
        let london = point(51.5074, -0.1278);
        let paris = point(48.8566, 2.3522);
        let distance = distance_km(&london, &paris);
        assert!((distance - 343.0).abs() < 5.0);
    }

    #[test]
    fn one_degree_of_longitude_at_the_equator() {
        let distance = distance_km(&point(0.0, 0.0), &point(0.0, 1.0));
        assert_eq!(distance, 111.19);
    }

    #[test]
    fn result_is_rounded_to_two_decimals() {
        let distance = distance_km(&point(0.0, 0.0), &point(0.003, 0.004));
        assert_eq!(distance, (distance * 100.0).round() / 100.0);
    }

    #[test]
    fn triangle_inequality_holds_along_a_route() {
        let a = point(-23.5505, -46.6333);
        let b = point(-24.5, -48.0);
        let c = point(-25.4284, -49.2733);
        assert!(distance_km(&a, &c) <= distance_km(&a, &b) + distance_km(&b, &c) + 0.01);
    }

    #[test]
    fn bounds_check_rejects_out_of_range_coordinates() {
        assert!(in_bounds(&point(-23.55, -46.63)));
        assert!(in_bounds(&point(90.0, 180.0)));
        assert!(!in_bounds(&point(90.01, 0.0)));
        assert!(!in_bounds(&point(0.0, -180.5)));
    }
}
