//! Circular geofence evaluation for check-in/check-out gating.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, as used by the haversine formula.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A device location fix. Immutable once read from the location provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// Reported horizontal accuracy of the fix, in meters.
    #[serde(default)]
    pub accuracy_m: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_m: 0.0,
        }
    }
}

/// A named approved location. Static configuration; radius must be positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedZone {
    pub name: String,
    pub center: Coordinate,
    pub radius_m: u32,
}

impl AllowedZone {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64, radius_m: u32) -> Self {
        Self {
            name: name.into(),
            center: Coordinate::new(latitude, longitude),
            radius_m,
        }
    }
}

/// Outcome of matching a fix against the allowed zones. Recomputed on every
/// location update, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceResult {
    pub is_valid: bool,
    pub matched_zone: Option<AllowedZone>,
    pub distance_m: Option<f64>,
}

impl GeofenceResult {
    fn outside() -> Self {
        Self {
            is_valid: false,
            matched_zone: None,
            distance_m: None,
        }
    }
}

/// Great-circle distance between two points in meters (haversine).
pub fn haversine_distance_m(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Match a fix against the zone list. The first zone (in list order) whose
/// radius contains the point wins; the reported distance is to that zone only.
/// NaN coordinates propagate — callers must guard malformed input.
pub fn evaluate(point: &Coordinate, zones: &[AllowedZone]) -> GeofenceResult {
    for zone in zones {
        let distance = haversine_distance_m(point, &zone.center);
        if distance <= f64::from(zone.radius_m) {
            return GeofenceResult {
                is_valid: true,
                matched_zone: Some(zone.clone()),
                distance_m: Some(distance),
            };
        }
    }
    GeofenceResult::outside()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office_zone() -> AllowedZone {
        AllowedZone::new("Head office", 16.063_462_3, 108.170_192, 300)
    }

    #[test]
    fn point_at_zone_center_is_valid_with_zero_distance() {
        let result = evaluate(&Coordinate::new(16.063_462_3, 108.170_192), &[office_zone()]);
        assert!(result.is_valid);
        assert_eq!(result.matched_zone.unwrap().name, "Head office");
        assert!(result.distance_m.unwrap() < 1e-6);
    }

    #[test]
    fn point_a_kilometer_away_is_rejected() {
        // ~0.009 degrees of latitude is roughly 1000 m
        let point = Coordinate::new(16.063_462_3 + 0.009, 108.170_192);
        let result = evaluate(&point, &[office_zone()]);
        assert!(!result.is_valid);
        assert!(result.matched_zone.is_none());
        assert!(result.distance_m.is_none());
    }

    #[test]
    fn haversine_is_symmetric() {
        let pairs = [
            (Coordinate::new(16.0634, 108.1702), Coordinate::new(16.0712, 108.2231)),
            (Coordinate::new(0.0, 0.0), Coordinate::new(-33.8688, 151.2093)),
            (Coordinate::new(89.9, 12.0), Coordinate::new(-89.9, -170.0)),
        ];
        for (a, b) in pairs {
            let forward = haversine_distance_m(&a, &b);
            let backward = haversine_distance_m(&b, &a);
            assert!((forward - backward).abs() < 1e-9, "{forward} != {backward}");
        }
    }

    #[test]
    fn first_matching_zone_wins_over_closer_later_zone() {
        let point = Coordinate::new(16.0634, 108.1702);
        let far_but_first = AllowedZone::new("wide", 16.0700, 108.1702, 2000);
        let near_but_second = AllowedZone::new("narrow", 16.0634, 108.1702, 2000);
        let result = evaluate(&point, &[far_but_first.clone(), near_but_second]);
        assert_eq!(result.matched_zone.unwrap().name, "wide");
    }

    #[test]
    fn empty_zone_list_never_matches() {
        let result = evaluate(&Coordinate::new(16.0, 108.0), &[]);
        assert!(!result.is_valid);
    }
}
