use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod tracker;

pub use tracker::{LocationTracker, DEFAULT_POLL_INTERVAL};

use crate::error::Result;
use crate::geofence::{Coordinate, GeofenceResult};

/// Device location services, outside the crate.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// A fresh fix, or `None` when the device cannot produce one right now.
    async fn current_location(&self) -> Result<Option<Coordinate>>;

    /// Human-readable address for a fix. `None` falls back to the raw
    /// coordinate string.
    async fn reverse_geocode(&self, _point: &Coordinate) -> Option<String> {
        None
    }
}

/// A location reading with its geofence verdict, recomputed on every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFix {
    pub coordinate: Coordinate,
    pub address: Option<String>,
    pub geofence: GeofenceResult,
    pub acquired_at: DateTime<Utc>,
}

impl LocationFix {
    /// Address when known, otherwise the coordinate-derived fallback string.
    pub fn location_text(&self) -> String {
        match &self.address {
            Some(address) if !address.trim().is_empty() => address.clone(),
            _ => format!(
                "Lat: {:.5}, Lng: {:.5}",
                self.coordinate.latitude, self.coordinate.longitude
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geofence::evaluate;

    #[test]
    fn location_text_falls_back_to_coordinates() {
        let coordinate = Coordinate::new(16.063_462_3, 108.170_192);
        let fix = LocationFix {
            coordinate,
            address: None,
            geofence: evaluate(&coordinate, &[]),
            acquired_at: Utc::now(),
        };
        assert_eq!(fix.location_text(), "Lat: 16.06346, Lng: 108.17019");

        let with_address = LocationFix {
            address: Some("16 Ly Thuong Kiet".to_string()),
            ..fix
        };
        assert_eq!(with_address.location_text(), "16 Ly Thuong Kiet");
    }
}
