use serde::Serialize;
use utoipa::ToSchema;

use crate::geo::GeoPoint;

/// Information about a single satellite from TLE
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SatelliteInfo {
    pub name: String,
    pub norad_id: u32,
    pub tle_source: String,
}

/// A satellite observed at one instant.
#[derive(Debug, Clone)]
pub struct SatelliteNode {
    pub info: SatelliteInfo,
    /// Earth-fixed position (km)
    pub position_km: [f64; 3],
    pub subpoint: GeoPoint,
}

impl SatelliteNode {
    pub fn is_finite(&self) -> bool {
        self.position_km.iter().all(|c| c.is_finite()) && self.subpoint.is_finite()
    }
}
