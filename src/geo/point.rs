use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// WGS-84 constants
pub const WGS84_A_KM: f64 = 6378.137;
pub const WGS84_E2: f64 = 0.00669437999014;

const GEODETIC_ITERATIONS: usize = 6;

/// A point on the WGS-84 ellipsoid surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl GeoPoint {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }

    /// Parse `"lat,lon"` in degrees. Out-of-range values are rejected.
    pub fn from_coordinates(coordinates: &str) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return None;
        }
        let lat: f64 = parts[0].parse().ok()?;
        let lon: f64 = parts[1].parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self::new(lat, lon))
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    /// GeoJSON ordering: `[longitude, latitude]`.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude_deg, self.latitude_deg]
    }

    pub fn is_finite(&self) -> bool {
        self.latitude_deg.is_finite() && self.longitude_deg.is_finite()
    }

    /// Earth-fixed position at zero altitude.
    pub fn position_ecef_km(&self) -> [f64; 3] {
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        [
            n * cos_lat * lon.cos(),
            n * cos_lat * lon.sin(),
            n * (1.0 - WGS84_E2) * sin_lat,
        ]
    }

    /// Geodetic point directly beneath an Earth-fixed position.
    pub fn from_ecef_km(position: [f64; 3]) -> Self {
        let [x, y, z] = position;
        let p = (x * x + y * y).sqrt();
        let longitude = y.atan2(x);

        let mut latitude = z.atan2(p * (1.0 - WGS84_E2));
        for _ in 0..GEODETIC_ITERATIONS {
            let sin_lat = latitude.sin();
            let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
            latitude = (z + WGS84_E2 * n * sin_lat).atan2(p);
        }

        Self::new(latitude.to_degrees(), longitude.to_degrees())
    }
}

pub fn distance_km(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}
