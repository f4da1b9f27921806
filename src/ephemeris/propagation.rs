use chrono::{DateTime, Duration, Utc};
use sgp4::{Constants, Elements};

use crate::ephemeris::error::CatalogError;
use crate::geo::GeoPoint;

/// Position source for a single orbiting object.
pub trait Ephemeris {
    /// Earth-fixed position in km.
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<[f64; 3], CatalogError>;

    /// Point directly beneath the object.
    fn subpoint_at(&self, timestamp: DateTime<Utc>) -> Result<GeoPoint, CatalogError> {
        let position = self.position_at(timestamp)?;
        Ok(GeoPoint::from_ecef_km(position))
    }
}

pub fn propagate_ecef(
    elements: &Elements,
    constants: &Constants,
    timestamp: DateTime<Utc>,
) -> Result<[f64; 3], CatalogError> {
    let minutes = elements
        .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
        .map_err(|e| CatalogError::Propagation(e.to_string()))?;

    let prediction = constants
        .propagate(minutes)
        .map_err(|e| CatalogError::Propagation(e.to_string()))?;

    let sidereal =
        sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&timestamp.naive_utc()));

    Ok(teme_to_ecef_position(prediction.position, sidereal))
}

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

/// Subpoints sampled over `[center - half_window, center + half_window)`,
/// as `[longitude, latitude]` with longitudes unwrapped across the
/// antimeridian.
pub fn ground_track<E: Ephemeris + ?Sized>(
    ephemeris: &E,
    center: DateTime<Utc>,
    half_window: Duration,
    step: Duration,
) -> Result<Vec<[f64; 2]>, CatalogError> {
    if step <= Duration::zero() {
        return Err(CatalogError::Propagation("ground track step must be positive".into()));
    }

    let end = center + half_window;
    let mut cursor = center - half_window;
    let mut longitudes = Vec::new();
    let mut latitudes = Vec::new();

    while cursor < end {
        let point = ephemeris.subpoint_at(cursor)?;
        if !point.is_finite() {
            return Err(CatalogError::NonFinite(cursor.to_rfc3339()));
        }
        longitudes.push(point.longitude_deg);
        latitudes.push(point.latitude_deg);
        cursor += step;
    }

    unwrap_longitudes(&mut longitudes);
    Ok(longitudes
        .into_iter()
        .zip(latitudes)
        .map(|(lon, lat)| [lon, lat])
        .collect())
}

/// Remove 360 degree jumps so consecutive samples differ by at most 180.
pub fn unwrap_longitudes(longitudes: &mut [f64]) {
    let mut offset = 0.0;
    for i in 1..longitudes.len() {
        let previous = longitudes[i - 1];
        let raw = longitudes[i] + offset;
        let delta = raw - previous;
        if delta > 180.0 {
            offset -= 360.0;
        } else if delta < -180.0 {
            offset += 360.0;
        }
        longitudes[i] += offset;
    }
}
