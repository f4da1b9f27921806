mod gazetteer;
pub mod geojson;
mod point;

pub use gazetteer::{resolve_with_fallback, Gazetteer, LocationResolver};
pub use point::{distance_km, GeoPoint};
