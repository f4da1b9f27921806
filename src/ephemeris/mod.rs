mod error;
mod propagation;
mod tle_loader;
mod types;

pub use propagation::ground_track;
pub use tle_loader::Catalog;
pub use types::{SatelliteInfo, SatelliteNode};

#[cfg(test)]
pub(crate) use tle_loader::tests as fixtures;
