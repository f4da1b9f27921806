//! Inter-satellite relay routing.
//!
//! A `RelayGraph` links every pair of satellites within link range at one
//! instant. `resolve_relay_path` runs Dijkstra from the satellite nearest
//! the source and walks predecessor links back from the satellite nearest
//! the destination.

mod error;
mod graph;
mod path;
mod planner;

pub use error::RelayError;
pub use path::{RelayPath, SPEED_OF_LIGHT_KM_S};
pub use planner::{plan_route, RelaySettings};
