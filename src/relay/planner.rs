use chrono::{DateTime, Utc};

use crate::ephemeris::Catalog;
use crate::geo::{resolve_with_fallback, LocationResolver};
use crate::relay::error::RelayError;
use crate::relay::graph::RelayGraph;
use crate::relay::path::{resolve_relay_path, GroundEndpoint, RelayPath};

/// Tunables for a relay query.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaySettings {
    pub max_link_range_km: f64,
    pub speed_of_light_km_s: f64,
    pub default_source: String,
    pub default_destination: String,
}

/// Resolve both endpoints, build the relay graph at `at` and route between
/// them.
///
/// Unknown place names fall back to the configured defaults. The endpoint
/// names in the result are the ones requested.
pub fn plan_route<R: LocationResolver + ?Sized>(
    catalog: &Catalog,
    resolver: &R,
    settings: &RelaySettings,
    from: &str,
    to: &str,
    at: DateTime<Utc>,
) -> Result<RelayPath, RelayError> {
    let source = resolve_endpoint(resolver, from, &settings.default_source)?;
    let destination = resolve_endpoint(resolver, to, &settings.default_destination)?;

    let graph = RelayGraph::build(catalog.snapshot(at), settings.max_link_range_km);
    if graph.is_empty() {
        return Err(RelayError::NoRelayNodes);
    }

    log::info!(
        "Routing {} -> {} over {} satellites ({} links <= {} km)",
        from,
        to,
        graph.node_count(),
        graph.link_count(),
        graph.max_link_range_km()
    );

    resolve_relay_path(&graph, &source, &destination, settings.speed_of_light_km_s)
}

fn resolve_endpoint<R: LocationResolver + ?Sized>(
    resolver: &R,
    name: &str,
    fallback: &str,
) -> Result<GroundEndpoint, RelayError> {
    let location = resolve_with_fallback(resolver, name, fallback)
        .ok_or_else(|| RelayError::UnknownLocation(fallback.to_string()))?;
    Ok(GroundEndpoint {
        name: name.to_string(),
        location,
    })
}
