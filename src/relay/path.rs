use serde::Serialize;

use crate::geo::geojson::{Feature, FeatureCollection, Geometry};
use crate::geo::GeoPoint;
use crate::relay::error::RelayError;
use crate::relay::graph::RelayGraph;

/// Speed of light in vacuum (km/s)
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Single-source shortest path tree.
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    source: usize,
    distances: Vec<f64>,
    predecessors: Vec<Option<usize>>,
}

impl ShortestPaths {
    /// Path length to `target`, `None` when unreachable.
    pub fn distance_to(&self, target: usize) -> Option<f64> {
        self.distances
            .get(target)
            .copied()
            .filter(|d| d.is_finite())
    }

    pub fn predecessor(&self, node: usize) -> Option<usize> {
        self.predecessors.get(node).copied().flatten()
    }

    /// Node indices from `target` back to the source, inclusive.
    pub fn route_to(&self, target: usize) -> Result<Vec<usize>, RelayError> {
        if self.distance_to(target).is_none() {
            return Err(RelayError::NoPath);
        }

        let mut route = vec![target];
        let mut current = target;
        while current != self.source {
            if route.len() > self.distances.len() {
                return Err(RelayError::NoPath);
            }
            current = self.predecessor(current).ok_or(RelayError::NoPath)?;
            route.push(current);
        }
        Ok(route)
    }
}

/// Dijkstra over the in-range links of `graph`.
///
/// Each reached node's predecessor is the neighbour on a shortest route to
/// it; equal candidates go to the lowest index.
pub fn shortest_paths(graph: &RelayGraph, source: usize) -> Result<ShortestPaths, RelayError> {
    let count = graph.node_count();
    if source >= count {
        return Err(RelayError::UnknownNode(source));
    }

    let distances = graph.distances_from(source);
    let predecessors = (0..count)
        .map(|node| {
            if node == source || !distances[node].is_finite() {
                return None;
            }
            graph
                .links(node)
                .filter(|&(prev, _)| distances[prev] < distances[node])
                .map(|(prev, weight)| (prev, distances[prev] + weight))
                .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0)))
                .map(|(prev, _)| prev)
        })
        .collect();

    Ok(ShortestPaths {
        source,
        distances,
        predecessors,
    })
}

/// Named ground location taking part in a query.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundEndpoint {
    pub name: String,
    pub location: GeoPoint,
}

/// Computed relay route.
#[derive(Debug, Clone, Serialize)]
pub struct RelayPath {
    pub name: String,
    /// `[longitude, latitude]` from destination to source
    pub coordinates: Vec<[f64; 2]>,
    /// Satellites visited, destination side first
    pub hops: Vec<String>,
    /// Length of each inter-satellite link along `hops`
    pub links_km: Vec<f64>,
    pub distance_km: f64,
    pub time_us: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathProperties {
    pub name: String,
    /// Total path length (km)
    pub distance: f64,
    /// Round-trip propagation time (microseconds)
    pub time: f64,
}

impl RelayPath {
    pub fn to_feature_collection(&self) -> FeatureCollection<PathProperties> {
        FeatureCollection::new(vec![Feature {
            properties: PathProperties {
                name: self.name.clone(),
                distance: self.distance_km,
                time: self.time_us,
            },
            geometry: Geometry::LineString {
                coordinates: self.coordinates.clone(),
            },
        }])
    }
}

/// Signal time for travelling `distance_km` there and back (microseconds).
pub fn round_trip_time_us(distance_km: f64, speed_of_light_km_s: f64) -> f64 {
    2.0 * distance_km / speed_of_light_km_s * 1_000_000.0
}

/// Route from `source` to `destination` through `graph`.
///
/// The search starts at the satellite nearest the source. Coordinates run
/// from the destination ground point, through each satellite subpoint, to
/// the source ground point.
pub fn resolve_relay_path(
    graph: &RelayGraph,
    source: &GroundEndpoint,
    destination: &GroundEndpoint,
    speed_of_light_km_s: f64,
) -> Result<RelayPath, RelayError> {
    let up = graph.nearest(source.location.position_ecef_km())?;
    let down = graph.nearest(destination.location.position_ecef_km())?;

    let paths = shortest_paths(graph, up.index)?;
    let relay_km = paths.distance_to(down.index).ok_or(RelayError::NoPath)?;
    let route = paths.route_to(down.index)?;

    let mut coordinates = Vec::with_capacity(route.len() + 2);
    let mut hops = Vec::with_capacity(route.len());
    let links_km = route
        .windows(2)
        .map(|pair| graph.distance(pair[0], pair[1]))
        .collect::<Result<Vec<_>, _>>()?;
    coordinates.push(destination.location.lon_lat());
    for index in route {
        let node = graph.node(index).ok_or(RelayError::UnknownNode(index))?;
        coordinates.push(node.subpoint.lon_lat());
        hops.push(node.info.name.clone());
    }
    coordinates.push(source.location.lon_lat());

    let distance_km = down.distance_km + relay_km + up.distance_km;

    log::debug!(
        "Relay {} -> {}: {} hops, {:.1} km",
        source.name,
        destination.name,
        hops.len(),
        distance_km
    );

    Ok(RelayPath {
        name: format!("{} to {}", source.name, destination.name),
        coordinates,
        hops,
        links_km,
        distance_km,
        time_us: round_trip_time_us(distance_km, speed_of_light_km_s),
    })
}
