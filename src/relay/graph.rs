use petgraph::algo::dijkstra;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::ephemeris::SatelliteNode;
use crate::geo::distance_km;
use crate::relay::error::RelayError;

/// Distance reported for pairs beyond link range. Large but finite so sums
/// stay well-behaved.
pub const UNREACHABLE_KM: f64 = 1e10;

/// Satellite closest to a ground endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    pub index: usize,
    pub distance_km: f64,
}

/// Inter-satellite link graph at one instant.
///
/// Nodes keep their input order. Only pairs within `max_link_range_km` get an
/// edge, weighted by straight-line distance.
pub struct RelayGraph {
    graph: UnGraph<SatelliteNode, f64>,
    max_link_range_km: f64,
}

impl RelayGraph {
    pub fn build(nodes: Vec<SatelliteNode>, max_link_range_km: f64) -> Self {
        let mut graph = UnGraph::with_capacity(nodes.len(), nodes.len() * 4);
        for node in nodes {
            graph.add_node(node);
        }

        let count = graph.node_count();
        for i in 0..count {
            let a = NodeIndex::new(i);
            for j in (i + 1)..count {
                let b = NodeIndex::new(j);
                let d = distance_km(graph[a].position_km, graph[b].position_km);
                if d <= max_link_range_km {
                    graph.add_edge(a, b, d);
                }
            }
        }

        log::debug!(
            "Relay graph: {} nodes, {} links within {} km",
            graph.node_count(),
            graph.edge_count(),
            max_link_range_km
        );

        Self {
            graph,
            max_link_range_km,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn max_link_range_km(&self) -> f64 {
        self.max_link_range_km
    }

    pub fn node(&self, index: usize) -> Option<&SatelliteNode> {
        self.graph.node_weight(NodeIndex::new(index))
    }

    /// Link distance between two nodes: zero on the diagonal,
    /// [`UNREACHABLE_KM`] beyond link range.
    pub fn distance(&self, i: usize, j: usize) -> Result<f64, RelayError> {
        let a = self.node(i).ok_or(RelayError::UnknownNode(i))?;
        let b = self.node(j).ok_or(RelayError::UnknownNode(j))?;
        if i == j {
            return Ok(0.0);
        }
        let d = distance_km(a.position_km, b.position_km);
        Ok(if d <= self.max_link_range_km {
            d
        } else {
            UNREACHABLE_KM
        })
    }

    /// In-range neighbours of `index` with their link distances.
    pub fn links(&self, index: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let a = NodeIndex::new(index);
        self.graph.edges(a).map(move |e| {
            let other = if e.source() == a { e.target() } else { e.source() };
            (other.index(), *e.weight())
        })
    }

    /// Shortest routed distance from `source` to every node, or
    /// `f64::INFINITY` where no chain of links reaches it.
    pub fn distances_from(&self, source: usize) -> Vec<f64> {
        let mut distances = vec![f64::INFINITY; self.graph.node_count()];
        let costs = dijkstra(&self.graph, NodeIndex::new(source), None, |e| *e.weight());
        for (node, cost) in costs {
            distances[node.index()] = cost;
        }
        distances
    }

    /// Node closest to `position`. The first node wins ties.
    pub fn nearest(&self, position: [f64; 3]) -> Result<Nearest, RelayError> {
        let mut best: Option<Nearest> = None;
        for index in self.graph.node_indices() {
            let d = distance_km(self.graph[index].position_km, position);
            if best.map_or(true, |b| d < b.distance_km) {
                best = Some(Nearest {
                    index: index.index(),
                    distance_km: d,
                });
            }
        }
        best.ok_or(RelayError::NoRelayNodes)
    }
}
