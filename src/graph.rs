use crate::error::{SahgaError, SahgaResult};
use crate::table::ObservationTable;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::debug;

pub const EARTH_RADIUS_KM: f64 = 6378.160;

// Points table layout consumed by `create_mpg`.
pub const COL_ID: usize = 0;
pub const COL_LONGITUDE: usize = 1;
pub const COL_LATITUDE: usize = 2;
pub const COL_CLASS: usize = 3;

/// How edge weights were assigned when the graph was built.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum WeightingPolicy {
    #[default]
    Undefined,
    HalfRadius,
    InverseDistance,
    InverseSquaredDistance,
}

impl WeightingPolicy {
    /// Short tag written in MPG file headers.
    pub fn tag(&self) -> &'static str {
        match self {
            WeightingPolicy::Undefined => "",
            WeightingPolicy::HalfRadius => "R/2",
            WeightingPolicy::InverseDistance => "1/d",
            WeightingPolicy::InverseSquaredDistance => "1/(d^2)",
        }
    }

    /// Edge weight for a pair at `dist`, or `None` when no edge is created.
    pub fn weight(&self, dist: f64, radius: f64) -> Option<f64> {
        match self {
            WeightingPolicy::Undefined => None,
            WeightingPolicy::HalfRadius => {
                if dist <= radius / 2.0 {
                    Some(1.0)
                } else if dist <= radius {
                    Some(0.5)
                } else {
                    None
                }
            }
            WeightingPolicy::InverseDistance => (dist <= radius).then(|| 1.0 / dist),
            WeightingPolicy::InverseSquaredDistance => {
                (dist <= radius).then(|| 1.0 / (dist * dist))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Row index of the neighbor in the associated table.
    pub neighbor: usize,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// External observation id (1-based in files).
    pub id: u64,
    pub edges: Vec<Edge>,
}

impl Node {
    pub fn neighbor_count(&self) -> usize {
        self.edges.len()
    }
}

/// Planar distance between two (longitude, latitude) pairs in degrees,
/// scaled to kilometres along a great circle.
pub fn distance_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let degrees = ((lon2 - lon1).powi(2) + (lat2 - lat1).powi(2)).sqrt();
    degrees * std::f64::consts::PI * EARTH_RADIUS_KM / 180.0
}

/// Weighted proximity graph (MPG) linking observations of the same class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProximityGraph {
    pub policy: WeightingPolicy,
    pub nodes: Vec<Node>,
}

impl ProximityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(Node::neighbor_count).sum()
    }

    /// Builds the graph from a points table `[id, lon, lat, class, ..]`.
    ///
    /// Every node starts with a self-edge of weight 1.0, followed by edges to
    /// same-class rows in table order.
    pub fn create_mpg(
        table: &ObservationTable,
        radius: f64,
        policy: WeightingPolicy,
    ) -> SahgaResult<Self> {
        if table.cols() <= COL_CLASS {
            return Err(SahgaError::MalformedInput(format!(
                "points table needs at least {} columns (id, long, lat, class), got {}",
                COL_CLASS + 1,
                table.cols()
            )));
        }
        if !(radius > 0.0) {
            return Err(SahgaError::Config(format!(
                "radius must be positive, got {}",
                radius
            )));
        }

        let rows = table.rows();
        let mut nodes = Vec::with_capacity(rows);

        for i in 0..rows {
            let mut edges = vec![Edge {
                neighbor: i,
                weight: 1.0,
            }];
            let lon_i = table.at(i, COL_LONGITUDE);
            let lat_i = table.at(i, COL_LATITUDE);
            let class_i = table.at(i, COL_CLASS);

            for j in 0..rows {
                if i == j || table.at(j, COL_CLASS) != class_i {
                    continue;
                }
                let dist = distance_km(lon_i, lat_i, table.at(j, COL_LONGITUDE), table.at(j, COL_LATITUDE));
                if let Some(weight) = policy.weight(dist, radius) {
                    edges.push(Edge { neighbor: j, weight });
                }
            }

            nodes.push(Node {
                id: table.at(i, COL_ID) as u64,
                edges,
            });
        }

        let graph = Self { policy, nodes };
        debug!(
            "MPG built: {} nodes, {} edges (policy {}, radius {} km)",
            graph.len(),
            graph.edge_count(),
            policy,
            radius
        );
        Ok(graph)
    }

    /// Checks that the graph can be used to score `table`.
    pub fn validate_against(&self, table: &ObservationTable) -> SahgaResult<()> {
        if self.nodes.len() != table.rows() {
            return Err(SahgaError::MalformedInput(format!(
                "graph has {} nodes but table has {} rows",
                self.nodes.len(),
                table.rows()
            )));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            for edge in &node.edges {
                if edge.neighbor >= table.rows() {
                    return Err(SahgaError::MalformedInput(format!(
                        "node {} (row {}) links to row {} outside the table",
                        node.id, i, edge.neighbor
                    )));
                }
                if !edge.weight.is_finite() {
                    return Err(SahgaError::MalformedInput(format!(
                        "node {} (row {}) has non-finite edge weight",
                        node.id, i
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One degree of arc in km under the MPG distance.
    fn km_per_degree() -> f64 {
        distance_km(0.0, 0.0, 1.0, 0.0)
    }

    #[test]
    fn test_distance_scaling() {
        let d = distance_km(0.0, 0.0, 3.0, 4.0);
        assert!((d - 5.0 * km_per_degree()).abs() < 1e-9);
        assert!((km_per_degree() - 111.3196).abs() < 1e-3);
    }

    #[test]
    fn test_policy_weights() {
        assert_eq!(WeightingPolicy::HalfRadius.weight(5.0, 10.0), Some(1.0));
        assert_eq!(WeightingPolicy::HalfRadius.weight(7.0, 10.0), Some(0.5));
        assert_eq!(WeightingPolicy::HalfRadius.weight(10.0, 10.0), Some(0.5));
        assert_eq!(WeightingPolicy::HalfRadius.weight(10.1, 10.0), None);
        assert_eq!(WeightingPolicy::InverseDistance.weight(4.0, 10.0), Some(0.25));
        assert_eq!(
            WeightingPolicy::InverseSquaredDistance.weight(2.0, 10.0),
            Some(0.25)
        );
        assert_eq!(WeightingPolicy::Undefined.weight(0.1, 10.0), None);
    }

    #[test]
    fn test_create_mpg_respects_class_and_order() {
        let table = ObservationTable::from_rows(&[
            vec![1.0, 0.0, 0.0, 1.0],
            vec![2.0, 0.01, 0.0, 0.0],
            vec![3.0, 0.02, 0.0, 1.0],
            vec![4.0, 0.01, 0.0, 1.0],
        ])
        .unwrap();
        let g = ProximityGraph::create_mpg(&table, 10.0, WeightingPolicy::HalfRadius).unwrap();

        assert_eq!(g.len(), 4);
        let first = &g.nodes[0];
        assert_eq!(first.id, 1);
        assert_eq!(first.edges[0], Edge { neighbor: 0, weight: 1.0 });
        let neighbors: Vec<usize> = first.edges.iter().map(|e| e.neighbor).collect();
        // Row 1 is a different class; rows 2 then 3 follow table order.
        assert_eq!(neighbors, vec![0, 2, 3]);
        assert_eq!(g.nodes[1].neighbor_count(), 1);
        g.validate_against(&table).unwrap();
    }

    #[test]
    fn test_create_mpg_rejects_narrow_table() {
        let table = ObservationTable::from_rows(&[vec![1.0, 0.0, 0.0]]).unwrap();
        assert!(ProximityGraph::create_mpg(&table, 1.0, WeightingPolicy::HalfRadius).is_err());
    }

    #[test]
    fn test_validate_against_catches_mismatch() {
        let table = ObservationTable::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
        let mut g = ProximityGraph::new();
        g.insert(Node {
            id: 1,
            edges: vec![Edge { neighbor: 5, weight: 1.0 }],
        });
        assert!(g.validate_against(&table).is_err());
        g.insert(Node { id: 2, edges: vec![] });
        assert!(g.validate_against(&table).is_err());
        g.nodes[0].edges[0].neighbor = 1;
        g.validate_against(&table).unwrap();
    }

    #[test]
    fn test_policy_parses_from_cli_names() {
        use std::str::FromStr;
        assert_eq!(
            WeightingPolicy::from_str("half-radius").unwrap(),
            WeightingPolicy::HalfRadius
        );
        assert_eq!(
            WeightingPolicy::from_str("inverse-squared-distance").unwrap(),
            WeightingPolicy::InverseSquaredDistance
        );
    }
}
