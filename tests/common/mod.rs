#![allow(dead_code)]

use sahga::graph::{Edge, Node, ProximityGraph};
use sahga::rng::RandomSource;
use sahga::table::ObservationTable;

/// `n` observations with two covariates in [-1, 1] and presence where
/// `x1 + 0.5 * x2 > 0`.
pub fn separable_table(n: usize, seed: u64) -> ObservationTable {
    let mut rng = RandomSource::seeded(seed);
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|_| {
            let x1 = rng.uniform_in(-1.0, 1.0);
            let x2 = rng.uniform_in(-1.0, 1.0);
            let class = if x1 + 0.5 * x2 > 0.0 { 1.0 } else { 0.0 };
            vec![class, x1, x2]
        })
        .collect();
    ObservationTable::from_rows(&rows).unwrap()
}

/// Self-edge on every row plus a half-weight link to the next row of the
/// same class.
pub fn class_chain_graph(table: &ObservationTable) -> ProximityGraph {
    let mut graph = ProximityGraph::new();
    for i in 0..table.rows() {
        let mut edges = vec![Edge {
            neighbor: i,
            weight: 1.0,
        }];
        if let Some(j) = (i + 1..table.rows()).find(|&j| table.at(j, 0) == table.at(i, 0)) {
            edges.push(Edge {
                neighbor: j,
                weight: 0.5,
            });
        }
        graph.insert(Node {
            id: i as u64 + 1,
            edges,
        });
    }
    graph
}

pub fn separable_dataset(n: usize, seed: u64) -> (ProximityGraph, ObservationTable) {
    let table = separable_table(n, seed);
    let graph = class_chain_graph(&table);
    (graph, table)
}

/// Tab-separated points file: `n` points in a 0.2 degree box, present east
/// of longitude -47.1.
pub fn points_file(n: usize, seed: u64) -> String {
    let mut rng = RandomSource::seeded(seed);
    let mut out = String::from("id\tspecies\tlong\tlat\tclass\n");
    for i in 0..n {
        let lon = rng.uniform_in(-47.2, -47.0);
        let lat = rng.uniform_in(-15.2, -15.0);
        let class = if lon > -47.1 { 1 } else { 0 };
        out.push_str(&format!(
            "{}\tSpecies testii\t{:.5}\t{:.5}\t{}\n",
            i + 1,
            lon,
            lat,
            class
        ));
    }
    out
}

/// ESRI grid over lon [-47.5, -46.5], lat [-15.5, -14.5] at 0.05 degrees.
pub fn grid_file(value: impl Fn(usize, usize) -> f64) -> String {
    let (cols, rows) = (21, 21);
    let mut out = format!(
        "NCOLS {}\nNROWS {}\nXLLCORNER -47.5\nYLLCORNER -15.5\nCELLSIZE 0.05\nNODATA_VALUE -9999\n",
        cols, rows
    );
    for r in 0..rows {
        let line: Vec<String> = (0..cols).map(|c| value(r, c).to_string()).collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}
