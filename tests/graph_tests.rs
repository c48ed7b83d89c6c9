use rstest::rstest;
use sahga::graph::{distance_km, ProximityGraph, WeightingPolicy};
use sahga::table::ObservationTable;
use sahga::SahgaError;

/// Two same-class points 0.05 degrees apart plus one of the other class
/// sitting on top of the first.
fn pair_table() -> ObservationTable {
    ObservationTable::from_rows(&[
        vec![1.0, -47.0, -15.0, 1.0],
        vec![2.0, -46.95, -15.0, 1.0],
        vec![3.0, -47.0, -15.0, 0.0],
    ])
    .unwrap()
}

fn pair_distance() -> f64 {
    distance_km(-47.0, -15.0, -46.95, -15.0)
}

#[rstest]
#[case::exactly_half_radius(2.0, Some(1.0))]
#[case::between(1.5, Some(0.5))]
#[case::on_radius(1.0, Some(0.5))]
#[case::outside(0.9, None)]
fn test_half_radius_bands(#[case] radius_factor: f64, #[case] expected: Option<f64>) {
    let radius = radius_factor * pair_distance();
    let graph = ProximityGraph::create_mpg(&pair_table(), radius, WeightingPolicy::HalfRadius).unwrap();

    let first = &graph.nodes[0];
    assert_eq!(first.edges[0].neighbor, 0);
    assert_eq!(first.edges[0].weight, 1.0);
    let link = first.edges.iter().skip(1).find(|e| e.neighbor == 1).map(|e| e.weight);
    assert_eq!(link, expected);
    // Row 2 is co-located but belongs to the other class.
    assert!(first.edges.iter().all(|e| e.neighbor != 2));
    assert_eq!(graph.nodes[2].neighbor_count(), 1);
}

#[rstest]
#[case(WeightingPolicy::InverseDistance, 1.0)]
#[case(WeightingPolicy::InverseSquaredDistance, 2.0)]
fn test_inverse_policies(#[case] policy: WeightingPolicy, #[case] power: f64) {
    let d = pair_distance();
    let graph = ProximityGraph::create_mpg(&pair_table(), 10.0, policy).unwrap();

    let weight = graph.nodes[1].edges[1].weight;
    assert_eq!(graph.nodes[1].edges[1].neighbor, 0);
    assert!((weight - 1.0 / d.powf(power)).abs() < 1e-12);
    assert_eq!(graph.policy, policy);
}

#[test]
fn test_edges_are_symmetric_for_symmetric_policies() {
    let table = ObservationTable::from_rows(
        &(0..12)
            .map(|i| {
                let f = i as f64;
                vec![f + 1.0, -47.0 + 0.01 * f, -15.0 + 0.003 * (f * f), (i % 2) as f64]
            })
            .collect::<Vec<_>>(),
    )
    .unwrap();
    let graph = ProximityGraph::create_mpg(&table, 4.0, WeightingPolicy::HalfRadius).unwrap();

    for (i, node) in graph.nodes.iter().enumerate() {
        for edge in node.edges.iter().skip(1) {
            let back = graph.nodes[edge.neighbor]
                .edges
                .iter()
                .find(|e| e.neighbor == i)
                .map(|e| e.weight);
            assert_eq!(back, Some(edge.weight));
        }
    }
    graph.validate_against(&table).unwrap();
}

#[test]
fn test_rejects_bad_arguments() {
    let narrow = ObservationTable::from_rows(&[vec![1.0, 0.0, 0.0], vec![2.0, 0.1, 0.0]]).unwrap();
    assert!(matches!(
        ProximityGraph::create_mpg(&narrow, 5.0, WeightingPolicy::HalfRadius),
        Err(SahgaError::MalformedInput(_))
    ));
    assert!(matches!(
        ProximityGraph::create_mpg(&pair_table(), 0.0, WeightingPolicy::HalfRadius),
        Err(SahgaError::Config(_))
    ));
}

#[test]
fn test_coincident_points_fail_validation_under_inverse_weights() {
    let table = ObservationTable::from_rows(&[
        vec![1.0, -47.0, -15.0, 1.0],
        vec![2.0, -47.0, -15.0, 1.0],
    ])
    .unwrap();
    let graph = ProximityGraph::create_mpg(&table, 5.0, WeightingPolicy::InverseDistance).unwrap();
    assert!(matches!(
        graph.validate_against(&table),
        Err(SahgaError::MalformedInput(_))
    ));
}
