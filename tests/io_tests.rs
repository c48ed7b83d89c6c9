mod common;

use common::{grid_file, points_file};
use sahga::config::{GasaConfig, ModelType, Objective};
use sahga::graph::{ProximityGraph, WeightingPolicy};
use sahga::io::{
    merge_layer_data, read_graph_table, read_layer_data, read_mpg, read_points, read_result,
    write_graph_table, write_layer_data, write_mpg, write_result, Layer,
};
use sahga::optimizer::Gasa;
use sahga::SahgaError;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::tempdir;

fn write_with<F>(path: &Path, body: F)
where
    F: FnOnce(&mut BufWriter<File>),
{
    let mut w = BufWriter::new(File::create(path).unwrap());
    body(&mut w);
    w.flush().unwrap();
}

fn layers() -> Vec<Layer> {
    let bio1 = grid_file(|r, c| (r * 21 + c) as f64);
    let bio2 = grid_file(|r, c| 10.0 + 0.5 * c as f64 - 0.25 * r as f64);
    vec![
        Layer::from_reader("bio1".into(), bio1.as_bytes()).unwrap(),
        Layer::from_reader("bio2".into(), bio2.as_bytes()).unwrap(),
    ]
}

#[test]
fn test_file_pipeline_end_to_end() {
    let dir = tempdir().unwrap();
    let points_path = dir.path().join("points.txt");
    fs::write(&points_path, points_file(40, 5)).unwrap();

    // Points and MPG.
    let points = read_points(&points_path).unwrap();
    assert_eq!((points.rows(), points.cols()), (40, 4));

    let graph = ProximityGraph::create_mpg(&points, 5.0, WeightingPolicy::HalfRadius).unwrap();
    let mpg_path = dir.path().join("points.mpg.txt");
    write_with(&mpg_path, |w| write_mpg(&graph, "points.txt", 5.0, w).unwrap());
    let reloaded = read_mpg(&mpg_path).unwrap();
    assert_eq!(reloaded.nodes, graph.nodes);
    assert_eq!(reloaded.policy, WeightingPolicy::Undefined);

    // Layer sampling.
    let data_path = dir.path().join("points.data.txt");
    write_with(&data_path, |w| {
        write_layer_data(&points, &layers(), "points.txt", w).unwrap()
    });
    let layer_data = read_layer_data(&data_path).unwrap();
    assert_eq!((layer_data.rows(), layer_data.cols()), (40, 6));
    assert!(layer_data.column(4).iter().all(|&v| v != -9999.0));

    // Merge and reload the combined file.
    let merged = merge_layer_data(&reloaded, &layer_data).unwrap();
    assert_eq!(merged.cols(), 3);
    assert_eq!(merged.column(0), points.column(3));
    let combined_path = dir.path().join("points.gt.txt");
    write_with(&combined_path, |w| write_graph_table(&reloaded, &merged, w).unwrap());
    let header = fs::read_to_string(&combined_path).unwrap();
    assert!(header.starts_with("40;3\n"));

    let (graph, mut table) = read_graph_table(&combined_path).unwrap();
    assert_eq!(table, merged);
    table.update_stats().unwrap();
    let (means, std_devs) = (table.means(), table.std_devs());
    table.normalize(true).unwrap();

    // Fit, save and score the saved model.
    let config = GasaConfig::builder()
        .model(ModelType::Linear)
        .objective(Objective::MinBoth)
        .population_size(20)
        .max_generations(2)
        .max_iterations(3)
        .seed(17)
        .build();
    let outcome = Gasa::new(&table, &graph, config).unwrap().run().unwrap();

    let result_path = dir.path().join("points.result.txt");
    write_with(&result_path, |w| {
        write_result(&outcome, &means, &std_devs, "points.gt.txt", w).unwrap()
    });
    let saved = read_result(&result_path).unwrap();
    assert_eq!(saved.model, ModelType::Linear);
    assert_eq!(saved.objective, Objective::MinBoth);
    assert_eq!(saved.coefficients.len(), 3);
    assert_eq!(saved.means.len(), 3);
    for (a, b) in saved.coefficients.iter().zip(outcome.coefficients()) {
        assert!((a - b).abs() <= 5e-9);
    }

    let mut scored = merged.clone();
    scored.set_stats(&saved.means, &saved.std_devs).unwrap();
    scored.apply_normalization(true).unwrap();
    let summary = saved.outcome().evaluate(&scored, &graph).unwrap();
    assert_eq!(summary.classified(), 40);
    let direct = outcome.evaluate(&table, &graph).unwrap();
    assert_eq!(summary.misclassified(), direct.misclassified());
}

#[test]
fn test_unknown_extension_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("points.bin");
    fs::write(&path, points_file(3, 1)).unwrap();
    assert!(matches!(read_points(&path), Err(SahgaError::Config(_))));
}

#[test]
fn test_merge_detects_id_mismatch() {
    let dir = tempdir().unwrap();
    let points_path = dir.path().join("points.txt");
    fs::write(&points_path, points_file(6, 2)).unwrap();
    let points = read_points(&points_path).unwrap();
    let graph = ProximityGraph::create_mpg(&points, 5.0, WeightingPolicy::HalfRadius).unwrap();

    let mut out = Vec::new();
    write_layer_data(&points, &layers(), "points.txt", &mut out).unwrap();
    let mut layer_data = sahga::io::layer::read_layer_data_from_reader(out.as_slice()).unwrap();
    layer_data.set(2, 0, 99.0).unwrap();

    assert!(matches!(
        merge_layer_data(&graph, &layer_data),
        Err(SahgaError::MalformedInput(_))
    ));
}
