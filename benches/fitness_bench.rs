use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sahga::config::{ModelType, Objective};
use sahga::graph::{ProximityGraph, WeightingPolicy};
use sahga::optimizer::{Chromosome, FitnessModel};
use sahga::rng::RandomSource;
use sahga::table::ObservationTable;
use std::hint::black_box;

const ROWS: usize = 2000;
const LAYERS: usize = 8;

/// Points scattered over a 1 degree box with random covariates, plus the
/// `[class, x..]` table the optimizer scores.
fn setup() -> (ProximityGraph, ObservationTable) {
    let mut rng = RandomSource::seeded(2024);
    let mut points = Vec::with_capacity(ROWS);
    let mut observations = Vec::with_capacity(ROWS);
    for i in 0..ROWS {
        let lon = rng.uniform_in(-48.0, -47.0);
        let lat = rng.uniform_in(-16.0, -15.0);
        let class = if rng.uniform() < 0.5 { 0.0 } else { 1.0 };
        points.push(vec![i as f64 + 1.0, lon, lat, class]);

        let mut row = vec![class];
        row.extend((0..LAYERS).map(|_| rng.uniform_in(-2.0, 2.0)));
        observations.push(row);
    }
    let points = ObservationTable::from_rows(&points).unwrap();
    let graph = ProximityGraph::create_mpg(&points, 5.0, WeightingPolicy::HalfRadius).unwrap();
    let table = ObservationTable::from_rows(&observations).unwrap();
    (graph, table)
}

fn bench_evaluate_population(c: &mut Criterion) {
    let (graph, table) = setup();
    let mut group = c.benchmark_group("evaluate_population");

    for model in [ModelType::Linear, ModelType::Quadratic, ModelType::SpatialLag] {
        let fitness = FitnessModel::new(&table, &graph, model, Objective::MinBoth, 0.1);
        let mut rng = RandomSource::seeded(7);
        let mut population: Vec<Chromosome> = (0..50)
            .map(|_| Chromosome::random(fitness.gene_size(), -4.0, 4.0, &mut rng))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(model), &model, |b, _| {
            b.iter(|| fitness.evaluate_all(black_box(&mut population), None))
        });
    }
    group.finish();
}

fn bench_create_mpg(c: &mut Criterion) {
    let mut rng = RandomSource::seeded(11);
    let rows: Vec<Vec<f64>> = (0..ROWS)
        .map(|i| {
            vec![
                i as f64 + 1.0,
                rng.uniform_in(-48.0, -47.0),
                rng.uniform_in(-16.0, -15.0),
                (i % 2) as f64,
            ]
        })
        .collect();
    let points = ObservationTable::from_rows(&rows).unwrap();

    c.bench_function("create_mpg_2000", |b| {
        b.iter(|| {
            ProximityGraph::create_mpg(black_box(&points), 5.0, WeightingPolicy::HalfRadius).unwrap()
        })
    });
}

criterion_group!(benches, bench_evaluate_population, bench_create_mpg);
criterion_main!(benches);
