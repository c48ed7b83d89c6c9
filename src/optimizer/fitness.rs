use super::chromosome::{Chromosome, Gene};
use crate::config::{ModelType, Objective};
use crate::graph::ProximityGraph;
use crate::table::ObservationTable;
use rayon::prelude::*;
use rayon::ThreadPool;

/// Classification threshold separating predicted presence from absence.
pub const PRESENCE_THRESHOLD: f64 = 0.5;

#[inline(always)]
pub fn is_misclassified(observed: f64, estimate: f64) -> bool {
    (estimate < PRESENCE_THRESHOLD && observed == 1.0)
        || (estimate >= PRESENCE_THRESHOLD && observed == 0.0)
}

/// Weighted mean of `value(neighbor)` over `edges`; zero when the weights sum
/// to zero.
#[inline(always)]
fn weighted_average<F>(edges: impl Iterator<Item = (usize, f64)>, value: F) -> f64
where
    F: Fn(usize) -> f64,
{
    let mut sum_n = 0.0;
    let mut sum_d = 0.0;
    for (neighbor, weight) in edges {
        sum_n += weight * value(neighbor);
        sum_d += weight;
    }
    if sum_d == 0.0 {
        0.0
    } else {
        sum_n / sum_d
    }
}

/// Scores chromosomes against one table/graph pair.
///
/// Neighborhood aggregates do not depend on the chromosome, so they are
/// computed once here. `features` is row-major with `covariates` columns:
/// neighbor-weighted covariate averages for the linear and quadratic models,
/// raw covariates for the spatial-lag model.
pub struct FitnessModel<'a> {
    table: &'a ObservationTable,
    model: ModelType,
    objective: Objective,
    epsilon: f64,
    covariates: usize,
    features: Vec<f64>,
    lag: Vec<f64>,
}

impl<'a> FitnessModel<'a> {
    /// The graph must already be validated against the table.
    pub fn new(
        table: &'a ObservationTable,
        graph: &ProximityGraph,
        model: ModelType,
        objective: Objective,
        epsilon: f64,
    ) -> Self {
        let rows = table.rows();
        let covariates = table.cols().saturating_sub(1);
        let mut features = Vec::with_capacity(rows * covariates);
        let mut lag = Vec::new();

        match model {
            ModelType::Linear | ModelType::Quadratic => {
                for node in graph.nodes.iter().take(rows) {
                    for j in 0..covariates {
                        let avg = weighted_average(
                            node.edges.iter().map(|e| (e.neighbor, e.weight)),
                            |n| table.at(n, j + 1),
                        );
                        features.push(avg);
                    }
                }
            }
            ModelType::SpatialLag => {
                lag.reserve(rows);
                for (i, node) in graph.nodes.iter().enumerate().take(rows) {
                    features.extend_from_slice(&table.row(i)[1..]);
                    let avg = weighted_average(
                        node.edges
                            .iter()
                            .filter(|e| e.neighbor != i)
                            .map(|e| (e.neighbor, e.weight)),
                        |n| table.at(n, 0),
                    );
                    lag.push(avg);
                }
            }
        }

        Self {
            table,
            model,
            objective,
            epsilon,
            covariates,
            features,
            lag,
        }
    }

    pub fn model(&self) -> ModelType {
        self.model
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn gene_size(&self) -> usize {
        self.model.gene_size(self.table.cols())
    }

    /// Model estimate of the dependent variable at `row`.
    #[inline(always)]
    pub fn estimate(&self, genes: &[Gene], row: usize) -> f64 {
        let k = self.covariates;
        let x = &self.features[row * k..(row + 1) * k];
        let size = genes.len();

        match self.model {
            ModelType::Linear => {
                let mut est = 0.0;
                for j in 0..k {
                    est += genes[j].value * x[j];
                }
                est + genes[size - 1].value
            }
            ModelType::Quadratic => {
                let mut est = 0.0;
                for j in 0..k {
                    let avg = x[j];
                    est += genes[2 * j].value * avg * avg + genes[2 * j + 1].value * avg;
                }
                est + genes[size - 1].value
            }
            ModelType::SpatialLag => {
                let mut est = 0.0;
                for j in 0..k {
                    est += genes[j].value * x[j];
                }
                est += genes[size - 2].value;
                est + genes[size - 1].value * self.lag[row]
            }
        }
    }

    #[inline(always)]
    fn row_error(&self, observed: f64, estimate: f64) -> f64 {
        match self.objective {
            Objective::MinSqT => (observed - estimate).powi(2),
            Objective::MinErr => {
                if is_misclassified(observed, estimate) {
                    1.0
                } else {
                    0.0
                }
            }
            Objective::MinBoth => {
                let mut err = (observed - estimate).powi(2);
                if is_misclassified(observed, estimate) {
                    err += self.epsilon;
                }
                err
            }
        }
    }

    /// Fitness of `chromosome` (lower is better). Rows are summed in table
    /// order so the result is reproducible.
    pub fn evaluate(&self, chromosome: &Chromosome) -> f64 {
        let mut fitness = 0.0;
        for i in 0..self.table.rows() {
            let est = self.estimate(&chromosome.genes, i);
            fitness += self.row_error(self.table.at(i, 0), est);
        }
        fitness
    }

    /// Estimates for every row of the table.
    pub fn estimates(&self, genes: &[Gene]) -> Vec<f64> {
        (0..self.table.rows())
            .map(|i| self.estimate(genes, i))
            .collect()
    }

    /// Scores `chromosomes` in parallel, one task per candidate.
    pub fn evaluate_all(&self, chromosomes: &mut [Chromosome], pool: Option<&ThreadPool>) {
        let score = |c: &mut Chromosome| c.fitness = self.evaluate(c);
        match pool {
            Some(p) => p.install(|| chromosomes.par_iter_mut().for_each(score)),
            None => chromosomes.par_iter_mut().for_each(score),
        }
    }
}
