use super::chromosome::Chromosome;
use super::fitness::{FitnessModel, PRESENCE_THRESHOLD};
use super::runner::GenerationRecord;
use crate::config::{ModelType, Objective, DEFAULT_GENE_MAX, DEFAULT_GENE_MIN};
use crate::error::{SahgaError, SahgaResult};
use crate::graph::ProximityGraph;
use crate::table::ObservationTable;
use serde::{Deserialize, Serialize};

/// Confusion counts at the 0.5 presence threshold plus the squared error.
///
/// Rows whose observed value is neither 0 nor 1 only contribute to
/// `sum_squares`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfusionSummary {
    pub true_pos: usize,
    pub true_neg: usize,
    pub false_pos: usize,
    pub false_neg: usize,
    pub sum_squares: f64,
}

impl ConfusionSummary {
    pub fn classified(&self) -> usize {
        self.true_pos + self.true_neg + self.false_pos + self.false_neg
    }

    pub fn misclassified(&self) -> usize {
        self.false_pos + self.false_neg
    }

    pub fn accuracy(&self) -> f64 {
        match self.classified() {
            0 => 0.0,
            n => (self.true_pos + self.true_neg) as f64 / n as f64,
        }
    }
}

/// Result of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOutcome {
    pub model: ModelType,
    pub objective: Objective,
    pub epsilon: f64,
    pub best: Chromosome,
    pub trace: Vec<GenerationRecord>,
}

impl FitOutcome {
    /// Outcome rebuilt from stored coefficients, without a trace.
    pub fn from_coefficients(
        model: ModelType,
        objective: Objective,
        epsilon: f64,
        coefficients: &[f64],
        fitness: f64,
    ) -> Self {
        let mut best = Chromosome::from_values(coefficients, DEFAULT_GENE_MIN, DEFAULT_GENE_MAX);
        best.fitness = fitness;
        Self {
            model,
            objective,
            epsilon,
            best,
            trace: Vec::new(),
        }
    }

    pub fn fitness(&self) -> f64 {
        self.best.fitness
    }

    pub fn coefficients(&self) -> Vec<f64> {
        self.best.values()
    }

    fn scorer<'t>(
        &self,
        table: &'t ObservationTable,
        graph: &ProximityGraph,
    ) -> SahgaResult<FitnessModel<'t>> {
        let expected = self.model.gene_size(table.cols());
        if expected != self.best.len() {
            return Err(SahgaError::MalformedInput(format!(
                "{} model over {} columns needs {} coefficients, have {}",
                self.model,
                table.cols(),
                expected,
                self.best.len()
            )));
        }
        graph.validate_against(table)?;
        Ok(FitnessModel::new(
            table,
            graph,
            self.model,
            self.objective,
            self.epsilon,
        ))
    }

    /// Model estimates for every row of `table`.
    pub fn predict(
        &self,
        table: &ObservationTable,
        graph: &ProximityGraph,
    ) -> SahgaResult<Vec<f64>> {
        let scorer = self.scorer(table, graph)?;
        Ok(scorer.estimates(&self.best.genes))
    }

    pub fn evaluate(
        &self,
        table: &ObservationTable,
        graph: &ProximityGraph,
    ) -> SahgaResult<ConfusionSummary> {
        let estimates = self.predict(table, graph)?;
        let mut summary = ConfusionSummary::default();
        for (i, est) in estimates.into_iter().enumerate() {
            let observed = table.at(i, 0);
            summary.sum_squares += (observed - est).powi(2);
            let predicted = est >= PRESENCE_THRESHOLD;
            if observed == 1.0 {
                if predicted {
                    summary.true_pos += 1;
                } else {
                    summary.false_neg += 1;
                }
            } else if observed == 0.0 {
                if predicted {
                    summary.false_pos += 1;
                } else {
                    summary.true_neg += 1;
                }
            }
        }
        Ok(summary)
    }
}
