use crate::ranking::{quicksort, Rankable, SortOrder};
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};

/// One bounded model coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gene {
    pub min: f64,
    pub max: f64,
    pub value: f64,
}

impl Gene {
    /// Fresh gene drawn uniformly from `[min, max]`.
    pub fn random(min: f64, max: f64, rng: &mut RandomSource) -> Self {
        Self {
            min,
            max,
            value: rng.uniform_in(min, max),
        }
    }

    #[inline(always)]
    pub fn clamp_value(&mut self) {
        self.value = self.value.clamp(self.min, self.max);
    }

    pub fn in_range(&self) -> bool {
        self.min <= self.value && self.value <= self.max
    }
}

/// Candidate parameterization plus its (minimized) fitness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chromosome {
    pub fitness: f64,
    pub genes: Vec<Gene>,
}

impl Chromosome {
    /// Placeholder worse than any evaluated candidate.
    pub fn unevaluated(genes: Vec<Gene>) -> Self {
        Self {
            fitness: f64::INFINITY,
            genes,
        }
    }

    /// `gene_count` genes sharing one `[min, max]` range.
    pub fn random(gene_count: usize, min: f64, max: f64, rng: &mut RandomSource) -> Self {
        let genes = (0..gene_count)
            .map(|_| Gene::random(min, max, rng))
            .collect();
        Self::unevaluated(genes)
    }

    pub fn from_values(values: &[f64], min: f64, max: f64) -> Self {
        let genes = values
            .iter()
            .map(|&value| Gene { min, max, value })
            .collect();
        Self::unevaluated(genes)
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.genes.iter().map(|g| g.value).collect()
    }
}

impl Rankable for [Chromosome] {
    fn key(&self, idx: usize) -> f64 {
        self[idx].fitness
    }

    fn swap_items(&mut self, a: usize, b: usize) {
        self.swap(a, b);
    }
}

/// Orders the population best-first (ascending fitness). Not stable.
pub fn rank_population(population: &mut [Chromosome]) {
    if population.len() > 1 {
        let hi = population.len() - 1;
        quicksort(population, 0, hi, SortOrder::Ascending);
    }
}
