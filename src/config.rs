use crate::error::{SahgaError, SahgaResult};
use clap::Args;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use typed_builder::TypedBuilder;

/// Model formulation fitted by the optimizer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ModelType {
    #[default]
    Linear,
    Quadratic,
    #[strum(to_string = "lag", serialize = "spatiallag")]
    SpatialLag,
}

impl ModelType {
    /// Genome length for a table with `cols` columns (dependent variable included).
    pub fn gene_size(&self, cols: usize) -> usize {
        match self {
            ModelType::Linear => cols,
            ModelType::Quadratic => cols.saturating_mul(2).saturating_sub(1),
            ModelType::SpatialLag => cols.saturating_add(1),
        }
    }
}

/// Error measure minimized by the optimizer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Objective {
    /// Sum of squared residuals.
    #[default]
    MinSqT,
    /// Omission + commission errors at threshold 0.5.
    MinErr,
    /// Squared residuals plus `epsilon` per misclassification.
    MinBoth,
}

/// Named parameter bundles for the GA/SA loop.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Preset {
    #[default]
    Default,
    Fast,
    Hard,
    Ultra,
    HighPop,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresetParams {
    pub max_iterations: usize,
    pub minimum_temperature: f64,
    pub maximum_temperature: f64,
    pub cooling_rate: f64,
    pub elite_size: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    pub epsilon: f64,
}

impl Preset {
    pub fn params(&self) -> PresetParams {
        let base = PresetParams {
            max_iterations: 5,
            minimum_temperature: 0.001,
            maximum_temperature: 3.0,
            cooling_rate: 0.9,
            elite_size: 1,
            crossover_rate: 0.8,
            mutation_rate: 0.01,
            epsilon: 0.1,
        };
        match self {
            Preset::Default | Preset::Hard => base,
            Preset::Fast => PresetParams {
                max_iterations: 3,
                ..base
            },
            Preset::Ultra => PresetParams {
                max_iterations: 10,
                mutation_rate: 0.02,
                ..base
            },
            Preset::HighPop => PresetParams {
                cooling_rate: 0.75,
                mutation_rate: 0.02,
                ..base
            },
        }
    }
}

pub const DEFAULT_POPULATION: usize = 50;
pub const DEFAULT_GENERATIONS: usize = 3;
pub const DEFAULT_GENE_MIN: f64 = -4.0;
pub const DEFAULT_GENE_MAX: f64 = 4.0;

/// Immutable configuration of one optimizer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct GasaConfig {
    #[builder(default)]
    pub model: ModelType,
    #[builder(default)]
    pub objective: Objective,
    #[builder(default = DEFAULT_POPULATION)]
    pub population_size: usize,
    #[builder(default = DEFAULT_GENERATIONS)]
    pub max_generations: usize,
    #[builder(default = 5)]
    pub max_iterations: usize,
    #[builder(default = 0.001)]
    pub minimum_temperature: f64,
    #[builder(default = 3.0)]
    pub maximum_temperature: f64,
    #[builder(default = 0.9)]
    pub cooling_rate: f64,
    #[builder(default = 1)]
    pub elite_size: usize,
    #[builder(default = 0.8)]
    pub crossover_rate: f64,
    #[builder(default = 0.01)]
    pub mutation_rate: f64,
    #[builder(default = 0.1)]
    pub epsilon: f64,
    #[builder(default = DEFAULT_GENE_MIN)]
    pub gene_min: f64,
    #[builder(default = DEFAULT_GENE_MAX)]
    pub gene_max: f64,
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
    #[builder(default, setter(strip_option))]
    pub threads: Option<usize>,
}

impl Default for GasaConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GasaConfig {
    /// Configuration with the values bound to `preset`.
    pub fn from_preset(preset: Preset, model: ModelType, objective: Objective) -> Self {
        let p = preset.params();
        Self {
            model,
            objective,
            max_iterations: p.max_iterations,
            minimum_temperature: p.minimum_temperature,
            maximum_temperature: p.maximum_temperature,
            cooling_rate: p.cooling_rate,
            elite_size: p.elite_size,
            crossover_rate: p.crossover_rate,
            mutation_rate: p.mutation_rate,
            epsilon: p.epsilon,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SahgaResult<()> {
        if self.population_size == 0 {
            return Err(SahgaError::EmptyPopulation);
        }
        if self.elite_size > self.population_size {
            return Err(SahgaError::Config(format!(
                "elite size {} exceeds population size {}",
                self.elite_size, self.population_size
            )));
        }
        if self.elite_size < self.population_size && self.population_size < 2 {
            return Err(SahgaError::Config(
                "crossover needs a population of at least 2".into(),
            ));
        }
        if !(self.gene_min.is_finite() && self.gene_max.is_finite()) || self.gene_min > self.gene_max
        {
            return Err(SahgaError::Config(format!(
                "invalid gene range [{}, {}]",
                self.gene_min, self.gene_max
            )));
        }
        for (name, rate) in [
            ("crossover rate", self.crossover_rate),
            ("mutation rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(SahgaError::Config(format!(
                    "{} must lie in [0, 1], got {}",
                    name, rate
                )));
            }
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(SahgaError::Config(format!(
                "cooling rate must lie in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        if !(self.minimum_temperature > 0.0) || self.maximum_temperature < self.minimum_temperature
        {
            return Err(SahgaError::Config(format!(
                "invalid temperature range [{}, {}]",
                self.minimum_temperature, self.maximum_temperature
            )));
        }
        if self.threads == Some(0) {
            return Err(SahgaError::Config("thread count must be positive".into()));
        }
        Ok(())
    }
}

/// Command-line surface of a fit. Unset overrides fall back to the preset.
#[derive(Args, Debug, Clone)]
pub struct FitParams {
    #[arg(long, default_value = "linear")]
    pub model: ModelType,
    #[arg(long, default_value = "minsqt")]
    pub objective: Objective,
    #[arg(long, default_value = "default")]
    pub preset: Preset,
    #[arg(long, default_value_t = DEFAULT_POPULATION)]
    pub population: usize,
    #[arg(long, default_value_t = DEFAULT_GENERATIONS)]
    pub generations: usize,
    #[arg(long, default_value_t = DEFAULT_GENE_MIN, allow_negative_numbers = true)]
    pub min_gene: f64,
    #[arg(long, default_value_t = DEFAULT_GENE_MAX, allow_negative_numbers = true)]
    pub max_gene: f64,
    #[arg(long)]
    pub threads: Option<usize>,
    #[arg(long)]
    pub mutation_rate: Option<f64>,
    #[arg(long)]
    pub crossover_rate: Option<f64>,
    #[arg(long)]
    pub cooling_rate: Option<f64>,
    #[arg(long)]
    pub elite: Option<usize>,
    #[arg(long)]
    pub epsilon: Option<f64>,
}

impl FitParams {
    pub fn to_config(&self, seed: Option<u64>) -> GasaConfig {
        let base = GasaConfig::from_preset(self.preset, self.model, self.objective);
        GasaConfig {
            population_size: self.population,
            max_generations: self.generations,
            gene_min: self.min_gene,
            gene_max: self.max_gene,
            threads: self.threads,
            seed,
            mutation_rate: self.mutation_rate.unwrap_or(base.mutation_rate),
            crossover_rate: self.crossover_rate.unwrap_or(base.crossover_rate),
            cooling_rate: self.cooling_rate.unwrap_or(base.cooling_rate),
            elite_size: self.elite.unwrap_or(base.elite_size),
            epsilon: self.epsilon.unwrap_or(base.epsilon),
            ..base
        }
    }
}
