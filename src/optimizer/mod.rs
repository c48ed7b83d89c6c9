pub mod anneal;
pub mod chromosome;
pub mod fitness;
pub mod genetic;
pub mod outcome;
pub mod runner;

pub use self::chromosome::{rank_population, Chromosome, Gene};
pub use self::fitness::FitnessModel;
pub use self::outcome::{ConfusionSummary, FitOutcome};
pub use self::runner::{GenerationRecord, ProgressCallback, Silent};

use crate::config::GasaConfig;
use crate::error::{SahgaError, SahgaResult};
use crate::graph::ProximityGraph;
use crate::rng::RandomSource;
use crate::table::ObservationTable;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::debug;

/// Where a run currently is in the GA/SA cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum RunPhase {
    Constructed,
    PopulationInitialized,
    EvaluatedGa,
    EvolvedGa,
    EvaluatedSa,
    EvolvedSa,
    Converged,
}

/// Hybrid Genetic Algorithm / Simulated Annealing optimizer.
///
/// Borrows the table and graph it scores against and never mutates them.
pub struct Gasa<'a> {
    config: GasaConfig,
    gene_size: usize,
    evaluator: FitnessModel<'a>,
    rng: RandomSource,
    pool: Option<rayon::ThreadPool>,

    population: Vec<Chromosome>,
    best: Chromosome,
    normalize_fitness_factor: f64,
    current_temperature: f64,
    phase: RunPhase,
}

impl<'a> Gasa<'a> {
    pub fn new(
        table: &'a ObservationTable,
        graph: &'a ProximityGraph,
        config: GasaConfig,
    ) -> SahgaResult<Self> {
        config.validate()?;

        if table.is_empty() {
            return Err(SahgaError::MalformedInput("observation table is empty".into()));
        }
        if let Some((r, c)) = table.first_non_finite() {
            return Err(SahgaError::MalformedInput(format!(
                "non-finite value at row {}, column {}",
                r, c
            )));
        }
        graph.validate_against(table)?;

        let pool = match config.threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| SahgaError::Config(format!("thread pool: {}", e)))?,
            ),
            None => None,
        };

        let gene_size = config.model.gene_size(table.cols());
        let evaluator = FitnessModel::new(
            table,
            graph,
            config.model,
            config.objective,
            config.epsilon,
        );
        debug!(
            "GASA ready: model={} objective={} genes={} rows={}",
            config.model,
            config.objective,
            gene_size,
            table.rows()
        );

        Ok(Self {
            rng: RandomSource::new(config.seed),
            current_temperature: config.maximum_temperature,
            gene_size,
            evaluator,
            pool,
            population: Vec::new(),
            best: Chromosome::unevaluated(Vec::new()),
            normalize_fitness_factor: 0.0,
            phase: RunPhase::Constructed,
            config,
        })
    }

    pub fn config(&self) -> &GasaConfig {
        &self.config
    }

    pub fn gene_size(&self) -> usize {
        self.gene_size
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn population(&self) -> &[Chromosome] {
        &self.population
    }

    pub fn best(&self) -> &Chromosome {
        &self.best
    }

    pub fn current_temperature(&self) -> f64 {
        self.current_temperature
    }

    pub fn normalize_fitness_factor(&self) -> f64 {
        self.normalize_fitness_factor
    }

    pub fn evaluator(&self) -> &FitnessModel<'a> {
        &self.evaluator
    }

    /// Fitness of a single chromosome under this run's model and objective.
    pub fn chromosome_fitness(&self, chromosome: &Chromosome) -> f64 {
        self.evaluator.evaluate(chromosome)
    }

    pub fn create_gene(&mut self) -> Gene {
        Gene::random(self.config.gene_min, self.config.gene_max, &mut self.rng)
    }

    pub fn create_chromosome(&mut self) -> Chromosome {
        Chromosome::random(
            self.gene_size,
            self.config.gene_min,
            self.config.gene_max,
            &mut self.rng,
        )
    }

    /// Fills the population with random chromosomes and forgets any previous
    /// best.
    pub fn create_population(&mut self) {
        let size = self.config.population_size;
        let population = (0..size).map(|_| self.create_chromosome()).collect();
        self.population = population;
        self.best = Chromosome::unevaluated(Vec::new());
        self.current_temperature = self.config.maximum_temperature;
        self.phase = RunPhase::PopulationInitialized;
    }

    pub fn reset_current_temperature(&mut self) {
        self.current_temperature = self.config.maximum_temperature;
    }

    fn evaluate_population(&mut self) {
        self.evaluator
            .evaluate_all(&mut self.population, self.pool.as_ref());
    }

    /// Replaces the global best when the current leader improves on it.
    fn update_best(&mut self) {
        if let Some(leader) = self.population.first() {
            if leader.fitness < self.best.fitness {
                self.best = leader.clone();
            }
        }
    }
}
