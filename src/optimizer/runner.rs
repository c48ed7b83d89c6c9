use super::outcome::FitOutcome;
use super::{Gasa, RunPhase};
use crate::error::SahgaResult;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Snapshot taken after each outer GA/SA cycle. Generation 0 is the
/// evaluated initial population.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    /// Best fitness seen so far in the run.
    pub best_fitness: f64,
    /// Leader of the current population before the best is restored.
    pub population_best: f64,
    /// Annealing cycles run in this generation.
    pub sa_cycles: usize,
    /// Temperature reached before the reset.
    pub temperature: f64,
}

/// Receives a record per generation. Observation only: a run cannot be
/// stopped from here.
pub trait ProgressCallback {
    fn on_generation(&self, record: &GenerationRecord);
}

impl<F> ProgressCallback for F
where
    F: Fn(&GenerationRecord),
{
    fn on_generation(&self, record: &GenerationRecord) {
        self(record)
    }
}

/// Callback that ignores every record.
pub struct Silent;

impl ProgressCallback for Silent {
    fn on_generation(&self, _record: &GenerationRecord) {}
}

impl<'a> Gasa<'a> {
    pub fn run(&mut self) -> SahgaResult<FitOutcome> {
        self.run_with(&Silent)
    }

    /// Full hybrid run: initial population, then `max_generations` cycles of
    /// one GA pass followed by annealing down to `minimum_temperature`.
    pub fn run_with<CB: ProgressCallback + ?Sized>(
        &mut self,
        callback: &CB,
    ) -> SahgaResult<FitOutcome> {
        let start = Instant::now();
        let mut trace = Vec::with_capacity(self.config.max_generations + 1);

        self.create_population();
        self.calculate_fitness_ga();

        let initial = GenerationRecord {
            generation: 0,
            best_fitness: self.best.fitness,
            population_best: self.best.fitness,
            sa_cycles: 0,
            temperature: self.current_temperature,
        };
        info!("🧬 Initial population: best fitness {:.6}", initial.best_fitness);
        callback.on_generation(&initial);
        trace.push(initial);

        for generation in 1..=self.config.max_generations {
            self.evolve_ga();
            self.calculate_fitness_ga();

            let mut sa_cycles = 0;
            while self.current_temperature > self.config.minimum_temperature {
                self.evolve_sa();
                self.calculate_fitness_sa();
                sa_cycles += 1;
            }
            let temperature = self.current_temperature;
            let population_best = self
                .population
                .first()
                .map_or(f64::INFINITY, |c| c.fitness);

            // Annealing may have walked the leader away from the best.
            if let Some(slot) = self.population.first_mut() {
                *slot = self.best.clone();
            }
            self.reset_current_temperature();

            let record = GenerationRecord {
                generation,
                best_fitness: self.best.fitness,
                population_best,
                sa_cycles,
                temperature,
            };
            info!(
                "Generation {}/{}: best {:.6} (population {:.6}, {} SA cycles)",
                generation,
                self.config.max_generations,
                record.best_fitness,
                record.population_best,
                record.sa_cycles
            );
            callback.on_generation(&record);
            trace.push(record);
        }

        self.phase = RunPhase::Converged;
        debug!("run finished in {:.2?}", start.elapsed());

        Ok(FitOutcome {
            model: self.config.model,
            objective: self.config.objective,
            epsilon: self.config.epsilon,
            best: self.best.clone(),
            trace,
        })
    }
}
