use super::chromosome::{rank_population, Chromosome, Gene};
use super::{Gasa, RunPhase};
use crate::rng::RandomSource;
use tracing::debug;

/// Nudges the value by `u - 0.5` and clamps it to the gene's range.
#[inline(always)]
pub fn mutate_gene_sa(gene: &mut Gene, rng: &mut RandomSource) {
    gene.value += rng.uniform() - 0.5;
    gene.clamp_value();
}

/// Metropolis rule for a minimized objective. The generator is only drawn
/// for uphill moves.
#[inline(always)]
pub fn accept_move(delta: f64, temperature: f64, rng: &mut RandomSource) -> bool {
    delta <= 0.0 || rng.uniform() < (-delta / temperature).exp()
}

impl<'a> Gasa<'a> {
    pub fn mutate_gene_sa(&mut self, gene: &mut Gene) {
        mutate_gene_sa(gene, &mut self.rng);
    }

    /// Runs `max_iterations` annealing steps over the whole population.
    ///
    /// Each step perturbs a clone of every candidate, scores the clones in
    /// parallel and then applies acceptance in population order.
    pub fn evolve_sa(&mut self) {
        let temperature = self.current_temperature;
        let mut accepted = 0usize;

        for _ in 0..self.config.max_iterations {
            let mut trial: Vec<Chromosome> = self.population.clone();
            for candidate in trial.iter_mut() {
                for gene in candidate.genes.iter_mut() {
                    mutate_gene_sa(gene, &mut self.rng);
                }
            }

            self.evaluator.evaluate_all(&mut trial, self.pool.as_ref());

            for (current, candidate) in self.population.iter_mut().zip(trial) {
                let delta = candidate.fitness - current.fitness;
                if accept_move(delta, temperature, &mut self.rng) {
                    *current = candidate;
                    accepted += 1;
                }
            }
        }

        self.phase = RunPhase::EvolvedSa;
        debug!("SA step at T={:.5}: {} moves accepted", temperature, accepted);
    }

    /// Cools the temperature, re-ranks, and refreshes the global best.
    pub fn calculate_fitness_sa(&mut self) {
        self.current_temperature *= self.config.cooling_rate;
        rank_population(&mut self.population);
        self.update_best();
        self.phase = RunPhase::EvaluatedSa;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutate_gene_sa_stays_close_and_in_range() {
        let mut rng = RandomSource::seeded(21);
        let mut g = Gene {
            min: -4.0,
            max: 4.0,
            value: 0.0,
        };
        for _ in 0..200 {
            let before = g.value;
            mutate_gene_sa(&mut g, &mut rng);
            assert!(g.in_range());
            assert!((g.value - before).abs() <= 0.5);
        }

        let mut edge = Gene {
            min: 0.0,
            max: 0.1,
            value: 0.1,
        };
        for _ in 0..50 {
            mutate_gene_sa(&mut edge, &mut rng);
            assert!(edge.in_range());
        }
    }

    #[test]
    fn test_accept_move() {
        let mut rng = RandomSource::seeded(2);
        assert!(accept_move(0.0, 1.0, &mut rng));
        assert!(accept_move(-3.0, 1e-9, &mut rng));
        // exp(-1e6) is zero: never accepted.
        assert!(!accept_move(1e6, 1.0, &mut rng));
    }
}
