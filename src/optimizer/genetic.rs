use super::chromosome::{rank_population, Chromosome, Gene};
use super::{Gasa, RunPhase};
use crate::rng::RandomSource;
use tracing::{debug, warn};

/// Redraws for a distinct mate before falling back to the next slot.
const MAX_DISTINCT_ATTEMPTS: usize = 64;

/// Reset mutation: with probability `rate` the value is redrawn inside the
/// gene's range.
#[inline(always)]
pub fn mutate_gene_ga(gene: &mut Gene, rate: f64, rng: &mut RandomSource) {
    if rng.uniform() < rate {
        gene.value = rng.uniform_in(gene.min, gene.max);
    }
}

/// Arithmetic crossover of two aligned genes. The blend is clamped back into
/// `g1`'s range.
#[inline(always)]
pub fn crossover_gene(
    g1: &Gene,
    g2: &Gene,
    weight: f64,
    rate: f64,
    rng: &mut RandomSource,
) -> Gene {
    let mut gene = *g1;
    if rng.uniform() < rate {
        gene.value = weight * g1.value + (1.0 - weight) * g2.value;
        gene.clamp_value();
    }
    gene
}

/// Child of `first` and `second`; the blend weight is drawn per gene.
pub fn crossover_chromosome(
    first: &Chromosome,
    second: &Chromosome,
    rate: f64,
    rng: &mut RandomSource,
) -> Chromosome {
    let genes = first
        .genes
        .iter()
        .zip(&second.genes)
        .map(|(g1, g2)| {
            let weight = rng.uniform();
            crossover_gene(g1, g2, weight, rate, rng)
        })
        .collect();
    Chromosome::unevaluated(genes)
}

/// Roulette walk for a minimized objective. Each candidate weighs
/// `factor - fitness`; returns the first index whose running total reaches
/// `threshold`, or the last index.
pub fn roulette_index(population: &[Chromosome], factor: f64, threshold: f64) -> usize {
    let last = population.len().saturating_sub(1);
    let mut step = 0.0;
    for (i, c) in population.iter().enumerate() {
        step += factor - c.fitness;
        if step >= threshold {
            return i;
        }
    }
    last
}

/// Sum of the roulette weights over the population.
pub fn selection_weight_sum(population: &[Chromosome], factor: f64) -> f64 {
    population.iter().map(|c| factor - c.fitness).sum()
}

impl<'a> Gasa<'a> {
    pub fn mutate_gene_ga(&mut self, gene: &mut Gene) {
        mutate_gene_ga(gene, self.config.mutation_rate, &mut self.rng);
    }

    pub fn crossover_gene(&mut self, g1: &Gene, g2: &Gene, weight: f64) -> Gene {
        crossover_gene(g1, g2, weight, self.config.crossover_rate, &mut self.rng)
    }

    pub fn crossover_chromosome(&mut self, first: &Chromosome, second: &Chromosome) -> Chromosome {
        crossover_chromosome(first, second, self.config.crossover_rate, &mut self.rng)
    }

    /// Draws one population index by roulette. The population must be ranked
    /// and `normalize_fitness_factor` current.
    pub fn selection(&mut self, fitness_sum: f64) -> usize {
        let threshold = self.rng.uniform() * fitness_sum;
        roulette_index(&self.population, self.normalize_fitness_factor, threshold)
    }

    fn select_distinct_pair(&mut self, fitness_sum: f64) -> (usize, usize) {
        let n = self.population.len();
        let mut first = 0;
        for _ in 0..MAX_DISTINCT_ATTEMPTS {
            first = self.selection(fitness_sum);
            let second = self.selection(fitness_sum);
            if first != second {
                return (first, second);
            }
        }
        // One candidate dominates the wheel; pair it with its neighbor.
        warn!("selection collapsed on index {}, pairing with next slot", first);
        (first, (first + 1) % n)
    }

    /// Builds the next generation: elites are copied, the rest are children of
    /// distinct roulette pairs, crossed in both orders and then mutated.
    pub fn evolve_ga(&mut self) {
        let size = self.config.population_size;
        let elite = self.config.elite_size.min(self.population.len());

        let mut next: Vec<Chromosome> = Vec::with_capacity(size);
        next.extend_from_slice(&self.population[..elite]);

        let fitness_sum = selection_weight_sum(&self.population, self.normalize_fitness_factor);

        while next.len() < size {
            let (s1, s2) = self.select_distinct_pair(fitness_sum);
            let (p1, p2) = (&self.population[s1], &self.population[s2]);

            let child = crossover_chromosome(p1, p2, self.config.crossover_rate, &mut self.rng);
            next.push(child);

            if next.len() < size {
                let child = crossover_chromosome(p2, p1, self.config.crossover_rate, &mut self.rng);
                next.push(child);
            }
        }

        let rate = self.config.mutation_rate;
        for child in next.iter_mut().skip(elite) {
            for gene in child.genes.iter_mut() {
                mutate_gene_ga(gene, rate, &mut self.rng);
            }
        }

        self.population = next;
        self.phase = RunPhase::EvolvedGa;
    }

    /// Scores and ranks the population, refreshes the roulette factor and the
    /// global best.
    pub fn calculate_fitness_ga(&mut self) {
        self.evaluate_population();
        rank_population(&mut self.population);

        if let Some(worst) = self.population.last() {
            self.normalize_fitness_factor = worst.fitness + 1.0;
        }
        self.update_best();
        self.phase = RunPhase::EvaluatedGa;

        debug!(
            "GA pass: leader={:.6} best={:.6} factor={:.6}",
            self.population.first().map_or(f64::INFINITY, |c| c.fitness),
            self.best.fitness,
            self.normalize_fitness_factor
        );
    }
}
