/// Uniform [0, 1) generator owned by a single optimizer run.
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: fastrand::Rng,
}

impl RandomSource {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = if let Some(s) = seed {
            fastrand::Rng::with_seed(s)
        } else {
            fastrand::Rng::new()
        };
        Self { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(Some(seed))
    }

    #[inline(always)]
    pub fn uniform(&mut self) -> f64 {
        self.rng.f64()
    }

    /// Uniform draw in `[min, max]`.
    #[inline(always)]
    pub fn uniform_in(&mut self, min: f64, max: f64) -> f64 {
        self.uniform() * (max - min) + min
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        self.rng.shuffle(items);
    }
}
