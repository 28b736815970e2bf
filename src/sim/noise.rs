//! Random perturbations for the simulated drivers
//!
//! Every simulated sensor owns its own generator, forked from one root so a
//! single `random_seed` reproduces a whole run.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Per-sensor random source
#[derive(Clone)]
pub struct NoiseGenerator {
    rng: SmallRng,
}

impl NoiseGenerator {
    /// Seed 0 means "unseeded": the state comes from the OS.
    pub fn new(seed: u64) -> Self {
        let rng = match seed {
            0 => SmallRng::from_entropy(),
            seed => SmallRng::seed_from_u64(seed),
        };
        Self { rng }
    }

    /// Child generator seeded from this one's stream
    pub fn fork(&mut self) -> Self {
        let seed: u64 = self.rng.r#gen();
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Zero-mean normal draw scaled by `stddev`
    #[inline]
    pub fn gaussian(&mut self, stddev: f32) -> f32 {
        if stddev == 0.0 {
            return 0.0;
        }
        let z: f32 = StandardNormal.sample(&mut self.rng);
        stddev * z
    }

    #[inline]
    pub fn biased_gaussian(&mut self, bias: f32, stddev: f32) -> f32 {
        bias + self.gaussian(stddev)
    }

    /// Fraction in `0.0..1.0`
    #[inline]
    pub fn uniform(&mut self) -> f32 {
        self.rng.gen_range(0.0f32..1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = NoiseGenerator::new(1234);
        let mut b = NoiseGenerator::new(1234);
        let xs: Vec<f32> = (0..50).map(|_| a.biased_gaussian(3.0, 0.2)).collect();
        let ys: Vec<f32> = (0..50).map(|_| b.biased_gaussian(3.0, 0.2)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_zero_stddev_returns_bias() {
        let mut noise = NoiseGenerator::new(5);
        assert_eq!(noise.gaussian(0.0), 0.0);
        assert_eq!(noise.biased_gaussian(11.8, 0.0), 11.8);
    }

    #[test]
    fn test_uniform_stays_in_unit_interval() {
        let mut noise = NoiseGenerator::new(9);
        assert!((0..1000).map(|_| noise.uniform()).all(|u| (0.0..1.0).contains(&u)));
    }

    #[test]
    fn test_forks_are_reproducible_and_distinct() {
        let mut a = NoiseGenerator::new(7);
        let mut b = NoiseGenerator::new(7);
        let mut fork_a = a.fork();
        let mut fork_b = b.fork();

        let first = fork_a.uniform();
        assert_eq!(first, fork_b.uniform());
        assert_ne!(first, a.uniform());
    }
}
