use rand_distr::{Distribution, Normal};

use crate::source::Source;

/// Truncated discrete Gaussian over the integers.
/// Samples are rejected outside [-bound, bound].
pub struct GaussianSampler {
    normal: Normal<f64>,
    bound: f64,
}

impl GaussianSampler {
    pub fn new(sigma: f64, bound: f64) -> Self {
        Self {
            normal: Normal::new(0.0, sigma).expect("invalid sigma"),
            bound: bound,
        }
    }

    #[inline(always)]
    pub fn sample(&self, source: &mut Source) -> i64 {
        loop {
            let x: f64 = self.normal.sample(source);
            if x.abs() <= self.bound {
                return x.round() as i64;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_bound() {
        let sigma: f64 = 3.2;
        let sampler: GaussianSampler = GaussianSampler::new(sigma, 6.0 * sigma);
        let mut source: Source = Source::new([0; 32]);
        for _ in 0..4096 {
            assert!(sampler.sample(&mut source).abs() <= (6.0 * sigma) as i64 + 1);
        }
    }
}
