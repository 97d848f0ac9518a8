use crate::modulus::WordOps;
use crate::poly::{Poly, PolyRNS};
use crate::ring::{Ring, RingRNS};
use rand_core::RngCore;
use sampling::dist::GaussianSampler;
use sampling::source::Source;

impl Ring<u64> {
    pub fn fill_uniform(&self, source: &mut Source, a: &mut Poly<u64>) {
        let max: u64 = self.modulus.q;
        let mask: u64 = max.mask();
        a.0.iter_mut().for_each(|a| *a = source.next_u64n(max, mask));
    }
}

impl RingRNS<u64> {
    pub fn fill_uniform(&self, source: &mut Source, a: &mut PolyRNS<u64>) {
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, r)| r.fill_uniform(source, a.at_mut(i)));
        a.is_ntt = false;
    }

    /// Fills a with a discrete Gaussian of the given standard deviation,
    /// truncated at bound, embedded consistently across all primes.
    pub fn fill_gaussian(&self, source: &mut Source, sigma: f64, bound: f64, a: &mut PolyRNS<u64>) {
        let sampler: GaussianSampler = GaussianSampler::new(sigma, bound);
        let level: usize = self.level();
        for j in 0..a.n() {
            let e: i64 = sampler.sample(source);
            for i in 0..level + 1 {
                let q_i: u64 = self.0[i].modulus.q;
                a.at_mut(i).0[j] = if e < 0 {
                    q_i - (e.unsigned_abs() % q_i)
                } else {
                    e as u64 % q_i
                };
            }
        }
        a.is_ntt = false;
    }

    /// Fills a with a ternary polynomial of exactly hamming_weight nonzero
    /// coefficients, each +-1 with equal probability.
    pub fn fill_ternary_hw(&self, source: &mut Source, hamming_weight: usize, a: &mut PolyRNS<u64>) {
        let n: usize = a.n();
        debug_assert!(hamming_weight <= n, "hamming_weight={} > n={}", hamming_weight, n);
        let level: usize = self.level();

        for i in 0..level + 1 {
            a.at_mut(i).0.fill(0);
        }

        let mut index: Vec<usize> = (0..n).collect();
        let n_mask: u64 = (n as u64).mask();
        for k in 0..hamming_weight {
            let j: usize = k + source.next_u64n((n - k) as u64, n_mask) as usize;
            index.swap(k, j);
            let sign: bool = source.next_u64() & 1 == 1;
            for i in 0..level + 1 {
                let q_i: u64 = self.0[i].modulus.q;
                a.at_mut(i).0[index[k]] = if sign { 1 } else { q_i - 1 };
            }
        }
        a.is_ntt = false;
    }

    /// Extends the small centered coefficients of a (residues modulo q_src)
    /// into every prime of self.
    pub fn extend_basis_small_norm(&self, q_src: u64, a: &Poly<u64>, b: &mut PolyRNS<u64>) {
        let q_src_half: u64 = q_src >> 1;
        let level: usize = self.level();

        for j in 0..a.n() {
            let coeff: u64 = a.0[j];
            let (value, sign): (u64, bool) = if coeff > q_src_half {
                (q_src - coeff, false)
            } else {
                (coeff, true)
            };
            for i in 0..level + 1 {
                let q_i: u64 = self.0[i].modulus.q;
                b.at_mut(i).0[j] = if sign { value % q_i } else { q_i - (value % q_i) };
            }
        }
    }
}
