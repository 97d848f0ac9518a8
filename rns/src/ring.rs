pub mod impl_u64;

use crate::dft::DFT;
use crate::modulus::prime::Prime;
use crate::modulus::WordOps;
use crate::poly::{Poly, PolyRNS};
use std::sync::Arc;

/// Generator of the cyclotomic Galois group used for slot rotations.
pub const GALOISGENERATOR: u64 = 5;

/// Quotient ring flavor. Standard is Z[X]/(X^n + 1); ConjugateInvariant is
/// the real-embedded subring Z[X + X^-1]/(X^2n + 1) kept in compressed
/// length-n form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RingType {
    Standard,
    ConjugateInvariant,
}

pub struct Ring<O> {
    pub n: usize,
    pub ring_type: RingType,
    pub modulus: Prime<O>,
    /// 2n for Standard, 4n for ConjugateInvariant.
    pub cyclotomic_order: usize,
    pub dft: Box<dyn DFT<O> + Send + Sync>,
}

impl<O> Ring<O> {
    pub fn log_n(&self) -> usize {
        self.n.log2()
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn ring_type(&self) -> RingType {
        self.ring_type
    }

    pub fn cyclotomic_order(&self) -> usize {
        self.cyclotomic_order
    }

    /// Returns GALOISGENERATOR^gen_1 * (-1)^gen_2 mod cyclotomic_order.
    pub fn galois_element(&self, gen_1: usize, gen_2: bool) -> usize {
        let mut gal_el: usize = 1;
        let mut gen_1_pow: usize = GALOISGENERATOR as usize;
        let mut e: usize = gen_1;
        while e > 0 {
            if e & 1 == 1 {
                gal_el = gal_el.wrapping_mul(gen_1_pow);
            }
            gen_1_pow = gen_1_pow.wrapping_mul(gen_1_pow);
            e >>= 1;
        }

        gal_el &= self.cyclotomic_order - 1;

        if gen_2 {
            return self.cyclotomic_order - gal_el;
        }
        gal_el
    }

    /// Returns the galois element of a column rotation by k slots
    /// (negative k rotates right).
    pub fn galois_element_for_rotation(&self, k: isize) -> usize {
        let half_order: usize = self.cyclotomic_order >> 2;
        self.galois_element(k.rem_euclid(half_order as isize) as usize, false)
    }

    /// Returns the galois element of the row rotation (conjugation).
    pub fn galois_element_for_row_rotation(&self) -> usize {
        self.cyclotomic_order - 1
    }

    /// Returns the inverse of gal_el mod cyclotomic_order.
    pub fn galois_element_inv(&self, gal_el: usize) -> usize {
        let mut inv: usize = 1;
        let mut x: usize = gal_el;
        // gal_el^(2^(log-1) - 1) = gal_el^-1 mod 2^log for odd gal_el
        let mut e: usize = (self.cyclotomic_order >> 1) - 1;
        while e > 0 {
            if e & 1 == 1 {
                inv = inv.wrapping_mul(x);
            }
            x = x.wrapping_mul(x);
            e >>= 1;
        }
        inv & (self.cyclotomic_order - 1)
    }
}

impl Ring<u64> {
    pub fn new_poly(&self) -> Poly<u64> {
        Poly::<u64>::new(self.n())
    }
}

/// Full RNS ring: one Ring per prime, all sharing the degree and type.
pub struct RingRNS<O>(pub Vec<Arc<Ring<O>>>);

impl<O> RingRNS<O> {
    pub fn log_n(&self) -> usize {
        self.0[0].log_n()
    }

    pub fn n(&self) -> usize {
        self.0[0].n()
    }

    pub fn ring_type(&self) -> RingType {
        self.0[0].ring_type()
    }

    pub fn cyclotomic_order(&self) -> usize {
        self.0[0].cyclotomic_order()
    }

    pub fn max_level(&self) -> usize {
        self.0.len() - 1
    }

    pub fn level(&self) -> usize {
        self.0.len() - 1
    }

    /// Returns a view of the first level+1 prime rings.
    pub fn at_level(&self, level: usize) -> RingRNS<O> {
        debug_assert!(level < self.0.len(), "invalid level: {} > {}", level, self.0.len() - 1);
        RingRNS(self.0[..level + 1].to_vec())
    }

}

impl RingRNS<u64> {
    pub fn moduli(&self) -> Vec<u64> {
        self.0.iter().map(|r| r.modulus.q).collect()
    }

    pub fn new_poly(&self) -> Poly<u64> {
        Poly::<u64>::new(self.n())
    }

    pub fn new_polyrns(&self) -> PolyRNS<u64> {
        PolyRNS::<u64>::new(self.n(), self.level())
    }
}

impl<O> Clone for RingRNS<O> {
    fn clone(&self) -> Self {
        RingRNS(self.0.clone())
    }
}
