use crate::modulus::WordOps;
use crate::poly::{Poly, PolyRNS};
use crate::ring::{Ring, RingRNS, RingType};
use utils::map::Map;

/// Lookup tables for the automorphisms X^i -> X^(i * gal_el), keyed by the
/// galois element. Tables are built once per requested element.
pub struct AutoPermMap(Map<usize, AutoPerm>);

impl AutoPermMap {
    pub fn new() -> Self {
        Self(Map::<usize, AutoPerm>::new())
    }

    pub fn insert(&mut self, perm: AutoPerm) {
        self.0.insert(perm.gal_el, perm);
    }

    pub fn gen(&mut self, ring: &Ring<u64>, gal_el: usize) {
        if self.0.get(&gal_el).is_none() {
            self.insert(AutoPerm::new(ring, gal_el));
        }
    }

    pub fn get(&self, gal_el: &usize) -> Option<&AutoPerm> {
        self.0.get(gal_el)
    }
}

impl Default for AutoPermMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Index table applying X^i -> X^(i * gal_el) in the point-value domain.
/// Entry i is the source position gathered into position i.
pub struct AutoPerm {
    pub gal_el: usize,
    pub permutation: Vec<usize>,
}

impl AutoPerm {
    /// Method will panic if gal_el is not coprime with the cyclotomic order.
    pub fn new(ring: &Ring<u64>, gal_el: usize) -> Self {
        let n: usize = ring.n();
        let cyclotomic_order: usize = ring.cyclotomic_order();
        assert!(
            gal_el & 1 == 1,
            "invalid gal_el = {}: not coprime with the cyclotomic order",
            gal_el
        );

        let mask: usize = cyclotomic_order - 1;
        let half_order: usize = cyclotomic_order >> 1;
        let log_width: u32 = half_order.log2() as u32;

        let mut permutation: Vec<usize> = Vec::with_capacity(n);
        for i in 0..n {
            let i_rev: usize = 2 * i.reverse_bits_msb(log_width) + 1;
            let mut exponent: usize = (gal_el * i_rev) & mask;
            if ring.ring_type() == RingType::ConjugateInvariant && exponent > half_order {
                // conjugate pair holds the same evaluation
                exponent = cyclotomic_order - exponent;
            }
            permutation.push((exponent >> 1).reverse_bits_msb(log_width));
        }

        Self {
            gal_el: gal_el,
            permutation: permutation,
        }
    }
}

impl Ring<u64> {
    /// b[i] <- a[perm[i]], both in the NTT domain.
    pub fn permute_ntt(&self, a: &Poly<u64>, perm: &AutoPerm, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        let index: &[usize] = &perm.permutation;
        b.0.iter_mut()
            .zip(index.iter())
            .for_each(|(b, &j)| *b = a.0[j]);
    }
}

impl RingRNS<u64> {
    /// b <- automorphism of a given by perm, both in the NTT domain.
    pub fn permute_ntt(&self, a: &PolyRNS<u64>, perm: &AutoPerm, b: &mut PolyRNS<u64>) {
        debug_assert!(a.is_ntt, "a is not in the NTT domain");
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.permute_ntt(a.at(i), perm, b.at_mut(i)));
        b.is_ntt = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_permutation() {
        let ring: Ring<u64> = Ring::new(16, 0xffff00001, RingType::Standard);
        let perm: AutoPerm = AutoPerm::new(&ring, 1);
        for (i, &j) in perm.permutation.iter().enumerate() {
            assert_eq!(i, j);
        }
    }

    #[test]
    fn test_permutation_is_bijective() {
        let ring: Ring<u64> = Ring::new(16, 0xffff00001, RingType::Standard);
        let gal_el: usize = ring.galois_element(1, false);
        let perm: AutoPerm = AutoPerm::new(&ring, gal_el);
        let mut seen: Vec<bool> = vec![false; 16];
        for &j in perm.permutation.iter() {
            assert!(!seen[j]);
            seen[j] = true;
        }
    }

    #[test]
    fn test_inverse_composes_to_identity() {
        let ring: Ring<u64> = Ring::new(32, 0xffff00001, RingType::Standard);
        let gal_el: usize = ring.galois_element(3, false);
        let gal_el_inv: usize = ring.galois_element_inv(gal_el);
        assert_eq!((gal_el * gal_el_inv) & (ring.cyclotomic_order() - 1), 1);

        let perm: AutoPerm = AutoPerm::new(&ring, gal_el);
        let perm_inv: AutoPerm = AutoPerm::new(&ring, gal_el_inv);

        let mut a: Poly<u64> = ring.new_poly();
        let mut b: Poly<u64> = ring.new_poly();
        let mut c: Poly<u64> = ring.new_poly();
        for i in 0..32 {
            a.0[i] = i as u64;
        }
        ring.permute_ntt(&a, &perm, &mut b);
        ring.permute_ntt(&b, &perm_inv, &mut c);
        assert_eq!(a, c);
    }
}
