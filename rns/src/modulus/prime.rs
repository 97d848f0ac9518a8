use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::montgomery::MontgomeryPrecomp;

/// A prime modulus along with its reduction precomputations and
/// the distinct factors of q-1 (used for primitive root search).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prime<O> {
    pub q: O,
    pub two_q: O,
    pub four_q: O,
    /// distinct prime factors of q-1
    pub factors: Vec<O>,
    pub montgomery: MontgomeryPrecomp<O>,
    pub barrett: BarrettPrecomp<O>,
    pub phi: O,
}

/// Generator of primes p = k * nth_root + 1 of a requested bit size,
/// scanning upward and downward from 2^size.
pub struct NTTFriendlyPrimesGenerator<O> {
    pub size: u64,
    pub nth_root: O,
    pub next_prime: O,
    pub prev_prime: O,
    pub check_next_prime: bool,
    pub check_prev_prime: bool,
}
