use crate::modulus::barrett::BarrettPrecomp;

/// An element in the Montgomery domain (x * 2^64 mod q).
pub type Montgomery<O> = O;

/// Precomputations for Montgomery arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MontgomeryPrecomp<O> {
    pub q: O,
    pub two_q: O,
    pub four_q: O,
    pub barrett: BarrettPrecomp<O>,
    /// q^-1 mod 2^64
    pub q_inv: O,
    pub one: Montgomery<O>,
    pub minus_one: Montgomery<O>,
}
