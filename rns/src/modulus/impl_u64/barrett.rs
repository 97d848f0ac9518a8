use crate::modulus::barrett::{Barrett, BarrettPrecomp};
use crate::modulus::ReduceOnce;
use crate::modulus::{BARRETT, BARRETTLAZY, FOURTIMES, NONE, ONCE, REDUCEMOD, TWICE};

use num_bigint::BigUint;
use num_traits::cast::ToPrimitive;

impl BarrettPrecomp<u64> {
    pub fn new(q: u64) -> BarrettPrecomp<u64> {
        let big_r: BigUint =
            (BigUint::from(1usize) << ((u64::BITS << 1) as usize)) / BigUint::from(q);
        let lo: u64 = (&big_r & BigUint::from(u64::MAX)).to_u64().unwrap();
        let hi: u64 = (big_r >> u64::BITS).to_u64().unwrap();
        let mut precomp: BarrettPrecomp<u64> = Self {
            q: q,
            two_q: q << 1,
            four_q: q << 2,
            lo: lo,
            hi: hi,
            one: Barrett(0, 0),
        };
        precomp.one = precomp.prepare(1);
        precomp
    }

    #[inline(always)]
    pub fn one(&self) -> Barrett<u64> {
        self.one
    }

    #[inline(always)]
    pub fn reduce_assign<const REDUCE: REDUCEMOD>(&self, x: &mut u64) {
        match REDUCE {
            NONE => {}
            ONCE => x.reduce_once_assign(self.q),
            TWICE => x.reduce_once_assign(self.two_q),
            FOURTIMES => x.reduce_once_assign(self.four_q),
            BARRETT => {
                let mhi: u64 = ((*x as u128 * self.hi as u128) >> 64) as u64;
                *x = x.wrapping_sub(mhi.wrapping_mul(self.q));
                x.reduce_once_assign(self.q);
            }
            BARRETTLAZY => {
                let mhi: u64 = ((*x as u128 * self.hi as u128) >> 64) as u64;
                *x = x.wrapping_sub(mhi.wrapping_mul(self.q));
            }
            _ => unreachable!("invalid REDUCE argument"),
        }
    }

    #[inline(always)]
    pub fn reduce<const REDUCE: REDUCEMOD>(&self, x: &u64) -> u64 {
        let mut r: u64 = *x;
        self.reduce_assign::<REDUCE>(&mut r);
        r
    }

    /// Reduces a 128-bit accumulator modulo q.
    /// The dropped cross carries underestimate floor(x/q) by at most 3,
    /// which the trailing conditional subtractions absorb.
    #[inline(always)]
    pub fn reduce_u128(&self, x: u128) -> u64 {
        let x_lo: u64 = x as u64;
        let x_hi: u64 = (x >> 64) as u64;
        let mid_0: u128 = (x_hi as u128) * (self.lo as u128);
        let mid_1: u128 =
            (x_lo as u128) * (self.hi as u128) + (((x_lo as u128) * (self.lo as u128)) >> 64);
        let t: u128 = (x_hi as u128) * (self.hi as u128) + (mid_0 >> 64) + (mid_1 >> 64);
        let mut r: u64 = x.wrapping_sub(t.wrapping_mul(self.q as u128)) as u64;
        r.reduce_once_assign(self.four_q);
        r.reduce_once_assign(self.two_q);
        r.reduce_once_assign(self.q);
        r
    }

    #[inline(always)]
    pub fn prepare(&self, v: u64) -> Barrett<u64> {
        debug_assert!(v < self.q, "invalid argument v: v = {} >= q = {}", v, self.q);
        let quotient: u64 = (((v as u128) << 64) / self.q as u128) as _;
        Barrett(v, quotient)
    }

    #[inline(always)]
    pub fn mul_external<const REDUCE: REDUCEMOD>(&self, lhs: &Barrett<u64>, rhs: &u64) -> u64 {
        let mut r: u64 = *rhs;
        self.mul_external_assign::<REDUCE>(lhs, &mut r);
        r
    }

    /// Assigns lhs * rhs to rhs using Shoup multiplication.
    /// Output in [0, 2q) before the REDUCE policy is applied.
    #[inline(always)]
    pub fn mul_external_assign<const REDUCE: REDUCEMOD>(&self, lhs: &Barrett<u64>, rhs: &mut u64) {
        let t: u64 = ((*lhs.quotient() as u128 * *rhs as u128) >> 64) as _;
        *rhs = (rhs.wrapping_mul(*lhs.value())).wrapping_sub(self.q.wrapping_mul(t));
        self.reduce_assign::<REDUCE>(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduce_barrett() {
        let q: u64 = 0x1fffffffffe00001;
        let precomp: BarrettPrecomp<u64> = BarrettPrecomp::new(q);
        let x: u64 = 0xfedcba9876543210;
        assert_eq!(precomp.reduce::<BARRETT>(&x), x % q);
    }

    #[test]
    fn test_reduce_u128() {
        let q: u64 = 0x1fffffffffe00001;
        let precomp: BarrettPrecomp<u64> = BarrettPrecomp::new(q);
        let x: u128 = 0x5f876e514845cc8bad726f98f24a761a;
        assert_eq!(precomp.reduce_u128(x), (x % q as u128) as u64);
    }

    #[test]
    fn test_mul_external() {
        let q: u64 = 0xffffffffffc0001;
        let precomp: BarrettPrecomp<u64> = BarrettPrecomp::new(q);
        let x: u64 = 0x5f876e514845cc8b % q;
        let y: u64 = 0xad726f98f24a761a % q;
        let y_brt: Barrett<u64> = precomp.prepare(y);
        assert_eq!(
            precomp.mul_external::<ONCE>(&y_brt, &x),
            (x as u128 * y as u128 % q as u128) as u64
        );
    }
}
