use crate::modulus::barrett::BarrettPrecomp;
use crate::modulus::montgomery::{Montgomery, MontgomeryPrecomp};
use crate::modulus::ReduceOnce;
use crate::modulus::{BARRETT, BARRETTLAZY, FOURTIMES, NONE, ONCE, REDUCEMOD, TWICE};

/// Montgomery arithmetic over u64 values.
impl MontgomeryPrecomp<u64> {
    /// Returns a new instance of MontgomeryPrecomp<u64>.
    /// This method will fail if gcd(q, 2^64) != 1.
    pub fn new(q: u64) -> MontgomeryPrecomp<u64> {
        assert!(q & 1 != 0, "invalid argument: gcd(q={}, radix=2^64) != 1", q);
        let mut q_inv: u64 = 1;
        let mut q_pow: u64 = q;
        for _i in 0..63 {
            q_inv = q_inv.wrapping_mul(q_pow);
            q_pow = q_pow.wrapping_mul(q_pow);
        }
        let mut precomp: MontgomeryPrecomp<u64> = Self {
            q: q,
            two_q: q << 1,
            four_q: q << 2,
            barrett: BarrettPrecomp::new(q),
            q_inv: q_inv,
            one: 0,
            minus_one: 0,
        };

        precomp.one = precomp.prepare::<ONCE>(1);
        precomp.minus_one = q - precomp.one;

        precomp
    }

    /// Returns 2^64 mod q as a Montgomery<u64>.
    #[inline(always)]
    pub fn one(&self) -> Montgomery<u64> {
        self.one
    }

    /// Returns (q-1) * 2^64 mod q as a Montgomery<u64>.
    #[inline(always)]
    pub fn minus_one(&self) -> Montgomery<u64> {
        self.minus_one
    }

    /// Applies a modular reduction on x based on REDUCE:
    /// - NONE: no modular reduction.
    /// - ONCE/TWICE/FOURTIMES: subtracts q/2q/4q if x >= q/2q/4q.
    /// - BARRETT: maps x to x mod q.
    /// - BARRETTLAZY: maps x to x mod q with values in [0, 2q-1].
    #[inline(always)]
    pub fn reduce_assign<const REDUCE: REDUCEMOD>(&self, x: &mut u64) {
        match REDUCE {
            NONE => {}
            ONCE => x.reduce_once_assign(self.q),
            TWICE => x.reduce_once_assign(self.two_q),
            FOURTIMES => x.reduce_once_assign(self.four_q),
            BARRETT => self.barrett.reduce_assign::<BARRETT>(x),
            BARRETTLAZY => self.barrett.reduce_assign::<BARRETTLAZY>(x),
            _ => unreachable!("invalid REDUCE argument"),
        }
    }

    #[inline(always)]
    pub fn reduce<const REDUCE: REDUCEMOD>(&self, x: u64) -> u64 {
        let mut r: u64 = x;
        self.reduce_assign::<REDUCE>(&mut r);
        r
    }

    /// Returns lhs * 2^64 mod q as a Montgomery<u64>.
    #[inline(always)]
    pub fn prepare<const REDUCE: REDUCEMOD>(&self, lhs: u64) -> Montgomery<u64> {
        let mut rhs: u64 = 0;
        self.prepare_assign::<REDUCE>(lhs, &mut rhs);
        rhs
    }

    /// Assigns lhs * 2^64 mod q to rhs.
    #[inline(always)]
    pub fn prepare_assign<const REDUCE: REDUCEMOD>(&self, lhs: u64, rhs: &mut Montgomery<u64>) {
        let mhi: u64 = ((lhs as u128 * *self.barrett.value_lo() as u128) >> 64) as u64;
        *rhs = (lhs
            .wrapping_mul(*self.barrett.value_hi())
            .wrapping_add(mhi))
        .wrapping_mul(self.q)
        .wrapping_neg();
        self.reduce_assign::<REDUCE>(rhs);
    }

    /// Returns lhs * (2^64)^-1 mod q as a u64.
    #[inline(always)]
    pub fn unprepare<const REDUCE: REDUCEMOD>(&self, lhs: Montgomery<u64>) -> u64 {
        let mut rhs: u64 = 0;
        self.unprepare_assign::<REDUCE>(lhs, &mut rhs);
        rhs
    }

    /// Assigns lhs * (2^64)^-1 mod q to rhs.
    #[inline(always)]
    pub fn unprepare_assign<const REDUCE: REDUCEMOD>(&self, lhs: Montgomery<u64>, rhs: &mut u64) {
        let r: u64 = ((self.q as u128 * lhs.wrapping_mul(self.q_inv) as u128) >> 64) as u64;
        *rhs = self.reduce::<REDUCE>(self.q.wrapping_sub(r));
    }

    /// Returns lhs * rhs * (2^64)^-1 mod q.
    #[inline(always)]
    pub fn mul_external<const REDUCE: REDUCEMOD>(&self, lhs: Montgomery<u64>, rhs: u64) -> u64 {
        let mut r: u64 = rhs;
        self.mul_external_assign::<REDUCE>(lhs, &mut r);
        r
    }

    /// Assigns lhs * rhs * (2^64)^-1 mod q to rhs.
    /// Output in (0, 2q) before the REDUCE policy is applied.
    #[inline(always)]
    pub fn mul_external_assign<const REDUCE: REDUCEMOD>(
        &self,
        lhs: Montgomery<u64>,
        rhs: &mut u64,
    ) {
        let ab: u128 = lhs as u128 * *rhs as u128;
        let hhi: u64 =
            ((self.q as u128 * (ab as u64).wrapping_mul(self.q_inv) as u128) >> 64) as u64;
        *rhs = self.reduce::<REDUCE>(((ab >> 64) as u64).wrapping_sub(hhi).wrapping_add(self.q));
    }

    /// Returns lhs * rhs * (2^64)^-1 mod q with both operands in the Montgomery domain.
    #[inline(always)]
    pub fn mul_internal<const REDUCE: REDUCEMOD>(
        &self,
        lhs: Montgomery<u64>,
        rhs: Montgomery<u64>,
    ) -> Montgomery<u64> {
        self.mul_external::<REDUCE>(lhs, rhs)
    }

    /// Assigns lhs * rhs * (2^64)^-1 mod q to rhs.
    #[inline(always)]
    pub fn mul_internal_assign<const REDUCE: REDUCEMOD>(
        &self,
        lhs: Montgomery<u64>,
        rhs: &mut Montgomery<u64>,
    ) {
        self.mul_external_assign::<REDUCE>(lhs, rhs);
    }

    #[inline(always)]
    pub fn add_internal(&self, lhs: Montgomery<u64>, rhs: Montgomery<u64>) -> Montgomery<u64> {
        self.barrett.reduce::<BARRETT>(&(lhs + rhs))
    }

    /// Returns (x^exponent) * 2^64 mod q.
    pub fn pow(&self, x: Montgomery<u64>, exponent: u64) -> Montgomery<u64> {
        let mut y: Montgomery<u64> = self.one();
        let mut x_mut: Montgomery<u64> = x;
        let mut i: u64 = exponent;
        while i > 0 {
            if i & 1 == 1 {
                self.mul_internal_assign::<ONCE>(x_mut, &mut y);
            }
            self.mul_internal_assign::<ONCE>(x_mut, &mut x_mut);
            i >>= 1;
        }

        y.reduce_once_assign(self.q);
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mul_external() {
        let q: u64 = 0x1fffffffffe00001;
        let m_precomp: MontgomeryPrecomp<u64> = MontgomeryPrecomp::new(q);
        let x: u64 = 0x5f876e514845cc8b % q;
        let y: u64 = 0xad726f98f24a761a % q;
        let y_mont: Montgomery<u64> = m_precomp.prepare::<ONCE>(y);
        assert_eq!(
            m_precomp.mul_external::<ONCE>(y_mont, x),
            (x as u128 * y as u128 % q as u128) as u64
        );
    }

    #[test]
    fn test_prepare_unprepare_roundtrip() {
        let q: u64 = 0xffffffffffc0001;
        let m_precomp: MontgomeryPrecomp<u64> = MontgomeryPrecomp::new(q);
        for x in [0u64, 1, 2, q - 1, q >> 1, 0xdeadbeef % q] {
            let x_mont: Montgomery<u64> = m_precomp.prepare::<ONCE>(x);
            assert_eq!(m_precomp.unprepare::<ONCE>(x_mont), x);
        }
    }

    #[test]
    fn test_pow() {
        let q: u64 = 65537;
        let m_precomp: MontgomeryPrecomp<u64> = MontgomeryPrecomp::new(q);
        let x_mont: Montgomery<u64> = m_precomp.prepare::<ONCE>(3);
        // 3^16 = 43046721 mod 65537
        assert_eq!(m_precomp.unprepare::<ONCE>(m_precomp.pow(x_mont, 16)), 43046721 % q);
    }
}
