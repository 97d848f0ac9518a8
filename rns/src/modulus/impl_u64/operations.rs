use crate::modulus::barrett::Barrett;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::prime::Prime;
use crate::modulus::{ONCE, REDUCEMOD};
use crate::{apply_binary, apply_ternary, apply_unary};
use itertools::izip;

/// Single-word kernels. All vector kernels below are built from these.
impl Prime<u64> {
    #[inline(always)]
    fn word_reduce_assign<const REDUCE: REDUCEMOD>(&self, x: &mut u64) {
        self.montgomery.reduce_assign::<REDUCE>(x);
    }

    #[inline(always)]
    fn word_add_binary_assign<const REDUCE: REDUCEMOD>(&self, a: &u64, b: &u64, c: &mut u64) {
        *c = a.wrapping_add(*b);
        self.word_reduce_assign::<REDUCE>(c);
    }

    #[inline(always)]
    fn word_add_unary_assign<const REDUCE: REDUCEMOD>(&self, a: &u64, b: &mut u64) {
        *b = a.wrapping_add(*b);
        self.word_reduce_assign::<REDUCE>(b);
    }

    #[inline(always)]
    fn word_sub_binary_assign<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &u64,
        b: &u64,
        c: &mut u64,
    ) {
        *c = a.wrapping_add((BRANGE as u64 * self.q).wrapping_sub(*b));
        self.word_reduce_assign::<REDUCE>(c);
    }

    #[inline(always)]
    fn word_sub_unary_assign<const BRANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &u64, b: &mut u64) {
        *b = a.wrapping_add((BRANGE as u64 * self.q).wrapping_sub(*b));
        self.word_reduce_assign::<REDUCE>(b);
    }

    #[inline(always)]
    fn word_sub_from_unary_assign<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        b: &u64,
        a: &mut u64,
    ) {
        *a = a.wrapping_add((BRANGE as u64 * self.q).wrapping_sub(*b));
        self.word_reduce_assign::<REDUCE>(a);
    }

    #[inline(always)]
    fn word_neg_unary_assign<const ARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &mut u64) {
        *a = (ARANGE as u64 * self.q).wrapping_sub(*a);
        self.word_reduce_assign::<REDUCE>(a)
    }

    #[inline(always)]
    fn word_neg_binary_assign<const ARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &u64, b: &mut u64) {
        *b = (ARANGE as u64 * self.q).wrapping_sub(*a);
        self.word_reduce_assign::<REDUCE>(b)
    }

    #[inline(always)]
    fn word_prepare_montgomery_assign<const REDUCE: REDUCEMOD>(
        &self,
        a: &u64,
        b: &mut Montgomery<u64>,
    ) {
        self.montgomery.prepare_assign::<REDUCE>(*a, b);
    }

    #[inline(always)]
    fn word_unprepare_montgomery_assign<const REDUCE: REDUCEMOD>(
        &self,
        a: &Montgomery<u64>,
        b: &mut u64,
    ) {
        self.montgomery.unprepare_assign::<REDUCE>(*a, b);
    }

    #[inline(always)]
    fn word_mul_montgomery_binary_assign<const REDUCE: REDUCEMOD>(
        &self,
        a: &Montgomery<u64>,
        b: &u64,
        c: &mut u64,
    ) {
        *c = self.montgomery.mul_external::<REDUCE>(*a, *b);
    }

    #[inline(always)]
    fn word_mul_montgomery_unary_assign<const REDUCE: REDUCEMOD>(
        &self,
        a: &Montgomery<u64>,
        b: &mut u64,
    ) {
        self.montgomery.mul_external_assign::<REDUCE>(*a, b);
    }

    #[inline(always)]
    fn word_mul_montgomery_add_assign<const REDUCE1: REDUCEMOD, const REDUCE2: REDUCEMOD>(
        &self,
        a: &Montgomery<u64>,
        b: &u64,
        c: &mut u64,
    ) {
        *c = c.wrapping_add(self.montgomery.mul_external::<REDUCE1>(*a, *b));
        self.word_reduce_assign::<REDUCE2>(c);
    }

    #[inline(always)]
    fn word_mul_montgomery_sub_assign<const REDUCE: REDUCEMOD>(
        &self,
        a: &Montgomery<u64>,
        b: &u64,
        c: &mut u64,
    ) {
        *c = c.wrapping_add(self.q.wrapping_sub(self.montgomery.mul_external::<ONCE>(*a, *b)));
        self.word_reduce_assign::<REDUCE>(c);
    }

    // full 128-bit Barrett product, both operands plain
    #[inline(always)]
    fn word_mul_binary_assign(&self, a: &u64, b: &u64, c: &mut u64) {
        *c = self.barrett.reduce_u128(*a as u128 * *b as u128);
    }

    #[inline(always)]
    fn word_mul_barrett_binary_assign<const REDUCE: REDUCEMOD>(
        &self,
        a: &Barrett<u64>,
        b: &u64,
        c: &mut u64,
    ) {
        *c = self.barrett.mul_external::<REDUCE>(a, b);
    }

    #[inline(always)]
    fn word_mul_barrett_unary_assign<const REDUCE: REDUCEMOD>(&self, a: &Barrett<u64>, b: &mut u64) {
        self.barrett.mul_external_assign::<REDUCE>(a, b);
    }

    // c = (a + BRANGE*q - b) * s
    #[inline(always)]
    fn word_sub_mul_barrett_assign<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &u64,
        b: &u64,
        s: &Barrett<u64>,
        c: &mut u64,
    ) {
        *c = a.wrapping_add((BRANGE as u64 * self.q).wrapping_sub(*b));
        self.barrett.mul_external_assign::<REDUCE>(s, c);
    }

    // b = (a + t + BRANGE*q - b) * s
    #[inline(always)]
    fn word_add_scalar_sub_mul_barrett_assign<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &u64,
        t: &u64,
        s: &Barrett<u64>,
        b: &mut u64,
    ) {
        *b = a
            .wrapping_add(*t)
            .wrapping_add((BRANGE as u64 * self.q).wrapping_sub(*b));
        self.barrett.mul_external_assign::<REDUCE>(s, b);
    }

    // c = (a + t + BRANGE*q - b) * s
    #[inline(always)]
    fn word_add_scalar_sub_mul_barrett_binary_assign<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &u64,
        t: &u64,
        b: &u64,
        s: &Barrett<u64>,
        c: &mut u64,
    ) {
        *c = a
            .wrapping_add(*t)
            .wrapping_add((BRANGE as u64 * self.q).wrapping_sub(*b));
        self.barrett.mul_external_assign::<REDUCE>(s, c);
    }
}

/// Vectorized kernels, unrolled in CHUNK-wide blocks.
impl Prime<u64> {
    #[inline(always)]
    pub fn vec_reduce_assign<const CHUNK: usize, const REDUCE: REDUCEMOD>(&self, x: &mut [u64]) {
        apply_unary!(self, Self::word_reduce_assign::<REDUCE>, x, CHUNK);
    }

    #[inline(always)]
    pub fn vec_add_binary_assign<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &[u64],
        c: &mut [u64],
    ) {
        apply_ternary!(self, Self::word_add_binary_assign::<REDUCE>, a, b, c, CHUNK);
    }

    #[inline(always)]
    pub fn vec_add_unary_assign<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &mut [u64],
    ) {
        apply_binary!(self, Self::word_add_unary_assign::<REDUCE>, a, b, CHUNK);
    }

    #[inline(always)]
    pub fn vec_sub_binary_assign<const CHUNK: usize, const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &[u64],
        c: &mut [u64],
    ) {
        apply_ternary!(
            self,
            Self::word_sub_binary_assign::<BRANGE, REDUCE>,
            a,
            b,
            c,
            CHUNK
        );
    }

    /// b <- a - b
    #[inline(always)]
    pub fn vec_sub_unary_assign<const CHUNK: usize, const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &mut [u64],
    ) {
        apply_binary!(self, Self::word_sub_unary_assign::<BRANGE, REDUCE>, a, b, CHUNK);
    }

    /// a <- a - b
    #[inline(always)]
    pub fn vec_sub_from_unary_assign<const CHUNK: usize, const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        b: &[u64],
        a: &mut [u64],
    ) {
        apply_binary!(self, Self::word_sub_from_unary_assign::<BRANGE, REDUCE>, b, a, CHUNK);
    }

    #[inline(always)]
    pub fn vec_neg_unary_assign<const CHUNK: usize, const ARANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &mut [u64],
    ) {
        apply_unary!(self, Self::word_neg_unary_assign::<ARANGE, REDUCE>, a, CHUNK);
    }

    #[inline(always)]
    pub fn vec_neg_binary_assign<const CHUNK: usize, const ARANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &mut [u64],
    ) {
        apply_binary!(self, Self::word_neg_binary_assign::<ARANGE, REDUCE>, a, b, CHUNK);
    }

    #[inline(always)]
    pub fn vec_add_scalar_unary_assign<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &u64,
        b: &mut [u64],
    ) {
        let f = |p: &Self, b: &mut u64| p.word_add_unary_assign::<REDUCE>(a, b);
        apply_unary!(self, f, b, CHUNK);
    }

    #[inline(always)]
    pub fn vec_add_scalar_binary_assign<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &u64,
        c: &mut [u64],
    ) {
        let f = |p: &Self, a: &u64, c: &mut u64| p.word_add_binary_assign::<REDUCE>(a, b, c);
        apply_binary!(self, f, a, c, CHUNK);
    }

    #[inline(always)]
    pub fn vec_prepare_montgomery_assign<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[u64],
        b: &mut [Montgomery<u64>],
    ) {
        apply_binary!(self, Self::word_prepare_montgomery_assign::<REDUCE>, a, b, CHUNK);
    }

    #[inline(always)]
    pub fn vec_unprepare_montgomery_assign<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<u64>],
        b: &mut [u64],
    ) {
        apply_binary!(self, Self::word_unprepare_montgomery_assign::<REDUCE>, a, b, CHUNK);
    }

    /// c[i] <- a[i] * b[i] mod q, both operands outside the Montgomery domain.
    #[inline(always)]
    pub fn vec_mul_binary_assign<const CHUNK: usize>(&self, a: &[u64], b: &[u64], c: &mut [u64]) {
        apply_ternary!(self, Self::word_mul_binary_assign, a, b, c, CHUNK);
    }

    #[inline(always)]
    pub fn vec_mul_montgomery_binary_assign<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<u64>],
        b: &[u64],
        c: &mut [u64],
    ) {
        apply_ternary!(
            self,
            Self::word_mul_montgomery_binary_assign::<REDUCE>,
            a,
            b,
            c,
            CHUNK
        );
    }

    #[inline(always)]
    pub fn vec_mul_montgomery_unary_assign<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<u64>],
        b: &mut [u64],
    ) {
        apply_binary!(self, Self::word_mul_montgomery_unary_assign::<REDUCE>, a, b, CHUNK);
    }

    /// c[i] <- c[i] + a[i] * b[i]. REDUCE1 applies to the product,
    /// REDUCE2 to the sum; NONE/NONE accumulates lazily.
    #[inline(always)]
    pub fn vec_mul_montgomery_add_assign<
        const CHUNK: usize,
        const REDUCE1: REDUCEMOD,
        const REDUCE2: REDUCEMOD,
    >(
        &self,
        a: &[Montgomery<u64>],
        b: &[u64],
        c: &mut [u64],
    ) {
        apply_ternary!(
            self,
            Self::word_mul_montgomery_add_assign::<REDUCE1, REDUCE2>,
            a,
            b,
            c,
            CHUNK
        );
    }

    /// c[i] <- c[i] - a[i] * b[i]
    #[inline(always)]
    pub fn vec_mul_montgomery_sub_assign<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &[Montgomery<u64>],
        b: &[u64],
        c: &mut [u64],
    ) {
        apply_ternary!(
            self,
            Self::word_mul_montgomery_sub_assign::<REDUCE>,
            a,
            b,
            c,
            CHUNK
        );
    }

    #[inline(always)]
    pub fn vec_mul_barrett_binary_assign<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &Barrett<u64>,
        b: &[u64],
        c: &mut [u64],
    ) {
        let f = |p: &Self, b: &u64, c: &mut u64| p.word_mul_barrett_binary_assign::<REDUCE>(a, b, c);
        apply_binary!(self, f, b, c, CHUNK);
    }

    #[inline(always)]
    pub fn vec_mul_barrett_unary_assign<const CHUNK: usize, const REDUCE: REDUCEMOD>(
        &self,
        a: &Barrett<u64>,
        b: &mut [u64],
    ) {
        let f = |p: &Self, b: &mut u64| p.word_mul_barrett_unary_assign::<REDUCE>(a, b);
        apply_unary!(self, f, b, CHUNK);
    }

    /// c[i] <- (a[i] + BRANGE*q - b[i]) * s
    #[inline(always)]
    pub fn vec_sub_mul_barrett_binary_assign<
        const CHUNK: usize,
        const BRANGE: u8,
        const REDUCE: REDUCEMOD,
    >(
        &self,
        a: &[u64],
        b: &[u64],
        s: &Barrett<u64>,
        c: &mut [u64],
    ) {
        let f = |p: &Self, a: &u64, b: &u64, c: &mut u64| {
            p.word_sub_mul_barrett_assign::<BRANGE, REDUCE>(a, b, s, c)
        };
        apply_ternary!(self, f, a, b, c, CHUNK);
    }

    /// b[i] <- (a[i] + BRANGE*q - b[i]) * s
    #[inline(always)]
    pub fn vec_sub_mul_barrett_unary_assign<
        const CHUNK: usize,
        const BRANGE: u8,
        const REDUCE: REDUCEMOD,
    >(
        &self,
        a: &[u64],
        s: &Barrett<u64>,
        b: &mut [u64],
    ) {
        let f = |p: &Self, a: &u64, b: &mut u64| {
            let t: u64 = *b;
            p.word_sub_mul_barrett_assign::<BRANGE, REDUCE>(a, &t, s, b)
        };
        apply_binary!(self, f, a, b, CHUNK);
    }

    /// b[i] <- (a[i] + t + BRANGE*q - b[i]) * s
    #[inline(always)]
    pub fn vec_add_scalar_sub_mul_barrett_unary_assign<
        const CHUNK: usize,
        const BRANGE: u8,
        const REDUCE: REDUCEMOD,
    >(
        &self,
        a: &[u64],
        t: &u64,
        s: &Barrett<u64>,
        b: &mut [u64],
    ) {
        let f = |p: &Self, a: &u64, b: &mut u64| {
            p.word_add_scalar_sub_mul_barrett_assign::<BRANGE, REDUCE>(a, t, s, b)
        };
        apply_binary!(self, f, a, b, CHUNK);
    }

    /// c[i] <- (a[i] + t + BRANGE*q - b[i]) * s
    #[inline(always)]
    pub fn vec_add_scalar_sub_mul_barrett_binary_assign<
        const CHUNK: usize,
        const BRANGE: u8,
        const REDUCE: REDUCEMOD,
    >(
        &self,
        a: &[u64],
        t: &u64,
        b: &[u64],
        s: &Barrett<u64>,
        c: &mut [u64],
    ) {
        let f = |p: &Self, a: &u64, b: &u64, c: &mut u64| {
            p.word_add_scalar_sub_mul_barrett_binary_assign::<BRANGE, REDUCE>(a, t, b, s, c)
        };
        apply_ternary!(self, f, a, b, c, CHUNK);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modulus::{BARRETT, NONE, ONCE};
    use crate::CHUNK;

    fn prime() -> Prime<u64> {
        Prime::<u64>::new(0xffff00001)
    }

    #[test]
    fn test_vec_add_sub_roundtrip() {
        let p: Prime<u64> = prime();
        let q: u64 = p.q;
        let a: Vec<u64> = (0..37u64).map(|i| (i * 0x123456789) % q).collect();
        let b: Vec<u64> = (0..37u64).map(|i| (i * 0x987654321) % q).collect();
        let mut c: Vec<u64> = vec![0; 37];
        let mut d: Vec<u64> = vec![0; 37];
        p.vec_add_binary_assign::<CHUNK, ONCE>(&a, &b, &mut c);
        p.vec_sub_binary_assign::<CHUNK, 1, ONCE>(&c, &b, &mut d);
        assert_eq!(a, d);
    }

    #[test]
    fn test_vec_mul_matches_montgomery_path() {
        let p: Prime<u64> = prime();
        let q: u64 = p.q;
        let a: Vec<u64> = (0..24u64).map(|i| (i * 0x2468ace) % q).collect();
        let b: Vec<u64> = (0..24u64).map(|i| (i * 0x13579bd) % q).collect();

        let mut direct: Vec<u64> = vec![0; 24];
        p.vec_mul_binary_assign::<CHUNK>(&a, &b, &mut direct);

        let mut a_mont: Vec<u64> = vec![0; 24];
        p.vec_prepare_montgomery_assign::<CHUNK, ONCE>(&a, &mut a_mont);
        let mut via_mont: Vec<u64> = vec![0; 24];
        p.vec_mul_montgomery_binary_assign::<CHUNK, ONCE>(&a_mont, &b, &mut via_mont);

        assert_eq!(direct, via_mont);
    }

    #[test]
    fn test_vec_mul_montgomery_add() {
        let p: Prime<u64> = prime();
        let q: u64 = p.q;
        let a: Vec<u64> = (0..16u64).map(|i| (i * 0xabcdef) % q).collect();
        let b: Vec<u64> = (0..16u64).map(|i| (i * 0x13579b) % q).collect();
        let mut a_mont: Vec<u64> = vec![0; 16];
        p.vec_prepare_montgomery_assign::<CHUNK, ONCE>(&a, &mut a_mont);
        let mut c: Vec<u64> = vec![0; 16];
        p.vec_mul_montgomery_binary_assign::<CHUNK, NONE>(&a_mont, &b, &mut c);
        p.vec_mul_montgomery_add_assign::<CHUNK, NONE, NONE>(&a_mont, &b, &mut c);
        p.vec_reduce_assign::<CHUNK, BARRETT>(&mut c);
        for i in 0..16 {
            let expect: u64 = ((2 * (a[i] as u128 * b[i] as u128)) % q as u128) as u64;
            assert_eq!(c[i], expect);
        }
    }
}
