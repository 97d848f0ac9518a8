use crate::dft::ntt::Table;
use crate::modulus::barrett::Barrett;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::prime::Prime;
use crate::modulus::REDUCEMOD;
use crate::poly::Poly;
use crate::ring::{Ring, RingType};
use crate::CHUNK;
use num_bigint::BigInt;
use num_traits::ToPrimitive;

impl Ring<u64> {
    pub fn new(n: usize, q: u64, ring_type: RingType) -> Self {
        assert!(n & (n - 1) == 0, "invalid argument: n = {} is not a power of two", n);
        let prime: Prime<u64> = Prime::<u64>::new(q);
        let cyclotomic_order: usize = match ring_type {
            RingType::Standard => n << 1,
            RingType::ConjugateInvariant => n << 2,
        };
        Self {
            n: n,
            ring_type: ring_type,
            modulus: prime.clone(),
            cyclotomic_order: cyclotomic_order,
            dft: Box::new(Table::<u64>::new(prime, n, ring_type)),
        }
    }

    pub fn from_bigint(&self, coeffs: &[BigInt], a: &mut Poly<u64>) {
        debug_assert!(coeffs.len() <= a.n());
        let q_big: BigInt = BigInt::from(self.modulus.q);
        a.0.iter_mut()
            .zip(coeffs.iter())
            .for_each(|(v, c)| {
                let mut r: BigInt = c % &q_big;
                if r.sign() == num_bigint::Sign::Minus {
                    r += &q_big;
                }
                *v = r.to_u64().unwrap()
            });
    }
}

impl Ring<u64> {
    pub fn ntt_inplace<const LAZY: bool>(&self, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        match LAZY {
            true => self.dft.forward_inplace_lazy(&mut a.0),
            false => self.dft.forward_inplace(&mut a.0),
        }
    }

    pub fn intt_inplace<const LAZY: bool>(&self, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        match LAZY {
            true => self.dft.backward_inplace_lazy(&mut a.0),
            false => self.dft.backward_inplace(&mut a.0),
        }
    }

    pub fn ntt<const LAZY: bool>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        b.0.copy_from_slice(&a.0);
        self.ntt_inplace::<LAZY>(b);
    }

    pub fn intt<const LAZY: bool>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        b.0.copy_from_slice(&a.0);
        self.intt_inplace::<LAZY>(b);
    }
}

impl Ring<u64> {
    #[inline(always)]
    pub fn reduce_inplace<const REDUCE: REDUCEMOD>(&self, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.vec_reduce_assign::<CHUNK, REDUCE>(&mut a.0);
    }

    /// c <- a + b
    #[inline(always)]
    pub fn add<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.vec_add_binary_assign::<CHUNK, REDUCE>(&a.0, &b.0, &mut c.0);
    }

    /// b <- b + a
    #[inline(always)]
    pub fn add_inplace<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus.vec_add_unary_assign::<CHUNK, REDUCE>(&a.0, &mut b.0);
    }

    /// c <- a - b
    #[inline(always)]
    pub fn sub<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        b: &Poly<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .vec_sub_binary_assign::<CHUNK, BRANGE, REDUCE>(&a.0, &b.0, &mut c.0);
    }

    /// b <- a - b
    #[inline(always)]
    pub fn sub_inplace<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        b: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .vec_sub_unary_assign::<CHUNK, BRANGE, REDUCE>(&a.0, &mut b.0);
    }

    /// a <- a - b
    #[inline(always)]
    pub fn sub_from_inplace<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        b: &Poly<u64>,
        a: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .vec_sub_from_unary_assign::<CHUNK, BRANGE, REDUCE>(&b.0, &mut a.0);
    }

    /// b <- -a
    #[inline(always)]
    pub fn neg<const ARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .vec_neg_binary_assign::<CHUNK, ARANGE, REDUCE>(&a.0, &mut b.0);
    }

    #[inline(always)]
    pub fn neg_inplace<const ARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.vec_neg_unary_assign::<CHUNK, ARANGE, REDUCE>(&mut a.0);
    }

    /// c <- a * b, both operands outside the Montgomery domain
    #[inline(always)]
    pub fn mul(&self, a: &Poly<u64>, b: &Poly<u64>, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus.vec_mul_binary_assign::<CHUNK>(&a.0, &b.0, &mut c.0);
    }

    /// b <- a * 2^64
    #[inline(always)]
    pub fn mform<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, b: &mut Poly<Montgomery<u64>>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .vec_prepare_montgomery_assign::<CHUNK, REDUCE>(&a.0, &mut b.0);
    }

    /// b <- a * 2^-64
    #[inline(always)]
    pub fn inv_mform<const REDUCE: REDUCEMOD>(&self, a: &Poly<Montgomery<u64>>, b: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .vec_unprepare_montgomery_assign::<CHUNK, REDUCE>(&a.0, &mut b.0);
    }

    /// c <- a * b with a in the Montgomery domain
    #[inline(always)]
    pub fn mul_montgomery_external<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<Montgomery<u64>>,
        b: &Poly<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .vec_mul_montgomery_binary_assign::<CHUNK, REDUCE>(&a.0, &b.0, &mut c.0);
    }

    /// b <- a * b with a in the Montgomery domain
    #[inline(always)]
    pub fn mul_montgomery_external_inplace<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<Montgomery<u64>>,
        b: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .vec_mul_montgomery_unary_assign::<CHUNK, REDUCE>(&a.0, &mut b.0);
    }

    /// c <- c + a * b with a in the Montgomery domain
    #[inline(always)]
    pub fn mul_montgomery_external_add_inplace<
        const REDUCE1: REDUCEMOD,
        const REDUCE2: REDUCEMOD,
    >(
        &self,
        a: &Poly<Montgomery<u64>>,
        b: &Poly<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .vec_mul_montgomery_add_assign::<CHUNK, REDUCE1, REDUCE2>(&a.0, &b.0, &mut c.0);
    }

    /// c <- c - a * b with a in the Montgomery domain
    #[inline(always)]
    pub fn mul_montgomery_external_sub_inplace<const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<Montgomery<u64>>,
        b: &Poly<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .vec_mul_montgomery_sub_assign::<CHUNK, REDUCE>(&a.0, &b.0, &mut c.0);
    }

    /// c <- a * s
    #[inline(always)]
    pub fn mul_scalar_barrett<const REDUCE: REDUCEMOD>(
        &self,
        s: &Barrett<u64>,
        a: &Poly<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .vec_mul_barrett_binary_assign::<CHUNK, REDUCE>(s, &a.0, &mut c.0);
    }

    #[inline(always)]
    pub fn mul_scalar_barrett_inplace<const REDUCE: REDUCEMOD>(
        &self,
        s: &Barrett<u64>,
        a: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.vec_mul_barrett_unary_assign::<CHUNK, REDUCE>(s, &mut a.0);
    }

    /// c <- a + s
    #[inline(always)]
    pub fn add_scalar<const REDUCE: REDUCEMOD>(&self, a: &Poly<u64>, s: &u64, c: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .vec_add_scalar_binary_assign::<CHUNK, REDUCE>(&a.0, s, &mut c.0);
    }

    #[inline(always)]
    pub fn add_scalar_inplace<const REDUCE: REDUCEMOD>(&self, s: &u64, a: &mut Poly<u64>) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        self.modulus.vec_add_scalar_unary_assign::<CHUNK, REDUCE>(s, &mut a.0);
    }

    /// c <- (a - b) * s
    #[inline(always)]
    pub fn sub_mul_scalar_barrett<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        b: &Poly<u64>,
        s: &Barrett<u64>,
        c: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        debug_assert!(c.n() == self.n(), "c.n()={} != n={}", c.n(), self.n());
        self.modulus
            .vec_sub_mul_barrett_binary_assign::<CHUNK, BRANGE, REDUCE>(&a.0, &b.0, s, &mut c.0);
    }

    /// b <- (a - b) * s
    #[inline(always)]
    pub fn sub_mul_scalar_barrett_inplace<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        s: &Barrett<u64>,
        b: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .vec_sub_mul_barrett_unary_assign::<CHUNK, BRANGE, REDUCE>(&a.0, s, &mut b.0);
    }

    /// b <- (a + t - b) * s
    #[inline(always)]
    pub fn add_scalar_sub_mul_barrett_inplace<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &Poly<u64>,
        t: &u64,
        s: &Barrett<u64>,
        b: &mut Poly<u64>,
    ) {
        debug_assert!(a.n() == self.n(), "a.n()={} != n={}", a.n(), self.n());
        debug_assert!(b.n() == self.n(), "b.n()={} != n={}", b.n(), self.n());
        self.modulus
            .vec_add_scalar_sub_mul_barrett_unary_assign::<CHUNK, BRANGE, REDUCE>(
                &a.0, t, s, &mut b.0,
            );
    }
}
