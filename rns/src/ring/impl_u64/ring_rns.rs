use crate::modulus::barrett::Barrett;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::REDUCEMOD;
use crate::poly::PolyRNS;
use crate::ring::{Ring, RingRNS, RingType};
use crate::scalar::ScalarRNS;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::sync::Arc;

impl RingRNS<u64> {
    pub fn new(n: usize, moduli: Vec<u64>, ring_type: RingType) -> Self {
        assert!(!moduli.is_empty(), "moduli cannot be empty");
        let rings: Vec<Arc<Ring<u64>>> = moduli
            .into_iter()
            .map(|q| Arc::new(Ring::new(n, q, ring_type)))
            .collect();
        RingRNS(rings)
    }

    /// Builds a sub-ring over an arbitrary subset of already-constructed prime rings.
    pub fn from_rings(rings: Vec<Arc<Ring<u64>>>) -> Self {
        assert!(!rings.is_empty(), "rings cannot be empty");
        RingRNS(rings)
    }

    /// Product of all prime moduli.
    pub fn modulus_big(&self) -> BigInt {
        let mut modulus: BigInt = BigInt::from(1);
        self.0.iter().for_each(|r| modulus *= BigInt::from(r.modulus.q));
        modulus
    }

    /// Barrett constants -(q_level^-1) mod q_i used by the rescaling kernels.
    pub fn rescaling_constants(&self) -> ScalarRNS<Barrett<u64>> {
        let level: usize = self.level();
        let q_scale: u64 = self.0[level].modulus.q;
        ScalarRNS(
            (0..level)
                .map(|i| {
                    let q_i: u64 = self.0[i].modulus.q;
                    self.0[i]
                        .modulus
                        .barrett
                        .prepare(q_i - self.0[i].modulus.inv(q_scale % q_i))
                })
                .collect(),
        )
    }
}

impl RingRNS<u64> {
    pub fn ntt_inplace<const LAZY: bool>(&self, a: &mut PolyRNS<u64>) {
        debug_assert!(!a.is_ntt, "a is already in the NTT domain");
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.ntt_inplace::<LAZY>(a.at_mut(i)));
        a.is_ntt = true;
    }

    pub fn intt_inplace<const LAZY: bool>(&self, a: &mut PolyRNS<u64>) {
        debug_assert!(a.is_ntt, "a is not in the NTT domain");
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.intt_inplace::<LAZY>(a.at_mut(i)));
        a.is_ntt = false;
    }

    pub fn ntt<const LAZY: bool>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.ntt::<LAZY>(a.at(i), b.at_mut(i)));
        b.is_ntt = true;
    }

    pub fn intt<const LAZY: bool>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.intt::<LAZY>(a.at(i), b.at_mut(i)));
        b.is_ntt = false;
    }
}

macro_rules! check_levels {
    ($self:expr, $($p:expr),+) => {
        $(
            debug_assert!(
                $p.level() >= $self.level(),
                "operand level {} < ring level {}",
                $p.level(),
                $self.level()
            );
        )+
    };
}

impl RingRNS<u64> {
    #[inline(always)]
    pub fn reduce_inplace<const REDUCE: REDUCEMOD>(&self, a: &mut PolyRNS<u64>) {
        check_levels!(self, a);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.reduce_inplace::<REDUCE>(a.at_mut(i)));
    }

    #[inline(always)]
    pub fn add<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        check_levels!(self, a, b, c);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.add::<REDUCE>(a.at(i), b.at(i), c.at_mut(i)));
        c.is_ntt = a.is_ntt;
    }

    #[inline(always)]
    pub fn add_inplace<const REDUCE: REDUCEMOD>(&self, a: &PolyRNS<u64>, b: &mut PolyRNS<u64>) {
        check_levels!(self, a, b);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.add_inplace::<REDUCE>(a.at(i), b.at_mut(i)));
    }

    #[inline(always)]
    pub fn sub<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        check_levels!(self, a, b, c);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.sub::<BRANGE, REDUCE>(a.at(i), b.at(i), c.at_mut(i)));
        c.is_ntt = a.is_ntt;
    }

    /// b <- a - b
    #[inline(always)]
    pub fn sub_inplace<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &mut PolyRNS<u64>,
    ) {
        check_levels!(self, a, b);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.sub_inplace::<BRANGE, REDUCE>(a.at(i), b.at_mut(i)));
    }

    /// a <- a - b
    #[inline(always)]
    pub fn sub_from_inplace<const BRANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        b: &PolyRNS<u64>,
        a: &mut PolyRNS<u64>,
    ) {
        check_levels!(self, a, b);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.sub_from_inplace::<BRANGE, REDUCE>(b.at(i), a.at_mut(i)));
    }

    #[inline(always)]
    pub fn neg<const ARANGE: u8, const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &mut PolyRNS<u64>,
    ) {
        check_levels!(self, a, b);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.neg::<ARANGE, REDUCE>(a.at(i), b.at_mut(i)));
        b.is_ntt = a.is_ntt;
    }

    #[inline(always)]
    pub fn neg_inplace<const ARANGE: u8, const REDUCE: REDUCEMOD>(&self, a: &mut PolyRNS<u64>) {
        check_levels!(self, a);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.neg_inplace::<ARANGE, REDUCE>(a.at_mut(i)));
    }

    /// c <- a * b, both operands outside the Montgomery domain.
    #[inline(always)]
    pub fn mul(&self, a: &PolyRNS<u64>, b: &PolyRNS<u64>, c: &mut PolyRNS<u64>) {
        check_levels!(self, a, b, c);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.mul(a.at(i), b.at(i), c.at_mut(i)));
        c.is_ntt = a.is_ntt;
    }

    /// b <- a * s with s an unprepared scalar.
    pub fn mul_scalar<const REDUCE: REDUCEMOD>(&self, a: &PolyRNS<u64>, s: u64, b: &mut PolyRNS<u64>) {
        check_levels!(self, a, b);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            let s_brt: Barrett<u64> = ring.modulus.barrett.prepare(s % ring.modulus.q);
            ring.mul_scalar_barrett::<REDUCE>(&s_brt, a.at(i), b.at_mut(i));
        });
        b.is_ntt = a.is_ntt;
    }

    #[inline(always)]
    pub fn mform<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        b: &mut PolyRNS<Montgomery<u64>>,
    ) {
        check_levels!(self, a, b);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.mform::<REDUCE>(a.at(i), b.at_mut(i)));
        b.is_ntt = a.is_ntt;
    }

    #[inline(always)]
    pub fn mform_inplace<const REDUCE: REDUCEMOD>(&self, a: &mut PolyRNS<u64>) {
        check_levels!(self, a);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            let montgomery = &ring.modulus.montgomery;
            a.at_mut(i).0.iter_mut().for_each(|x| {
                let v: u64 = *x;
                montgomery.prepare_assign::<REDUCE>(v, x);
            });
        });
    }

    #[inline(always)]
    pub fn inv_mform_inplace<const REDUCE: REDUCEMOD>(&self, a: &mut PolyRNS<u64>) {
        check_levels!(self, a);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            let montgomery = &ring.modulus.montgomery;
            a.at_mut(i).0.iter_mut().for_each(|x| {
                let v: u64 = *x;
                montgomery.unprepare_assign::<REDUCE>(v, x);
            });
        });
    }

    #[inline(always)]
    pub fn inv_mform<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<Montgomery<u64>>,
        b: &mut PolyRNS<u64>,
    ) {
        check_levels!(self, a, b);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.inv_mform::<REDUCE>(a.at(i), b.at_mut(i)));
        b.is_ntt = a.is_ntt;
    }

    #[inline(always)]
    pub fn mul_montgomery_external<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<Montgomery<u64>>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        check_levels!(self, a, b, c);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            ring.mul_montgomery_external::<REDUCE>(a.at(i), b.at(i), c.at_mut(i))
        });
        c.is_ntt = b.is_ntt;
    }

    #[inline(always)]
    pub fn mul_montgomery_external_inplace<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<Montgomery<u64>>,
        b: &mut PolyRNS<u64>,
    ) {
        check_levels!(self, a, b);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            ring.mul_montgomery_external_inplace::<REDUCE>(a.at(i), b.at_mut(i))
        });
    }

    #[inline(always)]
    pub fn mul_montgomery_external_add_inplace<
        const REDUCE1: REDUCEMOD,
        const REDUCE2: REDUCEMOD,
    >(
        &self,
        a: &PolyRNS<Montgomery<u64>>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        check_levels!(self, a, b, c);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            ring.mul_montgomery_external_add_inplace::<REDUCE1, REDUCE2>(
                a.at(i),
                b.at(i),
                c.at_mut(i),
            )
        });
    }

    #[inline(always)]
    pub fn mul_montgomery_external_sub_inplace<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<Montgomery<u64>>,
        b: &PolyRNS<u64>,
        c: &mut PolyRNS<u64>,
    ) {
        check_levels!(self, a, b, c);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            ring.mul_montgomery_external_sub_inplace::<REDUCE>(a.at(i), b.at(i), c.at_mut(i))
        });
    }

    /// b <- a * s mod each q_i, with s reduced per prime.
    pub fn mul_scalar_bigint<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        s: &BigInt,
        b: &mut PolyRNS<u64>,
    ) {
        check_levels!(self, a, b);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            let s_i: u64 = bigint_mod_u64(s, ring.modulus.q);
            let s_brt: Barrett<u64> = ring.modulus.barrett.prepare(s_i);
            ring.mul_scalar_barrett::<REDUCE>(&s_brt, a.at(i), b.at_mut(i));
        });
        b.is_ntt = a.is_ntt;
    }

    pub fn mul_scalar_bigint_inplace<const REDUCE: REDUCEMOD>(
        &self,
        s: &BigInt,
        a: &mut PolyRNS<u64>,
    ) {
        check_levels!(self, a);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            let s_i: u64 = bigint_mod_u64(s, ring.modulus.q);
            let s_brt: Barrett<u64> = ring.modulus.barrett.prepare(s_i);
            ring.mul_scalar_barrett_inplace::<REDUCE>(&s_brt, a.at_mut(i));
        });
    }

    /// b <- a + s mod each q_i.
    pub fn add_scalar_bigint<const REDUCE: REDUCEMOD>(
        &self,
        a: &PolyRNS<u64>,
        s: &BigInt,
        b: &mut PolyRNS<u64>,
    ) {
        check_levels!(self, a, b);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            let s_i: u64 = bigint_mod_u64(s, ring.modulus.q);
            ring.add_scalar::<REDUCE>(a.at(i), &s_i, b.at_mut(i));
        });
        b.is_ntt = a.is_ntt;
    }

    pub fn add_scalar_bigint_inplace<const REDUCE: REDUCEMOD>(
        &self,
        s: &BigInt,
        a: &mut PolyRNS<u64>,
    ) {
        check_levels!(self, a);
        self.0.iter().enumerate().for_each(|(i, ring)| {
            let s_i: u64 = bigint_mod_u64(s, ring.modulus.q);
            ring.add_scalar_inplace::<REDUCE>(&s_i, a.at_mut(i));
        });
    }
}

impl RingRNS<u64> {
    /// Writes the centered CRT reconstruction of a into coeffs.
    pub fn to_bigint_inplace(&self, a: &PolyRNS<u64>, coeffs: &mut [BigInt]) {
        debug_assert!(
            coeffs.len() <= a.n(),
            "invalid coeffs: coeffs.len()={} > a.n()={}",
            coeffs.len(),
            a.n()
        );
        check_levels!(self, a);

        let level: usize = self.level();
        let q_big: BigInt = self.modulus_big();
        let q_big_half: BigInt = &q_big >> 1;

        let mut inv_crt: Vec<BigInt> = vec![BigInt::default(); level + 1];
        inv_crt.iter_mut().enumerate().for_each(|(i, c)| {
            let qi_big: BigInt = BigInt::from(self.0[i].modulus.q);
            *c = &q_big / &qi_big;
            *c *= c.modinv(&qi_big).unwrap();
        });

        coeffs.iter_mut().enumerate().for_each(|(j, c)| {
            *c = BigInt::from(a.at(0).0[j]) * &inv_crt[0];
            (1..level + 1).for_each(|i| {
                *c += BigInt::from(a.at(i).0[j]) * &inv_crt[i];
            });
            *c %= &q_big;
            if &*c > &q_big_half {
                *c -= &q_big;
            }
        });
    }

    /// Fills a with the residues of coeffs.
    pub fn from_bigint_inplace(&self, coeffs: &[BigInt], a: &mut PolyRNS<u64>) {
        check_levels!(self, a);
        self.0
            .iter()
            .enumerate()
            .for_each(|(i, ring)| ring.from_bigint(coeffs, a.at_mut(i)));
        a.is_ntt = false;
    }
}

#[inline(always)]
pub fn bigint_mod_u64(s: &BigInt, q: u64) -> u64 {
    let q_big: BigInt = BigInt::from(q);
    let mut r: BigInt = s % &q_big;
    if r.sign() == num_bigint::Sign::Minus {
        r += &q_big;
    }
    r.to_u64().unwrap()
}
