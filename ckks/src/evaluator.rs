use rlwe::key_switching::KeySwitcher;
use rlwe::keys::{RelinearizationKey, RotationKey, RotationKeySet};
use rns::modulus::barrett::Barrett;
use rns::modulus::ONCE;
use rns::poly::{Poly, PolyRNS};
use rns::ring::impl_u64::automorphism::AutoPermMap;
use rns::ring::RingRNS;

use crate::elements::Ciphertext;
use crate::errors::{Error, Result};
use crate::parameters::Parameters;

/// Homomorphic operations over CKKS ciphertexts. Multiplication and
/// rotation run their degree reduction through the owned key switcher;
/// everything else is plain ring arithmetic with scale bookkeeping.
///
/// An evaluator is single-threaded; shallow_copy yields an independent
/// worker sharing the read-only tables.
pub struct Evaluator {
    params: Parameters,
    ksw: KeySwitcher,
    perms: AutoPermMap,
    pool: [PolyRNS<u64>; 5],
    pool_rescale: [Poly<u64>; 2],
    ct_pool: Ciphertext,
}

impl Evaluator {
    pub fn new(params: &Parameters) -> Self {
        let n: usize = params.n();
        let level: usize = params.max_level();
        Self {
            params: params.clone(),
            ksw: KeySwitcher::new(params.rlwe()),
            perms: AutoPermMap::new(),
            pool: [
                PolyRNS::<u64>::new(n, level),
                PolyRNS::<u64>::new(n, level),
                PolyRNS::<u64>::new(n, level),
                PolyRNS::<u64>::new(n, level),
                PolyRNS::<u64>::new(n, level),
            ],
            pool_rescale: [Poly::<u64>::new(n), Poly::<u64>::new(n)],
            ct_pool: Ciphertext::new(params, 2, level, 0.0),
        }
    }

    pub fn shallow_copy(&self) -> Self {
        let n: usize = self.params.n();
        let level: usize = self.params.max_level();
        Self {
            params: self.params.clone(),
            ksw: self.ksw.shallow_copy(),
            perms: AutoPermMap::new(),
            pool: [
                PolyRNS::<u64>::new(n, level),
                PolyRNS::<u64>::new(n, level),
                PolyRNS::<u64>::new(n, level),
                PolyRNS::<u64>::new(n, level),
                PolyRNS::<u64>::new(n, level),
            ],
            pool_rescale: [Poly::<u64>::new(n), Poly::<u64>::new(n)],
            ct_pool: Ciphertext::new(&self.params, 2, level, 0.0),
        }
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    fn ring_at(&self, level: usize) -> RingRNS<u64> {
        self.params.rlwe().ring_q().at_level(level)
    }

    fn check_binary(a: &Ciphertext, b: &Ciphertext) {
        assert!(
            a.is_ntt() && b.is_ntt(),
            "operands must be in the NTT domain"
        );
    }

    /// c <- a + b. Operand scales are aligned by integer up-scaling of the
    /// smaller-scaled side when the ratio rounds above one.
    pub fn add(&mut self, a: &Ciphertext, b: &Ciphertext, c: &mut Ciphertext) {
        self.add_sub::<false>(a, b, c)
    }

    /// c <- a - b, with the same scale alignment as add.
    pub fn sub(&mut self, a: &Ciphertext, b: &Ciphertext, c: &mut Ciphertext) {
        self.add_sub::<true>(a, b, c)
    }

    fn add_sub<const SUB: bool>(&mut self, a: &Ciphertext, b: &Ciphertext, c: &mut Ciphertext) {
        Self::check_binary(a, b);
        let level: usize = a.level().min(b.level()).min(c.level());
        if c.level() > level {
            c.el.drop_level(c.level() - level);
        }
        let ring_q: RingRNS<u64> = self.ring_at(level);

        let ratio_a_over_b: f64 = a.scale / b.scale;

        // at most one operand is rescaled into the pool
        let (lhs, rhs): (&Ciphertext, &Ciphertext) = if ratio_a_over_b >= 2.0 {
            self.scale_up_into_pool(b, ratio_a_over_b.round() as u64, level);
            (a, &self.ct_pool)
        } else if ratio_a_over_b <= 0.5 {
            self.scale_up_into_pool(a, (1.0 / ratio_a_over_b).round() as u64, level);
            (&self.ct_pool, b)
        } else {
            (a, b)
        };

        let max_degree: usize = lhs.degree().max(rhs.degree());
        let min_degree: usize = lhs.degree().min(rhs.degree());
        c.el.resize_degree(max_degree);

        for i in 0..min_degree + 1 {
            if SUB {
                ring_q.sub::<1, ONCE>(&lhs.el.value[i], &rhs.el.value[i], &mut c.el.value[i]);
            } else {
                ring_q.add::<ONCE>(&lhs.el.value[i], &rhs.el.value[i], &mut c.el.value[i]);
            }
        }
        for i in min_degree + 1..max_degree + 1 {
            if lhs.degree() > rhs.degree() {
                c.el.value[i].copy_lvl(level, &lhs.el.value[i]);
            } else if SUB {
                ring_q.neg::<1, ONCE>(&rhs.el.value[i], &mut c.el.value[i]);
                c.el.value[i].is_ntt = true;
            } else {
                c.el.value[i].copy_lvl(level, &rhs.el.value[i]);
            }
        }

        c.scale = if a.scale > b.scale { a.scale } else { b.scale };
    }

    fn scale_up_into_pool(&mut self, x: &Ciphertext, ratio: u64, level: usize) {
        let ring_q: RingRNS<u64> = self.ring_at(level);
        self.ct_pool.el.resize_degree(x.degree());
        for (i, component) in x.el.value.iter().enumerate() {
            for (j, r) in ring_q.0.iter().enumerate() {
                let s: Barrett<u64> = r.modulus.barrett.prepare(ratio % r.modulus.q);
                r.mul_scalar_barrett::<ONCE>(&s, component.at(j), self.ct_pool.el.value[i].at_mut(j));
            }
            self.ct_pool.el.value[i].is_ntt = component.is_ntt;
        }
        self.ct_pool.scale = x.scale * ratio as f64;
    }

    /// c <- a * b without relinearization; c has degree 2.
    pub fn mul(&mut self, a: &Ciphertext, b: &Ciphertext, c: &mut Ciphertext) {
        self.mul_internal(a, b, None, c)
    }

    /// c <- a * b followed by relinearization to degree 1.
    /// The output scale is the product of the operand scales.
    pub fn mul_relin(
        &mut self,
        a: &Ciphertext,
        b: &Ciphertext,
        rlk: &RelinearizationKey,
        c: &mut Ciphertext,
    ) {
        self.mul_internal(a, b, Some(rlk), c)
    }

    fn mul_internal(
        &mut self,
        a: &Ciphertext,
        b: &Ciphertext,
        rlk: Option<&RelinearizationKey>,
        c: &mut Ciphertext,
    ) {
        Self::check_binary(a, b);
        assert!(
            a.degree() == 1 && b.degree() == 1,
            "mul: operands must have degree 1"
        );

        let level: usize = a.level().min(b.level()).min(c.level());
        if c.level() > level {
            c.el.drop_level(c.level() - level);
        }
        let ring_q: RingRNS<u64> = self.ring_at(level);

        let squaring: bool = std::ptr::eq(a, b);

        // Montgomery tensor: c0 = a0*b0, c1 = a0*b1 + a1*b0, c2 = a1*b1
        ring_q.mform::<ONCE>(&a.el.value[0], &mut self.pool[0]);
        ring_q.mform::<ONCE>(&a.el.value[1], &mut self.pool[1]);

        ring_q.mul_montgomery_external::<ONCE>(&self.pool[0], &b.el.value[0], &mut c.el.value[0]);
        {
            let (pool1_slice, pool2_slice) = self.pool.split_at_mut(2);
            ring_q.mul_montgomery_external::<ONCE>(
                &pool1_slice[1],
                &b.el.value[1],
                &mut pool2_slice[0],
            );
        }
        ring_q.mul_montgomery_external::<ONCE>(&self.pool[0], &b.el.value[1], &mut c.el.value[1]);
        if squaring {
            self.pool[3].copy_lvl(level, &c.el.value[1]);
            ring_q.add_inplace::<ONCE>(&self.pool[3], &mut c.el.value[1]);
        } else {
            ring_q.mul_montgomery_external_add_inplace::<ONCE, ONCE>(
                &self.pool[1],
                &b.el.value[0],
                &mut c.el.value[1],
            );
        }

        c.scale = a.scale * b.scale;

        match rlk {
            Some(rlk) => {
                c.el.resize_degree(1);
                self.relinearize_pool2(level, rlk, c);
            }
            None => {
                c.el.resize_degree(2);
                c.el.value[2].copy_lvl(level, &self.pool[2]);
            }
        }
    }

    /// Reduces the degree-2 component sitting in pool[2] (NTT domain) into
    /// (c0, c1) through the relinearization key.
    fn relinearize_pool2(&mut self, level: usize, rlk: &RelinearizationKey, c: &mut Ciphertext) {
        let ring_q: RingRNS<u64> = self.ring_at(level);

        ring_q.intt_inplace::<false>(&mut self.pool[2]);

        let (head, tail) = self.pool.split_at_mut(3);
        let (d0_slice, d1_slice) = tail.split_at_mut(1);
        let d0: &mut PolyRNS<u64> = &mut d0_slice[0];
        let d1: &mut PolyRNS<u64> = &mut d1_slice[0];
        self.ksw
            .switch_key(level, &head[2], &rlk.value[0], &rlk.value[1], d0, d1);

        ring_q.ntt_inplace::<false>(d0);
        ring_q.ntt_inplace::<false>(d1);

        ring_q.add_inplace::<ONCE>(d0, &mut c.el.value[0]);
        ring_q.add_inplace::<ONCE>(d1, &mut c.el.value[1]);
    }

    /// Reduces a degree-2 ciphertext back to degree 1.
    pub fn relinearize(&mut self, a: &Ciphertext, rlk: &RelinearizationKey, c: &mut Ciphertext) {
        assert!(a.degree() == 2, "relinearize: input must have degree 2");
        assert!(a.is_ntt(), "relinearize: input must be in the NTT domain");
        let level: usize = a.level().min(c.level());
        if c.level() > level {
            c.el.drop_level(c.level() - level);
        }

        c.el.resize_degree(1);
        c.el.value[0].copy_lvl(level, &a.el.value[0]);
        c.el.value[1].copy_lvl(level, &a.el.value[1]);
        self.pool[2].copy_lvl(level, &a.el.value[2]);
        c.scale = a.scale;

        self.relinearize_pool2(level, rlk, c);
    }

    /// c <- a rotated left by k slots, using the matching key of the set.
    pub fn rotate(
        &mut self,
        a: &Ciphertext,
        k: isize,
        rtks: &RotationKeySet,
        c: &mut Ciphertext,
    ) -> Result<()> {
        let gal_el: usize = self.params.rlwe().galois_element_for_rotation(k);
        let rtk: &RotationKey = rtks.get(gal_el).ok_or(Error::MissingKey(gal_el))?;
        self.apply_galois(a, rtk, c)
    }

    /// c <- conjugate of a (row rotation), standard ring only.
    pub fn conjugate(&mut self, a: &Ciphertext, ck: &RotationKey, c: &mut Ciphertext) -> Result<()> {
        self.apply_galois(a, ck, c)
    }

    fn apply_galois(&mut self, a: &Ciphertext, rtk: &RotationKey, c: &mut Ciphertext) -> Result<()> {
        if !a.is_ntt() {
            return Err(Error::Domain(
                "rotation input must be in the NTT domain".to_string(),
            ));
        }
        if a.degree() != 1 || c.degree() != 1 {
            return Err(Error::Shape(format!(
                "rotation expects degree-1 operands, got {} and {}",
                a.degree(),
                c.degree()
            )));
        }

        let level: usize = a.level().min(c.level());
        if c.level() > level {
            c.el.drop_level(c.level() - level);
        }
        let ring_q: RingRNS<u64> = self.ring_at(level);

        ring_q.intt::<false>(&a.el.value[1], &mut self.pool[0]);

        let (head, tail) = self.pool.split_at_mut(3);
        let (tail0_slice, tail1_slice) = tail.split_at_mut(1);
        self.ksw.switch_key(
            level,
            &head[0],
            &rtk.value[0],
            &rtk.value[1],
            &mut tail0_slice[0],
            &mut tail1_slice[0],
        );

        ring_q.ntt_inplace::<false>(&mut tail0_slice[0]);
        ring_q.ntt_inplace::<false>(&mut tail1_slice[0]);
        ring_q.add_inplace::<ONCE>(&a.el.value[0], &mut tail0_slice[0]);

        self.perms.gen(&ring_q.0[0], rtk.gal_el);
        let perm = self.perms.get(&rtk.gal_el).unwrap();

        ring_q.permute_ntt(&tail0_slice[0], perm, &mut c.el.value[0]);
        ring_q.permute_ntt(&tail1_slice[0], perm, &mut c.el.value[1]);

        c.scale = a.scale;
        Ok(())
    }

    /// Divides by the topmost primes until the scale approaches min_scale,
    /// consuming one level per division.
    pub fn rescale(&mut self, a: &Ciphertext, min_scale: f64, c: &mut Ciphertext) -> Result<()> {
        if min_scale <= 0.0 {
            return Err(Error::Precision("min_scale is not positive".to_string()));
        }
        if a.scale == 0.0 {
            return Err(Error::Precision("ciphertext scale is 0".to_string()));
        }
        if a.level() == 0 {
            return Err(Error::Precision(
                "input already at level 0".to_string(),
            ));
        }
        if a.degree() != c.degree() {
            return Err(Error::Shape(format!(
                "degree mismatch: {} != {}",
                a.degree(),
                c.degree()
            )));
        }

        let level: usize = a.level();
        let moduli: Vec<u64> = self.params.rlwe().ring_q().moduli();

        let mut nb_rescales: usize = 0;
        let mut scale: f64 = a.scale;
        while nb_rescales < level {
            let q_top: f64 = moduli[level - nb_rescales] as f64;
            if scale / q_top < min_scale / 2.0 {
                break;
            }
            scale /= q_top;
            nb_rescales += 1;
        }

        if nb_rescales == 0 {
            c.el.copy_from(&a.el);
            c.scale = a.scale;
            return Ok(());
        }

        let ring_q: RingRNS<u64> = self.ring_at(level);
        for (i, component) in a.el.value.iter().enumerate() {
            c.el.value[i] = component.clone();
            ring_q.div_by_last_moduli_inplace::<true, true>(
                nb_rescales,
                &mut self.pool_rescale,
                &mut c.el.value[i],
            );
        }
        c.scale = scale;
        Ok(())
    }

    /// c <- -a
    pub fn neg(&mut self, a: &Ciphertext, c: &mut Ciphertext) {
        assert!(a.degree() == c.degree(), "neg: degree mismatch");
        let level: usize = a.level().min(c.level());
        let ring_q: RingRNS<u64> = self.ring_at(level);
        for i in 0..a.degree() + 1 {
            ring_q.neg::<1, ONCE>(&a.el.value[i], &mut c.el.value[i]);
        }
        c.scale = a.scale;
    }

    /// c <- a * constant. A fractional constant consumes scale headroom:
    /// it is scaled up by the top modulus and the output scale grows
    /// accordingly.
    pub fn mul_by_const(&mut self, a: &Ciphertext, constant: f64, c: &mut Ciphertext) {
        let level: usize = a.level().min(c.level());
        if c.level() > level {
            c.el.drop_level(c.level() - level);
        }
        let ring_q: RingRNS<u64> = self.ring_at(level);

        let scale_factor: f64 = if constant.fract() != 0.0 {
            ring_q.0[level].modulus.q as f64
        } else {
            1.0
        };

        c.el.resize_degree(a.degree());
        for (j, r) in ring_q.0.iter().enumerate() {
            let scaled: u64 = scale_up_exact(constant, scale_factor, r.modulus.q);
            let s: Barrett<u64> = r.modulus.barrett.prepare(scaled);
            for i in 0..a.degree() + 1 {
                r.mul_scalar_barrett::<ONCE>(&s, a.el.value[i].at(j), c.el.value[i].at_mut(j));
            }
        }
        for i in 0..a.degree() + 1 {
            c.el.value[i].is_ntt = a.el.value[i].is_ntt;
        }
        c.scale = a.scale * scale_factor;
    }

    /// c <- a + constant (applied to every slot).
    pub fn add_const(&mut self, a: &Ciphertext, constant: f64, c: &mut Ciphertext) {
        assert!(a.is_ntt(), "add_const: input must be in the NTT domain");
        let level: usize = a.level().min(c.level());
        if c.level() > level {
            c.el.drop_level(c.level() - level);
        }
        let ring_q: RingRNS<u64> = self.ring_at(level);

        c.el.resize_degree(a.degree());
        for i in 0..a.degree() + 1 {
            c.el.value[i].copy_lvl(level, &a.el.value[i]);
        }

        for (j, r) in ring_q.0.iter().enumerate() {
            let scaled: u64 = scale_up_exact(constant, a.scale, r.modulus.q);
            r.add_scalar_inplace::<ONCE>(&scaled, c.el.value[0].at_mut(j));
        }
        c.scale = a.scale;
    }

    /// Drops levels levels without rescaling.
    pub fn drop_level(&mut self, ct: &mut Ciphertext, levels: usize) {
        ct.el.drop_level(levels);
    }
}

/// round(|value| * scale) mod q with the sign folded in.
fn scale_up_exact(value: f64, scale: f64, q: u64) -> u64 {
    let scaled: f64 = (value.abs() * scale).round();
    debug_assert!(scaled < (1u64 << 63) as f64, "constant overflow");
    let reduced: u64 = (scaled as u64) % q;
    if value < 0.0 && reduced != 0 {
        q - reduced
    } else {
        reduced
    }
}

