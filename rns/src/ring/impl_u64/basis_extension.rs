use crate::modulus::barrett::Barrett;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::ONCE;
use crate::poly::PolyRNS;
use crate::ring::RingRNS;
use crate::CHUNK;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use std::sync::Arc;

/// Largest RNS basis size the per-coefficient scratch supports.
const MAX_MODULI: usize = 64;

/// How many 122-bit partial products fit a u128 accumulator before a reduction.
const ACC_CHUNK: usize = 16;

/// Per-source-level constants of the exact lift from one RNS basis into another.
struct ModUpTables {
    /// [l][i]: ((Q_l/q_i)^-1 mod q_i) * 2^64
    q_over_qi_inv: Vec<Vec<Montgomery<u64>>>,
    /// [l][j][i]: (Q_l/q_i) mod p_j
    q_over_qi: Vec<Vec<Vec<u64>>>,
    /// [l][j]: Q_l mod p_j
    q_mod_p: Vec<Vec<u64>>,
    /// [i]: 1 / q_i as f64
    q_inv_f64: Vec<f64>,
}

impl ModUpTables {
    fn new(from: &RingRNS<u64>, to: &RingRNS<u64>) -> Self {
        let max_level_from: usize = from.max_level();
        let max_level_to: usize = to.max_level();

        let mut q_over_qi_inv: Vec<Vec<u64>> = Vec::with_capacity(max_level_from + 1);
        let mut q_over_qi: Vec<Vec<Vec<u64>>> = Vec::with_capacity(max_level_from + 1);
        let mut q_mod_p: Vec<Vec<u64>> = Vec::with_capacity(max_level_from + 1);

        for l in 0..max_level_from + 1 {
            let mut q_big: BigInt = BigInt::from(1);
            (0..l + 1).for_each(|i| q_big *= BigInt::from(from.0[i].modulus.q));

            let mut inv_row: Vec<u64> = Vec::with_capacity(l + 1);
            for i in 0..l + 1 {
                let q_i: u64 = from.0[i].modulus.q;
                let qi_big: BigInt = BigInt::from(q_i);
                let q_over_qi_mod_qi: u64 = ((&q_big / &qi_big) % &qi_big).to_u64().unwrap();
                let inv: u64 = from.0[i].modulus.inv(q_over_qi_mod_qi);
                inv_row.push(from.0[i].modulus.montgomery.prepare::<ONCE>(inv));
            }
            q_over_qi_inv.push(inv_row);

            let mut cross_rows: Vec<Vec<u64>> = Vec::with_capacity(max_level_to + 1);
            let mut q_mod_row: Vec<u64> = Vec::with_capacity(max_level_to + 1);
            for j in 0..max_level_to + 1 {
                let p_j: u64 = to.0[j].modulus.q;
                let pj_big: BigInt = BigInt::from(p_j);
                let mut row: Vec<u64> = Vec::with_capacity(l + 1);
                for i in 0..l + 1 {
                    let qi_big: BigInt = BigInt::from(from.0[i].modulus.q);
                    row.push(((&q_big / &qi_big) % &pj_big).to_u64().unwrap());
                }
                cross_rows.push(row);
                q_mod_row.push((&q_big % &pj_big).to_u64().unwrap());
            }
            q_over_qi.push(cross_rows);
            q_mod_p.push(q_mod_row);
        }

        let q_inv_f64: Vec<f64> = (0..max_level_from + 1)
            .map(|i| 1.0 / from.0[i].modulus.q as f64)
            .collect();

        Self {
            q_over_qi_inv: q_over_qi_inv,
            q_over_qi: q_over_qi,
            q_mod_p: q_mod_p,
            q_inv_f64: q_inv_f64,
        }
    }
}

/// Converts RNS representations between two bases without big integers.
///
/// The lift uses the standard float estimate of the CRT overflow count: each
/// coefficient x in basis Q is recovered as sum_i y_i * (Q/q_i) - v * Q with
/// y_i = x_i * (Q/q_i)^-1 mod q_i and v = round/floor(sum_i y_i / q_i).
pub struct BasisExtender {
    ring_from: RingRNS<u64>,
    ring_to: RingRNS<u64>,
    up: Arc<ModUpTables>,
    down: Arc<ModUpTables>,
    /// [l_p][i]: (P_l / 2) mod p_i
    p_half_mod_p: Vec<Vec<u64>>,
    /// [l_p][j]: (P_l / 2) mod q_j
    p_half_mod_q: Vec<Vec<u64>>,
    /// [l_p][j]: (P_l^-1 mod q_j) as a Barrett scalar
    p_inv_mod_q: Vec<Vec<Barrett<u64>>>,
    buf_p: PolyRNS<u64>,
    buf_q: PolyRNS<u64>,
}

impl BasisExtender {
    pub fn new(ring_from: &RingRNS<u64>, ring_to: &RingRNS<u64>) -> Self {
        assert!(
            ring_from.max_level() < MAX_MODULI && ring_to.max_level() < MAX_MODULI,
            "basis larger than {} primes",
            MAX_MODULI
        );

        let up: Arc<ModUpTables> = Arc::new(ModUpTables::new(ring_from, ring_to));
        let down: Arc<ModUpTables> = Arc::new(ModUpTables::new(ring_to, ring_from));

        let max_level_p: usize = ring_to.max_level();
        let max_level_q: usize = ring_from.max_level();

        let mut p_half_mod_p: Vec<Vec<u64>> = Vec::with_capacity(max_level_p + 1);
        let mut p_half_mod_q: Vec<Vec<u64>> = Vec::with_capacity(max_level_p + 1);
        let mut p_inv_mod_q: Vec<Vec<Barrett<u64>>> = Vec::with_capacity(max_level_p + 1);

        for l in 0..max_level_p + 1 {
            let mut p_big: BigInt = BigInt::from(1);
            (0..l + 1).for_each(|i| p_big *= BigInt::from(ring_to.0[i].modulus.q));
            let p_half: BigInt = &p_big >> 1;

            p_half_mod_p.push(
                (0..l + 1)
                    .map(|i| {
                        (&p_half % BigInt::from(ring_to.0[i].modulus.q))
                            .to_u64()
                            .unwrap()
                    })
                    .collect(),
            );
            p_half_mod_q.push(
                (0..max_level_q + 1)
                    .map(|j| {
                        (&p_half % BigInt::from(ring_from.0[j].modulus.q))
                            .to_u64()
                            .unwrap()
                    })
                    .collect(),
            );
            p_inv_mod_q.push(
                (0..max_level_q + 1)
                    .map(|j| {
                        let q_j: u64 = ring_from.0[j].modulus.q;
                        let p_mod_qj: u64 =
                            (&p_big % BigInt::from(q_j)).to_u64().unwrap();
                        ring_from.0[j]
                            .modulus
                            .barrett
                            .prepare(ring_from.0[j].modulus.inv(p_mod_qj))
                    })
                    .collect(),
            );
        }

        let buf_p: PolyRNS<u64> = ring_to.new_polyrns();
        let buf_q: PolyRNS<u64> = ring_from.new_polyrns();

        Self {
            ring_from: ring_from.clone(),
            ring_to: ring_to.clone(),
            up: up,
            down: down,
            p_half_mod_p: p_half_mod_p,
            p_half_mod_q: p_half_mod_q,
            p_inv_mod_q: p_inv_mod_q,
            buf_p: buf_p,
            buf_q: buf_q,
        }
    }

    /// Extends a (basis from, levels 0..=level_from, natural domain, possibly
    /// lazy in [0, 2q)) into b (basis to, levels 0..=level_to).
    /// The lifted representative is in [0, Q_l); with ROUND the lift is
    /// centered in [-Q_l/2, Q_l/2).
    pub fn mod_up<const ROUND: bool>(
        &self,
        level_from: usize,
        level_to: usize,
        a: &PolyRNS<u64>,
        b: &mut PolyRNS<u64>,
    ) {
        mod_up_core::<ROUND>(&self.up, &self.ring_from, &self.ring_to, level_from, level_to, a, b)
    }

    /// Extends in the opposite direction (basis to -> basis from).
    pub fn mod_up_inv<const ROUND: bool>(
        &self,
        level_from: usize,
        level_to: usize,
        a: &PolyRNS<u64>,
        b: &mut PolyRNS<u64>,
    ) {
        mod_up_core::<ROUND>(&self.down, &self.ring_to, &self.ring_from, level_from, level_to, a, b)
    }

    /// Returns an extender sharing the precomputed tables with fresh
    /// scratch buffers, for use by an independent worker.
    pub fn shallow_copy(&self) -> Self {
        Self {
            ring_from: self.ring_from.clone(),
            ring_to: self.ring_to.clone(),
            up: self.up.clone(),
            down: self.down.clone(),
            p_half_mod_p: self.p_half_mod_p.clone(),
            p_half_mod_q: self.p_half_mod_q.clone(),
            p_inv_mod_q: self.p_inv_mod_q.clone(),
            buf_p: self.ring_to.new_polyrns(),
            buf_q: self.ring_from.new_polyrns(),
        }
    }

    /// b <- round(x / P) mod Q where x = (a_q mod Q, a_p mod P).
    /// All polynomials are in the natural domain.
    pub fn mod_down(
        &mut self,
        level_q: usize,
        level_p: usize,
        a_q: &PolyRNS<u64>,
        a_p: &PolyRNS<u64>,
        b: &mut PolyRNS<u64>,
    ) {
        debug_assert!(!a_q.is_ntt && !a_p.is_ntt, "mod_down expects natural-domain inputs");

        // (a_p + P/2) mod P
        for (i, r) in self.ring_to.0[..level_p + 1].iter().enumerate() {
            r.add_scalar::<ONCE>(a_p.at(i), &self.p_half_mod_p[level_p][i], self.buf_p.at_mut(i));
        }

        mod_up_core::<false>(
            &self.down,
            &self.ring_to,
            &self.ring_from,
            level_p,
            level_q,
            &self.buf_p,
            &mut self.buf_q,
        );

        // b = (a_q + P/2 - [x + P/2 mod P]) / P mod q_j
        for (j, r) in self.ring_from.0[..level_q + 1].iter().enumerate() {
            r.modulus.vec_add_scalar_sub_mul_barrett_binary_assign::<CHUNK, 2, ONCE>(
                &a_q.at(j).0,
                &self.p_half_mod_q[level_p][j],
                &self.buf_q.at(j).0,
                &self.p_inv_mod_q[level_p][j],
                &mut b.at_mut(j).0,
            );
        }

        b.is_ntt = false;
    }
}

fn mod_up_core<const ROUND: bool>(
    tables: &ModUpTables,
    ring_from: &RingRNS<u64>,
    ring_to: &RingRNS<u64>,
    level_from: usize,
    level_to: usize,
    a: &PolyRNS<u64>,
    b: &mut PolyRNS<u64>,
) {
    debug_assert!(level_from <= ring_from.max_level());
    debug_assert!(level_to <= ring_to.max_level());
    debug_assert!(level_from <= a.level());
    debug_assert!(level_to <= b.level());

    let n: usize = a.n();
    let q_over_qi_inv: &[Montgomery<u64>] = &tables.q_over_qi_inv[level_from];
    let q_over_qi: &[Vec<u64>] = &tables.q_over_qi[level_from];
    let q_mod_p: &[u64] = &tables.q_mod_p[level_from];

    let mut y: [u64; MAX_MODULI] = [0u64; MAX_MODULI];

    for j in 0..n {
        let mut v_f64: f64 = if ROUND { 0.5 } else { 0.0 };
        for i in 0..level_from + 1 {
            let y_i: u64 = ring_from.0[i]
                .modulus
                .montgomery
                .mul_external::<ONCE>(q_over_qi_inv[i], a.at(i).0[j]);
            y[i] = y_i;
            v_f64 += y_i as f64 * tables.q_inv_f64[i];
        }
        let v: u64 = v_f64 as u64;

        for k in 0..level_to + 1 {
            let modulus = &ring_to.0[k].modulus;
            let p_k: u64 = modulus.q;
            let row: &[u64] = &q_over_qi[k];

            let mut acc: u128 = (p_k - q_mod_p[k]) as u128 * v as u128;
            let mut count: usize = 0;
            for i in 0..level_from + 1 {
                acc += y[i] as u128 * row[i] as u128;
                count += 1;
                if count == ACC_CHUNK {
                    acc = modulus.barrett.reduce_u128(acc) as u128;
                    count = 0;
                }
            }
            b.at_mut(k).0[j] = modulus.barrett.reduce_u128(acc);
        }
    }

    b.is_ntt = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::RingType;
    use num_bigint::BigInt;
    use sampling::source::Source;

    fn setup() -> (RingRNS<u64>, RingRNS<u64>) {
        let n: usize = 32;
        let ring_q: RingRNS<u64> =
            RingRNS::new(n, vec![0xffff00001, 0xfff9c0001, 0xfff8e0001], RingType::Standard);
        let ring_p: RingRNS<u64> =
            RingRNS::new(n, vec![0xffffffffffc0001, 0xfffffffff840001], RingType::Standard);
        (ring_q, ring_p)
    }

    #[test]
    fn test_mod_up_matches_bigint_lift() {
        let (ring_q, ring_p) = setup();
        let extender: BasisExtender = BasisExtender::new(&ring_q, &ring_p);

        let mut source: Source = Source::new([3; 32]);
        let mut a: PolyRNS<u64> = ring_q.new_polyrns();
        ring_q.fill_uniform(&mut source, &mut a);

        let mut b: PolyRNS<u64> = ring_p.new_polyrns();
        extender.mod_up::<false>(ring_q.max_level(), ring_p.max_level(), &a, &mut b);

        // reference: positive lift in [0, Q)
        let mut q_big: BigInt = BigInt::from(1);
        ring_q.0.iter().for_each(|r| q_big *= BigInt::from(r.modulus.q));

        let mut coeffs: Vec<BigInt> = vec![BigInt::default(); a.n()];
        ring_q.to_bigint_inplace(&a, &mut coeffs);

        for j in 0..a.n() {
            let mut x: BigInt = coeffs[j].clone();
            if x.sign() == num_bigint::Sign::Minus {
                x += &q_big;
            }
            for (k, r) in ring_p.0.iter().enumerate() {
                let expect: u64 = (&x % BigInt::from(r.modulus.q)).to_u64().unwrap();
                assert_eq!(b.at(k).0[j], expect, "coefficient {} prime {}", j, k);
            }
        }
    }

    #[test]
    fn test_mod_up_centered_on_small_norm() {
        let (ring_q, ring_p) = setup();
        let extender: BasisExtender = BasisExtender::new(&ring_q, &ring_p);

        let mut a: PolyRNS<u64> = ring_q.new_polyrns();
        let values: [i64; 4] = [-3, 7, -12345, 1];
        for (j, &v) in values.iter().enumerate() {
            for (i, r) in ring_q.0.iter().enumerate() {
                let q_i: u64 = r.modulus.q;
                a.at_mut(i).0[j] = if v < 0 { q_i - v.unsigned_abs() } else { v as u64 };
            }
        }

        let mut b: PolyRNS<u64> = ring_p.new_polyrns();
        extender.mod_up::<true>(ring_q.max_level(), ring_p.max_level(), &a, &mut b);

        for (j, &v) in values.iter().enumerate() {
            for (k, r) in ring_p.0.iter().enumerate() {
                let p_k: u64 = r.modulus.q;
                let expect: u64 = if v < 0 { p_k - v.unsigned_abs() } else { v as u64 };
                assert_eq!(b.at(k).0[j], expect, "coefficient {} prime {}", j, k);
            }
        }
    }

    #[test]
    fn test_mod_down_inverts_mul_by_p() {
        let (ring_q, ring_p) = setup();
        let mut extender: BasisExtender = BasisExtender::new(&ring_q, &ring_p);

        let mut p_big: BigInt = BigInt::from(1);
        ring_p.0.iter().for_each(|r| p_big *= BigInt::from(r.modulus.q));

        // a_q = x * P mod Q, a_p = 0 mod P, so round((x*P)/P) = x
        let mut source: Source = Source::new([5; 32]);
        let mut x: PolyRNS<u64> = ring_q.new_polyrns();
        ring_q.fill_uniform(&mut source, &mut x);

        let mut a_q: PolyRNS<u64> = ring_q.new_polyrns();
        ring_q.mul_scalar_bigint::<{ crate::modulus::ONCE }>(&x, &p_big, &mut a_q);

        let a_p: PolyRNS<u64> = ring_p.new_polyrns();

        let mut b: PolyRNS<u64> = ring_q.new_polyrns();
        extender.mod_down(ring_q.max_level(), ring_p.max_level(), &a_q, &a_p, &mut b);

        for i in 0..ring_q.0.len() {
            assert_eq!(b.at(i).0, x.at(i).0, "prime {}", i);
        }
    }
}
