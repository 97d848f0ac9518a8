use num_bigint::BigInt;
use rns::modulus::{BARRETT, NONE, ONCE};
use rns::poly::PolyRNS;
use rns::ring::impl_u64::basis_extension::BasisExtender;
use rns::ring::RingRNS;

use crate::elem::PolyQP;
use crate::keys::SwitchingKey;
use crate::parameters::Parameters;

/// Rewrites a polynomial under a new secret key through the auxiliary ring:
/// the input is gadget-decomposed into alpha-prime groups lifted to R, the
/// inner products against the switching-key blocks are accumulated lazily in
/// R, and each block is brought back to its Q/P slots before the final
/// division by P.
///
/// A switcher owns all of its scratch polynomials; nothing is allocated per
/// call. It is not safe for concurrent use; shallow_copy yields an
/// independent worker sharing the read-only tables.
pub struct KeySwitcher {
    params: Parameters,
    ring_p: RingRNS<u64>,
    ring_r: RingRNS<u64>,
    ring_q_at: Vec<RingRNS<u64>>,

    half_r_qp: PolyQP,
    half_r_r: PolyRNS<u64>,

    pools_decomp: Vec<PolyRNS<u64>>,
    pools_acc: Vec<PolyRNS<u64>>,
    pool_qp: PolyQP,
    pool_gather: PolyRNS<u64>,

    conv_qp: BasisExtender,
    conv_group_r: Vec<BasisExtender>,
    conv_r_q_block: Vec<BasisExtender>,
    conv_r_p_block: Vec<BasisExtender>,
}

impl KeySwitcher {
    pub fn new(params: &Parameters) -> Self {
        let n: usize = params.n();
        let level_q: usize = params.max_level();
        let level_p: usize = params.p_count() - 1;
        let level_r: usize = params.r_count() - 1;

        let ring_q = params.ring_q();
        let ring_p = params.ring_p();
        let ring_r = params.ring_r();

        let ring_q_at: Vec<RingRNS<u64>> =
            (0..level_q + 1).map(|l| ring_q.at_level(l)).collect();

        let mut conv_group_r: Vec<BasisExtender> = Vec::with_capacity(params.beta());
        for i in 0..params.beta() {
            let rings: Vec<_> = params
                .group_range(i, level_q)
                .map(|idx| ring_q.0[idx].clone())
                .collect();
            conv_group_r.push(BasisExtender::new(&RingRNS::from_rings(rings), ring_r));
        }

        let mut conv_r_q_block: Vec<BasisExtender> = Vec::with_capacity(params.block_len_q());
        for b in 0..params.block_len_q() {
            let rings: Vec<_> = params
                .q_block_range(b, level_q)
                .map(|idx| ring_q.0[idx].clone())
                .collect();
            conv_r_q_block.push(BasisExtender::new(ring_r, &RingRNS::from_rings(rings)));
        }

        let mut conv_r_p_block: Vec<BasisExtender> = Vec::with_capacity(params.block_len_p());
        for b in 0..params.block_len_p() {
            let rings: Vec<_> = params
                .p_block_range(b)
                .map(|idx| ring_p.0[idx].clone())
                .collect();
            conv_r_p_block.push(BasisExtender::new(ring_r, &RingRNS::from_rings(rings)));
        }

        let half_r: BigInt = params.r_big() >> 1;
        let mut half_r_qp: PolyQP = PolyQP::new(n, level_q, level_p);
        ring_q.add_scalar_bigint_inplace::<ONCE>(&half_r, &mut half_r_qp.q);
        ring_p.add_scalar_bigint_inplace::<ONCE>(&half_r, &mut half_r_qp.p);
        let mut half_r_r: PolyRNS<u64> = ring_r.new_polyrns();
        ring_r.add_scalar_bigint_inplace::<ONCE>(&half_r, &mut half_r_r);

        let gather_level: usize = params.alpha().max(params.gamma()) - 1;

        Self {
            params: params.clone(),
            ring_p: ring_p.clone(),
            ring_r: ring_r.clone(),
            ring_q_at: ring_q_at,
            half_r_qp: half_r_qp,
            half_r_r: half_r_r,
            pools_decomp: (0..params.beta())
                .map(|_| PolyRNS::<u64>::new(n, level_r))
                .collect(),
            pools_acc: (0..params.block_len())
                .map(|_| PolyRNS::<u64>::new(n, level_r))
                .collect(),
            pool_qp: PolyQP::new(n, level_q, level_p),
            pool_gather: PolyRNS::<u64>::new(n, gather_level),
            conv_qp: BasisExtender::new(ring_q, ring_p),
            conv_group_r: conv_group_r,
            conv_r_q_block: conv_r_q_block,
            conv_r_p_block: conv_r_p_block,
        }
    }

    /// Independent worker sharing the read-only tables, with private pools.
    pub fn shallow_copy(&self) -> Self {
        let params = &self.params;
        let n: usize = params.n();
        let level_q: usize = params.max_level();
        let level_p: usize = params.p_count() - 1;
        let level_r: usize = params.r_count() - 1;
        let gather_level: usize = params.alpha().max(params.gamma()) - 1;

        Self {
            params: params.clone(),
            ring_p: self.ring_p.clone(),
            ring_r: self.ring_r.clone(),
            ring_q_at: self.ring_q_at.clone(),
            half_r_qp: self.half_r_qp.clone(),
            half_r_r: self.half_r_r.clone(),
            pools_decomp: (0..params.beta())
                .map(|_| PolyRNS::<u64>::new(n, level_r))
                .collect(),
            pools_acc: (0..params.block_len())
                .map(|_| PolyRNS::<u64>::new(n, level_r))
                .collect(),
            pool_qp: PolyQP::new(n, level_q, level_p),
            pool_gather: PolyRNS::<u64>::new(n, gather_level),
            conv_qp: self.conv_qp.shallow_copy(),
            conv_group_r: self.conv_group_r.iter().map(|c| c.shallow_copy()).collect(),
            conv_r_q_block: self.conv_r_q_block.iter().map(|c| c.shallow_copy()).collect(),
            conv_r_p_block: self.conv_r_p_block.iter().map(|c| c.shallow_copy()).collect(),
        }
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    /// Gadget-decomposes a into the R-basis pools: group j of alpha primes
    /// is lifted to the full auxiliary basis and NTT'ed lazily.
    fn decompose(&mut self, level_q: usize, a: &PolyRNS<u64>) {
        let params = &self.params;
        let level_r: usize = params.r_count() - 1;
        let beta_eff: usize = params.beta_at(level_q);

        for i in 0..beta_eff {
            let range = params.group_range(i, level_q);
            let count: usize = range.len();
            for (k, idx) in range.enumerate() {
                self.pool_gather.at_mut(k).0.copy_from_slice(&a.at(idx).0);
            }
            self.pool_gather.is_ntt = false;

            self.conv_group_r[i].mod_up::<false>(
                count - 1,
                level_r,
                &self.pool_gather,
                &mut self.pools_decomp[i],
            );
            self.ring_r.ntt_inplace::<true>(&mut self.pools_decomp[i]);
        }
    }

    /// Accumulates the inner product of the decomposed pools against one
    /// switching-key half and reduces the result to the Q basis.
    fn product_into(&mut self, level_q: usize, swk: &SwitchingKey, c: &mut PolyRNS<u64>) {
        let params = &self.params;
        let level_p: usize = params.p_count() - 1;
        let level_r: usize = params.r_count() - 1;

        let beta_eff: usize = params.beta_at(level_q);
        let block_len_q_eff: usize = params.block_len_q_at(level_q);
        let block_len_q_max: usize = params.block_len_q();
        let block_len_p: usize = params.block_len_p();

        let ring_r = &self.ring_r;
        let decomp = &self.pools_decomp;
        let acc = &mut self.pools_acc;

        // lazy Montgomery inner product; one Barrett pass per margin digits
        let margin: usize = (params.ri_overflow_margin(level_r) >> 1).max(1);

        for i in 0..beta_eff {
            for b in (0..block_len_q_eff).chain(block_len_q_max..block_len_q_max + block_len_p) {
                if i == 0 {
                    ring_r.mul_montgomery_external::<NONE>(
                        &swk.values[i][b],
                        &decomp[i],
                        &mut acc[b],
                    );
                } else {
                    ring_r.mul_montgomery_external_add_inplace::<NONE, NONE>(
                        &swk.values[i][b],
                        &decomp[i],
                        &mut acc[b],
                    );
                }
            }

            if (i + 1) % margin == 0 {
                for b in (0..block_len_q_eff).chain(block_len_q_max..block_len_q_max + block_len_p)
                {
                    ring_r.reduce_inplace::<BARRETT>(&mut acc[b]);
                }
            }
        }

        if beta_eff % margin != 0 {
            for b in (0..block_len_q_eff).chain(block_len_q_max..block_len_q_max + block_len_p) {
                ring_r.reduce_inplace::<BARRETT>(&mut acc[b]);
            }
        }

        // back to the natural domain, centered by the half-R offset, and
        // scattered into the covered Q/P slots
        for b in 0..block_len_q_eff {
            ring_r.intt_inplace::<true>(&mut acc[b]);
            ring_r.add_inplace::<NONE>(&self.half_r_r, &mut acc[b]);

            let range = params.q_block_range(b, level_q);
            let count: usize = range.len();
            self.conv_r_q_block[b].mod_up::<false>(
                level_r,
                count - 1,
                &acc[b],
                &mut self.pool_gather,
            );
            for (k, idx) in range.enumerate() {
                self.pool_qp
                    .q
                    .at_mut(idx)
                    .0
                    .copy_from_slice(&self.pool_gather.at(k).0);
            }
        }

        for b in 0..block_len_p {
            let acc_idx: usize = block_len_q_max + b;
            ring_r.intt_inplace::<true>(&mut acc[acc_idx]);
            ring_r.add_inplace::<NONE>(&self.half_r_r, &mut acc[acc_idx]);

            let range = params.p_block_range(b);
            let count: usize = range.len();
            self.conv_r_p_block[b].mod_up::<false>(
                level_r,
                count - 1,
                &acc[acc_idx],
                &mut self.pool_gather,
            );
            for (k, idx) in range.enumerate() {
                self.pool_qp
                    .p
                    .at_mut(idx)
                    .0
                    .copy_from_slice(&self.pool_gather.at(k).0);
            }
        }

        self.pool_qp.q.is_ntt = false;
        self.pool_qp.p.is_ntt = false;

        self.ring_q_at[level_q].sub_from_inplace::<1, ONCE>(&self.half_r_qp.q, &mut self.pool_qp.q);
        self.ring_p.sub_from_inplace::<1, ONCE>(&self.half_r_qp.p, &mut self.pool_qp.p);

        self.conv_qp
            .mod_down(level_q, level_p, &self.pool_qp.q, &self.pool_qp.p, c);
    }

    /// Inner product of a against a single switching-key half: c is such
    /// that c = a * key mod Q up to the switching noise. Exposed for noise
    /// testing; switch_key runs it once per output component.
    pub fn internal_product(
        &mut self,
        level_q: usize,
        a: &PolyRNS<u64>,
        swk: &SwitchingKey,
        c: &mut PolyRNS<u64>,
    ) {
        assert!(!a.is_ntt, "internal_product: a must be in the natural domain");
        self.decompose(level_q, a);
        self.product_into(level_q, swk, c);
    }

    /// (c0, c1) <- key switch of a at level_q against (swk0, swk1).
    /// a must be in the natural domain; outputs are natural.
    pub fn switch_key(
        &mut self,
        level_q: usize,
        a: &PolyRNS<u64>,
        swk0: &SwitchingKey,
        swk1: &SwitchingKey,
        c0: &mut PolyRNS<u64>,
        c1: &mut PolyRNS<u64>,
    ) {
        assert!(!a.is_ntt, "switch_key: a must be in the natural domain");
        debug_assert!(
            level_q <= a.level() && level_q <= self.params.max_level(),
            "invalid level_q = {}",
            level_q
        );
        debug_assert!(
            c0.level() >= level_q && c1.level() >= level_q,
            "receiver level below level_q = {}",
            level_q
        );

        self.decompose(level_q, a);
        self.product_into(level_q, swk0, c0);
        self.product_into(level_q, swk1, c1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_generator::KeyGenerator;
    use crate::keys::SecretKey;
    use crate::parameters::{test_parameters_small, Parameters};
    use num_bigint::Sign;
    use sampling::source::Source;

    // log2 of the l1 norm of the centered reconstruction of a
    fn log2_of_inner_sum(ring_q: &RingRNS<u64>, a: &PolyRNS<u64>) -> f64 {
        let mut coeffs: Vec<BigInt> = vec![BigInt::default(); a.n()];
        ring_q.to_bigint_inplace(a, &mut coeffs);
        let mut sum: BigInt = BigInt::default();
        for c in coeffs.iter() {
            sum += if c.sign() == Sign::Minus { -c } else { c.clone() };
        }
        sum.bits() as f64
    }

    fn product_minus_a_sk(
        params: &Parameters,
        ksw: &mut KeySwitcher,
        sk: &SecretKey,
        swk: &SwitchingKey,
        level_q: usize,
        seed: u8,
    ) -> f64 {
        let ring_q = params.ring_q();
        let ring_q_level = ring_q.at_level(level_q);
        let mut source: Source = Source::new([seed; 32]);

        let mut a: PolyRNS<u64> = ring_q.new_polyrns();
        ring_q_level.fill_uniform(&mut source, &mut a);

        let mut c: PolyRNS<u64> = ring_q.new_polyrns();
        ksw.internal_product(level_q, &a, swk, &mut c);

        let mut a_ntt: PolyRNS<u64> = a.clone();
        ring_q_level.ntt_inplace::<false>(&mut a_ntt);
        let mut ask: PolyRNS<u64> = ring_q.new_polyrns();
        ring_q_level.mul_montgomery_external::<ONCE>(&sk.value.q, &a_ntt, &mut ask);
        ring_q_level.intt_inplace::<false>(&mut ask);

        ring_q_level.sub_inplace::<1, ONCE>(&c, &mut ask);
        log2_of_inner_sum(&ring_q_level, &ask)
    }

    #[test]
    fn test_internal_product_against_gadget_key() {
        let params: Parameters = Parameters::from_literal(test_parameters_small());
        let mut kgen: KeyGenerator = KeyGenerator::new(&params);
        let mut ksw: KeySwitcher = KeySwitcher::new(&params);

        let sk: SecretKey = kgen.gen_secret_key();
        let swk: SwitchingKey = kgen.gen_gadget_key(&sk);

        let log2_bound: f64 =
            ((params.noise_bound().floor() as u64 * params.n() as u64) as f64).log2();
        let log2_noise: f64 =
            product_minus_a_sk(&params, &mut ksw, &sk, &swk, params.max_level(), 9);
        assert!(
            log2_noise <= log2_bound,
            "noise log2 = {} > bound log2 = {}",
            log2_noise,
            log2_bound
        );
    }

    #[test]
    fn test_internal_product_below_max_level() {
        let params: Parameters = Parameters::from_literal(test_parameters_small());
        let mut kgen: KeyGenerator = KeyGenerator::new(&params);
        let mut ksw: KeySwitcher = KeySwitcher::new(&params);

        let sk: SecretKey = kgen.gen_secret_key();
        let swk: SwitchingKey = kgen.gen_gadget_key(&sk);

        for level_q in [1usize, 2, 4] {
            let log2_bound: f64 =
                ((params.noise_bound().floor() as u64 * params.n() as u64) as f64).log2();
            let log2_noise: f64 =
                product_minus_a_sk(&params, &mut ksw, &sk, &swk, level_q, 17 + level_q as u8);
            assert!(
                log2_noise <= log2_bound,
                "level {}: noise log2 = {} > bound log2 = {}",
                level_q,
                log2_noise,
                log2_bound
            );
        }
    }

    #[test]
    fn test_shallow_copy_matches() {
        let params: Parameters = Parameters::from_literal(test_parameters_small());
        let mut kgen: KeyGenerator = KeyGenerator::new(&params);
        let mut ksw: KeySwitcher = KeySwitcher::new(&params);
        let mut worker: KeySwitcher = ksw.shallow_copy();

        let sk: SecretKey = kgen.gen_secret_key();
        let swk: SwitchingKey = kgen.gen_gadget_key(&sk);

        let ring_q = params.ring_q();
        let mut source: Source = Source::new([4; 32]);
        let mut a: PolyRNS<u64> = ring_q.new_polyrns();
        ring_q.fill_uniform(&mut source, &mut a);

        let mut c0: PolyRNS<u64> = ring_q.new_polyrns();
        let mut c1: PolyRNS<u64> = ring_q.new_polyrns();
        ksw.internal_product(params.max_level(), &a, &swk, &mut c0);
        worker.internal_product(params.max_level(), &a, &swk, &mut c1);
        assert_eq!(c0, c1);
    }

    #[test]
    #[should_panic(expected = "natural domain")]
    fn test_switch_key_rejects_ntt_input() {
        let params: Parameters = Parameters::from_literal(test_parameters_small());
        let mut kgen: KeyGenerator = KeyGenerator::new(&params);
        let mut ksw: KeySwitcher = KeySwitcher::new(&params);

        let sk: SecretKey = kgen.gen_secret_key();
        let [swk0, swk1] = kgen.gen_switching_key(&sk, &sk);

        let ring_q = params.ring_q();
        let mut a: PolyRNS<u64> = ring_q.new_polyrns();
        a.is_ntt = true;

        let mut c0: PolyRNS<u64> = ring_q.new_polyrns();
        let mut c1: PolyRNS<u64> = ring_q.new_polyrns();
        ksw.switch_key(params.max_level(), &a, &swk0, &swk1, &mut c0, &mut c1);
    }
}
