use num_bigint::BigInt;
use rns::poly::PolyRNS;
use rns::ring::impl_u64::automorphism::AutoPerm;
use rns::ring::impl_u64::basis_extension::BasisExtender;
use rns::ring::RingRNS;
use rns::modulus::ONCE;
use sampling::source::{new_seed, Source};

use crate::elem::PolyQP;
use crate::keys::{
    PublicKey, RelinearizationKey, RotationKey, RotationKeySet, SecretKey, SwitchingKey,
};
use crate::parameters::Parameters;

/// Generates secret, public, relinearization and rotation keys.
/// Switching keys are produced directly in the accelerated block format:
/// the standard gadget key is computed in QP, then every gamma-prime block
/// is lifted into the auxiliary ring R, NTT'ed and put in Montgomery form.
pub struct KeyGenerator {
    params: Parameters,
    source_xa: Source,
    source_xe: Source,
    conv_q_blocks: Vec<BasisExtender>,
    conv_p_blocks: Vec<BasisExtender>,
    pool_q: PolyRNS<u64>,
    pool_gather: PolyRNS<u64>,
}

impl KeyGenerator {
    pub fn new(params: &Parameters) -> Self {
        Self::with_seeds(params, new_seed(), new_seed())
    }

    pub fn with_seeds(params: &Parameters, seed_xa: [u8; 32], seed_xe: [u8; 32]) -> Self {
        let n: usize = params.n();
        let level_q: usize = params.max_level();
        let gamma: usize = params.gamma();

        let ring_q = params.ring_q();
        let ring_p = params.ring_p();
        let ring_r = params.ring_r();

        let mut conv_q_blocks: Vec<BasisExtender> = Vec::with_capacity(params.block_len_q());
        for b in 0..params.block_len_q() {
            let rings: Vec<_> = params
                .q_block_range(b, level_q)
                .map(|idx| ring_q.0[idx].clone())
                .collect();
            conv_q_blocks.push(BasisExtender::new(&RingRNS::from_rings(rings), ring_r));
        }

        let mut conv_p_blocks: Vec<BasisExtender> = Vec::with_capacity(params.block_len_p());
        for b in 0..params.block_len_p() {
            let rings: Vec<_> = params
                .p_block_range(b)
                .map(|idx| ring_p.0[idx].clone())
                .collect();
            conv_p_blocks.push(BasisExtender::new(&RingRNS::from_rings(rings), ring_r));
        }

        Self {
            params: params.clone(),
            source_xa: Source::new(seed_xa),
            source_xe: Source::new(seed_xe),
            conv_q_blocks: conv_q_blocks,
            conv_p_blocks: conv_p_blocks,
            pool_q: PolyRNS::<u64>::new(n, level_q),
            pool_gather: PolyRNS::<u64>::new(n, gamma - 1),
        }
    }

    /// Ternary secret with the configured Hamming weight, NTT + Montgomery
    /// in both bases.
    pub fn gen_secret_key(&mut self) -> SecretKey {
        let params = &self.params;
        let ring_q = params.ring_q();
        let ring_p = params.ring_p();

        let mut value: PolyQP = PolyQP::new(params.n(), params.max_level(), params.p_count() - 1);

        ring_q.fill_ternary_hw(&mut self.source_xe, params.h(), &mut value.q);
        ring_p.extend_basis_small_norm(ring_q.0[0].modulus.q, value.q.at(0), &mut value.p);

        ring_q.ntt_inplace::<false>(&mut value.q);
        ring_q.mform_inplace::<ONCE>(&mut value.q);
        ring_p.ntt_inplace::<false>(&mut value.p);
        ring_p.mform_inplace::<ONCE>(&mut value.p);

        SecretKey { value: value }
    }

    /// pk = (-a*s + e, a) in Q, NTT domain.
    pub fn gen_public_key(&mut self, sk: &SecretKey) -> PublicKey {
        let params = &self.params;
        let ring_q = params.ring_q();

        let mut pk: PublicKey = PublicKey::new(params);

        ring_q.fill_gaussian(
            &mut self.source_xe,
            params.sigma(),
            params.noise_bound(),
            &mut pk.value[0],
        );
        ring_q.ntt_inplace::<false>(&mut pk.value[0]);

        ring_q.fill_uniform(&mut self.source_xa, &mut pk.value[1]);
        pk.value[1].is_ntt = true;

        let (pk0, pk1) = pk.value.split_at_mut(1);
        ring_q.mul_montgomery_external_sub_inplace::<ONCE>(&sk.value.q, &pk1[0], &mut pk0[0]);

        pk
    }

    pub fn gen_key_pair(&mut self) -> (SecretKey, PublicKey) {
        let sk: SecretKey = self.gen_secret_key();
        let pk: PublicKey = self.gen_public_key(&sk);
        (sk, pk)
    }

    /// Relinearization key: sk^2 re-encrypted under sk.
    pub fn gen_relinearization_key(&mut self, sk: &SecretKey) -> RelinearizationKey {
        let params = &self.params;
        let ring_q = params.ring_q();

        let mut sk2: PolyRNS<u64> = ring_q.new_polyrns();
        ring_q.mul_montgomery_external::<ONCE>(&sk.value.q, &sk.value.q, &mut sk2);

        let (swk0, swk1) = self.gen_switching_key_internal(&sk2, &sk.value);
        RelinearizationKey {
            value: [swk0, swk1],
        }
    }

    /// Switching key re-encrypting ciphertexts from sk_in to sk_out.
    pub fn gen_switching_key(&mut self, sk_in: &SecretKey, sk_out: &SecretKey) -> [SwitchingKey; 2] {
        let (swk0, swk1) = self.gen_switching_key_internal(&sk_in.value.q, &sk_out.value);
        [swk0, swk1]
    }

    /// Rotation key for a column rotation by k slots.
    pub fn gen_rotation_key(&mut self, sk: &SecretKey, k: isize) -> RotationKey {
        let gal_el: usize = self.params.galois_element_for_rotation(k);
        let gal_el_gen: usize = self.params.galois_element_for_rotation(-k);
        self.gen_galois_key(sk, gal_el, gal_el_gen, k)
    }

    pub fn gen_rotation_keys(&mut self, sk: &SecretKey, ks: &[isize]) -> RotationKeySet {
        let mut set: RotationKeySet = RotationKeySet::new();
        for &k in ks {
            set.insert(self.gen_rotation_key(sk, k));
        }
        set
    }

    /// Conjugation (row-rotation) key. The row-rotation galois element is
    /// its own inverse.
    pub fn gen_conjugation_key(&mut self, sk: &SecretKey) -> RotationKey {
        let gal_el: usize = self.params.galois_element_for_row_rotation();
        self.gen_galois_key(sk, gal_el, gal_el, 0)
    }

    fn gen_galois_key(
        &mut self,
        sk: &SecretKey,
        gal_el: usize,
        gal_el_gen: usize,
        rot_idx: isize,
    ) -> RotationKey {
        let params = self.params.clone();
        let ring_q = params.ring_q();
        let ring_p = params.ring_p();

        let perm: AutoPerm = AutoPerm::new(&ring_q.0[0], gal_el_gen);

        let mut sk_out: PolyQP = PolyQP::new(params.n(), params.max_level(), params.p_count() - 1);
        ring_q.permute_ntt(&sk.value.q, &perm, &mut sk_out.q);
        ring_p.permute_ntt(&sk.value.p, &perm, &mut sk_out.p);

        let (swk0, swk1) = self.gen_switching_key_internal(&sk.value.q, &sk_out);

        RotationKey {
            rot_idx: rot_idx,
            gal_el: gal_el,
            value: [swk0, swk1],
        }
    }

    /// Noiseless gadget embedding of P * sk in the accelerated block
    /// format: digit i carries P * g_i * sk on the primes of gadget group i
    /// and zero elsewhere. Dividing the inner product against it by P
    /// recovers a * sk up to rounding, which makes it the reference vector
    /// for inner-product diagnostics.
    pub fn gen_gadget_key(&mut self, sk: &SecretKey) -> SwitchingKey {
        let params = self.params.clone();
        let ring_q = params.ring_q();

        let level_q: usize = params.max_level();
        let beta: usize = params.beta();

        let mut swk: SwitchingKey = SwitchingKey::new(&params);

        let p_big: BigInt = params.p_big().clone();
        ring_q.mul_scalar_bigint::<ONCE>(&sk.value.q, &p_big, &mut self.pool_q);

        let mut digit: PolyQP = PolyQP::new(params.n(), level_q, params.p_count() - 1);

        for i in 0..beta {
            digit.q.zero();
            digit.p.zero();
            for idx in params.group_range(i, level_q) {
                digit.q.at_mut(idx).0.copy_from_slice(&self.pool_q.at(idx).0);
            }
            digit.q.is_ntt = true;
            digit.p.is_ntt = true;

            self.rewrite_digit(&mut digit, i, &mut swk);
        }

        swk
    }

    /// Core generator: standard gadget key for sk_in under sk_out, digit by
    /// digit, each digit rewritten into the accelerated block format.
    fn gen_switching_key_internal(
        &mut self,
        sk_in_q: &PolyRNS<u64>,
        sk_out: &PolyQP,
    ) -> (SwitchingKey, SwitchingKey) {
        let params = self.params.clone();
        let ring_q = params.ring_q();
        let ring_p = params.ring_p();

        let level_q: usize = params.max_level();
        let beta: usize = params.beta();

        let mut swk0: SwitchingKey = SwitchingKey::new(&params);
        let mut swk1: SwitchingKey = SwitchingKey::new(&params);

        // P * sk_in, still NTT + Montgomery
        let p_big: BigInt = params.p_big().clone();
        ring_q.mul_scalar_bigint::<ONCE>(sk_in_q, &p_big, &mut self.pool_q);

        let mut digit: [PolyQP; 2] = [
            PolyQP::new(params.n(), level_q, params.p_count() - 1),
            PolyQP::new(params.n(), level_q, params.p_count() - 1),
        ];

        for i in 0..beta {
            // e, extended to P with the centered small-norm embedding
            ring_q.fill_gaussian(
                &mut self.source_xe,
                params.sigma(),
                params.noise_bound(),
                &mut digit[0].q,
            );
            ring_p.extend_basis_small_norm(
                ring_q.0[0].modulus.q,
                digit[0].q.at(0),
                &mut digit[0].p,
            );
            digit[0].p.is_ntt = false;
            ring_q.ntt_inplace::<true>(&mut digit[0].q);
            ring_p.ntt_inplace::<true>(&mut digit[0].p);
            ring_q.mform_inplace::<ONCE>(&mut digit[0].q);
            ring_p.mform_inplace::<ONCE>(&mut digit[0].p);

            // a, sampled directly in the NTT + Montgomery domain
            ring_q.fill_uniform(&mut self.source_xa, &mut digit[1].q);
            ring_p.fill_uniform(&mut self.source_xa, &mut digit[1].p);
            digit[1].q.is_ntt = true;
            digit[1].p.is_ntt = true;

            // + P * g_i * sk_in on the primes of gadget group i
            for idx in params.group_range(i, level_q) {
                ring_q.0[idx].add_inplace::<ONCE>(self.pool_q.at(idx), digit[0].q.at_mut(idx));
            }

            // - a * sk_out
            let (e_part, a_part) = digit.split_at_mut(1);
            ring_q.mul_montgomery_external_sub_inplace::<ONCE>(
                &a_part[0].q,
                &sk_out.q,
                &mut e_part[0].q,
            );
            ring_p.mul_montgomery_external_sub_inplace::<ONCE>(
                &a_part[0].p,
                &sk_out.p,
                &mut e_part[0].p,
            );

            self.rewrite_digit(&mut digit[0], i, &mut swk0);
            self.rewrite_digit(&mut digit[1], i, &mut swk1);
        }

        (swk0, swk1)
    }

    /// Converts one standard-format digit (QP, NTT + Montgomery) into its
    /// accelerated block representation inside swk.values[i].
    fn rewrite_digit(&mut self, digit: &mut PolyQP, i: usize, swk: &mut SwitchingKey) {
        let params = self.params.clone();
        let ring_q = params.ring_q();
        let ring_p = params.ring_p();
        let ring_r = params.ring_r();

        let level_q: usize = params.max_level();
        let level_r: usize = params.r_count() - 1;
        let block_len_q: usize = params.block_len_q();

        ring_q.inv_mform_inplace::<ONCE>(&mut digit.q);
        ring_p.inv_mform_inplace::<ONCE>(&mut digit.p);
        ring_q.intt_inplace::<false>(&mut digit.q);
        ring_p.intt_inplace::<false>(&mut digit.p);

        for b in 0..block_len_q {
            let range = params.q_block_range(b, level_q);
            let count: usize = range.len();
            for (k, idx) in range.enumerate() {
                self.pool_gather
                    .at_mut(k)
                    .0
                    .copy_from_slice(&digit.q.at(idx).0);
            }
            self.pool_gather.is_ntt = false;

            let out: &mut PolyRNS<u64> = &mut swk.values[i][b];
            self.conv_q_blocks[b].mod_up::<false>(count - 1, level_r, &self.pool_gather, out);
            ring_r.ntt_inplace::<false>(out);
            ring_r.mform_inplace::<ONCE>(out);
        }

        for b in 0..params.block_len_p() {
            let range = params.p_block_range(b);
            let count: usize = range.len();
            for (k, idx) in range.enumerate() {
                self.pool_gather
                    .at_mut(k)
                    .0
                    .copy_from_slice(&digit.p.at(idx).0);
            }
            self.pool_gather.is_ntt = false;

            let out: &mut PolyRNS<u64> = &mut swk.values[i][block_len_q + b];
            self.conv_p_blocks[b].mod_up::<false>(count - 1, level_r, &self.pool_gather, out);
            ring_r.ntt_inplace::<false>(out);
            ring_r.mform_inplace::<ONCE>(out);
        }
    }
}
