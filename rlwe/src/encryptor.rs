use rns::modulus::ONCE;
use rns::poly::PolyRNS;
use sampling::source::{new_seed, Source};

use crate::ciphertext::Ciphertext;
use crate::keys::PublicKey;
use crate::parameters::Parameters;

/// Public-key RLWE encryptor. Outputs are in the NTT domain.
pub struct Encryptor {
    params: Parameters,
    pk: PublicKey,
    source_xu: Source,
    source_xe: Source,
    pool_u: PolyRNS<u64>,
    pool_e: PolyRNS<u64>,
}

impl Encryptor {
    pub fn new(params: &Parameters, pk: &PublicKey) -> Self {
        let n: usize = params.n();
        let level: usize = params.max_level();
        Self {
            params: params.clone(),
            pk: pk.clone(),
            source_xu: Source::new(new_seed()),
            source_xe: Source::new(new_seed()),
            pool_u: PolyRNS::<u64>::new(n, level),
            pool_e: PolyRNS::<u64>::new(n, level),
        }
    }

    /// ct <- (u*pk0 + e0 + m, u*pk1 + e1) at the level of m.
    /// m must be in the NTT domain.
    pub fn encrypt(&mut self, m: &PolyRNS<u64>, ct: &mut Ciphertext) {
        assert!(m.is_ntt, "encrypt: m must be in the NTT domain");
        let level: usize = m.level().min(ct.level());
        let params = &self.params;
        let ring_q = params.ring_q().at_level(level);

        // u, ternary, NTT + Montgomery
        ring_q.fill_ternary_hw(&mut self.source_xu, params.h(), &mut self.pool_u);
        ring_q.ntt_inplace::<false>(&mut self.pool_u);
        ring_q.mform_inplace::<ONCE>(&mut self.pool_u);

        for k in 0..2 {
            ring_q.mul_montgomery_external::<ONCE>(
                &self.pool_u,
                &self.pk.value[k],
                &mut ct.value[k],
            );

            ring_q.fill_gaussian(
                &mut self.source_xe,
                params.sigma(),
                params.noise_bound(),
                &mut self.pool_e,
            );
            ring_q.ntt_inplace::<false>(&mut self.pool_e);
            ring_q.add_inplace::<ONCE>(&self.pool_e, &mut ct.value[k]);
            ct.value[k].is_ntt = true;
        }

        ring_q.add_inplace::<ONCE>(m, &mut ct.value[0]);
    }
}
