use rns::modulus::ONCE;
use rns::poly::PolyRNS;

use crate::ciphertext::Ciphertext;
use crate::keys::SecretKey;
use crate::parameters::Parameters;

/// Secret-key RLWE decryptor: m = sum_i c_i * s^i, evaluated Horner-style
/// in the NTT domain.
pub struct Decryptor {
    params: Parameters,
    sk: SecretKey,
}

impl Decryptor {
    pub fn new(params: &Parameters, sk: &SecretKey) -> Self {
        Self {
            params: params.clone(),
            sk: sk.clone(),
        }
    }

    pub fn decrypt(&self, ct: &Ciphertext, m: &mut PolyRNS<u64>) {
        assert!(ct.is_ntt(), "decrypt: ct must be in the NTT domain");
        let level: usize = ct.level().min(m.level());
        let ring_q = self.params.ring_q().at_level(level);

        let degree: usize = ct.degree();
        m.copy_lvl(level, &ct.value[degree]);
        for i in (0..degree).rev() {
            ring_q.mul_montgomery_external_inplace::<ONCE>(&self.sk.value.q, m);
            ring_q.add_inplace::<ONCE>(&ct.value[i], m);
        }
        m.is_ntt = true;
    }
}
