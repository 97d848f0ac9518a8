use rlwe::keys::PublicKey;

use crate::elements::{Ciphertext, Message, Plaintext};
use crate::encoder::Encoder;
use crate::parameters::Parameters;

/// Encodes and encrypts messages under a public key.
pub struct Encryptor {
    params: Parameters,
    encryptor: rlwe::encryptor::Encryptor,
    encoder: Encoder,
    pt_pool: Plaintext,
}

impl Encryptor {
    pub fn new(params: &Parameters, pk: &PublicKey) -> Self {
        Self {
            params: params.clone(),
            encryptor: rlwe::encryptor::Encryptor::new(params.rlwe(), pk),
            encoder: Encoder::new(params),
            pt_pool: Plaintext::new(params, params.max_level(), params.default_scale()),
        }
    }

    pub fn encrypt(&mut self, pt: &Plaintext, ct: &mut Ciphertext) {
        self.encryptor.encrypt(&pt.value, &mut ct.el);
        ct.scale = pt.scale;
    }

    pub fn encrypt_msg(&mut self, msg: &Message, ct: &mut Ciphertext) {
        let scale: f64 = self.params.default_scale();
        self.encoder.encode_into(msg, scale, &mut self.pt_pool);
        self.encrypt_pool(ct);
    }

    pub fn encrypt_msg_new(&mut self, msg: &Message) -> Ciphertext {
        let mut ct: Ciphertext = Ciphertext::new(
            &self.params,
            1,
            self.params.max_level(),
            self.params.default_scale(),
        );
        self.encrypt_msg(msg, &mut ct);
        ct
    }

    fn encrypt_pool(&mut self, ct: &mut Ciphertext) {
        self.encryptor.encrypt(&self.pt_pool.value, &mut ct.el);
        ct.scale = self.pt_pool.scale;
    }
}
