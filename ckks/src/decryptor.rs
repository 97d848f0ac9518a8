use rlwe::keys::SecretKey;

use crate::elements::{Ciphertext, Message, Plaintext};
use crate::encoder::Encoder;
use crate::parameters::Parameters;

/// Decrypts and decodes ciphertexts.
pub struct Decryptor {
    params: Parameters,
    decryptor: rlwe::decryptor::Decryptor,
    encoder: Encoder,
    pt_pool: Plaintext,
}

impl Decryptor {
    pub fn new(params: &Parameters, sk: &SecretKey) -> Self {
        Self {
            params: params.clone(),
            decryptor: rlwe::decryptor::Decryptor::new(params.rlwe(), sk),
            encoder: Encoder::new(params),
            pt_pool: Plaintext::new(params, params.max_level(), params.default_scale()),
        }
    }

    pub fn decrypt(&self, ct: &Ciphertext, pt: &mut Plaintext) {
        self.decryptor.decrypt(&ct.el, &mut pt.value);
        pt.scale = ct.scale;
    }

    pub fn decrypt_to_msg(&mut self, ct: &Ciphertext, msg: &mut Message) {
        if self.pt_pool.value.level() != ct.level() {
            self.pt_pool = Plaintext::new(&self.params, ct.level(), ct.scale);
        }
        self.decryptor.decrypt(&ct.el, &mut self.pt_pool.value);
        self.pt_pool.scale = ct.scale;
        self.encoder.decode_into(&self.pt_pool, msg);
    }

    pub fn decrypt_to_msg_new(&mut self, ct: &Ciphertext) -> Message {
        let mut msg: Message = Message::new(&self.params);
        self.decrypt_to_msg(ct, &mut msg);
        msg
    }
}
