use num_complex::Complex64;
use rns::poly::PolyRNS;

use crate::parameters::Parameters;

/// A vector of slot values. Conjugate-invariant parameter sets carry real
/// values in the real parts.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub values: Vec<Complex64>,
}

impl Message {
    pub fn new(params: &Parameters) -> Self {
        Self {
            values: vec![Complex64::new(0.0, 0.0); params.slots()],
        }
    }

    pub fn slots(&self) -> usize {
        self.values.len()
    }
}

/// An encoded message: one polynomial in Q (NTT domain) and its scale.
#[derive(Clone, Debug)]
pub struct Plaintext {
    pub value: PolyRNS<u64>,
    pub scale: f64,
}

impl Plaintext {
    pub fn new(params: &Parameters, level: usize, scale: f64) -> Self {
        Self {
            value: PolyRNS::<u64>::new(params.n(), level),
            scale: scale,
        }
    }

    pub fn level(&self) -> usize {
        self.value.level()
    }
}

/// An RLWE element together with its scale.
#[derive(Clone, Debug)]
pub struct Ciphertext {
    pub el: rlwe::ciphertext::Ciphertext,
    pub scale: f64,
}

impl Ciphertext {
    pub fn new(params: &Parameters, degree: usize, level: usize, scale: f64) -> Self {
        Self {
            el: rlwe::ciphertext::Ciphertext::new(params.rlwe(), degree, level),
            scale: scale,
        }
    }

    pub fn degree(&self) -> usize {
        self.el.degree()
    }

    pub fn level(&self) -> usize {
        self.el.level()
    }

    pub fn is_ntt(&self) -> bool {
        self.el.is_ntt()
    }
}
