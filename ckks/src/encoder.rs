use num_bigint::BigInt;
use num_complex::Complex64;
use num_traits::ToPrimitive;
use rns::modulus::WordOps;
use rns::poly::PolyRNS;
use rns::ring::RingType;
use std::f64::consts::PI;

use crate::elements::{Message, Plaintext};
use crate::parameters::Parameters;

/// Maps messages to polynomials through the canonical embedding: slot j is
/// the evaluation at the primitive root of exponent 5^j. The transform is
/// the standard special FFT over the rot-group, O(S log S).
///
/// Conjugate-invariant parameter sets go through the doubled standard ring:
/// a real slot vector embeds to a conjugation-invariant polynomial whose
/// compressed form keeps the first n coefficients.
pub struct Encoder {
    params: Parameters,
    /// cyclotomic order of the embedding
    m: usize,
    /// degree of the (possibly doubled) standard polynomial
    n_std: usize,
    /// 5^j mod m
    rot_group: Vec<usize>,
    /// e^(2 pi i k / m)
    ksi_pows: Vec<Complex64>,
    buf_slots: Vec<Complex64>,
    buf_coeffs: Vec<i64>,
    buf_big: Vec<BigInt>,
}

impl Encoder {
    pub fn new(params: &Parameters) -> Self {
        let n: usize = params.n();
        let n_std: usize = match params.ring_type() {
            RingType::Standard => n,
            RingType::ConjugateInvariant => n << 1,
        };
        let m: usize = n_std << 1;
        let nh: usize = n_std >> 1;

        let mut rot_group: Vec<usize> = Vec::with_capacity(nh);
        let mut five_pow: usize = 1;
        for _ in 0..nh {
            rot_group.push(five_pow);
            five_pow = (five_pow * 5) % m;
        }

        let mut ksi_pows: Vec<Complex64> = Vec::with_capacity(m + 1);
        for k in 0..m + 1 {
            let angle: f64 = 2.0 * PI * k as f64 / m as f64;
            ksi_pows.push(Complex64::new(angle.cos(), angle.sin()));
        }

        Self {
            params: params.clone(),
            m: m,
            n_std: n_std,
            rot_group: rot_group,
            ksi_pows: ksi_pows,
            buf_slots: vec![Complex64::new(0.0, 0.0); params.slots()],
            buf_coeffs: vec![0i64; n_std],
            buf_big: vec![BigInt::default(); n_std],
        }
    }

    /// Embedding transform: slot values to polynomial evaluations order.
    fn fft_special_inv(&mut self, size: usize) {
        let vals: &mut [Complex64] = &mut self.buf_slots[..size];

        let mut len: usize = size;
        while len >= 2 {
            let lenh: usize = len >> 1;
            let lenq: usize = len << 2;
            let mut i: usize = 0;
            while i < size {
                for j in 0..lenh {
                    let idx: usize =
                        (lenq - (self.rot_group[j] % lenq)) * self.m / lenq;
                    let u: Complex64 = vals[i + j] + vals[i + j + lenh];
                    let v: Complex64 = (vals[i + j] - vals[i + j + lenh]) * self.ksi_pows[idx];
                    vals[i + j] = u;
                    vals[i + j + lenh] = v;
                }
                i += len;
            }
            len >>= 1;
        }

        bit_reverse(vals);

        let size_inv: f64 = 1.0 / size as f64;
        vals.iter_mut().for_each(|v| *v *= size_inv);
    }

    /// Decoding transform, inverse of fft_special_inv.
    fn fft_special(&mut self, size: usize) {
        let vals: &mut [Complex64] = &mut self.buf_slots[..size];

        bit_reverse(vals);

        let mut len: usize = 2;
        while len <= size {
            let lenh: usize = len >> 1;
            let lenq: usize = len << 2;
            let mut i: usize = 0;
            while i < size {
                for j in 0..lenh {
                    let idx: usize = (self.rot_group[j] % lenq) * self.m / lenq;
                    let u: Complex64 = vals[i + j];
                    let v: Complex64 = vals[i + j + lenh] * self.ksi_pows[idx];
                    vals[i + j] = u + v;
                    vals[i + j + lenh] = u - v;
                }
                i += len;
            }
            len <<= 1;
        }
    }

    pub fn encode(&mut self, msg: &Message, level: usize, scale: f64) -> Plaintext {
        let mut pt: Plaintext = Plaintext::new(&self.params, level, scale);
        self.encode_into(msg, scale, &mut pt);
        pt
    }

    /// Encodes msg at the level of the receiver. The receiver ends up in
    /// the NTT domain.
    pub fn encode_into(&mut self, msg: &Message, scale: f64, pt: &mut Plaintext) {
        let slots: usize = self.params.slots();
        assert!(
            msg.slots() == slots,
            "encode: msg.slots()={} != {}",
            msg.slots(),
            slots
        );
        assert!(scale >= 1.0 && scale.is_finite(), "encode: invalid scale {}", scale);

        let real_only: bool = self.params.ring_type() == RingType::ConjugateInvariant;
        for (buf, v) in self.buf_slots.iter_mut().zip(msg.values.iter()) {
            *buf = if real_only {
                Complex64::new(v.re, 0.0)
            } else {
                *v
            };
        }

        self.fft_special_inv(slots);

        let nh: usize = self.n_std >> 1;
        let gap: usize = nh / slots;

        self.buf_coeffs.fill(0);
        for j in 0..slots {
            let v: Complex64 = self.buf_slots[j];
            self.buf_coeffs[j * gap] = (v.re * scale).round() as i64;
            self.buf_coeffs[nh + j * gap] = (v.im * scale).round() as i64;
        }

        // compressed form keeps the first n coefficients
        let n: usize = self.params.n();
        let level: usize = pt.level();
        let ring_q = self.params.rlwe().ring_q();
        for i in 0..level + 1 {
            let q_i: u64 = ring_q.0[i].modulus.q;
            let out: &mut [u64] = &mut pt.value.at_mut(i).0;
            for (j, &c) in self.buf_coeffs[..n].iter().enumerate() {
                out[j] = if c < 0 {
                    q_i - (c.unsigned_abs() % q_i)
                } else {
                    c as u64 % q_i
                };
            }
        }
        pt.value.is_ntt = false;
        ring_q.at_level(level).ntt_inplace::<false>(&mut pt.value);
        pt.scale = scale;
    }

    pub fn decode(&mut self, pt: &Plaintext) -> Message {
        let mut msg: Message = Message::new(&self.params);
        self.decode_into(pt, &mut msg);
        msg
    }

    pub fn decode_into(&mut self, pt: &Plaintext, msg: &mut Message) {
        let slots: usize = self.params.slots();
        assert!(pt.value.is_ntt, "decode: pt must be in the NTT domain");
        assert!(pt.scale > 0.0, "decode: invalid scale {}", pt.scale);

        let level: usize = pt.level();
        let ring_q = self.params.rlwe().ring_q().at_level(level);

        let mut value: PolyRNS<u64> = pt.value.clone();
        ring_q.intt_inplace::<false>(&mut value);

        let n: usize = self.params.n();
        ring_q.to_bigint_inplace(&value, &mut self.buf_big[..n]);

        // decompress to the standard degree when conjugate-invariant
        if self.params.ring_type() == RingType::ConjugateInvariant {
            self.buf_big[n] = BigInt::default();
            for j in 1..n {
                let neg: BigInt = -&self.buf_big[j];
                self.buf_big[2 * n - j] = neg;
            }
        }

        let nh: usize = self.n_std >> 1;
        let gap: usize = nh / slots;
        for j in 0..slots {
            let re: f64 = self.buf_big[j * gap].to_f64().unwrap_or(0.0) / pt.scale;
            let im: f64 = self.buf_big[nh + j * gap].to_f64().unwrap_or(0.0) / pt.scale;
            self.buf_slots[j] = Complex64::new(re, im);
        }

        self.fft_special(slots);

        let real_only: bool = self.params.ring_type() == RingType::ConjugateInvariant;
        for (out, v) in msg.values.iter_mut().zip(self.buf_slots.iter()) {
            *out = if real_only {
                Complex64::new(v.re, 0.0)
            } else {
                *v
            };
        }
    }
}

fn bit_reverse(vals: &mut [Complex64]) {
    let n: usize = vals.len();
    if n <= 2 {
        return;
    }
    let log_n: u32 = n.log2() as u32;
    for i in 0..n {
        let j: usize = i.reverse_bits_msb(log_n);
        if i < j {
            vals.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{test_parameters_small_ckks, Parameters};

    #[test]
    fn test_encode_decode_roundtrip() {
        let params: Parameters = test_parameters_small_ckks();
        let mut encoder: Encoder = Encoder::new(&params);

        let mut msg: Message = Message::new(&params);
        for (i, v) in msg.values.iter_mut().enumerate() {
            *v = Complex64::new(
                (i as f64 / 31.0) - 0.5,
                ((31 - i) as f64 / 31.0) - 0.5,
            );
        }

        let pt: Plaintext = encoder.encode(&msg, params.max_level(), params.default_scale());
        let decoded: Message = encoder.decode(&pt);

        for (a, b) in msg.values.iter().zip(decoded.values.iter()) {
            assert!((a.re - b.re).abs() < 1e-6, "re {} vs {}", a.re, b.re);
            assert!((a.im - b.im).abs() < 1e-6, "im {} vs {}", a.im, b.im);
        }
    }

    #[test]
    fn test_encode_is_level_aware() {
        let params: Parameters = test_parameters_small_ckks();
        let mut encoder: Encoder = Encoder::new(&params);

        let mut msg: Message = Message::new(&params);
        msg.values[0] = Complex64::new(0.25, -0.125);

        let pt: Plaintext = encoder.encode(&msg, 2, params.default_scale());
        assert_eq!(pt.level(), 2);
        let decoded: Message = encoder.decode(&pt);
        assert!((decoded.values[0].re - 0.25).abs() < 1e-6);
        assert!((decoded.values[0].im + 0.125).abs() < 1e-6);
    }
}
