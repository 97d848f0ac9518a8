use crate::modulus::barrett::Barrett;
use crate::modulus::{BARRETT, NONE, ONCE};
use crate::poly::{Poly, PolyRNS};
use crate::ring::{Ring, RingRNS};
use crate::scalar::ScalarRNS;

impl RingRNS<u64> {
    /// b <- floor(a / q[level]) (rounded to nearest when ROUND), written on
    /// the first level residue vectors of b.
    pub fn div_by_last_modulus<const ROUND: bool, const NTT: bool>(
        &self,
        a: &PolyRNS<u64>,
        buf: &mut [Poly<u64>; 2],
        b: &mut PolyRNS<u64>,
    ) {
        let level: usize = self.level();
        debug_assert!(level != 0, "invalid call: self.level()=0");
        debug_assert!(
            level <= a.level(),
            "invalid input a: self.level()={} > a.level()={}",
            level,
            a.level()
        );
        debug_assert!(
            b.level() >= level - 1,
            "invalid input b: b.level()={} < self.level()-1={}",
            b.level(),
            level - 1
        );

        let rescaling_constants: ScalarRNS<Barrett<u64>> = self.rescaling_constants();
        let r_last: &Ring<u64> = &self.0[level];

        let (buf_last, buf_i) = buf.split_at_mut(1);

        if ROUND {
            let q_half: u64 = r_last.modulus.q >> 1;

            if NTT {
                r_last.intt::<false>(a.at(level), &mut buf_last[0]);
                r_last.add_scalar_inplace::<ONCE>(&q_half, &mut buf_last[0]);
                for (i, r) in self.0[0..level].iter().enumerate() {
                    let offset: u64 = r.modulus.q - r.modulus.barrett.reduce::<BARRETT>(&q_half);
                    r_last.add_scalar::<NONE>(&buf_last[0], &offset, &mut buf_i[0]);
                    r.ntt_inplace::<true>(&mut buf_i[0]);
                    r.sub_mul_scalar_barrett::<2, ONCE>(
                        &buf_i[0],
                        a.at(i),
                        &rescaling_constants.0[i],
                        b.at_mut(i),
                    );
                }
            } else {
                r_last.add_scalar::<ONCE>(a.at(level), &q_half, &mut buf_last[0]);
                for (i, r) in self.0[0..level].iter().enumerate() {
                    let offset: u64 = r.modulus.q - r.modulus.barrett.reduce::<BARRETT>(&q_half);
                    r_last.add_scalar::<NONE>(&buf_last[0], &offset, &mut buf_i[0]);
                    r.sub_mul_scalar_barrett::<2, ONCE>(
                        &buf_i[0],
                        a.at(i),
                        &rescaling_constants.0[i],
                        b.at_mut(i),
                    );
                }
            }
        } else {
            if NTT {
                self.0[level].intt::<false>(a.at(level), &mut buf_last[0]);
                for (i, r) in self.0[0..level].iter().enumerate() {
                    r.ntt::<true>(&buf_last[0], &mut buf_i[0]);
                    r.sub_mul_scalar_barrett::<2, ONCE>(
                        &buf_i[0],
                        a.at(i),
                        &rescaling_constants.0[i],
                        b.at_mut(i),
                    );
                }
            } else {
                for (i, r) in self.0[0..level].iter().enumerate() {
                    r.sub_mul_scalar_barrett::<2, ONCE>(
                        a.at(level),
                        a.at(i),
                        &rescaling_constants.0[i],
                        b.at_mut(i),
                    );
                }
            }
        }

        b.is_ntt = NTT;
    }

    /// a <- floor(a / q[level]), result on the first level residue vectors.
    /// The topmost residue vector is left stale; the caller truncates.
    pub fn div_by_last_modulus_inplace<const ROUND: bool, const NTT: bool>(
        &self,
        buf: &mut [Poly<u64>; 2],
        a: &mut PolyRNS<u64>,
    ) {
        let level: usize = self.level();
        debug_assert!(level != 0, "invalid call: self.level()=0");
        debug_assert!(
            level <= a.level(),
            "invalid input a: self.level()={} > a.level()={}",
            level,
            a.level()
        );

        let rescaling_constants: ScalarRNS<Barrett<u64>> = self.rescaling_constants();
        let r_last: &Ring<u64> = &self.0[level];

        if ROUND {
            let q_half: u64 = r_last.modulus.q >> 1;

            if NTT {
                let (buf_last, buf_i) = buf.split_at_mut(1);
                r_last.intt::<false>(a.at(level), &mut buf_last[0]);
                r_last.add_scalar_inplace::<ONCE>(&q_half, &mut buf_last[0]);
                for (i, r) in self.0[0..level].iter().enumerate() {
                    let offset: u64 = r.modulus.q - r.modulus.barrett.reduce::<BARRETT>(&q_half);
                    r_last.add_scalar::<NONE>(&buf_last[0], &offset, &mut buf_i[0]);
                    r.ntt_inplace::<true>(&mut buf_i[0]);
                    r.sub_mul_scalar_barrett_inplace::<2, ONCE>(
                        &buf_i[0],
                        &rescaling_constants.0[i],
                        a.at_mut(i),
                    );
                }
            } else {
                let (a_i, a_last) = a.coeffs.split_at_mut(level);
                r_last.add_scalar_inplace::<ONCE>(&q_half, &mut a_last[0]);
                for (i, r) in self.0[0..level].iter().enumerate() {
                    let offset: u64 = r.modulus.q - r.modulus.barrett.reduce::<BARRETT>(&q_half);
                    r.add_scalar_sub_mul_barrett_inplace::<1, ONCE>(
                        &a_last[0],
                        &offset,
                        &rescaling_constants.0[i],
                        &mut a_i[i],
                    );
                }
            }
        } else {
            if NTT {
                let (buf_last, buf_i) = buf.split_at_mut(1);
                r_last.intt::<false>(a.at(level), &mut buf_last[0]);
                for (i, r) in self.0[0..level].iter().enumerate() {
                    r.ntt::<true>(&buf_last[0], &mut buf_i[0]);
                    r.sub_mul_scalar_barrett_inplace::<2, ONCE>(
                        &buf_i[0],
                        &rescaling_constants.0[i],
                        a.at_mut(i),
                    );
                }
            } else {
                let (a_i, a_last) = a.coeffs.split_at_mut(level);
                for (i, r) in self.0[0..level].iter().enumerate() {
                    r.sub_mul_scalar_barrett_inplace::<2, ONCE>(
                        &a_last[0],
                        &rescaling_constants.0[i],
                        &mut a_i[i],
                    );
                }
            }
        }
    }

    /// a <- floor(a / prod_{i=level-nb_moduli+1}^{level} q[i]), result on the
    /// first level+1-nb_moduli residue vectors. The caller truncates.
    pub fn div_by_last_moduli_inplace<const ROUND: bool, const NTT: bool>(
        &self,
        nb_moduli: usize,
        buf: &mut [Poly<u64>; 2],
        a: &mut PolyRNS<u64>,
    ) {
        debug_assert!(
            nb_moduli <= self.level(),
            "invalid input nb_moduli: nb_moduli={} > self.level()={}",
            nb_moduli,
            self.level()
        );

        if nb_moduli == 0 {
            return;
        }

        if NTT {
            self.intt_inplace::<false>(a);
            (0..nb_moduli).for_each(|i| {
                self.at_level(self.level() - i)
                    .div_by_last_modulus_inplace::<ROUND, false>(buf, a)
            });
            a.truncate_level(self.level() - nb_moduli);
            self.at_level(self.level() - nb_moduli).ntt_inplace::<false>(a);
        } else {
            (0..nb_moduli).for_each(|i| {
                self.at_level(self.level() - i)
                    .div_by_last_modulus_inplace::<ROUND, false>(buf, a)
            });
            a.truncate_level(self.level() - nb_moduli);
        }
    }
}
