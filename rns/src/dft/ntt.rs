use crate::dft::DFT;
use crate::modulus::barrett::Barrett;
use crate::modulus::montgomery::Montgomery;
use crate::modulus::prime::Prime;
use crate::modulus::ReduceOnce;
use crate::modulus::WordOps;
use crate::modulus::{BARRETT, NONE, ONCE};
use crate::ring::RingType;
use itertools::izip;

/// Negacyclic NTT tables for one prime.
///
/// For the Standard ring the transform length equals the ring degree n and
/// the twiddles are powers of a primitive 2n-th root of unity. For the
/// ConjugateInvariant ring of degree n the element is unfolded into the
/// length-2n standard ring of the 4n-th root, transformed there, and folded
/// back to its first n evaluations.
pub struct Table<O> {
    prime: Prime<O>,
    ring_type: RingType,
    size: usize,
    psi: O,
    psi_forward_rev: Vec<Barrett<u64>>,
    psi_backward_rev: Vec<Barrett<u64>>,
    size_inv: Barrett<u64>,
    q: O,
    two_q: O,
    four_q: O,
}

impl Table<u64> {
    pub fn new(prime: Prime<u64>, n: usize, ring_type: RingType) -> Table<u64> {
        assert!(n & (n - 1) == 0, "invalid argument: n = {} is not a power of two", n);

        let size: usize = match ring_type {
            RingType::Standard => n,
            RingType::ConjugateInvariant => n << 1,
        };
        let nth_root: u64 = (size << 1) as u64;

        let psi: u64 = prime.primitive_nth_root(nth_root);

        let psi_mont: Montgomery<u64> = prime.montgomery.prepare::<ONCE>(psi);
        let psi_inv_mont: Montgomery<u64> = prime.montgomery.pow(psi_mont, prime.phi - 1);

        let mut psi_forward_rev: Vec<Barrett<u64>> = vec![Barrett(0, 0); size];
        let mut psi_backward_rev: Vec<Barrett<u64>> = vec![Barrett(0, 0); size];

        psi_forward_rev[0] = prime.barrett.prepare(1);
        psi_backward_rev[0] = prime.barrett.prepare(1);

        let log_size: u32 = size.log2() as u32;

        let mut powers_forward: u64 = prime.montgomery.one();
        let mut powers_backward: u64 = prime.montgomery.one();

        for i in 1..size {
            let i_rev: usize = i.reverse_bits_msb(log_size);

            prime
                .montgomery
                .mul_external_assign::<ONCE>(psi_mont, &mut powers_forward);
            prime
                .montgomery
                .mul_external_assign::<ONCE>(psi_inv_mont, &mut powers_backward);

            psi_forward_rev[i_rev] = prime
                .barrett
                .prepare(prime.montgomery.unprepare::<ONCE>(powers_forward));
            psi_backward_rev[i_rev] = prime
                .barrett
                .prepare(prime.montgomery.unprepare::<ONCE>(powers_backward));
        }

        let size_inv: Barrett<u64> = prime.barrett.prepare(prime.inv(size as u64));

        let q: u64 = prime.q();

        Self {
            prime: prime,
            ring_type: ring_type,
            size: size,
            psi: psi,
            psi_forward_rev: psi_forward_rev,
            psi_backward_rev: psi_backward_rev,
            size_inv: size_inv,
            q: q,
            two_q: q << 1,
            four_q: q << 2,
        }
    }

    pub fn psi(&self) -> u64 {
        self.psi
    }

    pub fn forward_inplace<const LAZY: bool>(&self, a: &mut [u64]) {
        match self.ring_type {
            RingType::Standard => {
                debug_assert!(a.len() == self.size);
                self.forward_std::<LAZY>(a);
            }
            RingType::ConjugateInvariant => {
                // TODO: dedicated in-place cosine kernel to drop the scratch allocation.
                let n: usize = a.len();
                debug_assert!(n << 1 == self.size);
                let mut buf: Vec<u64> = vec![0u64; self.size];
                buf[0] = self.prime.barrett.reduce::<BARRETT>(&a[0]);
                for j in 1..n {
                    let v: u64 = self.prime.barrett.reduce::<BARRETT>(&a[j]);
                    buf[j] = v;
                    buf[(n << 1) - j] = if v == 0 { 0 } else { self.q - v };
                }
                self.forward_std::<LAZY>(&mut buf);
                a.copy_from_slice(&buf[..n]);
            }
        }
    }

    pub fn backward_inplace<const LAZY: bool>(&self, a: &mut [u64]) {
        match self.ring_type {
            RingType::Standard => {
                debug_assert!(a.len() == self.size);
                self.backward_std::<LAZY>(a);
            }
            RingType::ConjugateInvariant => {
                let n: usize = a.len();
                debug_assert!(n << 1 == self.size);
                let mut buf: Vec<u64> = vec![0u64; self.size];
                buf[..n].copy_from_slice(a);
                for i in 0..n {
                    buf[(n << 1) - 1 - i] = a[i];
                }
                self.backward_std::<LAZY>(&mut buf);
                a.copy_from_slice(&buf[..n]);
            }
        }
    }

    /// Cooley-Tukey forward transform, bit-reversed output.
    /// Values stay below 4q between layers; the final pass brings them
    /// to [0, 2q) (LAZY) or [0, q).
    fn forward_std<const LAZY: bool>(&self, a: &mut [u64]) {
        let n: usize = a.len();
        let log_n: u32 = n.log2() as u32;

        for layer in 0..log_n {
            let (m, size) = (1 << layer, 1 << (log_n - layer - 1));
            let t: usize = 2 * size;
            if t >= 16 {
                izip!(a.chunks_exact_mut(t), &self.psi_forward_rev[m..]).for_each(|(a, psi)| {
                    let (a, b) = a.split_at_mut(size);
                    izip!(a.chunks_exact_mut(8), b.chunks_exact_mut(8)).for_each(|(a, b)| {
                        self.dit_inplace(&mut a[0], &mut b[0], *psi);
                        self.dit_inplace(&mut a[1], &mut b[1], *psi);
                        self.dit_inplace(&mut a[2], &mut b[2], *psi);
                        self.dit_inplace(&mut a[3], &mut b[3], *psi);
                        self.dit_inplace(&mut a[4], &mut b[4], *psi);
                        self.dit_inplace(&mut a[5], &mut b[5], *psi);
                        self.dit_inplace(&mut a[6], &mut b[6], *psi);
                        self.dit_inplace(&mut a[7], &mut b[7], *psi);
                    });
                });
            } else {
                izip!(a.chunks_exact_mut(t), &self.psi_forward_rev[m..]).for_each(|(a, psi)| {
                    let (a, b) = a.split_at_mut(size);
                    izip!(a, b).for_each(|(a, b)| self.dit_inplace(a, b, *psi));
                });
            }
        }

        if LAZY {
            a.iter_mut().for_each(|a| {
                a.reduce_once_assign(self.two_q);
                debug_assert!(*a < self.two_q);
            });
        } else {
            a.iter_mut().for_each(|a| {
                self.prime.barrett.reduce_assign::<BARRETT>(a);
                debug_assert!(*a < self.q);
            });
        }
    }

    #[inline(always)]
    fn dit_inplace(&self, a: &mut u64, b: &mut u64, t: Barrett<u64>) {
        debug_assert!(*a < self.four_q, "a:{} 4q:{}", a, self.four_q);
        debug_assert!(*b < self.four_q, "b:{} 4q:{}", b, self.four_q);
        a.reduce_once_assign(self.two_q);
        let bt: u64 = self.prime.barrett.mul_external::<NONE>(&t, b);
        *b = *a + self.two_q - bt;
        *a += bt;
    }

    /// Gentleman-Sande inverse transform, bit-reversed input.
    /// Values stay below 2q between layers; the final scale by size^-1
    /// brings them to [0, 2q) (LAZY) or [0, q).
    fn backward_std<const LAZY: bool>(&self, a: &mut [u64]) {
        let n: usize = a.len();
        let log_n: u32 = n.log2() as u32;

        for layer in (0..log_n).rev() {
            let (m, size) = (1 << layer, 1 << (log_n - layer - 1));
            let t: usize = 2 * size;
            if t >= 16 {
                izip!(a.chunks_exact_mut(t), &self.psi_backward_rev[m..]).for_each(|(a, psi)| {
                    let (a, b) = a.split_at_mut(size);
                    izip!(a.chunks_exact_mut(8), b.chunks_exact_mut(8)).for_each(|(a, b)| {
                        self.dif_inplace(&mut a[0], &mut b[0], *psi);
                        self.dif_inplace(&mut a[1], &mut b[1], *psi);
                        self.dif_inplace(&mut a[2], &mut b[2], *psi);
                        self.dif_inplace(&mut a[3], &mut b[3], *psi);
                        self.dif_inplace(&mut a[4], &mut b[4], *psi);
                        self.dif_inplace(&mut a[5], &mut b[5], *psi);
                        self.dif_inplace(&mut a[6], &mut b[6], *psi);
                        self.dif_inplace(&mut a[7], &mut b[7], *psi);
                    });
                });
            } else {
                izip!(a.chunks_exact_mut(t), &self.psi_backward_rev[m..]).for_each(|(a, psi)| {
                    let (a, b) = a.split_at_mut(size);
                    izip!(a, b).for_each(|(a, b)| self.dif_inplace(a, b, *psi));
                });
            }
        }

        if LAZY {
            a.iter_mut().for_each(|a| {
                self.prime.barrett.mul_external_assign::<NONE>(&self.size_inv, a);
                debug_assert!(*a < self.two_q);
            });
        } else {
            a.iter_mut().for_each(|a| {
                self.prime.barrett.mul_external_assign::<ONCE>(&self.size_inv, a);
                debug_assert!(*a < self.q);
            });
        }
    }

    #[inline(always)]
    fn dif_inplace(&self, a: &mut u64, b: &mut u64, t: Barrett<u64>) {
        debug_assert!(*a < self.two_q, "a:{} 2q:{}", a, self.two_q);
        debug_assert!(*b < self.two_q, "b:{} 2q:{}", b, self.two_q);
        let d: u64 = self.prime.barrett.mul_external::<NONE>(&t, &(*a + self.two_q - *b));
        *a += *b;
        a.reduce_once_assign(self.two_q);
        *b = d;
    }
}

impl DFT<u64> for Table<u64> {
    fn forward_inplace(&self, a: &mut [u64]) {
        self.forward_inplace::<false>(a)
    }

    fn forward_inplace_lazy(&self, a: &mut [u64]) {
        self.forward_inplace::<true>(a)
    }

    fn backward_inplace(&self, a: &mut [u64]) {
        self.backward_inplace::<false>(a)
    }

    fn backward_inplace_lazy(&self, a: &mut [u64]) {
        self.backward_inplace::<true>(a)
    }
}
