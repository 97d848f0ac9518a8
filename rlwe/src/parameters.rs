use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use num_bigint::BigInt;
use rns::ring::{RingRNS, RingType};
use rns::serialization::{ReaderFrom, WriterTo};
use std::ops::Range;

/// Plain description of a parameter set. All primes must be distinct,
/// NTT-friendly for the chosen ring type, and q non-empty.
#[derive(Clone, Debug, PartialEq)]
pub struct ParametersLiteral {
    pub log_n: usize,
    pub q: Vec<u64>,
    pub p: Vec<u64>,
    /// auxiliary basis carrying the inner products of the key switch
    pub r: Vec<u64>,
    /// block grouping factor of the auxiliary-ring accumulation
    pub gamma: usize,
    pub sigma: f64,
    /// secret-key Hamming weight
    pub h: usize,
    pub ring_type: RingType,
}

/// Validated parameter set: the three rings, the gadget shape and the
/// precomputed modulus products. Cheap to clone (rings are shared).
#[derive(Clone)]
pub struct Parameters {
    literal: ParametersLiteral,
    ring_q: RingRNS<u64>,
    ring_p: RingRNS<u64>,
    ring_r: RingRNS<u64>,
    q_big: BigInt,
    p_big: BigInt,
    r_big: BigInt,
}

impl Parameters {
    pub fn from_literal(literal: ParametersLiteral) -> Self {
        assert!(
            (4..=17).contains(&literal.log_n),
            "invalid literal: log_n = {} not in [4, 17]",
            literal.log_n
        );
        assert!(!literal.q.is_empty(), "invalid literal: empty Q basis");
        assert!(!literal.p.is_empty(), "invalid literal: empty P basis");
        assert!(!literal.r.is_empty(), "invalid literal: empty R basis");
        assert!(literal.gamma >= 1, "invalid literal: gamma = 0");
        assert!(literal.sigma > 0.0, "invalid literal: sigma <= 0");

        let n: usize = 1 << literal.log_n;
        let nth_root: u64 = match literal.ring_type {
            RingType::Standard => (n << 1) as u64,
            RingType::ConjugateInvariant => (n << 2) as u64,
        };

        let mut all: Vec<u64> = Vec::new();
        all.extend_from_slice(&literal.q);
        all.extend_from_slice(&literal.p);
        all.extend_from_slice(&literal.r);
        for (i, &q_i) in all.iter().enumerate() {
            assert!(
                q_i % nth_root == 1,
                "invalid literal: prime {:#x} != 1 mod {}",
                q_i,
                nth_root
            );
            assert!(
                !all[..i].contains(&q_i),
                "invalid literal: duplicated prime {:#x}",
                q_i
            );
        }

        let ring_q: RingRNS<u64> = RingRNS::new(n, literal.q.clone(), literal.ring_type);
        let ring_p: RingRNS<u64> = RingRNS::new(n, literal.p.clone(), literal.ring_type);
        let ring_r: RingRNS<u64> = RingRNS::new(n, literal.r.clone(), literal.ring_type);

        let q_big: BigInt = ring_q.modulus_big();
        let p_big: BigInt = ring_p.modulus_big();
        let r_big: BigInt = ring_r.modulus_big();

        let params: Parameters = Self {
            literal: literal,
            ring_q: ring_q,
            ring_p: ring_p,
            ring_r: ring_r,
            q_big: q_big,
            p_big: p_big,
            r_big: r_big,
        };

        // The inner-product accumulator lifts one alpha-prime group and one
        // gamma-prime block; R must dominate their product times N * beta.
        let mut max_group: BigInt = BigInt::from(1);
        for i in 0..params.beta() {
            let mut group: BigInt = BigInt::from(1);
            for idx in params.group_range(i, params.max_level()) {
                group *= BigInt::from(params.literal.q[idx]);
            }
            if group > max_group {
                max_group = group;
            }
        }
        let mut max_block: BigInt = BigInt::from(1);
        for b in 0..params.block_len_q() {
            let mut block: BigInt = BigInt::from(1);
            for idx in params.q_block_range(b, params.max_level()) {
                block *= BigInt::from(params.literal.q[idx]);
            }
            if block > max_block {
                max_block = block;
            }
        }
        for b in 0..params.block_len_p() {
            let mut block: BigInt = BigInt::from(1);
            for idx in params.p_block_range(b) {
                block *= BigInt::from(params.literal.p[idx]);
            }
            if block > max_block {
                max_block = block;
            }
        }
        // negacyclic convolution makes the accumulator signed, so R must
        // cover twice the magnitude bound
        let bound: BigInt =
            max_group * max_block * BigInt::from(n) * BigInt::from(params.beta()) * 2;
        assert!(
            params.r_big > bound,
            "invalid literal: R (log2 = {}) too small for the accumulator bound (log2 = {})",
            params.r_big.bits(),
            bound.bits()
        );

        params
    }

    pub fn literal(&self) -> &ParametersLiteral {
        &self.literal
    }

    pub fn n(&self) -> usize {
        1 << self.literal.log_n
    }

    pub fn log_n(&self) -> usize {
        self.literal.log_n
    }

    pub fn ring_type(&self) -> RingType {
        self.literal.ring_type
    }

    pub fn ring_q(&self) -> &RingRNS<u64> {
        &self.ring_q
    }

    pub fn ring_p(&self) -> &RingRNS<u64> {
        &self.ring_p
    }

    pub fn ring_r(&self) -> &RingRNS<u64> {
        &self.ring_r
    }

    pub fn q_big(&self) -> &BigInt {
        &self.q_big
    }

    pub fn p_big(&self) -> &BigInt {
        &self.p_big
    }

    pub fn r_big(&self) -> &BigInt {
        &self.r_big
    }

    pub fn q_count(&self) -> usize {
        self.literal.q.len()
    }

    pub fn p_count(&self) -> usize {
        self.literal.p.len()
    }

    pub fn r_count(&self) -> usize {
        self.literal.r.len()
    }

    pub fn max_level(&self) -> usize {
        self.literal.q.len() - 1
    }

    pub fn sigma(&self) -> f64 {
        self.literal.sigma
    }

    /// Rejection bound of the noise sampler.
    pub fn noise_bound(&self) -> f64 {
        6.0 * self.literal.sigma
    }

    pub fn h(&self) -> usize {
        self.literal.h
    }

    /// Number of special primes (the gadget digit width).
    pub fn alpha(&self) -> usize {
        self.literal.p.len()
    }

    /// Number of gadget digits at the maximum level.
    pub fn beta(&self) -> usize {
        (self.max_level() + 1 + self.alpha() - 1) / self.alpha()
    }

    /// Number of gadget digits at the given level.
    pub fn beta_at(&self, level_q: usize) -> usize {
        (level_q + 1 + self.alpha() - 1) / self.alpha()
    }

    pub fn gamma(&self) -> usize {
        self.literal.gamma
    }

    /// Number of accumulator blocks covering Q at the maximum level.
    pub fn block_len_q(&self) -> usize {
        (self.max_level() + 1 + self.gamma() - 1) / self.gamma()
    }

    /// Number of accumulator blocks covering Q at the given level.
    pub fn block_len_q_at(&self, level_q: usize) -> usize {
        (level_q + 1 + self.gamma() - 1) / self.gamma()
    }

    /// Number of accumulator blocks covering P.
    pub fn block_len_p(&self) -> usize {
        (self.alpha() + self.gamma() - 1) / self.gamma()
    }

    /// Total accumulator blocks (Q blocks first, then P blocks).
    pub fn block_len(&self) -> usize {
        self.block_len_q() + self.block_len_p()
    }

    /// Q-prime indices of gadget group i, clipped to level_q.
    pub fn group_range(&self, i: usize, level_q: usize) -> Range<usize> {
        let alpha: usize = self.alpha();
        (i * alpha)..((i + 1) * alpha).min(level_q + 1)
    }

    /// Q-prime indices of accumulator block b, clipped to level_q.
    pub fn q_block_range(&self, b: usize, level_q: usize) -> Range<usize> {
        let gamma: usize = self.gamma();
        (b * gamma)..((b + 1) * gamma).min(level_q + 1)
    }

    /// P-prime indices of accumulator block b.
    pub fn p_block_range(&self, b: usize) -> Range<usize> {
        let gamma: usize = self.gamma();
        (b * gamma)..((b + 1) * gamma).min(self.alpha())
    }

    /// Number of lazy accumulations fitting a 64-bit word at the given
    /// R level: floor(2^64 / max r_i).
    pub fn ri_overflow_margin(&self, level_r: usize) -> usize {
        let max_r: u64 = *self.literal.r[..level_r + 1].iter().max().unwrap();
        ((u64::MAX / max_r) as usize).max(1)
    }

    pub fn galois_element_for_rotation(&self, k: isize) -> usize {
        self.ring_q.0[0].galois_element_for_rotation(k)
    }

    pub fn galois_element_for_row_rotation(&self) -> usize {
        self.ring_q.0[0].galois_element_for_row_rotation()
    }

    pub fn galois_element_inv(&self, gal_el: usize) -> usize {
        self.ring_q.0[0].galois_element_inv(gal_el)
    }
}

impl WriterTo for ParametersLiteral {
    fn write_to<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u8(self.log_n as u8)?;
        writer.write_u8(match self.ring_type {
            RingType::Standard => 0,
            RingType::ConjugateInvariant => 1,
        })?;
        writer.write_u64::<LittleEndian>(self.gamma as u64)?;
        writer.write_u64::<LittleEndian>(self.h as u64)?;
        writer.write_f64::<LittleEndian>(self.sigma)?;
        for basis in [&self.q, &self.p, &self.r] {
            writer.write_u64::<LittleEndian>(basis.len() as u64)?;
            for &prime in basis.iter() {
                writer.write_u64::<LittleEndian>(prime)?;
            }
        }
        Ok(())
    }
}

impl ReaderFrom for ParametersLiteral {
    fn read_from<R: std::io::Read>(&mut self, reader: &mut R) -> std::io::Result<()> {
        self.log_n = reader.read_u8()? as usize;
        self.ring_type = match reader.read_u8()? {
            0 => RingType::Standard,
            1 => RingType::ConjugateInvariant,
            t => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("invalid ring type tag {}", t),
                ))
            }
        };
        self.gamma = reader.read_u64::<LittleEndian>()? as usize;
        self.h = reader.read_u64::<LittleEndian>()? as usize;
        self.sigma = reader.read_f64::<LittleEndian>()?;
        for basis in [&mut self.q, &mut self.p, &mut self.r] {
            let len: usize = reader.read_u64::<LittleEndian>()? as usize;
            basis.clear();
            for _ in 0..len {
                basis.push(reader.read_u64::<LittleEndian>()?);
            }
        }
        Ok(())
    }
}

/// Test parameters: N = 2^15, 23 x 36-bit Q primes, one 36-bit special
/// prime, three 60-bit auxiliary primes, blocks of 3.
pub fn test_parameters_pn15() -> ParametersLiteral {
    ParametersLiteral {
        log_n: 15,
        q: vec![
            0xffff00001,
            0xfff9c0001,
            0xfff8e0001,
            0xfff840001,
            0xfff700001,
            0xfff640001,
            0xfff4c0001,
            0xfff3c0001,
            0xfff280001,
            0xfff100001,
            0xffefe0001,
            0xffee80001,
            0x10004a0001,
            0x1000500001,
            0x1000960001,
            0x1000a20001,
            0x1000b40001,
            0x1000f60001,
            0x10011a0001,
            0x1001220001,
            0x10014c0001,
            0x1001680001,
            0x10017c0001,
        ],
        p: vec![0x1002700001],
        r: vec![0xffffffffffc0001, 0xfffffffff840001, 0xfffffffff6a0001],
        gamma: 3,
        sigma: 3.2,
        h: 192,
        ring_type: RingType::Standard,
    }
}

/// Conjugate-invariant test parameters: N = 2^12, real slots.
pub fn test_parameters_pn12_ci() -> ParametersLiteral {
    ParametersLiteral {
        log_n: 12,
        q: vec![0xffff00001, 0xfff9c0001, 0xfff8e0001, 0xfff840001],
        p: vec![0x1002700001],
        r: vec![0xffffffffffc0001, 0xfffffffff840001, 0xfffffffff6a0001],
        gamma: 2,
        sigma: 3.2,
        h: 64,
        ring_type: RingType::ConjugateInvariant,
    }
}

/// Small parameters for fast unit tests: N = 2^6.
pub fn test_parameters_small() -> ParametersLiteral {
    ParametersLiteral {
        log_n: 6,
        q: vec![0xffff00001, 0xfff9c0001, 0xfff8e0001, 0xfff840001, 0xfff700001, 0xfff640001],
        p: vec![0x1002700001],
        r: vec![0xffffffffffc0001, 0xfffffffff840001, 0xfffffffff6a0001],
        gamma: 2,
        sigma: 3.2,
        h: 16,
        ring_type: RingType::Standard,
    }
}
