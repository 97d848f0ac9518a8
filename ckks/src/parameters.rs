use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use rlwe::parameters::{
    test_parameters_pn12_ci, test_parameters_pn15, test_parameters_small, ParametersLiteral,
};
use rns::ring::RingType;
use rns::serialization::{ReaderFrom, WriterTo};

/// CKKS parameters: the key-switching parameter set plus the slot count and
/// the default encoding scale.
#[derive(Clone)]
pub struct Parameters {
    rlwe: rlwe::parameters::Parameters,
    log_slots: usize,
    default_scale: f64,
}

impl Parameters {
    pub fn from_literal(literal: ParametersLiteral, log_slots: usize, default_scale: f64) -> Self {
        let rlwe_params = rlwe::parameters::Parameters::from_literal(literal);
        let max_log_slots: usize = match rlwe_params.ring_type() {
            RingType::Standard => rlwe_params.log_n() - 1,
            RingType::ConjugateInvariant => rlwe_params.log_n(),
        };
        assert!(
            log_slots >= 1 && log_slots <= max_log_slots,
            "invalid log_slots = {}: not in [1, {}]",
            log_slots,
            max_log_slots
        );
        assert!(
            default_scale >= 1.0 && default_scale.is_finite(),
            "invalid default_scale = {}",
            default_scale
        );
        Self {
            rlwe: rlwe_params,
            log_slots: log_slots,
            default_scale: default_scale,
        }
    }

    pub fn rlwe(&self) -> &rlwe::parameters::Parameters {
        &self.rlwe
    }

    pub fn n(&self) -> usize {
        self.rlwe.n()
    }

    pub fn log_slots(&self) -> usize {
        self.log_slots
    }

    pub fn slots(&self) -> usize {
        1 << self.log_slots
    }

    pub fn default_scale(&self) -> f64 {
        self.default_scale
    }

    pub fn max_level(&self) -> usize {
        self.rlwe.max_level()
    }

    pub fn ring_type(&self) -> RingType {
        self.rlwe.ring_type()
    }
}

impl WriterTo for Parameters {
    fn write_to<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.rlwe.literal().write_to(writer)?;
        writer.write_u8(self.log_slots as u8)?;
        writer.write_u64::<BigEndian>(self.default_scale.to_bits())
    }
}

/// Reads parameters serialized by write_to; the receiver contents are
/// replaced wholesale.
pub fn read_parameters<R: std::io::Read>(reader: &mut R) -> std::io::Result<Parameters> {
    let mut literal: ParametersLiteral = ParametersLiteral {
        log_n: 0,
        q: vec![],
        p: vec![],
        r: vec![],
        gamma: 0,
        sigma: 0.0,
        h: 0,
        ring_type: RingType::Standard,
    };
    literal.read_from(reader)?;
    let log_slots: usize = reader.read_u8()? as usize;
    let default_scale: f64 = f64::from_bits(reader.read_u64::<BigEndian>()?);
    Ok(Parameters::from_literal(literal, log_slots, default_scale))
}

/// N = 2^15 with 23 levels at scale 2^36, 2^14 complex slots.
pub fn test_parameters_pn15_ckks() -> Parameters {
    Parameters::from_literal(test_parameters_pn15(), 14, (1u64 << 36) as f64)
}

/// N = 2^12 conjugate-invariant, 2^10 real slots at scale 2^36.
pub fn test_parameters_pn12_ci_ckks() -> Parameters {
    Parameters::from_literal(test_parameters_pn12_ci(), 10, (1u64 << 36) as f64)
}

/// N = 2^6 quick set, 2^5 complex slots.
pub fn test_parameters_small_ckks() -> Parameters {
    Parameters::from_literal(test_parameters_small(), 5, (1u64 << 36) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_roundtrip() {
        let params: Parameters = test_parameters_small_ckks();
        let mut bytes: Vec<u8> = Vec::new();
        params.write_to(&mut bytes).unwrap();
        let decoded: Parameters = read_parameters(&mut bytes.as_slice()).unwrap();
        assert_eq!(params.rlwe().literal(), decoded.rlwe().literal());
        assert_eq!(params.log_slots(), decoded.log_slots());
        assert_eq!(params.default_scale(), decoded.default_scale());
    }
}
