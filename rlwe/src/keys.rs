use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use rns::poly::PolyRNS;
use rns::serialization::{ReaderFrom, WriterTo};
use utils::map::Map;

use crate::elem::PolyQP;
use crate::parameters::Parameters;

/// Ternary secret key in the Q and P bases, NTT + Montgomery domain.
#[derive(Clone)]
pub struct SecretKey {
    pub value: PolyQP,
}

/// (-a*s + e, a) in the Q basis, NTT domain.
#[derive(Clone)]
pub struct PublicKey {
    pub value: [PolyRNS<u64>; 2],
}

impl PublicKey {
    pub fn new(params: &Parameters) -> Self {
        let n: usize = params.n();
        let level: usize = params.max_level();
        Self {
            value: [
                PolyRNS::<u64>::new(n, level),
                PolyRNS::<u64>::new(n, level),
            ],
        }
    }
}

/// One half of a gadget switching key in the accelerated format:
/// values[i][b] holds, in the auxiliary ring R (NTT + Montgomery), the lift
/// of block b of the i-th gadget digit of the underlying standard key.
#[derive(Clone)]
pub struct SwitchingKey {
    pub values: Vec<Vec<PolyRNS<u64>>>,
}

impl SwitchingKey {
    pub fn new(params: &Parameters) -> Self {
        let n: usize = params.n();
        let level_r: usize = params.r_count() - 1;
        let beta: usize = params.beta();
        let block_len: usize = params.block_len();

        Self {
            values: (0..beta)
                .map(|_| {
                    (0..block_len)
                        .map(|_| PolyRNS::<u64>::new(n, level_r))
                        .collect()
                })
                .collect(),
        }
    }

    pub fn beta(&self) -> usize {
        self.values.len()
    }

    pub fn block_len(&self) -> usize {
        self.values[0].len()
    }
}

/// The two switching-key halves encoding sk^2 under sk.
#[derive(Clone)]
pub struct RelinearizationKey {
    pub value: [SwitchingKey; 2],
}

impl RelinearizationKey {
    pub fn new(params: &Parameters) -> Self {
        Self {
            value: [SwitchingKey::new(params), SwitchingKey::new(params)],
        }
    }
}

/// Switching-key pair of the automorphism X -> X^gal_el, tagged with the
/// slot rotation it implements.
#[derive(Clone)]
pub struct RotationKey {
    pub rot_idx: isize,
    pub gal_el: usize,
    pub value: [SwitchingKey; 2],
}

/// Rotation keys indexed by galois element.
#[derive(Clone)]
pub struct RotationKeySet {
    keys: Map<usize, RotationKey>,
}

impl RotationKeySet {
    pub fn new() -> Self {
        Self {
            keys: Map::<usize, RotationKey>::new(),
        }
    }

    pub fn insert(&mut self, key: RotationKey) {
        self.keys.insert(key.gal_el, key);
    }

    pub fn get(&self, gal_el: usize) -> Option<&RotationKey> {
        self.keys.get(&gal_el)
    }
}

impl Default for RotationKeySet {
    fn default() -> Self {
        Self::new()
    }
}

impl WriterTo for SwitchingKey {
    fn write_to<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u64::<LittleEndian>(self.beta() as u64)?;
        writer.write_u64::<LittleEndian>(self.block_len() as u64)?;
        for digit in self.values.iter() {
            for poly in digit.iter() {
                poly.write_to(writer)?;
            }
        }
        Ok(())
    }
}

impl ReaderFrom for SwitchingKey {
    fn read_from<R: std::io::Read>(&mut self, reader: &mut R) -> std::io::Result<()> {
        let beta: usize = reader.read_u64::<LittleEndian>()? as usize;
        let block_len: usize = reader.read_u64::<LittleEndian>()? as usize;
        if beta != self.beta() || block_len != self.block_len() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "switching key shape mismatch: got [{}][{}], expected [{}][{}]",
                    beta,
                    block_len,
                    self.beta(),
                    self.block_len()
                ),
            ));
        }
        for digit in self.values.iter_mut() {
            for poly in digit.iter_mut() {
                poly.read_from(reader)?;
                poly.is_ntt = true;
            }
        }
        Ok(())
    }
}

impl WriterTo for RelinearizationKey {
    fn write_to<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.value[0].write_to(writer)?;
        self.value[1].write_to(writer)
    }
}

impl ReaderFrom for RelinearizationKey {
    fn read_from<R: std::io::Read>(&mut self, reader: &mut R) -> std::io::Result<()> {
        self.value[0].read_from(reader)?;
        self.value[1].read_from(reader)
    }
}
