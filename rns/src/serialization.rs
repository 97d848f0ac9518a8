use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::poly::{Poly, PolyRNS};

pub trait WriterTo {
    fn write_to<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()>;
}

pub trait ReaderFrom {
    fn read_from<R: std::io::Read>(&mut self, reader: &mut R) -> std::io::Result<()>;
}

impl WriterTo for Poly<u64> {
    fn write_to<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for &x in self.0.iter() {
            writer.write_u64::<LittleEndian>(x)?;
        }
        Ok(())
    }
}

impl ReaderFrom for Poly<u64> {
    fn read_from<R: std::io::Read>(&mut self, reader: &mut R) -> std::io::Result<()> {
        for x in self.0.iter_mut() {
            *x = reader.read_u64::<LittleEndian>()?;
        }
        Ok(())
    }
}

impl WriterTo for PolyRNS<u64> {
    fn write_to<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u64::<LittleEndian>(self.level() as u64)?;
        for poly in self.coeffs.iter() {
            poly.write_to(writer)?;
        }
        Ok(())
    }
}

impl ReaderFrom for PolyRNS<u64> {
    /// The receiver fixes the degree; the level is resized to the stream.
    fn read_from<R: std::io::Read>(&mut self, reader: &mut R) -> std::io::Result<()> {
        let level: usize = reader.read_u64::<LittleEndian>()? as usize;
        let n: usize = self.n();
        self.coeffs.resize(level + 1, Poly::<u64>::new(n));
        for poly in self.coeffs.iter_mut() {
            poly.read_from(reader)?;
        }
        self.is_ntt = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polyrns_roundtrip() {
        let mut a: PolyRNS<u64> = PolyRNS::<u64>::new(8, 2);
        for (i, poly) in a.coeffs.iter_mut().enumerate() {
            for (j, x) in poly.0.iter_mut().enumerate() {
                *x = (i * 100 + j) as u64;
            }
        }

        let mut bytes: Vec<u8> = Vec::new();
        a.write_to(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 8 + 3 * 8 * 8);

        let mut b: PolyRNS<u64> = PolyRNS::<u64>::new(8, 0);
        b.read_from(&mut bytes.as_slice()).unwrap();
        assert_eq!(a, b);
    }
}
