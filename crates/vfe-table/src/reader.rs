//! Bounds-checked little-endian reads over a firmware table.

use vfe_core::{TableId, VfeError, VfeResult};

#[derive(Debug, Clone, Copy)]
pub(crate) struct ByteReader<'a> {
    table: TableId,
    data: &'a [u8],
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(table: TableId, data: &'a [u8]) -> Self {
        Self { table, data }
    }

    pub(crate) fn table(&self) -> TableId {
        self.table
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    /// Fail unless `needed` bytes are present.
    pub(crate) fn require(&self, needed: usize) -> VfeResult<()> {
        if self.data.len() < needed {
            return Err(VfeError::TableTruncated {
                table: self.table,
                needed,
                available: self.data.len(),
            });
        }
        Ok(())
    }

    fn bytes<const N: usize>(&self, off: usize) -> VfeResult<[u8; N]> {
        let end = off + N;
        self.require(end)?;
        let mut out = [0_u8; N];
        out.copy_from_slice(&self.data[off..end]);
        Ok(out)
    }

    pub(crate) fn u8_at(&self, off: usize) -> VfeResult<u8> {
        Ok(self.bytes::<1>(off)?[0])
    }

    pub(crate) fn u16_at(&self, off: usize) -> VfeResult<u16> {
        Ok(u16::from_le_bytes(self.bytes(off)?))
    }

    pub(crate) fn u32_at(&self, off: usize) -> VfeResult<u32> {
        Ok(u32::from_le_bytes(self.bytes(off)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let r = ByteReader::new(TableId::Vfe, &data);
        assert_eq!(r.u8_at(4).unwrap(), 0x05);
        assert_eq!(r.u16_at(0).unwrap(), 0x0201);
        assert_eq!(r.u32_at(1).unwrap(), 0x0504_0302);
    }

    #[test]
    fn short_read_is_truncation() {
        let data = [0_u8; 3];
        let r = ByteReader::new(TableId::Field, &data);
        assert_eq!(
            r.u32_at(0).unwrap_err(),
            VfeError::TableTruncated {
                table: TableId::Field,
                needed: 4,
                available: 3
            }
        );
    }
}
