//! Field and field-register tables.
//!
//! The field table maps a symbolic fuse field id to bit ranges inside
//! registers described by the field-register table.

use tracing::debug;
use vfe_core::{TableId, VfeError, VfeResult};
use vfe_graph::{FuseField, FuseSegment, MAX_FUSE_SEGMENTS};

use crate::layout::field;
use crate::reader::ByteReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldEntry {
    field_id: u8,
    reg_entry_idx: u8,
    lo_bit: u8,
    hi_bit: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RegEntry {
    Register {
        addr: u32,
    },
    Indexed {
        addr: u32,
        index_addr: u32,
        index: u32,
    },
}

/// Common four-byte header; returns `(entry_count, first entry offset)`.
fn parse_header(r: &ByteReader<'_>, entry_size: u8) -> VfeResult<(usize, usize)> {
    let version = r.u8_at(field::HDR_VERSION)?;
    if version != field::VERSION_10 {
        return Err(VfeError::UnsupportedTableVersion {
            table: r.table(),
            version,
        });
    }
    let header_size = r.u8_at(field::HDR_HEADER_SIZE)?;
    if header_size != field::HEADER_SIZE {
        return Err(VfeError::InvalidEntrySize {
            table: r.table(),
            what: "header",
            size: header_size,
        });
    }
    let size = r.u8_at(field::HDR_ENTRY_SIZE)?;
    if size != entry_size {
        return Err(VfeError::InvalidEntrySize {
            table: r.table(),
            what: "entry",
            size,
        });
    }
    let count = usize::from(r.u8_at(field::HDR_ENTRY_COUNT)?);
    let start = usize::from(header_size);
    r.require(start + count * usize::from(entry_size))?;
    Ok((count, start))
}

/// Parsed field and field-register tables.
#[derive(Debug, Clone, Default)]
pub struct FieldTables {
    fields: Vec<FieldEntry>,
    regs: Vec<Option<RegEntry>>,
}

impl FieldTables {
    /// Parse both tables.
    pub fn parse(field_data: &[u8], reg_data: &[u8]) -> VfeResult<Self> {
        let r = ByteReader::new(TableId::Field, field_data);
        let (count, start) = parse_header(&r, field::ENTRY_SIZE)?;
        let mut fields = Vec::with_capacity(count);
        for i in 0..count {
            let off = start + i * usize::from(field::ENTRY_SIZE);
            match r.u8_at(off)? {
                field::TYPE_UNUSED => {}
                field::TYPE_SEGMENT => fields.push(FieldEntry {
                    field_id: r.u8_at(off + 1)?,
                    reg_entry_idx: r.u8_at(off + 2)?,
                    lo_bit: r.u8_at(off + 3)?,
                    hi_bit: r.u8_at(off + 4)?,
                }),
                other => {
                    return Err(VfeError::UnknownTypeDiscriminant {
                        table: TableId::Field,
                        what: "field entry",
                        entry: i,
                        discriminant: other,
                    });
                }
            }
        }

        let r = ByteReader::new(TableId::FieldRegister, reg_data);
        let (count, start) = parse_header(&r, field::REG_ENTRY_SIZE)?;
        let mut regs = Vec::with_capacity(count);
        for i in 0..count {
            let off = start + i * usize::from(field::REG_ENTRY_SIZE);
            let entry = match r.u8_at(off)? {
                field::REG_TYPE_UNUSED => None,
                field::REG_TYPE_REGISTER => Some(RegEntry::Register {
                    addr: r.u32_at(off + 1)?,
                }),
                field::REG_TYPE_INDEXED => Some(RegEntry::Indexed {
                    addr: r.u32_at(off + 1)?,
                    index_addr: r.u32_at(off + 5)?,
                    index: r.u32_at(off + 9)?,
                }),
                other => {
                    return Err(VfeError::UnknownTypeDiscriminant {
                        table: TableId::FieldRegister,
                        what: "field register entry",
                        entry: i,
                        discriminant: other,
                    });
                }
            };
            regs.push(entry);
        }

        debug!(
            fields = fields.len(),
            registers = regs.len(),
            "parsed VFE field tables"
        );
        Ok(Self { fields, regs })
    }

    /// Resolve `field_id` into its register segments for variable `entry`.
    pub fn resolve(&self, entry: usize, field_id: u8) -> VfeResult<FuseField> {
        let mut segments = Vec::with_capacity(MAX_FUSE_SEGMENTS);
        for f in self.fields.iter().filter(|f| f.field_id == field_id) {
            if segments.len() == MAX_FUSE_SEGMENTS {
                return Err(VfeError::FuseSegmentOverflow {
                    entry,
                    field_id,
                    max: MAX_FUSE_SEGMENTS,
                });
            }
            if f.lo_bit > f.hi_bit || f.hi_bit > 31 {
                return Err(VfeError::InvalidOperandIndex {
                    what: "fuse bit range",
                    entry,
                    index: usize::from(f.hi_bit),
                    len: 32,
                });
            }
            let reg = self
                .regs
                .get(usize::from(f.reg_entry_idx))
                .copied()
                .flatten()
                .ok_or(VfeError::InvalidOperandIndex {
                    what: "field register index",
                    entry,
                    index: usize::from(f.reg_entry_idx),
                    len: self.regs.len(),
                })?;
            segments.push(match reg {
                RegEntry::Register { addr } => FuseSegment::Register {
                    addr,
                    lo_bit: f.lo_bit,
                    hi_bit: f.hi_bit,
                },
                RegEntry::Indexed {
                    addr,
                    index_addr,
                    index,
                } => FuseSegment::IndexedRegister {
                    addr,
                    index_addr,
                    index,
                    lo_bit: f.lo_bit,
                    hi_bit: f.hi_bit,
                },
            });
        }

        if segments.is_empty() {
            return Err(VfeError::MissingFuseFieldIdentity { entry, field_id });
        }
        Ok(FuseField {
            id: field_id,
            segments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{FieldTableEncoder, RegEntryDesc};

    fn tables(segments: &[(u8, u8, u8, u8)]) -> FieldTables {
        let mut enc = FieldTableEncoder::new();
        enc.register(RegEntryDesc::Register { addr: 0x0002_1100 });
        enc.register(RegEntryDesc::Indexed {
            addr: 0x0002_1200,
            index_addr: 0x0002_1204,
            index: 3,
        });
        for &(id, reg, lo, hi) in segments {
            enc.segment(id, reg, lo, hi);
        }
        let (fields, regs) = enc.finish();
        FieldTables::parse(&fields, &regs).unwrap()
    }

    #[test]
    fn resolves_indexed_register() {
        let t = tables(&[(0x1E, 1, 4, 11)]);
        let f = t.resolve(0, 0x1E).unwrap();
        assert_eq!(
            f.segments,
            vec![FuseSegment::IndexedRegister {
                addr: 0x0002_1200,
                index_addr: 0x0002_1204,
                index: 3,
                lo_bit: 4,
                hi_bit: 11
            }]
        );
    }

    #[test]
    fn second_segment_overflows() {
        let t = tables(&[(0x10, 0, 0, 7), (0x10, 0, 8, 15)]);
        assert_eq!(
            t.resolve(5, 0x10).unwrap_err(),
            VfeError::FuseSegmentOverflow {
                entry: 5,
                field_id: 0x10,
                max: 1
            }
        );
    }

    #[test]
    fn unknown_field_id() {
        let t = tables(&[(0x10, 0, 0, 7)]);
        assert_eq!(
            t.resolve(2, 0x11).unwrap_err(),
            VfeError::MissingFuseFieldIdentity {
                entry: 2,
                field_id: 0x11
            }
        );
    }

    #[test]
    fn bad_register_reference() {
        let t = tables(&[(0x10, 9, 0, 7)]);
        assert!(matches!(
            t.resolve(0, 0x10),
            Err(VfeError::InvalidOperandIndex {
                what: "field register index",
                index: 9,
                ..
            })
        ));
    }

    #[test]
    fn inverted_bit_range() {
        let t = tables(&[(0x10, 0, 9, 3)]);
        assert!(matches!(
            t.resolve(0, 0x10),
            Err(VfeError::InvalidOperandIndex {
                what: "fuse bit range",
                ..
            })
        ));
    }
}
