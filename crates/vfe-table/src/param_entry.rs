//! Parameter array decoding (4.x tables).

use vfe_core::{EquIdx, TableId, VarIdx, VfeError, VfeResult};
use vfe_graph::ParameterSlot;

use crate::header::VfeHeader;
use crate::layout::param;
use crate::reader::ByteReader;

/// Decode every parameter entry, checking references against the header counts.
pub(crate) fn decode_all(r: &ByteReader<'_>, hdr: &VfeHeader) -> VfeResult<Vec<ParameterSlot>> {
    (0..hdr.param_entry_count)
        .map(|i| {
            let off = hdr.param_offset(i);
            decode(i, r.u8_at(off)?, r.u32_at(off + 1)?, hdr)
        })
        .collect()
}

fn decode(entry: usize, type_code: u8, value: u32, hdr: &VfeHeader) -> VfeResult<ParameterSlot> {
    let index = value as usize;
    match type_code {
        param::TYPE_LITERAL => Ok(ParameterSlot::Literal(value)),
        param::TYPE_VAR_REF => {
            if index >= hdr.var_entry_count {
                return Err(out_of_range("parameter variable", entry, index, hdr.var_entry_count));
            }
            Ok(ParameterSlot::Variable(VarIdx::from(index as u8)))
        }
        param::TYPE_EQU_REF => EquIdx::new(index)
            .filter(|_| index < hdr.equ_entry_count)
            .map(ParameterSlot::Equation)
            .ok_or_else(|| out_of_range("parameter equation", entry, index, hdr.equ_entry_count)),
        other => Err(VfeError::UnknownTypeDiscriminant {
            table: TableId::Vfe,
            what: "parameter",
            entry,
            discriminant: other,
        }),
    }
}

fn out_of_range(what: &'static str, entry: usize, index: usize, len: usize) -> VfeError {
    VfeError::InvalidOperandIndex {
        what,
        entry,
        index,
        len,
    }
}
