//! Equation entry decoding.

use tracing::debug;
use vfe_core::{EquIdx, OutputRange, OutputUnit, TableId, VarIdx, VfeError, VfeResult};
use vfe_graph::{
    Compare, CompareFunction, Equation, EquationKind, MinMax, ParameterSlot, QuadraticN,
};

use crate::header::{TableVersion, VfeHeader};
use crate::layout::equ;
use crate::reader::ByteReader;

/// Decode equation entry `index`. Disabled entries yield `None`.
pub(crate) fn decode(
    r: &ByteReader<'_>,
    hdr: &VfeHeader,
    index: usize,
    params: &[ParameterSlot],
) -> VfeResult<Option<Equation>> {
    let off = hdr.equ_offset(index);
    let type_code = r.u8_at(off)?;
    if type_code == equ::TYPE_DISABLED {
        return Ok(None);
    }

    let var_idx = r.u8_at(off + 1)?;
    let (next, body) = match hdr.version {
        TableVersion::Vfe30 => {
            let n = r.u8_at(off + 2)?;
            ((n != equ::NO_EQU_30).then_some(usize::from(n)), off + 3)
        }
        TableVersion::Vfe40 => {
            let n = r.u16_at(off + 2)?;
            ((n != equ::NO_EQU_40).then_some(usize::from(n)), off + 4)
        }
    };
    let range = OutputRange::from_bits(r.u32_at(body)?, r.u32_at(body + 4)?);
    let par = [
        r.u32_at(body + 8)?,
        r.u32_at(body + 12)?,
        r.u32_at(body + 16)?,
    ];
    let unit_code = match (hdr.version, hdr.equ_entry_size) {
        (TableVersion::Vfe30, equ::ENTRY_SIZE_17) => 0,
        _ => r.u8_at(body + 20)?,
    };
    let output_unit =
        OutputUnit::try_from(unit_code).map_err(|d| unknown(index, "equation output type", d))?;

    let refs = EquRefs {
        entry: index,
        count: hdr.equ_entry_count,
    };
    let kind = match type_code {
        equ::TYPE_QUADRATIC => EquationKind::Quadratic { coeffs: par },
        equ::TYPE_MINMAX => EquationKind::MinMax(MinMax {
            take_max: equ::PAR0_MINMAX_TAKE_MAX.get_flag(par[0]),
            a: refs.get("min/max operand", equ::PAR1_MINMAX_EQU_IDX_0.get(par[1]))?,
            b: refs.get("min/max operand", equ::PAR1_MINMAX_EQU_IDX_1.get(par[1]))?,
        }),
        equ::TYPE_COMPARE => {
            let code = equ::PAR0_COMPARE_FUNCTION.get(par[0]) as u8;
            EquationKind::Compare(Compare {
                function: CompareFunction::try_from(code)
                    .map_err(|d| unknown(index, "compare function", d))?,
                criteria: par[2],
                if_true: refs.get(
                    "compare true branch",
                    equ::PAR1_COMPARE_EQU_IDX_TRUE.get(par[1]),
                )?,
                if_false: refs.get(
                    "compare false branch",
                    equ::PAR1_COMPARE_EQU_IDX_FALSE.get(par[1]),
                )?,
            })
        }
        equ::TYPE_SCALAR => EquationKind::Scalar {
            scaled: refs.get("scaled equation", equ::PAR0_SCALAR_EQU_IDX.get(par[0]))?,
        },
        equ::TYPE_QUADRATIC_N if hdr.version == TableVersion::Vfe40 => {
            EquationKind::QuadraticN(quadratic_n(index, par, params)?)
        }
        other => return Err(unknown(index, "equation", other)),
    };

    let equ = Equation {
        index: refs.get("equation", index as u32)?,
        operand_var: (var_idx != equ::NO_VAR).then(|| VarIdx::from(var_idx)),
        next: next.map(|n| refs.get("next equation", n as u32)).transpose()?,
        output_range: range,
        output_unit,
        kind,
    };
    debug!(entry = index, equ_type = ?equ.equ_type(), "decoded VFE equation");
    Ok(Some(equ))
}

/// Bounds check for equation indices embedded in an entry.
struct EquRefs {
    entry: usize,
    count: usize,
}

impl EquRefs {
    fn get(&self, what: &'static str, raw: u32) -> VfeResult<EquIdx> {
        let index = raw as usize;
        EquIdx::new(index)
            .filter(|_| index < self.count)
            .ok_or(VfeError::InvalidOperandIndex {
                what,
                entry: self.entry,
                index,
                len: self.count,
            })
    }
}

fn quadratic_n(entry: usize, par: [u32; 3], params: &[ParameterSlot]) -> VfeResult<QuadraticN> {
    let inputs = equ::PAR0_QUADRATIC_N_INPUTS.get(par[0]) as usize;
    if inputs == 0 {
        return Err(VfeError::InvalidOperandIndex {
            what: "quadratic input count",
            entry,
            index: inputs,
            len: QuadraticN::MAX_INPUTS + 1,
        });
    }
    let first = equ::PAR1_QUADRATIC_N_FIRST_PARAM.get(par[1]) as usize;
    let split = first + inputs;
    let end = split + QuadraticN::coeff_count(inputs);
    if end > params.len() {
        return Err(VfeError::InvalidOperandIndex {
            what: "equation parameter",
            entry,
            index: end - 1,
            len: params.len(),
        });
    }
    Ok(QuadraticN {
        inputs: params[first..split].to_vec(),
        coeffs: params[split..end].to_vec(),
    })
}

fn unknown(entry: usize, what: &'static str, discriminant: u8) -> VfeError {
    VfeError::UnknownTypeDiscriminant {
        table: TableId::Vfe,
        what,
        entry,
        discriminant,
    }
}
