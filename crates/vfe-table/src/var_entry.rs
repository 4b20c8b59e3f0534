//! Variable entry decoding.

use tracing::{debug, warn};
use vfe_core::{
    FuseValue, HwCorrection, OutputRange, TableId, VarIdx, VersionCheckPolicy, VfeError,
    VfeResult,
};
use vfe_graph::{
    DerivedOperands, FuseSensing, Override, SensedFuse, SensedFuse20, SensedTemperature,
    SingleCallerSpecified, SingleFrequency, SingleVoltage, Variable, VariableKind,
};

use crate::field::FieldTables;
use crate::fuse_id;
use crate::header::VfeHeader;
use crate::layout::var;
use crate::reader::ByteReader;

/// One variable entry as laid out in the table.
///
/// `params` holds only the words the entry size carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawVarEntry {
    pub type_code: u8,
    pub out_range_min: u32,
    pub out_range_max: u32,
    pub params: Vec<u32>,
}

impl RawVarEntry {
    pub(crate) fn read(r: &ByteReader<'_>, hdr: &VfeHeader, index: usize) -> VfeResult<Self> {
        let off = hdr.var_offset(index);
        let count = (usize::from(hdr.var_entry_size) - var::OFF_PARAM0) / 4;
        let params = (0..count)
            .map(|n| r.u32_at(off + var::OFF_PARAM0 + n * 4))
            .collect::<VfeResult<Vec<_>>>()?;
        Ok(Self {
            type_code: r.u8_at(off + var::OFF_TYPE)?,
            out_range_min: r.u32_at(off + var::OFF_OUT_RANGE_MIN)?,
            out_range_max: r.u32_at(off + var::OFF_OUT_RANGE_MAX)?,
            params,
        })
    }

    fn param(&self, n: usize) -> Option<u32> {
        self.params.get(n).copied()
    }

    fn par0(&self) -> u32 {
        self.param(0).unwrap_or(0)
    }
}

/// Context the variable decoder needs beyond the entry itself.
pub(crate) struct VarDecodeCtx<'a> {
    pub fields: Option<&'a FieldTables>,
    pub strict_fuse_ids: bool,
}

/// Decode entry `index`. Disabled entries yield `None`.
pub(crate) fn decode(
    raw: &RawVarEntry,
    index: usize,
    ctx: &VarDecodeCtx<'_>,
) -> VfeResult<Option<Variable>> {
    let par0 = raw.par0();
    let kind = match raw.type_code {
        var::TYPE_DISABLED => return Ok(None),
        var::TYPE_SINGLE_FREQUENCY => VariableKind::SingleFrequency(SingleFrequency {
            clk_domain_idx: var::PAR0_FREQ_CLK_DOMAIN_IDX.get(par0) as u8,
            value_override: Override::None,
        }),
        var::TYPE_SINGLE_VOLTAGE => VariableKind::SingleVoltage(SingleVoltage::default()),
        var::TYPE_SINGLE_CALLER_SPECIFIED => {
            VariableKind::SingleCallerSpecified(SingleCallerSpecified {
                uid: var::PAR0_CALLER_UID.get(par0) as u8,
                value_override: Override::None,
            })
        }
        var::TYPE_SINGLE_SENSED_TEMP => VariableKind::SingleSensedTemperature(SensedTemperature {
            therm_channel_idx: var::PAR0_TEMP_THERM_CHANNEL_IDX.get(par0) as u8,
            hysteresis_pos: raw.param(1).unwrap_or(0) as i32,
            hysteresis_neg: raw.param(2).unwrap_or(0) as i32,
            default_value: raw.param(3).unwrap_or(0) as i32,
            value_override: Override::None,
        }),
        var::TYPE_DERIVED_PRODUCT => VariableKind::DerivedProduct(operands(par0)),
        var::TYPE_DERIVED_SUM => VariableKind::DerivedSum(operands(par0)),
        var::TYPE_SINGLE_SENSED_FUSE => {
            let fields = ctx.fields.ok_or(VfeError::TableMissing {
                table: TableId::Field,
            })?;
            VariableKind::SingleSensedFuse(SensedFuse {
                value_field: fields.resolve(index, var::PAR0_FUSE_ID.get(par0) as u8)?,
                version_field: fields.resolve(index, var::PAR0_FUSE_ID_VERSION.get(par0) as u8)?,
                sensing: sensing(raw),
                value_override: Override::None,
            })
        }
        var::TYPE_SINGLE_SENSED_FUSE_20 => {
            let local_id = var::PAR0_FUSE_ID.get(par0) as u8;
            let local_id_version = var::PAR0_FUSE_ID_VERSION.get(par0) as u8;
            VariableKind::SingleSensedFuse20(SensedFuse20 {
                local_id,
                local_id_version,
                fuse_id: map_fuse_id(index, local_id, ctx.strict_fuse_ids)?,
                fuse_id_version: map_fuse_id(index, local_id_version, ctx.strict_fuse_ids)?,
                sensing: sensing(raw),
                value_override: Override::None,
            })
        }
        other => {
            return Err(VfeError::UnknownTypeDiscriminant {
                table: TableId::Vfe,
                what: "variable",
                entry: index,
                discriminant: other,
            });
        }
    };

    // Entry indices are bounded by the u8 entry count.
    let idx = VarIdx::from(index as u8);
    let var = Variable::new(
        idx,
        OutputRange::from_bits(raw.out_range_min, raw.out_range_max),
        kind,
    );
    debug!(entry = index, var_type = ?var.var_type(), "decoded VFE variable");
    Ok(Some(var))
}

fn operands(par0: u32) -> DerivedOperands {
    DerivedOperands {
        lhs: VarIdx::from(var::PAR0_DERIVED_VAR_IDX_0.get(par0) as u8),
        rhs: VarIdx::from(var::PAR0_DERIVED_VAR_IDX_1.get(par0) as u8),
    }
}

fn sensing(raw: &RawVarEntry) -> FuseSensing {
    let par0 = raw.par0();
    let signed = var::PAR0_FUSE_VALUE_SIGNED.get_flag(par0);
    FuseSensing {
        policy: VersionCheckPolicy {
            expected: var::PAR0_FUSE_EXPECTED_VERSION.get(par0),
            expected_is_bitmask: var::PAR0_FUSE_EXPECTED_IS_MASK.get_flag(par0),
            check_enabled: var::PAR0_FUSE_CHECK_VERSION.get_flag(par0),
            ignore_check_failure: var::PAR0_FUSE_IGNORE_CHECK_FAIL.get_flag(par0),
            use_default_on_check_failure: var::PAR0_FUSE_USE_DEFAULT_ON_FAIL.get_flag(par0),
        },
        default_value: FuseValue::from_word(raw.param(1).unwrap_or(0), signed),
        hw_correction: HwCorrection {
            scale: raw.param(2).unwrap_or(HwCorrection::IDENTITY.scale),
            offset: raw
                .param(3)
                .map_or(HwCorrection::IDENTITY.offset, |w| w as i32),
        },
        value_is_signed: signed,
        cached: None,
    }
}

fn map_fuse_id(entry: usize, local: u8, strict: bool) -> VfeResult<Option<vfe_core::FuseId>> {
    match fuse_id::lookup(local) {
        Some(id) => Ok(Some(id)),
        None if strict => Err(VfeError::MissingFuseFieldIdentity {
            entry,
            field_id: local,
        }),
        None => {
            warn!(entry, local_id = local, "unknown fuse id, variable left unmapped");
            Ok(None)
        }
    }
}
