//! VFE variables.
//!
//! A variable is either *derived* (product or sum of two other variables) or
//! *single*: a leaf whose value comes from the caller, a clock/voltage input,
//! a temperature sensor or a manufacturing fuse.

use serde::Serialize;
use vfe_core::{
    EquMask, FuseFieldIdentity, FuseId, FuseSelection, FuseValue, HwCorrection, OutputRange,
    VarIdx, VarMask, VersionCheckPolicy,
};

/// Firmware type tag of a variable, also carried in coprocessor status records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VariableType {
    SingleFrequency,
    SingleVoltage,
    SingleSensedTemperature,
    SingleSensedFuse,
    DerivedProduct,
    DerivedSum,
    SingleCallerSpecified,
    SingleSensedFuse20,
}

impl VariableType {
    /// Firmware discriminant.
    pub fn code(self) -> u8 {
        match self {
            VariableType::SingleFrequency => 0x01,
            VariableType::SingleVoltage => 0x02,
            VariableType::SingleSensedTemperature => 0x03,
            VariableType::SingleSensedFuse => 0x04,
            VariableType::DerivedProduct => 0x05,
            VariableType::DerivedSum => 0x06,
            VariableType::SingleCallerSpecified => 0x07,
            VariableType::SingleSensedFuse20 => 0x08,
        }
    }

    pub fn is_derived(self) -> bool {
        matches!(self, VariableType::DerivedProduct | VariableType::DerivedSum)
    }
}

/// Caller-supplied replacement for a single variable's value.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum Override {
    #[default]
    None,
    Value(f32),
    Offset(f32),
    Scale(f32),
}

/// Operands of a derived variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DerivedOperands {
    pub lhs: VarIdx,
    pub rhs: VarIdx,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SingleFrequency {
    pub clk_domain_idx: u8,
    pub value_override: Override,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SingleVoltage {
    pub value_override: Override,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SingleCallerSpecified {
    pub uid: u8,
    pub value_override: Override,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SensedTemperature {
    pub therm_channel_idx: u8,
    pub hysteresis_pos: i32,
    pub hysteresis_neg: i32,
    pub default_value: i32,
    pub value_override: Override,
}

/// One physical location contributing bits to a fuse field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FuseSegment {
    Register {
        addr: u32,
        lo_bit: u8,
        hi_bit: u8,
    },
    IndexedRegister {
        addr: u32,
        index_addr: u32,
        index: u32,
        lo_bit: u8,
        hi_bit: u8,
    },
}

/// Most register segments a fuse field may span.
pub const MAX_FUSE_SEGMENTS: usize = 1;

/// A fuse field resolved against the field tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FuseField {
    pub id: u8,
    pub segments: Vec<FuseSegment>,
}

/// Version policy, default and correction shared by both sensed-fuse variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FuseSensing {
    pub policy: VersionCheckPolicy,
    pub default_value: FuseValue,
    pub hw_correction: HwCorrection,
    pub value_is_signed: bool,
    /// Last reading fetched from the coprocessor.
    pub cached: Option<FuseValue>,
}

impl FuseSensing {
    /// Usable value for a raw reading and live version.
    pub fn resolve(&self, raw: FuseValue, live_version: Option<u32>) -> FuseSelection {
        self.policy
            .select(raw, live_version, self.default_value, &self.hw_correction)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensedFuse {
    pub value_field: FuseField,
    pub version_field: FuseField,
    pub sensing: FuseSensing,
    pub value_override: Override,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensedFuse20 {
    /// Firmware-local ids as they appear in the table.
    pub local_id: u8,
    pub local_id_version: u8,
    /// Stable ids; `None` when the local id is not recognized.
    pub fuse_id: Option<FuseId>,
    pub fuse_id_version: Option<FuseId>,
    pub sensing: FuseSensing,
    pub value_override: Override,
}

/// Per-type payload of a variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VariableKind {
    DerivedProduct(DerivedOperands),
    DerivedSum(DerivedOperands),
    SingleFrequency(SingleFrequency),
    SingleVoltage(SingleVoltage),
    SingleCallerSpecified(SingleCallerSpecified),
    SingleSensedTemperature(SensedTemperature),
    SingleSensedFuse(SensedFuse),
    SingleSensedFuse20(SensedFuse20),
}

impl VariableKind {
    pub fn var_type(&self) -> VariableType {
        match self {
            VariableKind::DerivedProduct(_) => VariableType::DerivedProduct,
            VariableKind::DerivedSum(_) => VariableType::DerivedSum,
            VariableKind::SingleFrequency(_) => VariableType::SingleFrequency,
            VariableKind::SingleVoltage(_) => VariableType::SingleVoltage,
            VariableKind::SingleCallerSpecified(_) => VariableType::SingleCallerSpecified,
            VariableKind::SingleSensedTemperature(_) => VariableType::SingleSensedTemperature,
            VariableKind::SingleSensedFuse(_) => VariableType::SingleSensedFuse,
            VariableKind::SingleSensedFuse20(_) => VariableType::SingleSensedFuse20,
        }
    }

    /// Operands of a derived variable.
    pub fn operands(&self) -> Option<DerivedOperands> {
        match self {
            VariableKind::DerivedProduct(ops) | VariableKind::DerivedSum(ops) => Some(*ops),
            _ => None,
        }
    }

    /// Whether a leaf's value changes between evaluations. `None` for derived.
    pub fn leaf_is_dynamic(&self) -> Option<bool> {
        match self {
            VariableKind::DerivedProduct(_) | VariableKind::DerivedSum(_) => None,
            VariableKind::SingleSensedFuse(_) | VariableKind::SingleSensedFuse20(_) => Some(false),
            VariableKind::SingleFrequency(_)
            | VariableKind::SingleVoltage(_)
            | VariableKind::SingleCallerSpecified(_)
            | VariableKind::SingleSensedTemperature(_) => Some(true),
        }
    }

    /// Override slot of a single variable.
    pub fn value_override_mut(&mut self) -> Option<&mut Override> {
        match self {
            VariableKind::DerivedProduct(_) | VariableKind::DerivedSum(_) => None,
            VariableKind::SingleFrequency(v) => Some(&mut v.value_override),
            VariableKind::SingleVoltage(v) => Some(&mut v.value_override),
            VariableKind::SingleCallerSpecified(v) => Some(&mut v.value_override),
            VariableKind::SingleSensedTemperature(v) => Some(&mut v.value_override),
            VariableKind::SingleSensedFuse(v) => Some(&mut v.value_override),
            VariableKind::SingleSensedFuse20(v) => Some(&mut v.value_override),
        }
    }

    pub fn fuse_sensing(&self) -> Option<&FuseSensing> {
        match self {
            VariableKind::SingleSensedFuse(v) => Some(&v.sensing),
            VariableKind::SingleSensedFuse20(v) => Some(&v.sensing),
            _ => None,
        }
    }

    pub fn fuse_sensing_mut(&mut self) -> Option<&mut FuseSensing> {
        match self {
            VariableKind::SingleSensedFuse(v) => Some(&mut v.sensing),
            VariableKind::SingleSensedFuse20(v) => Some(&mut v.sensing),
            _ => None,
        }
    }

    /// Construction-time fuse identity of a sensed-fuse variable.
    pub fn fuse_identity(&self) -> Option<FuseFieldIdentity> {
        match self {
            VariableKind::SingleSensedFuse(v) => Some(FuseFieldIdentity::Field(v.value_field.id)),
            VariableKind::SingleSensedFuse20(v) => v.fuse_id.map(FuseFieldIdentity::Fuse),
            _ => None,
        }
    }
}

/// Dependency masks populated by the graph builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Dependencies {
    /// Variables this variable reads. Leaves include themselves; derived
    /// variables hold the union of their operands.
    pub depends_on: VarMask,
    /// Variables whose `depends_on` holds this one. Leaves include
    /// themselves; derived variables never appear in a `depends_on`, so
    /// theirs stays empty.
    pub depended_on_by: VarMask,
    /// Equations that read this variable directly.
    pub dependent_equations: EquMask,
    /// Recompute per evaluation (`true`) or cache (`false`); `None` until built.
    pub is_dynamic: Option<bool>,
}

/// A VFE variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub index: VarIdx,
    pub output_range: OutputRange,
    pub kind: VariableKind,
    pub deps: Dependencies,
}

impl Variable {
    pub fn new(index: VarIdx, output_range: OutputRange, kind: VariableKind) -> Self {
        Self {
            index,
            output_range,
            kind,
            deps: Dependencies::default(),
        }
    }

    pub fn var_type(&self) -> VariableType {
        self.kind.var_type()
    }

    pub fn depends_on(&self) -> &VarMask {
        &self.deps.depends_on
    }

    pub fn depended_on_by(&self) -> &VarMask {
        &self.deps.depended_on_by
    }

    pub fn dependent_equations(&self) -> &EquMask {
        &self.deps.dependent_equations
    }

    pub fn is_dynamic(&self) -> Option<bool> {
        self.deps.is_dynamic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensing() -> FuseSensing {
        FuseSensing {
            policy: VersionCheckPolicy::default(),
            default_value: FuseValue::Unsigned(0),
            hw_correction: HwCorrection::IDENTITY,
            value_is_signed: false,
            cached: None,
        }
    }

    #[test]
    fn type_codes_match_firmware() {
        assert_eq!(VariableType::SingleSensedTemperature.code(), 0x03);
        assert_eq!(VariableType::DerivedSum.code(), 0x06);
        assert!(VariableType::DerivedProduct.is_derived());
        assert!(!VariableType::SingleVoltage.is_derived());
    }

    #[test]
    fn derived_has_no_override_slot() {
        let mut kind = VariableKind::DerivedSum(DerivedOperands {
            lhs: VarIdx::from(0),
            rhs: VarIdx::from(1),
        });
        assert!(kind.value_override_mut().is_none());
        assert!(kind.leaf_is_dynamic().is_none());
    }

    #[test]
    fn fuse20_without_stable_id_has_no_identity() {
        let kind = VariableKind::SingleSensedFuse20(SensedFuse20 {
            local_id: 0x7F,
            local_id_version: 0x7E,
            fuse_id: None,
            fuse_id_version: None,
            sensing: sensing(),
            value_override: Override::None,
        });
        assert_eq!(kind.fuse_identity(), None);
        assert_eq!(kind.leaf_is_dynamic(), Some(false));
    }
}
