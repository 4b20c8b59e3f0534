//! Table encoders.
//!
//! Produce byte-exact firmware tables from raw entry descriptions. Used to
//! build fixtures and sample images.

use vfe_core::OutputRange;

use crate::header::TableVersion;
use crate::layout::{BitField, equ, field, param, var, vfe};

/// Raw variable entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VarEntry {
    pub type_code: u8,
    pub out_range_min: u32,
    pub out_range_max: u32,
    pub params: [u32; 4],
}

impl VarEntry {
    pub fn new(type_code: u8, range: OutputRange) -> Self {
        let (min, max) = range.to_bits();
        Self {
            type_code,
            out_range_min: min,
            out_range_max: max,
            params: [0; 4],
        }
    }

    /// Write `value` into `field` of parameter word `n`.
    pub fn with(mut self, n: usize, field: BitField, value: u32) -> Self {
        self.params[n] = field.put(self.params[n], value);
        self
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn frequency(clk_domain_idx: u8) -> Self {
        Self::new(var::TYPE_SINGLE_FREQUENCY, OutputRange::default()).with(
            0,
            var::PAR0_FREQ_CLK_DOMAIN_IDX,
            u32::from(clk_domain_idx),
        )
    }

    pub fn voltage() -> Self {
        Self::new(var::TYPE_SINGLE_VOLTAGE, OutputRange::default())
    }

    pub fn caller_specified(uid: u8) -> Self {
        Self::new(var::TYPE_SINGLE_CALLER_SPECIFIED, OutputRange::default()).with(
            0,
            var::PAR0_CALLER_UID,
            u32::from(uid),
        )
    }

    pub fn temperature(channel: u8, hyst_pos: i32, hyst_neg: i32, default: i32) -> Self {
        let mut e = Self::new(var::TYPE_SINGLE_SENSED_TEMP, OutputRange::default()).with(
            0,
            var::PAR0_TEMP_THERM_CHANNEL_IDX,
            u32::from(channel),
        );
        e.params[1] = hyst_pos as u32;
        e.params[2] = hyst_neg as u32;
        e.params[3] = default as u32;
        e
    }

    pub fn product(lhs: u8, rhs: u8) -> Self {
        Self::derived(var::TYPE_DERIVED_PRODUCT, lhs, rhs)
    }

    pub fn sum(lhs: u8, rhs: u8) -> Self {
        Self::derived(var::TYPE_DERIVED_SUM, lhs, rhs)
    }

    fn derived(type_code: u8, lhs: u8, rhs: u8) -> Self {
        Self::new(type_code, OutputRange::default())
            .with(0, var::PAR0_DERIVED_VAR_IDX_0, u32::from(lhs))
            .with(0, var::PAR0_DERIVED_VAR_IDX_1, u32::from(rhs))
    }

    /// Sensed fuse; `type_code` selects the register-described or fuse-20 form.
    pub fn fuse(type_code: u8, desc: FuseDesc) -> Self {
        let mut e = Self::new(type_code, OutputRange::default())
            .with(0, var::PAR0_FUSE_ID, u32::from(desc.id))
            .with(0, var::PAR0_FUSE_ID_VERSION, u32::from(desc.id_version))
            .with(0, var::PAR0_FUSE_EXPECTED_VERSION, u32::from(desc.expected_version))
            .with(0, var::PAR0_FUSE_CHECK_VERSION, u32::from(desc.check_version))
            .with(0, var::PAR0_FUSE_USE_DEFAULT_ON_FAIL, u32::from(desc.use_default_on_fail))
            .with(0, var::PAR0_FUSE_VALUE_SIGNED, u32::from(desc.value_signed))
            .with(0, var::PAR0_FUSE_EXPECTED_IS_MASK, u32::from(desc.expected_is_mask))
            .with(0, var::PAR0_FUSE_IGNORE_CHECK_FAIL, u32::from(desc.ignore_check_fail));
        e.params[1] = desc.default_value;
        e.params[2] = desc.hw_scale;
        e.params[3] = desc.hw_offset as u32;
        e
    }
}

/// Sensed-fuse fields for [`VarEntry::fuse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuseDesc {
    pub id: u8,
    pub id_version: u8,
    pub expected_version: u8,
    pub check_version: bool,
    pub use_default_on_fail: bool,
    pub value_signed: bool,
    pub expected_is_mask: bool,
    pub ignore_check_fail: bool,
    pub default_value: u32,
    pub hw_scale: u32,
    pub hw_offset: i32,
}

impl Default for FuseDesc {
    fn default() -> Self {
        Self {
            id: 0,
            id_version: 0,
            expected_version: 0,
            check_version: false,
            use_default_on_fail: false,
            value_signed: false,
            expected_is_mask: false,
            ignore_check_fail: false,
            default_value: 0,
            hw_scale: 1,
            hw_offset: 0,
        }
    }
}

/// Raw equation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EquEntry {
    pub type_code: u8,
    pub var_idx: Option<u8>,
    pub next: Option<u16>,
    pub out_range_min: u32,
    pub out_range_max: u32,
    pub params: [u32; 3],
    pub output_type: u8,
}

impl EquEntry {
    pub fn new(type_code: u8, var_idx: Option<u8>, next: Option<u16>) -> Self {
        Self {
            type_code,
            var_idx,
            next,
            ..Self::default()
        }
    }

    pub fn with(mut self, n: usize, field: BitField, value: u32) -> Self {
        self.params[n] = field.put(self.params[n], value);
        self
    }

    pub fn range(mut self, range: OutputRange) -> Self {
        (self.out_range_min, self.out_range_max) = range.to_bits();
        self
    }

    pub fn output_type(mut self, code: u8) -> Self {
        self.output_type = code;
        self
    }
}

/// Raw parameter entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamEntry {
    pub type_code: u8,
    pub value: u32,
}

impl ParamEntry {
    pub fn literal(value: u32) -> Self {
        Self {
            type_code: param::TYPE_LITERAL,
            value,
        }
    }

    pub fn var_ref(idx: u8) -> Self {
        Self {
            type_code: param::TYPE_VAR_REF,
            value: u32::from(idx),
        }
    }

    pub fn equ_ref(idx: u16) -> Self {
        Self {
            type_code: param::TYPE_EQU_REF,
            value: u32::from(idx),
        }
    }
}

/// Builds a VFE table image.
#[derive(Debug, Clone)]
pub struct VfeTableEncoder {
    version: TableVersion,
    var_entry_size: u8,
    equ_entry_size: u8,
    polling_period_ms: u8,
    vars: Vec<VarEntry>,
    equs: Vec<EquEntry>,
    params: Vec<ParamEntry>,
}

impl VfeTableEncoder {
    /// 3.0 layout with the given entry sizes (0x11/0x19 and 0x17/0x18).
    pub fn v30(var_entry_size: u8, equ_entry_size: u8) -> Self {
        Self {
            version: TableVersion::Vfe30,
            var_entry_size,
            equ_entry_size,
            polling_period_ms: 0,
            vars: Vec::new(),
            equs: Vec::new(),
            params: Vec::new(),
        }
    }

    /// 4.0 layout.
    pub fn v40() -> Self {
        Self {
            version: TableVersion::Vfe40,
            var_entry_size: var::ENTRY_SIZE_19,
            equ_entry_size: equ::ENTRY_SIZE_1A,
            ..Self::v30(0, 0)
        }
    }

    pub fn polling_period_ms(mut self, ms: u8) -> Self {
        self.polling_period_ms = ms;
        self
    }

    pub fn var(&mut self, entry: VarEntry) -> &mut Self {
        self.vars.push(entry);
        self
    }

    pub fn equ(&mut self, entry: EquEntry) -> &mut Self {
        self.equs.push(entry);
        self
    }

    pub fn param(&mut self, entry: ParamEntry) -> &mut Self {
        self.params.push(entry);
        self
    }

    pub fn finish(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let equ_count = self.equs.len();
        match self.version {
            TableVersion::Vfe30 => out.extend_from_slice(&[
                vfe::VERSION_30,
                vfe::HEADER_SIZE_30,
                self.var_entry_size,
                self.vars.len() as u8,
                self.equ_entry_size,
                equ_count as u8,
                self.polling_period_ms,
            ]),
            TableVersion::Vfe40 => out.extend_from_slice(&[
                vfe::VERSION_40,
                vfe::HEADER_SIZE_40,
                self.var_entry_size,
                self.vars.len() as u8,
                self.equ_entry_size,
                (equ_count & 0xFF) as u8,
                self.polling_period_ms,
                (equ_count >> 8) as u8,
                param::ENTRY_SIZE_05,
                (self.params.len() & 0xFF) as u8,
                (self.params.len() >> 8) as u8,
                0,
            ]),
        }

        let var_params = (usize::from(self.var_entry_size) - var::OFF_PARAM0) / 4;
        for v in &self.vars {
            out.push(v.type_code);
            out.extend_from_slice(&v.out_range_min.to_le_bytes());
            out.extend_from_slice(&v.out_range_max.to_le_bytes());
            for p in &v.params[..var_params] {
                out.extend_from_slice(&p.to_le_bytes());
            }
        }

        for e in &self.equs {
            out.push(e.type_code);
            out.push(e.var_idx.unwrap_or(equ::NO_VAR));
            match self.version {
                TableVersion::Vfe30 => out.push(e.next.map_or(equ::NO_EQU_30, |n| n as u8)),
                TableVersion::Vfe40 => {
                    out.extend_from_slice(&e.next.unwrap_or(equ::NO_EQU_40).to_le_bytes())
                }
            }
            out.extend_from_slice(&e.out_range_min.to_le_bytes());
            out.extend_from_slice(&e.out_range_max.to_le_bytes());
            for p in &e.params {
                out.extend_from_slice(&p.to_le_bytes());
            }
            match (self.version, self.equ_entry_size) {
                (TableVersion::Vfe30, equ::ENTRY_SIZE_18) => out.push(e.output_type),
                (TableVersion::Vfe30, _) => {}
                (TableVersion::Vfe40, _) => out.extend_from_slice(&[e.output_type, 0]),
            }
        }

        if self.version == TableVersion::Vfe40 {
            for p in &self.params {
                out.push(p.type_code);
                out.extend_from_slice(&p.value.to_le_bytes());
            }
        }
        out
    }
}

/// Register descriptor for [`FieldTableEncoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegEntryDesc {
    Unused,
    Register {
        addr: u32,
    },
    Indexed {
        addr: u32,
        index_addr: u32,
        index: u32,
    },
}

/// Builds the field and field-register tables.
#[derive(Debug, Clone, Default)]
pub struct FieldTableEncoder {
    fields: Vec<[u8; 5]>,
    regs: Vec<RegEntryDesc>,
}

impl FieldTableEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a register descriptor and return its index.
    pub fn register(&mut self, desc: RegEntryDesc) -> u8 {
        self.regs.push(desc);
        (self.regs.len() - 1) as u8
    }

    pub fn segment(&mut self, field_id: u8, reg_idx: u8, lo_bit: u8, hi_bit: u8) -> &mut Self {
        self.fields
            .push([field::TYPE_SEGMENT, field_id, reg_idx, lo_bit, hi_bit]);
        self
    }

    /// `(field table, field register table)`.
    pub fn finish(&self) -> (Vec<u8>, Vec<u8>) {
        let mut fields = vec![
            field::VERSION_10,
            field::HEADER_SIZE,
            field::ENTRY_SIZE,
            self.fields.len() as u8,
        ];
        for f in &self.fields {
            fields.extend_from_slice(f);
        }

        let mut regs = vec![
            field::VERSION_10,
            field::HEADER_SIZE,
            field::REG_ENTRY_SIZE,
            self.regs.len() as u8,
        ];
        for r in &self.regs {
            let (kind, addr, index_addr, index) = match *r {
                RegEntryDesc::Unused => (field::REG_TYPE_UNUSED, 0, 0, 0),
                RegEntryDesc::Register { addr } => (field::REG_TYPE_REGISTER, addr, 0, 0),
                RegEntryDesc::Indexed {
                    addr,
                    index_addr,
                    index,
                } => (field::REG_TYPE_INDEXED, addr, index_addr, index),
            };
            regs.push(kind);
            regs.extend_from_slice(&addr.to_le_bytes());
            regs.extend_from_slice(&index_addr.to_le_bytes());
            regs.extend_from_slice(&index.to_le_bytes());
        }
        (fields, regs)
    }
}
