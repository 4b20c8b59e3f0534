//! VFE table header.

use vfe_core::{MAX_EQUATIONS, TableId, VfeError, VfeResult};

use crate::layout::{equ, param, var, vfe};
use crate::reader::ByteReader;

/// Table format revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableVersion {
    /// 8-bit equation indices, no parameter array.
    Vfe30,
    /// 16-bit equation indices, split equation count, parameter array.
    Vfe40,
}

impl TableVersion {
    pub fn code(self) -> u8 {
        match self {
            TableVersion::Vfe30 => vfe::VERSION_30,
            TableVersion::Vfe40 => vfe::VERSION_40,
        }
    }
}

impl TryFrom<u8> for TableVersion {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            vfe::VERSION_30 => Ok(Self::Vfe30),
            vfe::VERSION_40 => Ok(Self::Vfe40),
            other => Err(other),
        }
    }
}

/// Parsed VFE header plus derived entry offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VfeHeader {
    pub version: TableVersion,
    pub header_size: u8,
    pub var_entry_size: u8,
    pub var_entry_count: usize,
    pub equ_entry_size: u8,
    pub equ_entry_count: usize,
    pub param_entry_size: u8,
    pub param_entry_count: usize,
    pub polling_period_ms: u8,
}

impl VfeHeader {
    /// Parse the header and check that every declared entry fits in the table.
    pub(crate) fn parse(r: &ByteReader<'_>) -> VfeResult<Self> {
        let version_code = r.u8_at(vfe::HDR_VERSION)?;
        let version =
            TableVersion::try_from(version_code).map_err(|v| VfeError::UnsupportedTableVersion {
                table: TableId::Vfe,
                version: v,
            })?;

        let header_size = r.u8_at(vfe::HDR_HEADER_SIZE)?;
        let expected_header = match version {
            TableVersion::Vfe30 => vfe::HEADER_SIZE_30,
            TableVersion::Vfe40 => vfe::HEADER_SIZE_40,
        };
        if header_size != expected_header {
            return Err(invalid_size("header", header_size));
        }
        r.require(usize::from(header_size))?;

        let var_entry_size = r.u8_at(vfe::HDR_VAR_ENTRY_SIZE)?;
        let var_entry_count = usize::from(r.u8_at(vfe::HDR_VAR_ENTRY_COUNT)?);
        let equ_entry_size = r.u8_at(vfe::HDR_EQU_ENTRY_SIZE)?;
        let equ_lo = usize::from(r.u8_at(vfe::HDR_EQU_ENTRY_COUNT_LO)?);
        let polling_period_ms = r.u8_at(vfe::HDR_POLLING_PERIOD_MS)?;

        let (equ_entry_count, param_entry_size, param_entry_count) = match version {
            TableVersion::Vfe30 => (equ_lo, 0, 0),
            TableVersion::Vfe40 => {
                let equ_hi = usize::from(r.u8_at(vfe::HDR_EQU_ENTRY_COUNT_HI)?);
                let param_size = r.u8_at(vfe::HDR_PARAM_ENTRY_SIZE)?;
                let param_lo = usize::from(r.u8_at(vfe::HDR_PARAM_ENTRY_COUNT_LO)?);
                let param_hi = usize::from(r.u8_at(vfe::HDR_PARAM_ENTRY_COUNT_HI)?);
                (equ_lo | (equ_hi << 8), param_size, param_lo | (param_hi << 8))
            }
        };

        match version {
            TableVersion::Vfe30 => {
                if !matches!(var_entry_size, var::ENTRY_SIZE_11 | var::ENTRY_SIZE_19) {
                    return Err(invalid_size("variable entry", var_entry_size));
                }
                if !matches!(equ_entry_size, equ::ENTRY_SIZE_17 | equ::ENTRY_SIZE_18) {
                    return Err(invalid_size("equation entry", equ_entry_size));
                }
            }
            TableVersion::Vfe40 => {
                if var_entry_size != var::ENTRY_SIZE_19 {
                    return Err(invalid_size("variable entry", var_entry_size));
                }
                if equ_entry_size != equ::ENTRY_SIZE_1A {
                    return Err(invalid_size("equation entry", equ_entry_size));
                }
                if param_entry_size != param::ENTRY_SIZE_05 {
                    return Err(invalid_size("parameter entry", param_entry_size));
                }
            }
        }

        if equ_entry_count > MAX_EQUATIONS {
            return Err(VfeError::AllocationFailure {
                what: "equation",
                requested: equ_entry_count,
                capacity: MAX_EQUATIONS,
            });
        }

        let header = Self {
            version,
            header_size,
            var_entry_size,
            var_entry_count,
            equ_entry_size,
            equ_entry_count,
            param_entry_size,
            param_entry_count,
            polling_period_ms,
        };
        r.require(header.total_len())?;
        Ok(header)
    }

    pub fn var_offset(&self, index: usize) -> usize {
        usize::from(self.header_size) + index * usize::from(self.var_entry_size)
    }

    pub fn equ_offset(&self, index: usize) -> usize {
        self.var_offset(self.var_entry_count) + index * usize::from(self.equ_entry_size)
    }

    pub fn param_offset(&self, index: usize) -> usize {
        self.equ_offset(self.equ_entry_count) + index * usize::from(self.param_entry_size)
    }

    /// Bytes covered by the header and every entry.
    pub fn total_len(&self) -> usize {
        self.param_offset(self.param_entry_count)
    }
}

fn invalid_size(what: &'static str, size: u8) -> VfeError {
    VfeError::InvalidEntrySize {
        table: TableId::Vfe,
        what,
        size,
    }
}
