//! Firmware table layout: versions, entry sizes, type codes and bit fields.
//!
//! All multi-byte values are little-endian.

/// Inclusive bit range `[hi:lo]` inside a 32-bit parameter word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub hi: u8,
    pub lo: u8,
}

impl BitField {
    pub const fn new(hi: u8, lo: u8) -> Self {
        Self { hi, lo }
    }

    pub const fn bit(n: u8) -> Self {
        Self { hi: n, lo: n }
    }

    const fn mask(self) -> u32 {
        let width = (self.hi - self.lo + 1) as u32;
        if width >= 32 {
            u32::MAX
        } else {
            (1 << width) - 1
        }
    }

    pub const fn get(self, word: u32) -> u32 {
        (word >> self.lo) & self.mask()
    }

    pub const fn get_flag(self, word: u32) -> bool {
        self.get(word) != 0
    }

    /// Return `word` with this field replaced by `value` (truncated to width).
    pub const fn put(self, word: u32, value: u32) -> u32 {
        let mask = self.mask();
        (word & !(mask << self.lo)) | ((value & mask) << self.lo)
    }
}

pub mod vfe {
    pub const VERSION_30: u8 = 0x10;
    pub const VERSION_40: u8 = 0x40;

    pub const HEADER_SIZE_30: u8 = 0x07;
    pub const HEADER_SIZE_40: u8 = 0x0C;

    pub const HDR_VERSION: usize = 0;
    pub const HDR_HEADER_SIZE: usize = 1;
    pub const HDR_VAR_ENTRY_SIZE: usize = 2;
    pub const HDR_VAR_ENTRY_COUNT: usize = 3;
    pub const HDR_EQU_ENTRY_SIZE: usize = 4;
    pub const HDR_EQU_ENTRY_COUNT_LO: usize = 5;
    pub const HDR_POLLING_PERIOD_MS: usize = 6;
    pub const HDR_EQU_ENTRY_COUNT_HI: usize = 7;
    pub const HDR_PARAM_ENTRY_SIZE: usize = 8;
    pub const HDR_PARAM_ENTRY_COUNT_LO: usize = 9;
    pub const HDR_PARAM_ENTRY_COUNT_HI: usize = 10;
}

pub mod var {
    use super::BitField;

    pub const ENTRY_SIZE_11: u8 = 0x11;
    pub const ENTRY_SIZE_19: u8 = 0x19;

    pub const OFF_TYPE: usize = 0;
    pub const OFF_OUT_RANGE_MIN: usize = 1;
    pub const OFF_OUT_RANGE_MAX: usize = 5;
    pub const OFF_PARAM0: usize = 9;

    pub const TYPE_DISABLED: u8 = 0x00;
    pub const TYPE_SINGLE_FREQUENCY: u8 = 0x01;
    pub const TYPE_SINGLE_VOLTAGE: u8 = 0x02;
    pub const TYPE_SINGLE_SENSED_TEMP: u8 = 0x03;
    pub const TYPE_SINGLE_SENSED_FUSE: u8 = 0x04;
    pub const TYPE_DERIVED_PRODUCT: u8 = 0x05;
    pub const TYPE_DERIVED_SUM: u8 = 0x06;
    pub const TYPE_SINGLE_CALLER_SPECIFIED: u8 = 0x07;
    pub const TYPE_SINGLE_SENSED_FUSE_20: u8 = 0x08;

    pub const PAR0_FREQ_CLK_DOMAIN_IDX: BitField = BitField::new(7, 0);
    pub const PAR0_CALLER_UID: BitField = BitField::new(7, 0);
    pub const PAR0_TEMP_THERM_CHANNEL_IDX: BitField = BitField::new(7, 0);
    pub const PAR0_DERIVED_VAR_IDX_0: BitField = BitField::new(7, 0);
    pub const PAR0_DERIVED_VAR_IDX_1: BitField = BitField::new(15, 8);

    pub const PAR0_FUSE_ID: BitField = BitField::new(7, 0);
    pub const PAR0_FUSE_ID_VERSION: BitField = BitField::new(15, 8);
    pub const PAR0_FUSE_EXPECTED_VERSION: BitField = BitField::new(23, 16);
    pub const PAR0_FUSE_CHECK_VERSION: BitField = BitField::bit(24);
    pub const PAR0_FUSE_USE_DEFAULT_ON_FAIL: BitField = BitField::bit(25);
    pub const PAR0_FUSE_VALUE_SIGNED: BitField = BitField::bit(26);
    pub const PAR0_FUSE_EXPECTED_IS_MASK: BitField = BitField::bit(27);
    pub const PAR0_FUSE_IGNORE_CHECK_FAIL: BitField = BitField::bit(28);
}

pub mod equ {
    use super::BitField;

    pub const ENTRY_SIZE_17: u8 = 0x17;
    pub const ENTRY_SIZE_18: u8 = 0x18;
    pub const ENTRY_SIZE_1A: u8 = 0x1A;

    pub const NO_VAR: u8 = 0xFF;
    pub const NO_EQU_30: u8 = 0xFF;
    pub const NO_EQU_40: u16 = 0xFFFF;

    pub const TYPE_DISABLED: u8 = 0x00;
    pub const TYPE_QUADRATIC: u8 = 0x01;
    pub const TYPE_MINMAX: u8 = 0x02;
    pub const TYPE_COMPARE: u8 = 0x03;
    pub const TYPE_SCALAR: u8 = 0x04;
    pub const TYPE_QUADRATIC_N: u8 = 0x05;

    pub const PAR0_MINMAX_TAKE_MAX: BitField = BitField::bit(0);
    pub const PAR1_MINMAX_EQU_IDX_0: BitField = BitField::new(15, 0);
    pub const PAR1_MINMAX_EQU_IDX_1: BitField = BitField::new(31, 16);

    pub const PAR0_COMPARE_FUNCTION: BitField = BitField::new(7, 0);
    pub const PAR1_COMPARE_EQU_IDX_TRUE: BitField = BitField::new(15, 0);
    pub const PAR1_COMPARE_EQU_IDX_FALSE: BitField = BitField::new(31, 16);

    pub const PAR0_SCALAR_EQU_IDX: BitField = BitField::new(15, 0);

    pub const PAR0_QUADRATIC_N_INPUTS: BitField = BitField::new(1, 0);
    pub const PAR1_QUADRATIC_N_FIRST_PARAM: BitField = BitField::new(15, 0);
}

pub mod param {
    pub const ENTRY_SIZE_05: u8 = 0x05;

    pub const TYPE_LITERAL: u8 = 0x00;
    pub const TYPE_VAR_REF: u8 = 0x01;
    pub const TYPE_EQU_REF: u8 = 0x02;
}

pub mod field {
    pub const VERSION_10: u8 = 0x10;
    pub const HEADER_SIZE: u8 = 0x04;

    pub const HDR_VERSION: usize = 0;
    pub const HDR_HEADER_SIZE: usize = 1;
    pub const HDR_ENTRY_SIZE: usize = 2;
    pub const HDR_ENTRY_COUNT: usize = 3;

    pub const ENTRY_SIZE: u8 = 0x05;
    pub const TYPE_UNUSED: u8 = 0x00;
    pub const TYPE_SEGMENT: u8 = 0x01;

    pub const REG_ENTRY_SIZE: u8 = 0x0D;
    pub const REG_TYPE_UNUSED: u8 = 0x00;
    pub const REG_TYPE_REGISTER: u8 = 0x01;
    pub const REG_TYPE_INDEXED: u8 = 0x02;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitfield_get_put() {
        let f = BitField::new(15, 8);
        assert_eq!(f.get(0x00AB_CD12), 0xCD);
        assert_eq!(f.put(0x00AB_CD12, 0x34), 0x00AB_3412);
        assert_eq!(BitField::new(31, 0).get(0xDEAD_BEEF), 0xDEAD_BEEF);
        assert!(BitField::bit(24).get_flag(1 << 24));
        // Values wider than the field are truncated.
        assert_eq!(BitField::new(1, 0).put(0, 7), 3);
    }
}
