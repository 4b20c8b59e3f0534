//! Fuse values, affine hardware correction and version-check policy.

use core::fmt;

/// A fuse reading, tagged with the signedness of its 32-bit storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FuseValue {
    Signed(i32),
    Unsigned(u32),
}

impl FuseValue {
    /// Interpret a raw firmware word with the given signedness.
    pub fn from_word(word: u32, is_signed: bool) -> Self {
        if is_signed {
            FuseValue::Signed(word as i32)
        } else {
            FuseValue::Unsigned(word)
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(self, FuseValue::Signed(_))
    }

    /// Widened value, sign-correct.
    pub fn raw(&self) -> i64 {
        match *self {
            FuseValue::Signed(v) => i64::from(v),
            FuseValue::Unsigned(v) => i64::from(v),
        }
    }

    /// The 32-bit storage word.
    pub fn word(&self) -> u32 {
        match *self {
            FuseValue::Signed(v) => v as u32,
            FuseValue::Unsigned(v) => v,
        }
    }

    /// Apply `raw * scale + offset` in this value's signedness.
    ///
    /// Arithmetic wraps at 32 bits, matching the coprocessor.
    pub fn corrected(&self, correction: &HwCorrection) -> FuseValue {
        match *self {
            FuseValue::Signed(v) => FuseValue::Signed(
                v.wrapping_mul(correction.scale as i32)
                    .wrapping_add(correction.offset),
            ),
            FuseValue::Unsigned(v) => FuseValue::Unsigned(
                v.wrapping_mul(correction.scale)
                    .wrapping_add_signed(correction.offset),
            ),
        }
    }
}

impl fmt::Display for FuseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuseValue::Signed(v) => write!(f, "{v} (signed)"),
            FuseValue::Unsigned(v) => write!(f, "{v} (unsigned)"),
        }
    }
}

/// Affine correction for systematic fuse-programming bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HwCorrection {
    pub scale: u32,
    pub offset: i32,
}

impl HwCorrection {
    pub const IDENTITY: HwCorrection = HwCorrection {
        scale: 1,
        offset: 0,
    };
}

impl Default for HwCorrection {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Version-fuse check carried per sensed-fuse variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VersionCheckPolicy {
    /// Expected version, or a mask of accepted versions.
    pub expected: u32,
    pub expected_is_bitmask: bool,
    pub check_enabled: bool,
    pub ignore_check_failure: bool,
    pub use_default_on_check_failure: bool,
}

/// Which value a sensed fuse ends up exposing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuseSelection {
    /// Version accepted (or unchecked): corrected reading.
    Corrected(FuseValue),
    /// Version rejected but failures are ignored: raw reading.
    Uncorrected(FuseValue),
    /// Version rejected: statically configured default.
    Default(FuseValue),
}

impl FuseSelection {
    pub fn value(&self) -> FuseValue {
        match *self {
            FuseSelection::Corrected(v)
            | FuseSelection::Uncorrected(v)
            | FuseSelection::Default(v) => v,
        }
    }
}

impl VersionCheckPolicy {
    /// Whether a live version reading satisfies this policy's expectation.
    ///
    /// In bitmask mode bit `n` of `expected` accepts version `n`.
    pub fn version_matches(&self, live: u32) -> bool {
        if self.expected_is_bitmask {
            live < u32::BITS && (self.expected >> live) & 1 == 1
        } else {
            live == self.expected
        }
    }

    /// Pick the usable value for a reading.
    ///
    /// A mismatch falls back to `default` unless failures are ignored.
    /// `use_default_on_check_failure` is forwarded to the coprocessor and
    /// does not change the host-side choice. Without a live version there
    /// is no version fuse to disagree with, so the reading is accepted.
    pub fn select(
        &self,
        raw: FuseValue,
        live_version: Option<u32>,
        default: FuseValue,
        correction: &HwCorrection,
    ) -> FuseSelection {
        let accepted = match live_version {
            Some(v) => !self.check_enabled || self.version_matches(v),
            None => true,
        };
        if accepted {
            FuseSelection::Corrected(raw.corrected(correction))
        } else if self.ignore_check_failure {
            FuseSelection::Uncorrected(raw)
        } else {
            FuseSelection::Default(default)
        }
    }
}

/// Stable cross-chip fuse identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FuseId {
    Speedo0,
    Speedo1,
    Speedo2,
    SpeedoVersion,
    Iddq,
    IddqVersion,
    SParameter,
    SParameterVersion,
    NvvddVmin,
    MsvddVmin,
}

/// Symbolic fuse identity a sensed-fuse variable was constructed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FuseFieldIdentity {
    /// Field-table id used by the register-described sensed fuse.
    Field(u8),
    /// Stable id used by the fuse-20 variant.
    Fuse(FuseId),
}

/// Field-table id of the S-parameter on register-described boards.
pub const VFIELD_ID_S_PARAM: u8 = 0x1E;

impl FuseFieldIdentity {
    pub const S_PARAM: FuseFieldIdentity = FuseFieldIdentity::Fuse(FuseId::SParameter);
    pub const S_PARAM_FIELD: FuseFieldIdentity = FuseFieldIdentity::Field(VFIELD_ID_S_PARAM);
}

impl fmt::Display for FuseFieldIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuseFieldIdentity::Field(id) => write!(f, "field 0x{id:02x}"),
            FuseFieldIdentity::Fuse(id) => write!(f, "fuse {id:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correction_is_scale_then_offset() {
        let c = HwCorrection {
            scale: 3,
            offset: 7,
        };
        // (10*3)+7, not (10+7)*3
        assert_eq!(
            FuseValue::Unsigned(10).corrected(&c),
            FuseValue::Unsigned(37)
        );
        assert_eq!(FuseValue::Signed(-10).corrected(&c), FuseValue::Signed(-23));
    }

    #[test]
    fn correction_with_negative_offset() {
        let c = HwCorrection {
            scale: 3,
            offset: -50,
        };
        assert_eq!(
            FuseValue::Unsigned(100).corrected(&c),
            FuseValue::Unsigned(250)
        );
        assert_eq!(FuseValue::Signed(-10).corrected(&c), FuseValue::Signed(-80));
        assert_eq!(FuseValue::Signed(20).corrected(&c), FuseValue::Signed(10));
    }

    #[test]
    fn identity_correction_is_noop() {
        let v = FuseValue::Signed(-1234);
        assert_eq!(v.corrected(&HwCorrection::IDENTITY), v);
    }

    #[test]
    fn from_word_respects_sign() {
        assert_eq!(FuseValue::from_word(0xFFFF_FFFF, true).raw(), -1);
        assert_eq!(FuseValue::from_word(0xFFFF_FFFF, false).raw(), 0xFFFF_FFFF);
    }

    #[test]
    fn version_bitmask_mode() {
        let p = VersionCheckPolicy {
            expected: 0b1010,
            expected_is_bitmask: true,
            check_enabled: true,
            ..Default::default()
        };
        assert!(p.version_matches(1));
        assert!(p.version_matches(3));
        assert!(!p.version_matches(2));
        assert!(!p.version_matches(40));
    }

    #[test]
    fn version_policy_matrix() {
        let raw = FuseValue::Unsigned(10);
        let default = FuseValue::Unsigned(99);
        let c = HwCorrection {
            scale: 2,
            offset: 1,
        };
        let corrected = FuseValue::Unsigned(21);

        // (check_enabled, ignore_check_failure, version matches) -> selection
        let cases = [
            (false, false, true, FuseSelection::Corrected(corrected)),
            (false, false, false, FuseSelection::Corrected(corrected)),
            (false, true, true, FuseSelection::Corrected(corrected)),
            (false, true, false, FuseSelection::Corrected(corrected)),
            (true, false, true, FuseSelection::Corrected(corrected)),
            (true, false, false, FuseSelection::Default(default)),
            (true, true, true, FuseSelection::Corrected(corrected)),
            (true, true, false, FuseSelection::Uncorrected(raw)),
        ];

        for use_default in [false, true] {
            for (check, ignore, matches, expected) in cases {
                let p = VersionCheckPolicy {
                    expected: 5,
                    expected_is_bitmask: false,
                    check_enabled: check,
                    ignore_check_failure: ignore,
                    use_default_on_check_failure: use_default,
                };
                let live = if matches { 5 } else { 6 };
                let got = p.select(raw, Some(live), default, &c);
                assert_eq!(
                    got, expected,
                    "check={check} ignore={ignore} matches={matches} use_default={use_default}"
                );
            }
        }
    }

    #[test]
    fn default_policy_mismatch_selects_default() {
        let p = VersionCheckPolicy {
            expected: 1,
            check_enabled: true,
            ..Default::default()
        };
        let got = p.select(
            FuseValue::Signed(1),
            Some(2),
            FuseValue::Signed(0),
            &HwCorrection::IDENTITY,
        );
        assert_eq!(got, FuseSelection::Default(FuseValue::Signed(0)));
    }

    #[test]
    fn missing_version_skips_the_check() {
        let p = VersionCheckPolicy {
            expected: 0b0110,
            expected_is_bitmask: true,
            check_enabled: true,
            ignore_check_failure: false,
            use_default_on_check_failure: true,
        };
        let c = HwCorrection {
            scale: 3,
            offset: 1,
        };
        let got = p.select(FuseValue::Signed(7), None, FuseValue::Signed(-5), &c);
        assert_eq!(got, FuseSelection::Corrected(FuseValue::Signed(22)));
        assert!(p.version_matches(2));
        assert!(!p.version_matches(6));
    }
}
