//! Output ranges and unit tags shared by variables and equations.

use core::fmt;

/// Clamp range for a variable or equation output.
///
/// The firmware stores both bounds as IEEE-754 single-precision bit patterns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutputRange {
    pub min: f32,
    pub max: f32,
}

impl OutputRange {
    pub fn from_bits(min: u32, max: u32) -> Self {
        Self {
            min: f32::from_bits(min),
            max: f32::from_bits(max),
        }
    }

    pub fn to_bits(self) -> (u32, u32) {
        (self.min.to_bits(), self.max.to_bits())
    }
}

/// Unit an equation's result is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputUnit {
    #[default]
    Unitless,
    FreqMhz,
    VoltUv,
    VfGain,
    VoltDeltaUv,
    WorkType,
    UtilRatio,
    WorkFbNorm,
    PowerMw,
    PowerOverUtilSlope,
    AdcCode,
    ThreshPercent,
}

impl TryFrom<u8> for OutputUnit {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x00 => Ok(Self::Unitless),
            0x01 => Ok(Self::FreqMhz),
            0x02 => Ok(Self::VoltUv),
            0x03 => Ok(Self::VfGain),
            0x04 => Ok(Self::VoltDeltaUv),
            0x06 => Ok(Self::WorkType),
            0x07 => Ok(Self::UtilRatio),
            0x08 => Ok(Self::WorkFbNorm),
            0x09 => Ok(Self::PowerMw),
            0x0A => Ok(Self::PowerOverUtilSlope),
            0x0B => Ok(Self::AdcCode),
            0x0C => Ok(Self::ThreshPercent),
            other => Err(other),
        }
    }
}

impl From<OutputUnit> for u8 {
    fn from(unit: OutputUnit) -> u8 {
        match unit {
            OutputUnit::Unitless => 0x00,
            OutputUnit::FreqMhz => 0x01,
            OutputUnit::VoltUv => 0x02,
            OutputUnit::VfGain => 0x03,
            OutputUnit::VoltDeltaUv => 0x04,
            OutputUnit::WorkType => 0x06,
            OutputUnit::UtilRatio => 0x07,
            OutputUnit::WorkFbNorm => 0x08,
            OutputUnit::PowerMw => 0x09,
            OutputUnit::PowerOverUtilSlope => 0x0A,
            OutputUnit::AdcCode => 0x0B,
            OutputUnit::ThreshPercent => 0x0C,
        }
    }
}

impl fmt::Display for OutputUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputUnit::Unitless => "unitless",
            OutputUnit::FreqMhz => "MHz",
            OutputUnit::VoltUv => "uV",
            OutputUnit::VfGain => "gain",
            OutputUnit::VoltDeltaUv => "delta uV",
            OutputUnit::WorkType => "work type",
            OutputUnit::UtilRatio => "util ratio",
            OutputUnit::WorkFbNorm => "work/fb norm",
            OutputUnit::PowerMw => "mW",
            OutputUnit::PowerOverUtilSlope => "mW/util",
            OutputUnit::AdcCode => "ADC code",
            OutputUnit::ThreshPercent => "%",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_bits_round_trip() {
        let r = OutputRange::from_bits(0.5_f32.to_bits(), 1200.0_f32.to_bits());
        assert_eq!(r.min, 0.5);
        assert_eq!(r.max, 1200.0);
        assert_eq!(r.to_bits(), (0.5_f32.to_bits(), 1200.0_f32.to_bits()));
    }

    #[test]
    fn unit_code_gap_is_rejected() {
        assert_eq!(OutputUnit::try_from(0x05), Err(0x05));
        assert_eq!(OutputUnit::try_from(0x09), Ok(OutputUnit::PowerMw));
        assert_eq!(u8::from(OutputUnit::ThreshPercent), 0x0C);
    }
}
