//! Firmware-local fuse ids used by the fuse-20 variable variant.

use vfe_core::FuseId;

/// Map a table-local fuse id onto the stable cross-chip identifier.
pub fn lookup(local: u8) -> Option<FuseId> {
    match local {
        0x01 => Some(FuseId::Speedo0),
        0x02 => Some(FuseId::Speedo1),
        0x03 => Some(FuseId::Speedo2),
        0x04 => Some(FuseId::SpeedoVersion),
        0x05 => Some(FuseId::Iddq),
        0x06 => Some(FuseId::IddqVersion),
        0x07 => Some(FuseId::SParameter),
        0x08 => Some(FuseId::SParameterVersion),
        0x09 => Some(FuseId::NvvddVmin),
        0x0A => Some(FuseId::MsvddVmin),
        _ => None,
    }
}

/// Inverse of [`lookup`].
pub fn local_id(id: FuseId) -> u8 {
    match id {
        FuseId::Speedo0 => 0x01,
        FuseId::Speedo1 => 0x02,
        FuseId::Speedo2 => 0x03,
        FuseId::SpeedoVersion => 0x04,
        FuseId::Iddq => 0x05,
        FuseId::IddqVersion => 0x06,
        FuseId::SParameter => 0x07,
        FuseId::SParameterVersion => 0x08,
        FuseId::NvvddVmin => 0x09,
        FuseId::MsvddVmin => 0x0A,
    }
}
