use core::fmt;
use core::num::NonZeroU16;

/// Maximum number of variables the firmware format can address.
pub const MAX_VARIABLES: usize = 256;

/// Maximum number of equations the firmware format can address.
pub const MAX_EQUATIONS: usize = 2048;

macro_rules! dense_index {
    ($(#[$meta:meta])* $name:ident, $max:expr, $tag:literal) => {
        $(#[$meta])*
        ///
        /// - `u16` keeps the tables small
        /// - `NonZero` lets `Option<Self>` use the niche
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU16);

        impl $name {
            /// Number of distinct indices the format supports.
            pub const CAPACITY: usize = $max;

            /// Create from a 0-based index; `None` past the format maximum.
            pub fn new(index: usize) -> Option<Self> {
                if index >= Self::CAPACITY {
                    return None;
                }
                // index+1 is nonzero and fits: CAPACITY < u16::MAX
                NonZeroU16::new(index as u16 + 1).map(Self)
            }

            /// Recover the 0-based index.
            pub fn index(self) -> usize {
                usize::from(self.0.get() - 1)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "({})"), self.index())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.index())
            }
        }

        impl From<u8> for $name {
            fn from(raw: u8) -> Self {
                Self(NonZeroU16::MIN.saturating_add(u16::from(raw)))
            }
        }

        #[cfg(feature = "serde")]
        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_u16(self.index() as u16)
            }
        }

        #[cfg(feature = "serde")]
        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let raw = <u16 as serde::Deserialize>::deserialize(d)?;
                Self::new(usize::from(raw))
                    .ok_or_else(|| serde::de::Error::custom(concat!($tag, " out of range")))
            }
        }
    };
}

dense_index!(
    /// Dense index of a variable within the variable group.
    VarIdx,
    MAX_VARIABLES,
    "VarIdx"
);

dense_index!(
    /// Dense index of an equation within the equation group.
    EquIdx,
    MAX_EQUATIONS,
    "EquIdx"
);

/// Firmware tables consumed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TableId {
    /// Variable/equation/parameter table.
    Vfe,
    /// Symbolic fuse field -> register segment table.
    Field,
    /// Register descriptors referenced by the field table.
    FieldRegister,
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableId::Vfe => "VFE table",
            TableId::Field => "VFE field table",
            TableId::FieldRegister => "VFE field register table",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        for i in [0_usize, 1, 42, 255] {
            assert_eq!(VarIdx::new(i).unwrap().index(), i);
        }
        for i in [0_usize, 255, 256, 2047] {
            assert_eq!(EquIdx::new(i).unwrap().index(), i);
        }
    }

    #[test]
    fn index_rejects_past_capacity() {
        assert!(VarIdx::new(MAX_VARIABLES).is_none());
        assert!(EquIdx::new(MAX_EQUATIONS).is_none());
    }

    #[test]
    fn option_index_is_small() {
        assert_eq!(
            core::mem::size_of::<VarIdx>(),
            core::mem::size_of::<Option<VarIdx>>()
        );
    }

    #[test]
    fn from_raw_byte() {
        assert_eq!(VarIdx::from(0xFF_u8).index(), 255);
        assert_eq!(EquIdx::from(7_u8).index(), 7);
    }
}
