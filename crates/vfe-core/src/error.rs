use thiserror::Error;

use crate::ids::TableId;

pub type VfeResult<T> = Result<T, VfeError>;

/// Construction-time failures. Every one of these aborts VFE setup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VfeError {
    #[error("Required table missing: {table}")]
    TableMissing { table: TableId },

    #[error("Unsupported {table} version 0x{version:02x}")]
    UnsupportedTableVersion { table: TableId, version: u8 },

    #[error("Invalid {what} size in {table}: 0x{size:02x}")]
    InvalidEntrySize {
        table: TableId,
        what: &'static str,
        size: u8,
    },

    #[error("{table} truncated: need {needed} bytes, have {available}")]
    TableTruncated {
        table: TableId,
        needed: usize,
        available: usize,
    },

    #[error("Unknown {what} discriminant 0x{discriminant:02x} in {table} entry {entry}")]
    UnknownTypeDiscriminant {
        table: TableId,
        what: &'static str,
        entry: usize,
        discriminant: u8,
    },

    #[error("Fuse field 0x{field_id:02x} (variable {entry}) needs more than {max} register segment(s)")]
    FuseSegmentOverflow {
        entry: usize,
        field_id: u8,
        max: usize,
    },

    #[error("Fuse field 0x{field_id:02x} referenced by variable {entry} has no field table entry")]
    MissingFuseFieldIdentity { entry: usize, field_id: u8 },

    #[error("Invalid {what} in entry {entry}: index {index} (len={len})")]
    InvalidOperandIndex {
        what: &'static str,
        entry: usize,
        index: usize,
        len: usize,
    },

    #[error("Dependency cycle through {what} {index}")]
    DependencyCycle { what: &'static str, index: usize },

    #[error("Cannot allocate {what}: requested {requested}, capacity {capacity}")]
    AllocationFailure {
        what: &'static str,
        requested: usize,
        capacity: usize,
    },

    #[error("Duplicate {what} at index {index}")]
    DuplicateIndex { what: &'static str, index: usize },
}
