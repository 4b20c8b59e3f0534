//! vfe-table: firmware table decoding for the VFE engine.
//!
//! Turns the VFE table (and, for register-described fuses, the field and
//! field-register tables) into a validated [`vfe_graph::VfeGraphBuilder`].
//! The `encode` module writes the same layouts back out for fixtures.

pub mod decode;
pub mod encode;
pub mod field;
pub mod fuse_id;
pub mod header;
pub mod layout;
pub mod locator;

mod equ_entry;
mod param_entry;
mod reader;
mod var_entry;

pub use decode::{DecodeOptions, DecodedTables, decode_tables};
pub use field::FieldTables;
pub use header::{TableVersion, VfeHeader};
pub use locator::{MemoryTables, TableLocator};
