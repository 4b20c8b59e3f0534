//! vfe-core: stable foundation for the VFE variable/equation engine.
//!
//! Contains:
//! - ids (dense variable/equation indices, table identifiers)
//! - mask (fixed-capacity bitsets sized to the firmware maxima)
//! - fuse (fuse values, hardware correction, version-check policy)
//! - range (output ranges and unit tags)
//! - error (shared error types)

pub mod error;
pub mod fuse;
pub mod ids;
pub mod mask;
pub mod range;

// Re-exports: nice ergonomics for downstream crates
pub use error::{VfeError, VfeResult};
pub use fuse::*;
pub use ids::*;
pub use mask::*;
pub use range::*;
