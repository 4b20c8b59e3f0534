//! vfe-app: service layer shared by the driver init path and the CLI.
//!
//! Provides:
//! - `DriverConfig` loading (YAML)
//! - Table images read from disk
//! - `VfeContext`, the explicitly owned VFE state for one GPU instance
//! - A unified `AppError`

pub mod config;
pub mod context;
pub mod error;
pub mod tables;

pub use config::{DriverConfig, OverrideDef, OverrideKind};
pub use context::{VfeContext, build_graph, table_fingerprint};
pub use error::{AppError, AppResult};
pub use tables::{TablePaths, load_tables};
