//! Loading table images from disk.

use std::path::{Path, PathBuf};

use vfe_core::TableId;
use vfe_table::MemoryTables;

use crate::error::{AppError, AppResult};

/// Paths of the dumped table images.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablePaths {
    pub vfe: PathBuf,
    pub field: Option<PathBuf>,
    pub field_register: Option<PathBuf>,
}

fn read(path: &Path) -> AppResult<Vec<u8>> {
    std::fs::read(path).map_err(|source| AppError::TableRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Read every listed image into memory.
pub fn load_tables(paths: &TablePaths) -> AppResult<MemoryTables> {
    let mut tables = MemoryTables::new();
    tables.insert(TableId::Vfe, read(&paths.vfe)?);
    if let Some(p) = &paths.field {
        tables.insert(TableId::Field, read(p)?);
    }
    if let Some(p) = &paths.field_register {
        tables.insert(TableId::FieldRegister, read(p)?);
    }
    Ok(tables)
}
