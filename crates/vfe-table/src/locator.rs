//! Access to firmware table images.

use std::collections::HashMap;

use vfe_core::TableId;

/// Trait for types that can hand out firmware table images.
///
/// Implemented by whatever owns the VBIOS image in the running driver.
pub trait TableLocator {
    /// Raw bytes of `table`, or `None` if the image does not carry it.
    fn locate_table(&self, table: TableId) -> Option<&[u8]>;
}

/// Table images held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    tables: HashMap<TableId, Vec<u8>>,
}

impl MemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: TableId, data: Vec<u8>) -> Self {
        self.insert(table, data);
        self
    }

    pub fn insert(&mut self, table: TableId, data: Vec<u8>) {
        self.tables.insert(table, data);
    }
}

impl TableLocator for MemoryTables {
    fn locate_table(&self, table: TableId) -> Option<&[u8]> {
        self.tables.get(&table).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_table_is_none() {
        let tables = MemoryTables::new().with_table(TableId::Vfe, vec![0x10]);
        assert_eq!(tables.locate_table(TableId::Vfe), Some(&[0x10][..]));
        assert!(tables.locate_table(TableId::Field).is_none());
    }
}
