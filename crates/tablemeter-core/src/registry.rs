//! # Table Registry
//!
//! The floor's table inventory. The ledger depends on the [`TableRegistry`]
//! trait only, so a different store can stand in for [`InMemoryTables`].
//!
//! ```text
//! VisitLedger ──lookup / set_occupied──► TableRegistry
//!                                            │
//!                                            ▼
//!                                   InMemoryTables (BTreeMap)
//! ```

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::types::{Table, TableId};

/// Lookup and occupancy storage for tables.
pub trait TableRegistry {
    /// Returns the table or [`CoreError::TableNotFound`].
    fn lookup(&self, id: TableId) -> CoreResult<Table>;

    /// All tables, ordered by id.
    fn list_all(&self) -> Vec<Table>;

    /// Flips the occupancy flag.
    fn set_occupied(&mut self, id: TableId, occupied: bool) -> CoreResult<()>;

    fn list_free(&self) -> Vec<Table> {
        self.list_all().into_iter().filter(Table::is_free).collect()
    }

    fn list_occupied(&self) -> Vec<Table> {
        self.list_all().into_iter().filter(|t| t.occupied).collect()
    }
}

/// Tables held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTables {
    tables: BTreeMap<TableId, Table>,
}

impl InMemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// A floor with free tables numbered `1..=count`.
    pub fn with_tables(count: u32) -> Self {
        let tables = (1..=count)
            .map(|id| (TableId::new(id), Table::new(TableId::new(id))))
            .collect();
        InMemoryTables { tables }
    }

    /// Adds a free table numbered one past the current highest id.
    pub fn add_table(&mut self) -> Table {
        let next = self
            .tables
            .keys()
            .next_back()
            .map_or(1, |id| id.value() + 1);
        let table = Table::new(TableId::new(next));
        self.tables.insert(table.id, table);
        table
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl TableRegistry for InMemoryTables {
    fn lookup(&self, id: TableId) -> CoreResult<Table> {
        self.tables
            .get(&id)
            .copied()
            .ok_or(CoreError::TableNotFound(id))
    }

    fn list_all(&self) -> Vec<Table> {
        self.tables.values().copied().collect()
    }

    fn set_occupied(&mut self, id: TableId, occupied: bool) -> CoreResult<()> {
        let table = self
            .tables
            .get_mut(&id)
            .ok_or(CoreError::TableNotFound(id))?;
        table.occupied = occupied;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_tables_numbers_from_one() {
        let tables = InMemoryTables::with_tables(3);
        let ids: Vec<u32> = tables.list_all().iter().map(|t| t.id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(tables.list_free().len(), 3);
        assert!(tables.list_occupied().is_empty());
    }

    #[test]
    fn test_add_table_continues_numbering() {
        let mut tables = InMemoryTables::new();
        assert_eq!(tables.add_table().id, TableId::new(1));
        assert_eq!(tables.add_table().id, TableId::new(2));
        assert_eq!(tables.len(), 2);
    }

    #[test]
    fn test_set_occupied_splits_lists() {
        let mut tables = InMemoryTables::with_tables(2);
        tables.set_occupied(TableId::new(2), true).unwrap();

        assert_eq!(tables.list_free(), vec![Table::new(TableId::new(1))]);
        assert_eq!(tables.list_occupied()[0].id, TableId::new(2));
        assert!(tables.lookup(TableId::new(2)).unwrap().occupied);
    }

    #[test]
    fn test_unknown_table() {
        let mut tables = InMemoryTables::with_tables(1);
        assert_eq!(
            tables.lookup(TableId::new(9)),
            Err(CoreError::TableNotFound(TableId::new(9)))
        );
        assert!(tables.set_occupied(TableId::new(9), true).is_err());
    }
}
