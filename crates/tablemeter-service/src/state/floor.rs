//! # Floor State
//!
//! Tables and the visit ledger, guarded together.

use std::sync::{Arc, RwLock};

use tablemeter_core::{InMemoryTables, VisitLedger};

use crate::error::{ServiceError, ServiceResult};

/// Everything a visit transition reads or writes.
#[derive(Debug, Default)]
pub struct Floor {
    pub tables: InMemoryTables,
    pub ledger: VisitLedger,
}

impl Floor {
    /// A floor with `table_count` free tables and an empty ledger.
    pub fn with_tables(table_count: u32) -> Self {
        Floor {
            tables: InMemoryTables::with_tables(table_count),
            ledger: VisitLedger::new(),
        }
    }
}

/// Shared handle to the [`Floor`].
///
/// Uses `Arc<RwLock<Floor>>` because:
/// - `Arc`: every clone of the service sees the same floor
/// - `RwLock`: transitions are exclusive, queries run side by side and
///   never see a half-applied transition
#[derive(Debug, Clone, Default)]
pub struct FloorState {
    floor: Arc<RwLock<Floor>>,
}

impl FloorState {
    pub fn new(floor: Floor) -> Self {
        FloorState {
            floor: Arc::new(RwLock::new(floor)),
        }
    }

    /// Executes a function with read access to the floor.
    pub fn with_floor<F, R>(&self, f: F) -> ServiceResult<R>
    where
        F: FnOnce(&Floor) -> R,
    {
        let floor = self
            .floor
            .read()
            .map_err(|_| ServiceError::StatePoisoned("floor"))?;
        Ok(f(&floor))
    }

    /// Executes a function with exclusive access to the floor.
    ///
    /// Everything inside `f` is one atomic step as far as other callers are
    /// concerned.
    pub fn with_floor_mut<F, R>(&self, f: F) -> ServiceResult<R>
    where
        F: FnOnce(&mut Floor) -> R,
    {
        let mut floor = self
            .floor
            .write()
            .map_err(|_| ServiceError::StatePoisoned("floor"))?;
        Ok(f(&mut floor))
    }
}
