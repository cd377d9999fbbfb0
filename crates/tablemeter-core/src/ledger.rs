//! # Visit Ledger
//!
//! The authoritative, append-only list of visits. It enforces the per-table
//! state machine and answers every duration/cost question.
//!
//! ## Per-Table State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │           create_visit(client, table)                                   │
//! │   IDLE ─────────────────────────────────► ACTIVE                        │
//! │    ▲      • table exists                    │                           │
//! │    │      • table free, no active visit     │                           │
//! │    │      • append visit, mark occupied     │                           │
//! │    │                                        │                           │
//! │    └────────────────────────────────────────┘                           │
//! │           finish_visit(table)                                           │
//! │           • exactly one active visit                                    │
//! │           • bill, mark free, then freeze duration + cost                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ledger holds no clock and no rate. Callers pass `now` and the current
//! [`PricePerMinute`], which keeps every method deterministic.
//!
//! Finding "the active visit" is a linear scan that also counts matches, so a
//! corrupted ledger surfaces as [`CoreError::InvariantViolation`] instead of
//! silently picking the first hit.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::registry::TableRegistry;
use crate::types::{Client, PricePerMinute, TableId};
use crate::visit::Visit;

/// Ordered collection of all visits, past and present.
#[derive(Debug, Clone, Default)]
pub struct VisitLedger {
    visits: Vec<Visit>,
}

impl VisitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Seats `client` at `table_id` (IDLE → ACTIVE).
    ///
    /// ## Errors
    /// - [`CoreError::TableNotFound`] - unknown table
    /// - [`CoreError::TableOccupied`] - table already has an active visit;
    ///   nothing is appended and the table flag is left alone
    pub fn create_visit<R: TableRegistry>(
        &mut self,
        tables: &mut R,
        client: Client,
        table_id: TableId,
        now: DateTime<Utc>,
    ) -> CoreResult<Visit> {
        let table = tables.lookup(table_id)?;
        if table.occupied {
            return Err(CoreError::TableOccupied(table_id));
        }

        match self.active_index(table_id) {
            Ok(_) => return Err(CoreError::TableOccupied(table_id)),
            Err(CoreError::NoActiveVisit(_)) => {}
            Err(e) => return Err(e),
        }

        tables.set_occupied(table_id, true)?;
        let visit = Visit::start(client, table_id, now);
        debug!(visit_id = %visit.id(), %table_id, client_id = %client.id(), "Visit created");
        self.visits.push(visit.clone());
        Ok(visit)
    }

    /// Bills and closes the active visit at `table_id` (ACTIVE → IDLE).
    ///
    /// ## Errors
    /// - [`CoreError::TableNotFound`] - unknown table
    /// - [`CoreError::NoActiveVisit`] - nothing to finish (including a second
    ///   call right after a successful one)
    /// - [`CoreError::InvariantViolation`] - more than one active visit
    /// - [`CoreError::CostOverflow`] - the bill does not fit in cents
    ///
    /// On any error the visit stays active and the table stays occupied.
    pub fn finish_visit<R: TableRegistry>(
        &mut self,
        tables: &mut R,
        table_id: TableId,
        now: DateTime<Utc>,
        rate: PricePerMinute,
    ) -> CoreResult<Visit> {
        tables.lookup(table_id)?;
        let index = self.active_index(table_id)?;

        let bill = self.visits[index].bill(now, rate)?;
        tables.set_occupied(table_id, false)?;

        let visit = &mut self.visits[index];
        visit.close(bill);

        debug!(
            visit_id = %visit.id(),
            %table_id,
            cost = %visit.cost().unwrap_or_default(),
            "Visit finished"
        );
        Ok(visit.clone())
    }

    // =========================================================================
    // Point Queries
    // =========================================================================

    /// The unique active visit at `table_id`.
    pub fn active_visit<R: TableRegistry>(&self, tables: &R, table_id: TableId) -> CoreResult<&Visit> {
        tables.lookup(table_id)?;
        let index = self.active_index(table_id)?;
        Ok(&self.visits[index])
    }

    /// Elapsed time of the active visit at `table_id`.
    pub fn current_duration<R: TableRegistry>(
        &self,
        tables: &R,
        table_id: TableId,
        now: DateTime<Utc>,
    ) -> CoreResult<Duration> {
        Ok(self.active_visit(tables, table_id)?.current_duration(now))
    }

    /// Running cost of the active visit at `table_id`.
    pub fn current_cost<R: TableRegistry>(
        &self,
        tables: &R,
        table_id: TableId,
        rate: PricePerMinute,
        now: DateTime<Utc>,
    ) -> CoreResult<Money> {
        self.active_visit(tables, table_id)?.cost_at(rate, now)
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    /// Current duration for every occupied table.
    ///
    /// An occupied table without an active visit fails the whole call; the
    /// registry and ledger disagree and a partial answer would hide it.
    pub fn total_current_duration<R: TableRegistry>(
        &self,
        tables: &R,
        now: DateTime<Utc>,
    ) -> CoreResult<BTreeMap<TableId, Duration>> {
        tables
            .list_occupied()
            .into_iter()
            .map(|table| {
                self.current_duration(tables, table.id, now)
                    .map(|duration| (table.id, duration))
            })
            .collect()
    }

    /// Current cost for every occupied table.
    pub fn total_current_cost<R: TableRegistry>(
        &self,
        tables: &R,
        rate: PricePerMinute,
        now: DateTime<Utc>,
    ) -> CoreResult<BTreeMap<TableId, Money>> {
        tables
            .list_occupied()
            .into_iter()
            .map(|table| {
                self.current_cost(tables, table.id, rate, now)
                    .map(|cost| (table.id, cost))
            })
            .collect()
    }

    /// Sum of the frozen cost of every finished visit. Active visits are not
    /// counted until they are billed.
    pub fn total_cost_of_all_time(&self) -> Money {
        self.visits.iter().filter_map(Visit::cost).sum()
    }

    /// Mean duration of finished visits at `table_id`.
    ///
    /// ## Errors
    /// - [`CoreError::TableNotFound`] - unknown table
    /// - [`CoreError::NoHistory`] - the table has no finished visits
    pub fn average_duration<R: TableRegistry>(&self, tables: &R, table_id: TableId) -> CoreResult<Duration> {
        tables.lookup(table_id)?;

        let durations: Vec<Duration> = self
            .visits
            .iter()
            .filter(|v| v.table_id() == table_id)
            .filter_map(Visit::duration)
            .collect();

        if durations.is_empty() {
            return Err(CoreError::NoHistory(table_id));
        }

        let total_ms: i64 = durations.iter().map(Duration::num_milliseconds).sum();
        Ok(Duration::milliseconds(total_ms / durations.len() as i64))
    }

    /// [`Self::average_duration`] for every registered table. Tables without
    /// history carry their own `NoHistory` entry.
    pub fn average_duration_all_tables<R: TableRegistry>(
        &self,
        tables: &R,
    ) -> BTreeMap<TableId, CoreResult<Duration>> {
        tables
            .list_all()
            .into_iter()
            .map(|table| (table.id, self.average_duration(tables, table.id)))
            .collect()
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// All visits in creation order.
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    pub fn visit(&self, id: Uuid) -> Option<&Visit> {
        self.visits.iter().find(|v| v.id() == id)
    }

    pub fn len(&self) -> usize {
        self.visits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Index of the single active visit at `table_id`.
    fn active_index(&self, table_id: TableId) -> CoreResult<usize> {
        let mut matches = self
            .visits
            .iter()
            .enumerate()
            .filter(|(_, v)| v.table_id() == table_id && v.is_active())
            .map(|(i, _)| i);

        let first = matches.next().ok_or(CoreError::NoActiveVisit(table_id))?;

        let extra = matches.count();
        if extra > 0 {
            error!(%table_id, active = extra + 1, "Multiple active visits for one table");
            return Err(CoreError::InvariantViolation {
                table_id,
                active: extra + 1,
            });
        }

        Ok(first)
    }

    #[cfg(test)]
    fn push_raw(&mut self, visit: Visit) {
        self.visits.push(visit);
    }
}
