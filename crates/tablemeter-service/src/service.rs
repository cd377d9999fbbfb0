//! # Visit Service
//!
//! The caller-facing API: seat clients, bill tables, read figures.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create_visit(client, table)                                            │
//! │     │  now = clock.now()                                                │
//! │     ▼                                                                   │
//! │  floor.write() ── ledger.create_visit(tables, client, table, now) ──┐   │
//! │                                                                     │   │
//! │  finish_visit(table)                                                │   │
//! │     │  rate = pricing.get(), now = clock.now()                      │   │
//! │     ▼                                                               ▼   │
//! │  floor.write() ── ledger.finish_visit(tables, table, now, rate) ─► Visit│
//! │                                                                         │
//! │  queries ── floor.read() ── ledger.* (parallel with each other)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Duration;
use std::collections::BTreeMap;
use std::sync::Arc;
use tablemeter_core::{
    Client, ClientIdAllocator, Clock, CoreError, CoreResult, Money, PricePerMinute, SystemClock,
    Table, TableId, TableRegistry, Visit, VisitSummary,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::state::{Floor, FloorState, PricingState};

/// Visit lifecycle and billing over shared floor state.
///
/// Cheap to clone; clones share the same floor, rate, client counter and
/// clock.
#[derive(Debug, Clone)]
pub struct VisitService {
    floor: FloorState,
    pricing: PricingState,
    clients: Arc<ClientIdAllocator>,
    clock: Arc<dyn Clock>,
}

impl VisitService {
    /// Builds a service over explicitly supplied state.
    pub fn new(floor: FloorState, pricing: PricingState, clock: Arc<dyn Clock>) -> Self {
        VisitService {
            floor,
            pricing,
            clients: Arc::new(ClientIdAllocator::new()),
            clock,
        }
    }

    /// Builds a fresh floor from configuration, using wall-clock time.
    pub fn from_config(config: &ServiceConfig) -> ServiceResult<Self> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(config: &ServiceConfig, clock: Arc<dyn Clock>) -> ServiceResult<Self> {
        config.validate()?;
        let rate = config.price_per_minute()?;
        info!(
            tables = config.floor.table_count,
            price_per_minute = %rate.per_minute(),
            "Floor initialized"
        );
        Ok(Self::new(
            FloorState::new(Floor::with_tables(config.floor.table_count)),
            PricingState::new(rate),
            clock,
        ))
    }

    // =========================================================================
    // Clients & Tables
    // =========================================================================

    /// Allocates a new client.
    pub fn new_client(&self) -> Client {
        self.clients.allocate()
    }

    /// Adds a free table to the floor.
    pub fn add_table(&self) -> ServiceResult<Table> {
        let table = self.floor.with_floor_mut(|floor| floor.tables.add_table())?;
        debug!(table_id = %table.id, "Table added");
        Ok(table)
    }

    pub fn free_tables(&self) -> ServiceResult<Vec<Table>> {
        self.floor.with_floor(|floor| floor.tables.list_free())
    }

    pub fn occupied_tables(&self) -> ServiceResult<Vec<Table>> {
        self.floor.with_floor(|floor| floor.tables.list_occupied())
    }

    // =========================================================================
    // Pricing
    // =========================================================================

    pub fn price_per_minute(&self) -> ServiceResult<PricePerMinute> {
        self.pricing.get()
    }

    /// Changes the rate for visits billed from now on. Already finished
    /// visits keep their cost.
    pub fn set_price_per_minute(&self, rate: PricePerMinute) -> ServiceResult<()> {
        let previous = self.pricing.set(rate)?;
        info!(from = %previous.per_minute(), to = %rate.per_minute(), "Price per minute changed");
        Ok(())
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Seats `client` at `table_id`.
    pub fn create_visit(&self, client: Client, table_id: TableId) -> ServiceResult<Visit> {
        let result = self.floor.with_floor_mut(|floor| {
            let now = self.clock.now();
            floor
                .ledger
                .create_visit(&mut floor.tables, client, table_id, now)
        })?;

        match result {
            Ok(visit) => {
                info!(%table_id, client_id = %client.id(), visit_id = %visit.id(), "Visit started");
                Ok(visit)
            }
            Err(e) => Err(rejected("create_visit", table_id, e)),
        }
    }

    /// Bills and closes the active visit at `table_id`.
    pub fn finish_visit(&self, table_id: TableId) -> ServiceResult<Visit> {
        let rate = self.pricing.get()?;
        let result = self.floor.with_floor_mut(|floor| {
            let now = self.clock.now();
            floor
                .ledger
                .finish_visit(&mut floor.tables, table_id, now, rate)
        })?;

        match result {
            Ok(visit) => {
                info!(
                    %table_id,
                    visit_id = %visit.id(),
                    seconds = visit.duration().map(|d| d.num_seconds()),
                    cost = %visit.cost().unwrap_or_default(),
                    "Visit finished"
                );
                Ok(visit)
            }
            Err(e) => Err(rejected("finish_visit", table_id, e)),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn current_duration(&self, table_id: TableId) -> ServiceResult<Duration> {
        let now = self.clock.now();
        self.read(|floor| floor.ledger.current_duration(&floor.tables, table_id, now))
    }

    pub fn current_cost(&self, table_id: TableId) -> ServiceResult<Money> {
        let rate = self.pricing.get()?;
        let now = self.clock.now();
        self.read(|floor| floor.ledger.current_cost(&floor.tables, table_id, rate, now))
    }

    pub fn total_current_duration(&self) -> ServiceResult<BTreeMap<TableId, Duration>> {
        let now = self.clock.now();
        self.read(|floor| floor.ledger.total_current_duration(&floor.tables, now))
    }

    pub fn total_current_cost(&self) -> ServiceResult<BTreeMap<TableId, Money>> {
        let rate = self.pricing.get()?;
        let now = self.clock.now();
        self.read(|floor| floor.ledger.total_current_cost(&floor.tables, rate, now))
    }

    pub fn total_cost_of_all_time(&self) -> ServiceResult<Money> {
        self.floor.with_floor(|floor| floor.ledger.total_cost_of_all_time())
    }

    pub fn average_duration(&self, table_id: TableId) -> ServiceResult<Duration> {
        self.read(|floor| floor.ledger.average_duration(&floor.tables, table_id))
    }

    /// Per-table averages. A table without finished visits maps to its own
    /// `NoHistory` error; the call itself only fails on poisoned state.
    pub fn average_duration_all_tables(&self) -> ServiceResult<BTreeMap<TableId, CoreResult<Duration>>> {
        self.floor
            .with_floor(|floor| floor.ledger.average_duration_all_tables(&floor.tables))
    }

    /// Every visit in creation order.
    pub fn visits(&self) -> ServiceResult<Vec<VisitSummary>> {
        self.floor
            .with_floor(|floor| floor.ledger.visits().iter().map(Visit::summary).collect())
    }

    pub fn visit(&self, id: Uuid) -> ServiceResult<Option<Visit>> {
        self.floor.with_floor(|floor| floor.ledger.visit(id).cloned())
    }

    fn read<F, R>(&self, f: F) -> ServiceResult<R>
    where
        F: FnOnce(&Floor) -> CoreResult<R>,
    {
        Ok(self.floor.with_floor(f)??)
    }
}

fn rejected(operation: &'static str, table_id: TableId, err: CoreError) -> ServiceError {
    // InvariantViolation is already logged at error level by the ledger.
    if !matches!(err, CoreError::InvariantViolation { .. }) {
        warn!(operation, %table_id, error = %err, "Visit transition rejected");
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::{TimeZone, Utc};
    use tablemeter_core::ManualClock;

    fn t(id: u32) -> TableId {
        TableId::new(id)
    }

    fn service(tables: u32) -> (VisitService, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 19, 0, 0).unwrap());
        let mut config = ServiceConfig::default();
        config.floor.table_count = tables;
        let service = VisitService::from_config_with_clock(&config, Arc::new(clock.clone())).unwrap();
        (service, clock)
    }

    fn code(err: ServiceError) -> ErrorCode {
        err.code()
    }

    #[test]
    fn test_single_visit_scenario() {
        let (service, clock) = service(3);
        let client = service.new_client();

        service.create_visit(client, t(1)).unwrap();
        assert_eq!(service.occupied_tables().unwrap()[0].id, t(1));
        assert_eq!(service.free_tables().unwrap().len(), 2);

        clock.advance(Duration::seconds(60));
        let visit = service.finish_visit(t(1)).unwrap();

        assert_eq!(visit.client(), client);
        assert_eq!(visit.duration(), Some(Duration::seconds(60)));
        assert_eq!(visit.cost(), Some(Money::from_major_minor(5, 0)));
        assert!(service.occupied_tables().unwrap().is_empty());
        assert_eq!(service.total_cost_of_all_time().unwrap(), Money::from_major_minor(5, 0));
    }

    #[test]
    fn test_average_over_two_visits() {
        let (service, clock) = service(3);

        service.create_visit(service.new_client(), t(2)).unwrap();
        clock.advance(Duration::seconds(60));
        service.finish_visit(t(2)).unwrap();

        service.create_visit(service.new_client(), t(2)).unwrap();
        clock.advance(Duration::seconds(180));
        service.finish_visit(t(2)).unwrap();

        assert_eq!(service.average_duration(t(2)).unwrap(), Duration::seconds(120));

        let all = service.average_duration_all_tables().unwrap();
        assert_eq!(all[&t(2)], Ok(Duration::seconds(120)));
        assert_eq!(all[&t(1)], Err(CoreError::NoHistory(t(1))));
    }

    #[test]
    fn test_error_codes_reach_the_caller() {
        let (service, _clock) = service(2);
        let client = service.new_client();

        assert_eq!(code(service.create_visit(client, t(9)).unwrap_err()), ErrorCode::NotFound);
        assert_eq!(code(service.finish_visit(t(1)).unwrap_err()), ErrorCode::NoActiveVisit);
        assert_eq!(code(service.current_cost(t(1)).unwrap_err()), ErrorCode::NoActiveVisit);
        assert_eq!(code(service.average_duration(t(1)).unwrap_err()), ErrorCode::NoHistory);

        service.create_visit(client, t(1)).unwrap();
        assert_eq!(
            code(service.create_visit(service.new_client(), t(1)).unwrap_err()),
            ErrorCode::TableOccupied
        );
        assert_eq!(service.visits().unwrap().len(), 1);
    }

    #[test]
    fn test_running_totals() {
        let (service, clock) = service(3);
        service.create_visit(service.new_client(), t(1)).unwrap();
        clock.advance(Duration::seconds(90));
        service.create_visit(service.new_client(), t(3)).unwrap();
        clock.advance(Duration::seconds(150));

        assert_eq!(service.current_duration(t(1)).unwrap(), Duration::seconds(240));

        let costs = service.total_current_cost().unwrap();
        assert_eq!(costs[&t(1)], Money::from_major_minor(20, 0));
        assert_eq!(costs[&t(3)], Money::from_major_minor(10, 0));

        let durations = service.total_current_duration().unwrap();
        assert_eq!(durations.keys().copied().collect::<Vec<_>>(), vec![t(1), t(3)]);

        assert!(service.total_cost_of_all_time().unwrap().is_zero());
    }

    #[test]
    fn test_rate_change_applies_to_open_visits_only() {
        let (service, clock) = service(2);
        service.create_visit(service.new_client(), t(1)).unwrap();
        service.create_visit(service.new_client(), t(2)).unwrap();
        clock.advance(Duration::seconds(120));
        service.finish_visit(t(1)).unwrap();

        service
            .set_price_per_minute(PricePerMinute::from_cents(1000).unwrap())
            .unwrap();
        let second = service.finish_visit(t(2)).unwrap();

        assert_eq!(second.cost(), Some(Money::from_major_minor(20, 0)));
        assert_eq!(service.total_cost_of_all_time().unwrap(), Money::from_major_minor(30, 0));
        assert_eq!(service.price_per_minute().unwrap().per_minute().cents(), 1000);
    }

    #[test]
    fn test_max_rate_bills_long_stay_and_floor_stays_usable() {
        let (service, clock) = service(1);
        service
            .set_price_per_minute(PricePerMinute::from_cents(tablemeter_core::MAX_PRICE_PER_MINUTE_CENTS).unwrap())
            .unwrap();
        assert!(PricePerMinute::from_cents(i64::MAX / 10).is_err());

        service.create_visit(service.new_client(), t(1)).unwrap();
        clock.advance(Duration::days(365 * 100));
        let visit = service.finish_visit(t(1)).unwrap();

        let minutes = Duration::days(365 * 100).num_minutes();
        assert_eq!(visit.cost(), Some(Money::from_cents(minutes * 1_000_000)));
        assert!(service.create_visit(service.new_client(), t(1)).is_ok());
        assert_eq!(service.total_cost_of_all_time().unwrap(), visit.cost().unwrap());
    }

    #[test]
    fn test_visit_lookup_and_summaries() {
        let (service, clock) = service(1);
        let created = service.create_visit(service.new_client(), t(1)).unwrap();
        clock.advance(Duration::seconds(30));
        service.finish_visit(t(1)).unwrap();

        let stored = service.visit(created.id()).unwrap().unwrap();
        assert!(stored.is_finished());
        assert_eq!(stored.cost(), Some(Money::zero()));
        assert!(service.visit(Uuid::new_v4()).unwrap().is_none());

        let summaries = service.visits().unwrap();
        assert_eq!(summaries[0].id, created.id());
        assert_eq!(summaries[0].duration_ms, Some(30_000));
    }

    #[test]
    fn test_added_table_is_usable() {
        let (service, _clock) = service(1);
        let table = service.add_table().unwrap();
        assert_eq!(table.id, t(2));
        assert!(service.create_visit(service.new_client(), table.id).is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_seating_books_table_once() {
        let (service, _clock) = service(1);

        let attempts: Vec<_> = (0..32)
            .map(|_| {
                let service = service.clone();
                tokio::task::spawn_blocking(move || service.create_visit(service.new_client(), t(1)))
            })
            .collect();

        let mut seated = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => seated += 1,
                Err(e) => assert_eq!(e.code(), ErrorCode::TableOccupied),
            }
        }

        assert_eq!(seated, 1);
        assert_eq!(service.visits().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_finish_bills_once() {
        let (service, clock) = service(1);
        service.create_visit(service.new_client(), t(1)).unwrap();
        clock.advance(Duration::seconds(300));

        let attempts: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                tokio::task::spawn_blocking(move || service.finish_visit(t(1)))
            })
            .collect();

        let mut finished = 0;
        for attempt in attempts {
            if attempt.await.unwrap().is_ok() {
                finished += 1;
            }
        }

        assert_eq!(finished, 1);
        assert_eq!(service.total_cost_of_all_time().unwrap(), Money::from_major_minor(25, 0));
        assert_eq!(service.free_tables().unwrap().len(), 1);
    }
}
