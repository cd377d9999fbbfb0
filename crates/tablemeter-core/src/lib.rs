//! # tablemeter-core: Visit Lifecycle & Billing
//!
//! Pure domain logic for restaurant table occupancy: who sits where, for how
//! long, and what it costs. No I/O, no locks, no global state.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              tablemeter-service (VisitService)                  │   │
//! │  │   RwLock over tables + ledger, clock, rate, config, logging     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ tablemeter-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  ledger   │  │   visit   │  │ registry  │  │   money   │  │   │
//! │  │   │ lifecycle │  │ duration  │  │  tables   │  │   cents   │  │   │
//! │  │   │ aggregate │  │   cost    │  │ occupancy │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`ledger`] - Visit state machine and all aggregate queries
//! - [`visit`] - A single visit and its duration/cost projections
//! - [`registry`] - Table lookup and occupancy storage
//! - [`types`] - Client, Table, PricePerMinute and their ids
//! - [`money`] - Integer-cent Money type
//! - [`clock`] - Injectable source of "now"
//! - [`error`] - Domain error types
//! - [`validation`] - Configuration value checks
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use tablemeter_core::{ClientIdAllocator, InMemoryTables, Money, PricePerMinute, TableId, VisitLedger};
//!
//! let mut tables = InMemoryTables::with_tables(2);
//! let mut ledger = VisitLedger::new();
//! let clients = ClientIdAllocator::new();
//! let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 19, 0, 0).unwrap();
//!
//! ledger.create_visit(&mut tables, clients.allocate(), TableId::new(1), t0).unwrap();
//! let visit = ledger
//!     .finish_visit(&mut tables, TableId::new(1), t0 + Duration::seconds(125), PricePerMinute::default())
//!     .unwrap();
//!
//! // 125s → 2 whole minutes → 2 × 5.00
//! assert_eq!(visit.cost(), Some(Money::from_major_minor(10, 0)));
//! ```

pub mod clock;
pub mod error;
pub mod ledger;
pub mod money;
pub mod registry;
pub mod types;
pub mod validation;
pub mod visit;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::VisitLedger;
pub use money::Money;
pub use registry::{InMemoryTables, TableRegistry};
pub use types::*;
pub use visit::{Visit, VisitSummary};

/// Default billing rate: 5.00 per minute.
pub const DEFAULT_PRICE_PER_MINUTE_CENTS: i64 = 500;

/// Highest accepted rate: 10,000.00 per minute.
///
/// Keeps `rate × minutes` inside `i64` cents for any span `DateTime<Utc>`
/// can represent.
pub const MAX_PRICE_PER_MINUTE_CENTS: i64 = 1_000_000;

/// Default number of tables on a fresh floor.
pub const DEFAULT_TABLE_COUNT: u32 = 10;

/// Upper bound for the configured floor size.
pub const MAX_TABLES: u32 = 1000;
