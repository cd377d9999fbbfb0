//! # State Module
//!
//! Shared, process-wide state behind the service.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────────┐      ┌──────────────────────┐        │
//! │  │         FloorState           │      │    PricingState      │        │
//! │  │                              │      │                      │        │
//! │  │  Arc<RwLock<Floor>>          │      │  Arc<RwLock<         │        │
//! │  │    ├── InMemoryTables        │      │    PricePerMinute>>  │        │
//! │  │    └── VisitLedger           │      │                      │        │
//! │  └──────────────────────────────┘      └──────────────────────┘        │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • Tables and ledger share ONE lock: create/finish are atomic over     │
//! │    both, so two callers can never seat the same table.                 │
//! │  • Queries take the read lock and run in parallel.                     │
//! │  • The rate has its own lock; changing it never touches visits.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod floor;
mod pricing;

pub use floor::{Floor, FloorState};
pub use pricing::PricingState;
