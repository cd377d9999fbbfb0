//! # Domain Types
//!
//! Identifiers and small value types shared by the registry, visits and the
//! ledger.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Client      │   │      Table      │   │ PricePerMinute  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (ClientId)  │   │  id (TableId)   │   │  Money / minute │       │
//! │  │  immutable      │   │  occupied flag  │   │  500 = 5.00     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ClientIdAllocator ── hands out ClientId 0, 1, 2, ... (never reused)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::validation::validate_price_per_minute;

// =============================================================================
// Client
// =============================================================================

/// Unique client identifier within one allocator's lifetime.
///
/// Serialize-only: ids come from [`ClientIdAllocator`], never from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ClientId(u64);

impl ClientId {
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A restaurant guest. Immutable after allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Client {
    id: ClientId,
}

impl Client {
    #[inline]
    pub const fn id(&self) -> ClientId {
        self.id
    }
}

/// Allocates clients with monotonically increasing ids.
///
/// Owned by whoever builds the service and passed around explicitly, so two
/// allocators in the same process (e.g. two tests) never interfere.
#[derive(Debug, Default)]
pub struct ClientIdAllocator {
    next: AtomicU64,
}

impl ClientIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a client whose id no earlier call has returned.
    pub fn allocate(&self) -> Client {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        Client { id: ClientId(id) }
    }
}

// =============================================================================
// Table
// =============================================================================

/// Table identifier as printed on the floor plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableId(u32);

impl TableId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        TableId(id)
    }

    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A table and its occupancy flag.
///
/// The registry owns tables; the ledger only reads them and flips `occupied`
/// through [`crate::registry::TableRegistry::set_occupied`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub occupied: bool,
}

impl Table {
    /// A new, free table.
    pub const fn new(id: TableId) -> Self {
        Table {
            id,
            occupied: false,
        }
    }

    #[inline]
    pub const fn is_free(&self) -> bool {
        !self.occupied
    }
}

// =============================================================================
// Price Per Minute
// =============================================================================

/// Billing rate: money charged per whole minute of a visit.
///
/// Only built through [`PricePerMinute::new`], so every rate in circulation
/// is within `0..=MAX_PRICE_PER_MINUTE_CENTS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricePerMinute(Money);

impl PricePerMinute {
    /// Creates a rate, rejecting negative or oversized amounts.
    pub fn new(per_minute: Money) -> CoreResult<Self> {
        validate_price_per_minute(per_minute.cents())?;
        Ok(PricePerMinute(per_minute))
    }

    /// Creates a rate from cents per minute.
    pub fn from_cents(cents: i64) -> CoreResult<Self> {
        Self::new(Money::from_cents(cents))
    }

    #[inline]
    pub const fn per_minute(&self) -> Money {
        self.0
    }

    /// Cost of `minutes` whole minutes.
    ///
    /// ## Errors
    /// - [`CoreError::CostOverflow`] - the product does not fit in cents
    pub fn charge(&self, minutes: i64) -> CoreResult<Money> {
        self.0
            .checked_times(minutes)
            .ok_or(CoreError::CostOverflow { minutes })
    }

    /// Bypasses validation so tests can exercise the overflow path.
    #[cfg(test)]
    pub(crate) const fn unchecked(cents: i64) -> Self {
        PricePerMinute(Money::from_cents(cents))
    }
}

impl Default for PricePerMinute {
    fn default() -> Self {
        PricePerMinute(Money::from_cents(crate::DEFAULT_PRICE_PER_MINUTE_CENTS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[test]
    fn test_allocator_never_repeats() {
        let clients = ClientIdAllocator::new();
        let a = clients.allocate();
        let b = clients.allocate();
        let c = clients.allocate();
        assert_eq!(a.id().value(), 0);
        assert!(a.id() < b.id() && b.id() < c.id());
    }

    #[test]
    fn test_allocators_are_independent() {
        let first = ClientIdAllocator::new();
        let second = ClientIdAllocator::new();
        first.allocate();
        assert_eq!(second.allocate().id().value(), 0);
    }

    #[test]
    fn test_new_table_is_free() {
        let table = Table::new(TableId::new(4));
        assert!(table.is_free());
        assert_eq!(table.id.to_string(), "4");
    }

    #[test]
    fn test_default_rate() {
        let rate = PricePerMinute::default();
        assert_eq!(rate.per_minute(), Money::from_major_minor(5, 0));
        assert_eq!(rate.charge(2), Ok(Money::from_major_minor(10, 0)));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let err = PricePerMinute::from_cents(-1).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(PricePerMinute::from_cents(0).is_ok());
    }

    #[test]
    fn test_oversized_rate_rejected() {
        let err = PricePerMinute::from_cents(i64::MAX / 10).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(crate::error::ValidationError::OutOfRange { .. })
        ));
        assert!(PricePerMinute::from_cents(crate::MAX_PRICE_PER_MINUTE_CENTS).is_ok());
    }

    #[test]
    fn test_charge_overflow_is_an_error() {
        let rate = PricePerMinute::unchecked(i64::MAX / 10);
        assert_eq!(rate.charge(60), Err(CoreError::CostOverflow { minutes: 60 }));
    }

    #[test]
    fn test_max_rate_never_overflows() {
        // Longest span between two representable timestamps.
        let minutes = (DateTime::<Utc>::MAX_UTC - DateTime::<Utc>::MIN_UTC).num_minutes();
        let rate = PricePerMinute::from_cents(crate::MAX_PRICE_PER_MINUTE_CENTS).unwrap();
        assert!(rate.charge(minutes).is_ok());
    }
}
