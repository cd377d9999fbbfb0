//! # Visit Record
//!
//! One occupancy episode: a client seated at a table from `started_at` until
//! the ledger finishes the visit.
//!
//! ## Lifecycle
//! ```text
//!   create_visit                     finish_visit
//!  ─────────────►  ACTIVE  ───────────────────────►  FINISHED
//!                  duration = None                   duration = Some(d)
//!                  cost     = None                   cost     = Some(c)
//!                                                    (terminal, never reopened)
//! ```
//!
//! ## Billing
//! Cost is charged per *whole* minute; partial minutes are dropped:
//! ```text
//!   125s elapsed  →  2 whole minutes  →  2 × rate
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreResult;
use crate::money::Money;
use crate::types::{Client, PricePerMinute, TableId};

/// A single visit.
///
/// Only the ledger can finish a visit; everything else is read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    id: Uuid,
    client: Client,
    table_id: TableId,
    started_at: DateTime<Utc>,
    duration: Option<Duration>,
    cost: Option<Money>,
    finished: bool,
}

impl Visit {
    pub(crate) fn start(client: Client, table_id: TableId, started_at: DateTime<Utc>) -> Self {
        Visit {
            id: Uuid::new_v4(),
            client,
            table_id,
            started_at,
            duration: None,
            cost: None,
            finished: false,
        }
    }

    /// Computes the final duration and cost at `now` without touching the
    /// visit. Any failure happens here, before [`Visit::close`].
    pub(crate) fn bill(&self, now: DateTime<Utc>, rate: PricePerMinute) -> CoreResult<(Duration, Money)> {
        Ok((self.current_duration(now), self.cost_at(rate, now)?))
    }

    /// Freezes a bill from [`Visit::bill`]. Callers guarantee the visit is
    /// still active.
    pub(crate) fn close(&mut self, (duration, cost): (Duration, Money)) {
        debug_assert!(!self.finished, "visit {} finished twice", self.id);
        self.duration = Some(duration);
        self.cost = Some(cost);
        self.finished = true;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn client(&self) -> Client {
        self.client
    }

    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Final duration; `None` while active.
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Final cost; `None` while active.
    pub fn cost(&self) -> Option<Money> {
        self.cost
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn is_active(&self) -> bool {
        !self.finished
    }

    /// Time elapsed between `started_at` and `now`.
    ///
    /// Clamped at zero so a clock that steps backwards never produces a
    /// negative stay.
    pub fn current_duration(&self, now: DateTime<Utc>) -> Duration {
        (now - self.started_at).max(Duration::zero())
    }

    /// Whole minutes elapsed at `now`, truncated toward zero.
    pub fn whole_minutes(&self, now: DateTime<Utc>) -> i64 {
        self.current_duration(now).num_minutes()
    }

    /// What the visit would cost if billed at `now`.
    pub fn cost_at(&self, rate: PricePerMinute, now: DateTime<Utc>) -> CoreResult<Money> {
        rate.charge(self.whole_minutes(now))
    }

    /// Serializable snapshot of this visit.
    pub fn summary(&self) -> VisitSummary {
        VisitSummary::from(self)
    }
}

/// Flat, serializable view of a [`Visit`].
///
/// Durations are carried as whole milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitSummary {
    pub id: Uuid,
    pub client_id: u64,
    pub table_id: u32,
    pub started_at: DateTime<Utc>,
    pub duration_ms: Option<i64>,
    pub cost_cents: Option<i64>,
    pub finished: bool,
}

impl From<&Visit> for VisitSummary {
    fn from(visit: &Visit) -> Self {
        VisitSummary {
            id: visit.id,
            client_id: visit.client.id().value(),
            table_id: visit.table_id.value(),
            started_at: visit.started_at,
            duration_ms: visit.duration.map(|d| d.num_milliseconds()),
            cost_cents: visit.cost.map(|c| c.cents()),
            finished: visit.finished,
        }
    }
}
