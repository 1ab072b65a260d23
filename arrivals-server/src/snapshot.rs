//! Latest arrivals snapshot and its shared store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::sync::RwLock;

use crate::arrivals::{Arrivals, PredictionRecord};

/// The externally visible view of upcoming arrivals.
///
/// Built whole by the refresh loop and never modified in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Wall-clock time of the refresh as "HH:MM AM", empty before the first
    /// successful refresh.
    pub current_time: String,

    /// Timezone used for every displayed time.
    pub timezone: Tz,

    pub inbound: Vec<PredictionRecord>,

    pub outbound: Vec<PredictionRecord>,

    /// When this snapshot was computed; `None` for the initial empty state.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// The state served before any refresh has succeeded.
    pub fn empty(timezone: Tz) -> Self {
        Self {
            current_time: String::new(),
            timezone,
            inbound: Vec::new(),
            outbound: Vec::new(),
            refreshed_at: None,
        }
    }

    /// Build a snapshot from normalized arrivals computed at `now`.
    pub fn from_arrivals(arrivals: Arrivals, now: DateTime<Utc>, timezone: Tz) -> Self {
        Self {
            current_time: now.with_timezone(&timezone).format("%I:%M %p").to_string(),
            timezone,
            inbound: arrivals.inbound,
            outbound: arrivals.outbound,
            refreshed_at: Some(now),
        }
    }

    /// IANA name of the display timezone.
    pub fn timezone_name(&self) -> &'static str {
        self.timezone.name()
    }

    /// Arrival time of `record` in this snapshot's timezone.
    pub fn display_time(&self, record: &PredictionRecord) -> String {
        record.display_time(&self.timezone)
    }
}

/// Single-writer, many-reader holder of the current [`Snapshot`].
///
/// Readers get an `Arc` to a complete snapshot; the writer swaps in a new
/// `Arc` under the write lock. A reader therefore sees either the old
/// snapshot or the new one, never a mix.
#[derive(Clone)]
pub struct SnapshotStore {
    inner: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotStore {
    /// Create a store holding `initial`.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(initial))),
        }
    }

    /// The current snapshot.
    pub async fn current(&self) -> Arc<Snapshot> {
        let guard = self.inner.read().await;
        Arc::clone(&*guard)
    }

    /// Replace the current snapshot wholesale.
    pub async fn replace(&self, snapshot: Snapshot) {
        let next = Arc::new(snapshot);
        let mut guard = self.inner.write().await;
        *guard = next;
    }
}
