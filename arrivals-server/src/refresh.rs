//! Periodic refresh of the arrivals snapshot.
//!
//! One tick fetches predictions, normalizes them, and swaps the result into
//! the [`SnapshotStore`]. A failed tick leaves the store alone; the next
//! tick is the retry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::arrivals::normalize;
use crate::mbta::{FetchError, PredictionSource};
use crate::snapshot::{Snapshot, SnapshotStore};

/// How often predictions are refreshed.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Counts from one successful refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub inbound: usize,
    pub outbound: usize,
    /// Predictions dropped as malformed.
    pub skipped: usize,
    /// Predictions dropped because the train already arrived.
    pub departed: usize,
}

/// Runs refresh ticks against a prediction source.
pub struct Refresher<S> {
    source: S,
    store: SnapshotStore,
    timezone: Tz,
}

impl<S: PredictionSource> Refresher<S> {
    pub fn new(source: S, store: SnapshotStore, timezone: Tz) -> Self {
        Self {
            source,
            store,
            timezone,
        }
    }

    /// The store this refresher writes to.
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run one tick at the current time.
    pub async fn refresh_once(&self) -> Result<RefreshSummary, FetchError> {
        self.refresh_at(Utc::now()).await
    }

    /// Run one tick, treating `now` as the current time.
    ///
    /// On error the stored snapshot is left untouched.
    pub async fn refresh_at(&self, now: DateTime<Utc>) -> Result<RefreshSummary, FetchError> {
        let doc = self.source.fetch_predictions().await?;
        let arrivals = normalize(&doc, now);

        let summary = RefreshSummary {
            inbound: arrivals.inbound.len(),
            outbound: arrivals.outbound.len(),
            skipped: arrivals.skipped,
            departed: arrivals.departed,
        };

        self.store
            .replace(Snapshot::from_arrivals(arrivals, now, self.timezone))
            .await;

        Ok(summary)
    }

    /// Run one tick and log the outcome instead of returning it.
    pub async fn tick(&self) {
        match self.refresh_once().await {
            Ok(summary) => info!(
                inbound = summary.inbound,
                outbound = summary.outbound,
                skipped = summary.skipped,
                departed = summary.departed,
                "refreshed arrivals"
            ),
            Err(e) => warn!("failed to refresh arrivals, keeping previous snapshot: {e}"),
        }
    }
}

/// Spawn the background refresh loop.
///
/// The first interval tick fires immediately and is skipped: startup has
/// already run a refresh before serving. Ticks run one at a time, and a
/// tick that overruns the period delays the next one rather than queueing
/// a burst.
pub fn spawn_refresh_loop<S>(refresher: Arc<Refresher<S>>, period: Duration) -> JoinHandle<()>
where
    S: PredictionSource + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            refresher.tick().await;
        }
    })
}
