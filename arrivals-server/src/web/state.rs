//! Application state for the web layer.

use std::sync::Arc;

use crate::mbta::MbtaClient;
use crate::snapshot::SnapshotStore;

/// Shared application state.
///
/// Handlers only ever read the snapshot store; the refresh loop owns writes.
#[derive(Clone)]
pub struct AppState {
    /// Latest arrivals snapshot
    pub snapshots: SnapshotStore,

    /// MBTA client, used directly for the stops page
    pub mbta: Arc<MbtaClient>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(snapshots: SnapshotStore, mbta: MbtaClient) -> Self {
        Self {
            snapshots,
            mbta: Arc::new(mbta),
        }
    }
}
