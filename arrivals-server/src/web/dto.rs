//! JSON response types.

use serde::Serialize;

use crate::arrivals::{Direction, PredictionRecord};
use crate::snapshot::Snapshot;

/// Response for `GET /api/trains`.
#[derive(Debug, Serialize)]
pub struct TrainsResponse {
    /// Time of the last successful refresh, e.g. "08:05 AM"
    pub current_time: String,

    /// IANA timezone all times are shown in
    pub timezone: String,

    /// Trains toward Alewife, soonest first
    pub inbound_trains: Vec<TrainResult>,

    /// Trains toward Ashmont/Braintree, soonest first
    pub outbound_trains: Vec<TrainResult>,
}

/// A single upcoming train.
#[derive(Debug, Serialize)]
pub struct TrainResult {
    /// Upstream prediction ID
    pub id: String,

    /// Local arrival time, e.g. "08:05 AM"
    pub time: String,

    /// Whole minutes until arrival
    pub minutes_away: i64,

    /// Headsign
    pub destination: String,

    /// Upstream status text
    pub status: String,

    pub direction: Direction,

    /// Arrival time as RFC 3339
    pub arrival_time: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl TrainsResponse {
    /// Create from a snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        let convert = |records: &[PredictionRecord]| -> Vec<TrainResult> {
            records
                .iter()
                .map(|r| TrainResult::from_record(r, snapshot))
                .collect()
        };

        Self {
            current_time: snapshot.current_time.clone(),
            timezone: snapshot.timezone_name().to_string(),
            inbound_trains: convert(&snapshot.inbound),
            outbound_trains: convert(&snapshot.outbound),
        }
    }
}

impl TrainResult {
    /// Create from a record, formatting times in the snapshot's timezone.
    pub fn from_record(record: &PredictionRecord, snapshot: &Snapshot) -> Self {
        Self {
            id: record.id.clone(),
            time: snapshot.display_time(record),
            minutes_away: record.minutes_away,
            destination: record.destination.clone(),
            status: record.status.clone(),
            direction: record.direction,
            arrival_time: record.arrival_time.to_rfc3339(),
        }
    }
}
