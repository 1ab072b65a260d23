//! Arrival record types.

use std::fmt;

use chrono::{DateTime, FixedOffset, TimeZone};
use serde::Serialize;

/// Headsign fragment that marks a train as inbound.
///
/// Porter is on the Red Line trunk, so every northbound train terminates at
/// Alewife while southbound trains run to Ashmont or Braintree. Matching on
/// the headsign is a heuristic tied to this stop, not a general rule; the
/// trip's `direction_id` would be the route-agnostic alternative.
const INBOUND_HEADSIGN: &str = "alewife";

/// Direction of travel relative to the stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    /// Classify a trip by its headsign.
    ///
    /// Case-insensitive substring match on "alewife" is inbound, anything
    /// else (including an empty headsign) is outbound.
    pub fn from_headsign(headsign: &str) -> Self {
        if headsign.to_lowercase().contains(INBOUND_HEADSIGN) {
            Direction::Inbound
        } else {
            Direction::Outbound
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One upcoming train at the stop.
///
/// Built once by the normalizer and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRecord {
    /// Upstream prediction id.
    pub id: String,

    /// Trip headsign, or "Unknown" when the trip carries none.
    pub destination: String,

    pub direction: Direction,

    /// Predicted arrival, in the offset the API reported it in.
    pub arrival_time: DateTime<FixedOffset>,

    /// Whole minutes until arrival, truncated toward zero. Never negative.
    pub minutes_away: i64,

    /// Upstream status text, or "Unknown".
    pub status: String,
}

impl PredictionRecord {
    /// Arrival time as a 12-hour clock string (e.g. "08:05 AM") in `tz`.
    pub fn display_time<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        self.arrival_time
            .with_timezone(tz)
            .format("%I:%M %p")
            .to_string()
    }
}
