//! Prediction normalization.
//!
//! Joins each prediction to its trip, computes minutes until arrival,
//! drops trains that have already arrived, and splits the rest by
//! direction. Individual bad predictions are skipped; the function itself
//! never fails.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::mbta::{PredictionResource, PredictionsDocument};

use super::record::{Direction, PredictionRecord};

/// Maximum number of trains kept per direction.
pub const MAX_PER_DIRECTION: usize = 5;

/// Placeholder for a missing headsign or status.
const UNKNOWN: &str = "Unknown";

/// Why a single prediction could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedRecord {
    /// Resource is not a prediction object (missing id, wrong field types)
    #[error("malformed prediction resource: {0}")]
    Shape(String),

    /// Prediction has no trip relationship
    #[error("prediction has no trip relationship")]
    MissingTrip,

    /// Trip id not present in the included resources
    #[error("trip {0} not found in included resources")]
    UnjoinableTrip(String),

    /// No predicted arrival (e.g. first stop of a trip)
    #[error("prediction has no arrival time")]
    MissingArrival,

    /// Arrival time is not ISO 8601 with an offset
    #[error("invalid arrival time: {0}")]
    InvalidArrival(String),
}

/// Upcoming arrivals split by direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arrivals {
    /// Trains toward Alewife, soonest first.
    pub inbound: Vec<PredictionRecord>,

    /// All other trains, soonest first.
    pub outbound: Vec<PredictionRecord>,

    /// Predictions skipped as malformed.
    pub skipped: usize,

    /// Predictions dropped because the train already arrived.
    pub departed: usize,
}

/// Normalize a predictions document relative to `now`.
///
/// Output order follows the document order, which is ascending arrival
/// time because the request asks for `sort=arrival_time`. Each direction is
/// cut to [`MAX_PER_DIRECTION`] after filtering.
pub fn normalize(doc: &PredictionsDocument, now: DateTime<Utc>) -> Arrivals {
    let mut arrivals = Arrivals::default();

    for (index, value) in doc.data.iter().enumerate() {
        let record = match convert_prediction(value, doc, now) {
            Ok(record) => record,
            Err(e) => {
                debug!(index, "skipping prediction: {e}");
                arrivals.skipped += 1;
                continue;
            }
        };

        if record.minutes_away < 0 {
            arrivals.departed += 1;
            continue;
        }

        let list = match record.direction {
            Direction::Inbound => &mut arrivals.inbound,
            Direction::Outbound => &mut arrivals.outbound,
        };
        if list.len() < MAX_PER_DIRECTION {
            list.push(record);
        }
    }

    arrivals
}

/// Convert a single raw prediction, resolving its trip from `doc.included`.
///
/// Does not filter on `minutes_away`; a train that already arrived comes
/// back with a negative value.
pub fn convert_prediction(
    value: &serde_json::Value,
    doc: &PredictionsDocument,
    now: DateTime<Utc>,
) -> Result<PredictionRecord, MalformedRecord> {
    let prediction = PredictionResource::from_value(value)
        .map_err(|e| MalformedRecord::Shape(e.to_string()))?;

    let trip_id = prediction
        .relationships
        .trip
        .as_ref()
        .and_then(|t| t.id())
        .ok_or(MalformedRecord::MissingTrip)?;

    let trip = doc
        .find_included("trip", trip_id)
        .ok_or_else(|| MalformedRecord::UnjoinableTrip(trip_id.to_string()))?;

    let arrival_raw = prediction
        .attributes
        .arrival_time
        .as_deref()
        .ok_or(MalformedRecord::MissingArrival)?;

    // RFC 3339 accepts both a 'Z' suffix and a numeric offset.
    let arrival_time = DateTime::parse_from_rfc3339(arrival_raw)
        .map_err(|_| MalformedRecord::InvalidArrival(arrival_raw.to_string()))?;

    // Integer division truncates toward zero: 90s -> 1, -30s -> 0.
    let minutes_away = (arrival_time.with_timezone(&Utc) - now).num_seconds() / 60;

    let headsign = trip
        .trip_attributes()
        .and_then(|a| a.headsign)
        .filter(|h| !h.is_empty());

    let direction = Direction::from_headsign(headsign.as_deref().unwrap_or_default());

    Ok(PredictionRecord {
        id: prediction.id.clone(),
        destination: headsign.unwrap_or_else(|| UNKNOWN.to_string()),
        direction,
        arrival_time,
        minutes_away,
        status: prediction
            .attributes
            .status
            .clone()
            .unwrap_or_else(|| UNKNOWN.to_string()),
    })
}
