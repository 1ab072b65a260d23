//! MBTA API response DTOs.
//!
//! These types map directly to the JSON:API documents returned by
//! `api-v3.mbta.com`. Nearly everything is `Option` because the API emits
//! `null` for attributes it has no value for (e.g. `arrival_time` at a
//! terminus, where only a departure is predicted).
//!
//! Only the document envelope is decoded strictly. Array elements are
//! decoded one at a time so a single odd resource cannot sink the whole
//! response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Response from `GET /predictions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionsDocument {
    /// Raw prediction resources, in the order requested by `sort=`.
    /// Decode each with [`PredictionResource::from_value`].
    #[serde(default)]
    pub data: Vec<serde_json::Value>,

    /// Related resources requested via `include=` (trips, schedules,
    /// vehicles). Entries without a string `type` and `id` are dropped.
    #[serde(default, deserialize_with = "skip_malformed")]
    pub included: Vec<IncludedResource>,
}

impl PredictionsDocument {
    /// Find an included resource by type and id.
    pub fn find_included(&self, kind: &str, id: &str) -> Option<&IncludedResource> {
        self.included.iter().find(|r| r.kind == kind && r.id == id)
    }
}

/// Decode a JSON array, dropping elements that do not fit `T`.
fn skip_malformed<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Vec::<serde_json::Value>::deserialize(deserializer)?;
    Ok(values
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}

/// A single prediction resource.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionResource {
    pub id: String,

    #[serde(default)]
    pub attributes: PredictionAttributes,

    #[serde(default)]
    pub relationships: PredictionRelationships,
}

impl PredictionResource {
    /// Decode one element of [`PredictionsDocument::data`].
    pub fn from_value(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

/// Attributes of a prediction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionAttributes {
    /// Predicted arrival (ISO 8601 with offset). Null at the first stop of a trip.
    pub arrival_time: Option<String>,

    /// Free-text status, e.g. "Approaching" or "Stopped 2 stops away".
    pub status: Option<String>,
}

/// Relationships of a prediction. Only `trip` is used for joining.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionRelationships {
    pub trip: Option<Relationship>,
}

/// A JSON:API relationship object. `data` is null when the link is absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Relationship {
    pub data: Option<ResourceIdentifier>,
}

impl Relationship {
    /// The related resource id, if the relationship is populated.
    pub fn id(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.id.as_str())
    }
}

/// `{ "type": ..., "id": ... }` pointer to another resource.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// An entry in the `included` array.
///
/// Attributes are kept untyped because the array mixes trips, schedules and
/// vehicles; callers decode the shape they need.
#[derive(Debug, Clone, Deserialize)]
pub struct IncludedResource {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub attributes: serde_json::Value,
}

impl IncludedResource {
    /// Decode attributes as a trip. Returns `None` if this is not a trip or
    /// the attributes do not fit.
    pub fn trip_attributes(&self) -> Option<TripAttributes> {
        if self.kind != "trip" {
            return None;
        }
        TripAttributes::deserialize(&self.attributes).ok()
    }
}

/// Attributes of an included trip resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripAttributes {
    /// Rider-facing destination, e.g. "Alewife" or "Ashmont".
    pub headsign: Option<String>,
    /// 0 or 1; meaning is route-specific.
    pub direction_id: Option<u8>,
}

/// Response from `GET /stops`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopsDocument {
    #[serde(default, deserialize_with = "skip_malformed")]
    pub data: Vec<StopResource>,
}

/// A stop resource.
#[derive(Debug, Clone, Deserialize)]
pub struct StopResource {
    pub id: String,
    #[serde(default)]
    pub attributes: StopAttributes,
}

/// Attributes of a stop.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopAttributes {
    pub name: Option<String>,
    pub municipality: Option<String>,
}
