//! MBTA v3 API client.
//!
//! The MBTA API speaks JSON:API: every response carries a top-level `data`
//! array and, when `include=` is requested, an `included` array of related
//! resources that predictions point at through `relationships`.
//!
//! Only the predictions endpoint feeds the arrivals snapshot. The stops
//! endpoint backs the `/stops` page and is fetched on demand.

mod client;
mod error;
mod types;

pub use client::{MbtaClient, MbtaConfig, PredictionSource};
pub use error::FetchError;
pub use types::{
    IncludedResource, PredictionAttributes, PredictionRelationships, PredictionResource,
    PredictionsDocument, Relationship, ResourceIdentifier, StopAttributes, StopResource,
    StopsDocument, TripAttributes,
};
