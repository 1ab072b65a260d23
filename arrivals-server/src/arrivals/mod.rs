//! Upcoming arrivals at the configured stop.
//!
//! Turns a raw predictions document into two short, ordered lists of
//! trains, one per direction.

mod normalize;
mod record;

pub use normalize::{Arrivals, MAX_PER_DIRECTION, MalformedRecord, convert_prediction, normalize};
pub use record::{Direction, PredictionRecord};
