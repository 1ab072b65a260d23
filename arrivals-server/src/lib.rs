//! Porter Square arrivals board.
//!
//! Polls the MBTA predictions API once a minute, keeps the next few Red
//! Line trains in each direction, and serves them as a web page and JSON.

pub mod arrivals;
pub mod config;
pub mod mbta;
pub mod refresh;
pub mod snapshot;
pub mod web;
