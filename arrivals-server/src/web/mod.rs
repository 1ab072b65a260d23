//! Web layer for the arrivals board.
//!
//! Serves the current snapshot as an HTML page and as JSON, plus a list of
//! the route's stops.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
