//! Web layer for the fare-split server.
//!
//! Provides an HTTP endpoint that analyses a shared bahn.de journey and
//! returns the cheapest combination of tickets with booking links.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
