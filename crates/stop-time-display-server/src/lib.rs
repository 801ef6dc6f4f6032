//! # stop-time-display-server
//!
//! Tells a notebook user when the hub will cull their server.

pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod utils;

pub use routes::build_router;
pub use state::AppState;
