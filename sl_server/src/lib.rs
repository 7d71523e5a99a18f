//! HTTP command surface for the Swiss tournament engine.
//!
//! The server owns the tournament store and the player directory, and
//! exposes the engine's commands as JSON endpoints.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
