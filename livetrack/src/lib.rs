//! LiveTrack - live object position streaming
//!
//! Streams positions of tracked objects (people, vehicles, equipment) on a
//! facility level to map clients. Each client session periodically reads new
//! sensor events from a time-indexed event store, normalizes them into
//! geodetic positions, deduplicates them against what the client has already
//! seen, retires objects that went quiet, and pushes one update per tick.
//!
//! # Modules
//!
//! - [`coord`]: local metric frame to latitude/longitude
//! - [`object`]: event rows and their normalization into [`object::TrackedObject`]
//! - [`store`]: the event store contract and an in-memory implementation
//! - [`orchestrator`]: per-tick query planning and concurrent execution
//! - [`tracker`]: per-session object history and retirement
//! - [`session`]: the per-client tick loop
//! - [`server`]: WebSocket front end
//! - [`app`], [`config`], [`logging`]: process wiring

pub mod app;
pub mod config;
pub mod coord;
pub mod logging;
pub mod object;
pub mod orchestrator;
pub mod server;
pub mod session;
pub mod store;
pub mod tracker;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
