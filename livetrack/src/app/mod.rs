//! Application bootstrap and lifecycle management.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                    LiveTrackApp                       │
//! │                                                       │
//! │  1. EventStore (rows file or empty) ──┐               │
//! │  2. SessionContext ◄──────────────────┘               │
//! │     └── QueryOrchestrator, StreamConfig               │
//! │  3. StreamServer ──► one SessionScheduler per client  │
//! └──────────────────────────────────────────────────────┘
//! ```

mod bootstrap;
mod config;
mod error;

pub use bootstrap::LiveTrackApp;
pub use config::AppConfig;
pub use error::AppError;
