//! pulsegrid-state: heartbeat registry for PulseGrid.
//!
//! Holds the shared domain types (`Status`, `Thresholds`, `BeatReport`)
//! and the in-memory `HeartbeatRegistry` that keeps the latest report per
//! client and answers point and fleet-wide health queries.
//!
//! # Architecture
//!
//! The registry is a single map from client id to its most recent
//! `BeatReport`, guarded by one mutex. Each incoming report overwrites
//! the prior entry wholesale; no history is retained and nothing is
//! persisted across restarts.
//!
//! The `HeartbeatRegistry` is `Clone` + `Send` + `Sync` (backed by an
//! `Arc`) and can be shared across async tasks.

pub mod error;
pub mod registry;
pub mod types;

pub use error::{RegistryError, RegistryResult};
pub use registry::HeartbeatRegistry;
pub use types::*;
