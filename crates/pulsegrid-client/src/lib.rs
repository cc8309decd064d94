//! pulsegrid-client: client-side health instrumentation for PulseGrid.
//!
//! Application code records operation outcomes on a `HeartbeatClient`;
//! the client classifies its own health from the accumulated counts and
//! pushes snapshots to the registry, periodically and on every status
//! transition.
//!
//! # Architecture
//!
//! ```text
//! HeartbeatClient
//!   ├── success()/error()/force_error() ← called per operation outcome
//!   ├── classify() → Status (pure, threshold-driven)
//!   ├── on_status_change hook (invoked outside the state lock)
//!   └── start() → periodic beat loop
//!
//! BeatTransport
//!   └── HttpBeatTransport → POST JSON report to the registry
//! ```
//!
//! # Failure semantics
//!
//! Reporting is fire-and-forget: a beat that still fails after the retry
//! budget is dropped, the counters stay put, and the next trigger carries
//! the accumulated counts. The instrumentation calls never fail.

pub mod classifier;
pub mod client;
pub mod transport;

pub use classifier::{ClientState, classify};
pub use client::{ClientConfig, ClientError, HeartbeatClient, RetryPolicy, StatusChangeHook};
pub use transport::{BeatTransport, BoxFuture, HttpBeatTransport, TransportError, TransportResult};
