//! Domain types shared between heartbeat clients and the registry.
//!
//! `BeatReport` is the only value that crosses the process boundary. It is
//! JSON-serialized on the wire; field names and status strings below are
//! the interoperability contract.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unique identifier for a reporting client.
pub type ClientId = String;

// ── Status ─────────────────────────────────────────────────────────

/// Health classification of a client, ordered by severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Operating normally.
    Ok,
    /// Elevated error rate, still serving.
    Degraded,
    /// Error rate past the error threshold, or a forced error.
    Error,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Ok => "OK",
            Status::Degraded => "DEGRADED",
            Status::Error => "ERROR",
        };
        f.write_str(s)
    }
}

// ── Thresholds ─────────────────────────────────────────────────────

/// Error-rate boundaries used to classify accumulated outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Error rate at or above which a client is Degraded (e.g., 0.2 = 20%).
    pub degraded_error_rate: f64,
    /// Error rate at or above which a client is Error (e.g., 0.5 = 50%).
    pub error_error_rate: f64,
    /// Minimum observations before the rates apply; below this the
    /// previous status is kept.
    pub min_total_ops: u64,
}

/// Rejected threshold configurations.
#[derive(Debug, Error, PartialEq)]
pub enum ThresholdError {
    #[error("degraded_error_rate must be within (0, 1), got {0}")]
    DegradedRateOutOfRange(f64),

    #[error("error_error_rate must be within (0, 1), got {0}")]
    ErrorRateOutOfRange(f64),

    #[error("degraded_error_rate {degraded} exceeds error_error_rate {error}")]
    RateOrdering { degraded: f64, error: f64 },
}

impl Thresholds {
    /// Check the invariants: both rates in (0, 1), degraded <= error.
    pub fn validate(&self) -> Result<(), ThresholdError> {
        if !(self.degraded_error_rate > 0.0 && self.degraded_error_rate < 1.0) {
            return Err(ThresholdError::DegradedRateOutOfRange(
                self.degraded_error_rate,
            ));
        }
        if !(self.error_error_rate > 0.0 && self.error_error_rate < 1.0) {
            return Err(ThresholdError::ErrorRateOutOfRange(self.error_error_rate));
        }
        if self.degraded_error_rate > self.error_error_rate {
            return Err(ThresholdError::RateOrdering {
                degraded: self.degraded_error_rate,
                error: self.error_error_rate,
            });
        }
        Ok(())
    }
}

// ── BeatReport ─────────────────────────────────────────────────────

/// A single status snapshot transmitted from a client to the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatReport {
    pub client_id: ClientId,
    pub status: Status,
    /// Successes accumulated since the last successfully delivered report.
    pub success_count: u64,
    /// Errors accumulated since the last successfully delivered report.
    pub error_count: u64,
    /// Unix timestamp (milliseconds) when the report was built.
    pub timestamp: u64,
    /// The client's reporting interval (milliseconds).
    pub beat_delay: u64,
}

impl BeatReport {
    /// Whether this report is older than the client's own declared
    /// reporting interval. A liveness heuristic, not a guarantee: a slow
    /// network looks the same as a crashed client.
    pub fn is_stale(&self, now: u64) -> bool {
        now.saturating_sub(self.timestamp) > self.beat_delay
    }
}

/// Current unix timestamp in milliseconds.
pub fn epoch_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
