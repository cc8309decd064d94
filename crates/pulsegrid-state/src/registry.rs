//! HeartbeatRegistry: the aggregator's single, non-replicated view of
//! fleet health.
//!
//! One map from client id to its latest `BeatReport`, guarded by one
//! mutex. Every operation takes the lock for its whole duration, so
//! callers always observe a consistent snapshot. Reports are applied in
//! arrival order with no freshness guard: a delayed report overwrites a
//! newer one (see DESIGN.md).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::{RegistryError, RegistryResult};
use crate::types::{BeatReport, ClientId, Status};

/// Thread-safe registry holding the most recent report per client.
#[derive(Clone, Default)]
pub struct HeartbeatRegistry {
    clients: Arc<Mutex<HashMap<ClientId, BeatReport>>>,
}

impl HeartbeatRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ClientId, BeatReport>> {
        // A panicked writer cannot leave the map partially updated; keep
        // serving rather than propagating the poison.
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Ingestion ──────────────────────────────────────────────────

    /// Insert or replace the entry for the report's client id, wholesale.
    pub fn record_report(&self, report: BeatReport) {
        debug!(
            client_id = %report.client_id,
            status = %report.status,
            success_count = report.success_count,
            error_count = report.error_count,
            "beat recorded"
        );
        self.lock().insert(report.client_id.clone(), report);
    }

    // ── Point queries ──────────────────────────────────────────────

    /// Latest known status for a client.
    pub fn get_status(&self, client_id: &str) -> RegistryResult<Status> {
        self.lock()
            .get(client_id)
            .map(|report| report.status)
            .ok_or_else(|| RegistryError::NotFound(client_id.to_string()))
    }

    /// Latest full report for a client.
    pub fn get_report(&self, client_id: &str) -> RegistryResult<BeatReport> {
        self.lock()
            .get(client_id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(client_id.to_string()))
    }

    // ── Fleet queries ──────────────────────────────────────────────

    /// Snapshot copy of every current entry. Order unspecified.
    pub fn list_all(&self) -> Vec<BeatReport> {
        self.lock().values().cloned().collect()
    }

    /// True iff any stored entry's status is `Error`.
    pub fn any_error(&self) -> bool {
        self.lock()
            .values()
            .any(|report| report.status == Status::Error)
    }

    /// True iff any stored entry is older than its client's own declared
    /// reporting interval. False for an empty registry.
    pub fn any_dead(&self, now: u64) -> bool {
        self.lock().values().any(|report| report.is_stale(now))
    }

    /// Ids of all clients whose latest report is stale at `now`.
    pub fn dead_clients(&self, now: u64) -> Vec<ClientId> {
        self.lock()
            .iter()
            .filter(|(_, report)| report.is_stale(now))
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Number of clients currently tracked.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // ── Eviction ───────────────────────────────────────────────────

    /// Remove a client's entry. Returns true if it existed; absent ids
    /// are a no-op.
    pub fn delete_client(&self, client_id: &str) -> bool {
        let existed = self.lock().remove(client_id).is_some();
        debug!(%client_id, existed, "client deleted");
        existed
    }

    /// Clear the registry to empty.
    pub fn reset_all(&self) {
        self.lock().clear();
        debug!("registry reset");
    }
}
