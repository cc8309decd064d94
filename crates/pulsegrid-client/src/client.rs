//! HeartbeatClient: outcome counters, periodic reporting loop, and
//! bounded retry.
//!
//! One mutex serializes every state access; the ticker path and the
//! direct observation paths compete for it equally. `send_beat` keeps
//! the lock across its transmission attempts so a beat always reads and
//! resets a consistent counter snapshot; the cost is that concurrent
//! observations block until the attempts finish, and a hanging transport
//! stalls this client's lock. Callers needing bounded latency set
//! `RetryPolicy::attempt_timeout`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use pulsegrid_state::{BeatReport, Status, ThresholdError, Thresholds, epoch_millis};

use crate::classifier::{ClientState, classify};
use crate::transport::{BeatTransport, TransportError};

/// Hook invoked when the classified status changes, receiving
/// (old, new). Runs outside the state lock, so it may safely call back
/// into the client.
pub type StatusChangeHook = Arc<dyn Fn(Status, Status) + Send + Sync>;

/// Retry behavior for a single beat submission.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total transmission attempts per beat, first try included.
    pub max_attempts: u32,
    /// Fixed delay between attempts; `None` retries immediately.
    pub backoff: Option<Duration>,
    /// Upper bound on a single attempt; `None` leaves timing to the
    /// transport.
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: None,
            attempt_timeout: None,
        }
    }
}

/// Configuration surface for a heartbeat client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Identifier this client reports under. Must be non-empty.
    pub client_id: String,
    /// Interval between periodic reports.
    pub beat_delay: Duration,
    pub thresholds: Thresholds,
    pub retry: RetryPolicy,
    pub on_status_change: Option<StatusChangeHook>,
}

/// Rejected client configurations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("client_id must be non-empty")]
    EmptyClientId,

    #[error("beat_delay must be non-zero")]
    ZeroBeatDelay,

    #[error(transparent)]
    Thresholds(#[from] ThresholdError),
}

struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn BeatTransport>,
    state: Mutex<ClientState>,
    started: AtomicBool,
}

/// Cheaply cloneable handle over one counter set and at most one
/// reporting loop.
#[derive(Clone)]
pub struct HeartbeatClient {
    inner: Arc<ClientInner>,
}

impl HeartbeatClient {
    /// Create a client. Rejects empty ids, zero intervals, and invalid
    /// thresholds.
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn BeatTransport>,
    ) -> Result<Self, ClientError> {
        if config.client_id.is_empty() {
            return Err(ClientError::EmptyClientId);
        }
        if config.beat_delay.is_zero() {
            return Err(ClientError::ZeroBeatDelay);
        }
        config.thresholds.validate()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                transport,
                state: Mutex::new(ClientState::new()),
                started: AtomicBool::new(false),
            }),
        })
    }

    // ── Observations ───────────────────────────────────────────────

    /// Record a successful operation. Clears any forced error. Never
    /// fails; transmission problems are absorbed.
    pub async fn success(&self) {
        {
            let mut state = self.inner.state.lock().await;
            state.success_count += 1;
            state.forced_error = false;
        }
        self.update_status().await;
    }

    /// Record a failed operation. Never fails.
    pub async fn error(&self) {
        {
            let mut state = self.inner.state.lock().await;
            state.error_count += 1;
        }
        self.update_status().await;
    }

    /// Manually drive the client into `Error` regardless of counters,
    /// e.g. on a known-fatal local condition. Cleared only by the next
    /// `success()`.
    pub async fn force_error(&self) {
        {
            let mut state = self.inner.state.lock().await;
            state.forced_error = true;
        }
        self.update_status().await;
    }

    /// Current classified status.
    pub async fn status(&self) -> Status {
        self.inner.state.lock().await.current_status
    }

    // ── Reporting loop ─────────────────────────────────────────────

    /// Begin the periodic reporting loop. Idempotent: only the first
    /// call (under concurrent invocation included) spawns the loop,
    /// which then runs for the life of the process.
    pub fn start(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return;
        }

        info!(
            client_id = %self.inner.config.client_id,
            delay = ?self.inner.config.beat_delay,
            "heartbeat loop started"
        );

        let client = self.clone();
        tokio::spawn(async move {
            let delay = client.inner.config.beat_delay;
            loop {
                tokio::time::sleep(delay).await;
                client.send_beat().await;
            }
        });
    }

    /// Re-classify after an observation. On a transition, notify the
    /// hook outside the lock, then report immediately so the registry
    /// learns of the change without waiting for the next tick.
    async fn update_status(&self) {
        let transition = {
            let mut state = self.inner.state.lock().await;
            let next = classify(&state, &self.inner.config.thresholds);
            let previous = state.current_status;
            state.current_status = next;
            (previous != next).then_some((previous, next))
        };

        if let Some((old, new)) = transition {
            debug!(
                client_id = %self.inner.config.client_id,
                %old,
                %new,
                "status changed"
            );
            if let Some(hook) = &self.inner.config.on_status_change {
                hook(old, new);
            }
            self.send_beat().await;
        }
    }

    /// Build a report from current state and attempt transmission per
    /// the retry policy. The first successful attempt resets both
    /// counters; exhausted retries leave them in place for the next
    /// trigger.
    async fn send_beat(&self) {
        let config = &self.inner.config;
        let mut state = self.inner.state.lock().await;

        let report = BeatReport {
            client_id: config.client_id.clone(),
            status: state.current_status,
            success_count: state.success_count,
            error_count: state.error_count,
            timestamp: epoch_millis(),
            beat_delay: config.beat_delay.as_millis() as u64,
        };

        for attempt in 1..=config.retry.max_attempts {
            let submit = self.inner.transport.submit(report.clone());
            let result = match config.retry.attempt_timeout {
                Some(limit) => match tokio::time::timeout(limit, submit).await {
                    Ok(result) => result,
                    Err(_) => Err(TransportError::Timeout),
                },
                None => submit.await,
            };

            match result {
                Ok(()) => {
                    state.success_count = 0;
                    state.error_count = 0;
                    debug!(client_id = %config.client_id, attempt, "beat delivered");
                    return;
                }
                Err(error) => {
                    debug!(
                        client_id = %config.client_id,
                        attempt,
                        %error,
                        "beat attempt failed"
                    );
                    if attempt < config.retry.max_attempts {
                        if let Some(delay) = config.retry.backoff {
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }
        }

        warn!(
            client_id = %config.client_id,
            attempts = config.retry.max_attempts,
            "beat dropped after exhausting retries"
        );
    }

    #[cfg(test)]
    async fn counters(&self) -> (u64, u64) {
        let state = self.inner.state.lock().await;
        (state.success_count, state.error_count)
    }
}
