//! Status classification: maps accumulated outcome counts to a `Status`.
//!
//! Pure and total over valid thresholds; the only inputs are the counter
//! snapshot and the configured rates. The client re-runs this after every
//! observation.

use pulsegrid_state::{Status, Thresholds};

/// Per-client mutable state: outcome counters, the manual error
/// override, and the last computed status.
///
/// Owned by exactly one `HeartbeatClient`; all mutation is serialized
/// under the client's lock. Counters reset to zero only on a successful
/// report transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientState {
    pub success_count: u64,
    pub error_count: u64,
    pub forced_error: bool,
    pub current_status: Status,
}

impl ClientState {
    pub fn new() -> Self {
        Self {
            success_count: 0,
            error_count: 0,
            forced_error: false,
            current_status: Status::Ok,
        }
    }
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new()
    }
}

/// Classify `state` against `thresholds`.
///
/// A forced error wins unconditionally. Below `min_total_ops`
/// observations the previous status is kept, so a fresh or just-reset
/// window cannot flap on a handful of samples. Otherwise the error rate
/// is compared against the thresholds, boundaries inclusive.
pub fn classify(state: &ClientState, thresholds: &Thresholds) -> Status {
    if state.forced_error {
        return Status::Error;
    }

    let total = state.success_count + state.error_count;
    if total < thresholds.min_total_ops {
        return state.current_status;
    }

    // total == 0 is reachable only with min_total_ops == 0.
    let error_rate = if total == 0 {
        0.0
    } else {
        state.error_count as f64 / total as f64
    };

    if error_rate >= thresholds.error_error_rate {
        Status::Error
    } else if error_rate >= thresholds.degraded_error_rate {
        Status::Degraded
    } else {
        Status::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> Thresholds {
        Thresholds {
            degraded_error_rate: 0.2,
            error_error_rate: 0.5,
            min_total_ops: 10,
        }
    }

    fn state(success: u64, error: u64) -> ClientState {
        ClientState {
            success_count: success,
            error_count: error,
            forced_error: false,
            current_status: Status::Ok,
        }
    }

    #[test]
    fn low_error_rate_is_ok() {
        // 1/10 = 10%, under the 20% degraded boundary.
        assert_eq!(classify(&state(9, 1), &thresholds()), Status::Ok);
    }

    #[test]
    fn degraded_boundary_is_inclusive() {
        // 2/10 = exactly 20%.
        assert_eq!(classify(&state(8, 2), &thresholds()), Status::Degraded);
    }

    #[test]
    fn between_boundaries_is_degraded() {
        // 4/10 = 40%.
        assert_eq!(classify(&state(6, 4), &thresholds()), Status::Degraded);
    }

    #[test]
    fn error_boundary_is_inclusive() {
        // 5/10 = exactly 50%.
        assert_eq!(classify(&state(5, 5), &thresholds()), Status::Error);
    }

    #[test]
    fn all_errors_is_error() {
        assert_eq!(classify(&state(0, 10), &thresholds()), Status::Error);
    }

    #[test]
    fn below_sample_floor_keeps_previous_status() {
        // 9 observations, floor is 10: whatever the rate, no change.
        let mut s = state(0, 9);
        s.current_status = Status::Ok;
        assert_eq!(classify(&s, &thresholds()), Status::Ok);

        s.current_status = Status::Error;
        assert_eq!(classify(&s, &thresholds()), Status::Error);
    }

    #[test]
    fn forced_error_overrides_counters() {
        let mut s = state(100, 0);
        s.forced_error = true;
        assert_eq!(classify(&s, &thresholds()), Status::Error);
    }

    #[test]
    fn forced_error_overrides_sample_floor() {
        let mut s = state(0, 0);
        s.forced_error = true;
        assert_eq!(classify(&s, &thresholds()), Status::Error);
    }

    #[test]
    fn zero_total_with_zero_floor_is_ok() {
        let t = Thresholds {
            min_total_ops: 0,
            ..thresholds()
        };
        // No observations, no floor: error rate defined as zero.
        assert_eq!(classify(&state(0, 0), &t), Status::Ok);
    }

    #[test]
    fn deterministic_for_equal_inputs() {
        let s = state(7, 3);
        let t = thresholds();
        assert_eq!(classify(&s, &t), classify(&s, &t));
    }
}
