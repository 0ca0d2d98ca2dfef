//! The election state machine.
//!
//! ```text
//! Pending --start--> Active --end--> Closed --release--> Closed (released)
//!    ^                  |               |
//!    +------reset-------+-------reset---+
//! ```
//!
//! These functions only validate and apply changes to [`ElectionState`]; zeroing the
//! registries on reset is done by the caller inside the same critical section.

use chrono::{DateTime, Utc};

use super::error::{ElectionError, ElectionResult};
use super::state::{ElectionState, Phase};

/// `Pending -> Active`.
pub fn start(state: &mut ElectionState, at: DateTime<Utc>) -> ElectionResult<()> {
    if state.phase != Phase::Pending {
        return Err(ElectionError::InvalidTransition {
            action: "start",
            from: state.phase,
        });
    }
    state.phase = Phase::Active;
    state.started_at = Some(at);
    state.ended_at = None;
    state.results_released = false;
    Ok(())
}

/// `Active -> Closed`, optionally releasing results in the same step.
///
/// An explicit end time must not precede the start time. Without one, the end is
/// `now`, or the start time if the election was started with a future timestamp.
pub fn end(
    state: &mut ElectionState,
    requested: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    release: bool,
) -> ElectionResult<()> {
    if state.phase != Phase::Active {
        return Err(ElectionError::InvalidTransition {
            action: "end",
            from: state.phase,
        });
    }
    let ended_at = match (requested, state.started_at) {
        (Some(at), Some(started_at)) if at < started_at => {
            return Err(ElectionError::InvalidTimeOrdering(format!(
                "end {at} precedes start {started_at}"
            )));
        }
        (Some(at), _) => at,
        (None, Some(started_at)) => now.max(started_at),
        (None, None) => now,
    };

    state.phase = Phase::Closed;
    state.ended_at = Some(ended_at);
    if release {
        state.results_released = true;
    }
    Ok(())
}

/// Release the results of a closed election.
pub fn release(state: &mut ElectionState) -> ElectionResult<()> {
    if state.phase != Phase::Closed {
        return Err(ElectionError::InvalidTransition {
            action: "release results",
            from: state.phase,
        });
    }
    if state.results_released {
        return Err(ElectionError::AlreadyReleased);
    }
    state.results_released = true;
    Ok(())
}

/// Any phase `-> Pending`. Always succeeds.
pub fn reset(state: &mut ElectionState) {
    *state = ElectionState::new();
}
