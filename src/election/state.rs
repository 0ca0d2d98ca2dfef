use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stages in the election lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Not yet started; candidates and voters may register.
    Pending,
    /// Accepting ballots.
    Active,
    /// No longer accepting ballots.
    Closed,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Closed => "closed",
        };
        write!(f, "{name}")
    }
}

/// The one and only election.
///
/// Invariants:
/// * `results_released` implies `phase == Closed`.
/// * `started_at` is set iff the election has been active since the last reset.
/// * `ended_at` is set iff `phase == Closed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionState {
    pub phase: Phase,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub results_released: bool,
}

impl ElectionState {
    /// A fresh election that has not started.
    pub fn new() -> Self {
        Self {
            phase: Phase::Pending,
            started_at: None,
            ended_at: None,
            results_released: false,
        }
    }

    /// Is the election accepting ballots?
    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Check the structural invariants hold.
    pub fn is_consistent(&self) -> bool {
        let release_ok = !self.results_released || self.phase == Phase::Closed;
        let start_ok = match self.phase {
            Phase::Pending => self.started_at.is_none(),
            Phase::Active | Phase::Closed => self.started_at.is_some(),
        };
        let end_ok = self.ended_at.is_some() == (self.phase == Phase::Closed);
        release_ok && start_ok && end_ok
    }
}

impl Default for ElectionState {
    fn default() -> Self {
        Self::new()
    }
}
