//! The election engine: registries, lifecycle, ballots and tallies.
//!
//! Everything here is synchronous and in-memory. Persistence and HTTP live in
//! [`crate::model`] and [`crate::api`].

mod ballot;
mod candidate;
mod error;
mod lifecycle;
mod registry;
mod service;
mod state;
mod tally;
mod voter;

pub use ballot::CountedBallot;
pub use candidate::{Candidate, CandidateRegistry, NewCandidate};
pub use error::{ElectionError, ElectionResult, ErrorKind};
pub use service::{ElectionService, ElectionStatus, SnapshotError};
pub use state::{ElectionState, Phase};
pub use tally::{CandidateResult, Outcome, TallyReport};
pub use voter::{check_eligibility, NewVoter, Voter, VoterRegistry, VOTING_AGE};
