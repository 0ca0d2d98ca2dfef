use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    ballot::{self, CountedBallot},
    candidate::{Candidate, CandidateRegistry, NewCandidate},
    error::{ElectionError, ElectionResult},
    lifecycle,
    state::ElectionState,
    tally::TallyReport,
    voter::{NewVoter, Voter, VoterRegistry},
};

/// Everything the election owns, guarded as one unit.
#[derive(Debug, Clone, Default)]
struct Store {
    state: ElectionState,
    voters: VoterRegistry,
    candidates: CandidateRegistry,
    /// Bumped by every successful mutation so observers can tell when to refresh.
    version: u64,
}

impl Store {
    fn is_balanced(&self) -> bool {
        self.candidates.total_votes() == self.voters.voted_count()
    }

    fn touch(&mut self) -> u64 {
        self.version += 1;
        debug_assert!(self.is_balanced(), "vote totals diverged from voter flags");
        self.version
    }

    fn status(&self) -> ElectionStatus {
        ElectionStatus {
            state: self.state.clone(),
            version: self.version,
        }
    }

    fn register_voter(&mut self, voter: NewVoter, current_year: i32) -> ElectionResult<()> {
        let username = voter.username.clone();
        self.voters.register(voter, current_year, self.version + 1)?;
        self.touch();
        info!("Registered voter {username}");
        Ok(())
    }

    fn register_candidate(&mut self, candidate: NewCandidate) -> ElectionResult<()> {
        let party_name = candidate.party_name.clone();
        self.candidates.register(candidate, self.version + 1)?;
        self.touch();
        info!("Registered candidate {party_name}");
        Ok(())
    }

    fn start_election(&mut self, at: Option<DateTime<Utc>>) -> ElectionResult<ElectionStatus> {
        lifecycle::start(&mut self.state, at.unwrap_or_else(Utc::now))?;
        self.touch();
        info!("Election started");
        Ok(self.status())
    }

    fn end_election(
        &mut self,
        at: Option<DateTime<Utc>>,
        release: bool,
    ) -> ElectionResult<ElectionStatus> {
        lifecycle::end(&mut self.state, at, Utc::now(), release)?;
        self.touch();
        info!(
            "Election ended with {} votes{}",
            self.candidates.total_votes(),
            if release { ", results released" } else { "" }
        );
        Ok(self.status())
    }

    fn release_results(&mut self) -> ElectionResult<ElectionStatus> {
        lifecycle::release(&mut self.state)?;
        self.touch();
        info!("Election results released");
        Ok(self.status())
    }

    fn reset_election(&mut self) -> ElectionStatus {
        let discarded = self.candidates.total_votes();
        lifecycle::reset(&mut self.state);
        self.candidates.clear_votes();
        self.voters.clear_votes();
        self.touch();
        warn!("Election reset, discarded {discarded} votes");
        self.status()
    }

    fn cast_vote(&mut self, voter_id: &str, candidate_id: &str) -> ElectionResult<CountedBallot> {
        let ballot = ballot::cast_vote(
            &self.state,
            &mut self.voters,
            &mut self.candidates,
            voter_id,
            candidate_id,
        )?;
        self.touch();
        debug!("Counted ballot from {voter_id}");
        Ok(ballot)
    }

    fn remove_voter(&mut self, username: &str) -> ElectionResult<Voter> {
        let voter = self.voters.remove(username)?;
        self.touch();
        info!("Removed voter {username}");
        Ok(voter)
    }

    fn remove_candidate(&mut self, party_name: &str) -> ElectionResult<Candidate> {
        let candidate = self.candidates.remove(party_name)?;
        self.touch();
        info!("Removed candidate {party_name}");
        Ok(candidate)
    }
}

/// The election state as reported to any caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionStatus {
    #[serde(flatten)]
    pub state: ElectionState,
    /// Changes whenever anything in the election changes.
    pub version: u64,
}

/// Reasons a persisted snapshot cannot be loaded.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot contains a duplicate: {0}")]
    Duplicate(#[from] ElectionError),
    #[error("Snapshot election state is inconsistent: {0:?}")]
    InconsistentState(ElectionState),
    #[error("Snapshot counts {votes} votes but {voted} voters have voted")]
    Unbalanced { votes: u64, voted: u64 },
}

/// The single election of this deployment.
///
/// Every operation takes one exclusive lock over the whole store, so a ballot, a phase
/// transition and a reset can never interleave. Nothing inside the lock blocks.
///
/// A change that must be made durable first is applied to a [`draft`](Self::draft) and
/// only [`install`](Self::install)ed once stored, so readers never see it early.
#[derive(Debug, Default)]
pub struct ElectionService {
    store: Mutex<Store>,
}

impl ElectionService {
    /// A pending election with nobody registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the election from persisted rows. Candidates must be in registration order.
    pub fn restore(
        state: ElectionState,
        version: u64,
        voters: impl IntoIterator<Item = Voter>,
        candidates: impl IntoIterator<Item = Candidate>,
    ) -> Result<Self, SnapshotError> {
        if !state.is_consistent() {
            return Err(SnapshotError::InconsistentState(state));
        }
        let mut store = Store {
            state,
            version,
            ..Store::default()
        };
        for voter in voters {
            store.voters.restore(voter)?;
        }
        for candidate in candidates {
            store.candidates.restore(candidate)?;
        }
        if !store.is_balanced() {
            return Err(SnapshotError::Unbalanced {
                votes: store.candidates.total_votes(),
                voted: store.voters.voted_count(),
            });
        }
        Ok(Self {
            store: Mutex::new(store),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        // Operations validate before mutating, so a panicking holder cannot leave a
        // half-applied change behind.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A private copy of the election. Changes to it stay invisible until installed.
    pub fn draft(&self) -> ElectionService {
        Self {
            store: Mutex::new(self.lock().clone()),
        }
    }

    /// Replace the whole election with a draft.
    ///
    /// The caller must make sure nothing else changed the election since the draft was
    /// taken, otherwise those changes are lost.
    pub fn install(&self, draft: ElectionService) {
        let store = draft
            .store
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        *self.lock() = store;
    }

    /// Register a voter, checking eligibility against the current calendar year.
    pub fn register_voter(&self, voter: NewVoter) -> ElectionResult<()> {
        self.register_voter_in(voter, Utc::now().year())
    }

    /// Register a voter, checking eligibility against the given calendar year.
    pub fn register_voter_in(&self, voter: NewVoter, current_year: i32) -> ElectionResult<()> {
        self.lock().register_voter(voter, current_year)
    }

    pub fn register_candidate(&self, candidate: NewCandidate) -> ElectionResult<()> {
        self.lock().register_candidate(candidate)
    }

    /// Open the election, at `at` or now.
    pub fn start_election(&self, at: Option<DateTime<Utc>>) -> ElectionResult<ElectionStatus> {
        self.lock().start_election(at)
    }

    /// Close the election, at `at` or now, optionally releasing results at the same time.
    pub fn end_election(
        &self,
        at: Option<DateTime<Utc>>,
        release: bool,
    ) -> ElectionResult<ElectionStatus> {
        self.lock().end_election(at, release)
    }

    pub fn release_results(&self) -> ElectionResult<ElectionStatus> {
        self.lock().release_results()
    }

    /// Return to a pending election, zeroing every count and voter flag in the same step.
    /// Registrations are kept.
    pub fn reset_election(&self) -> ElectionStatus {
        self.lock().reset_election()
    }

    /// Count one ballot for `voter_id`, at most once per voter.
    pub fn cast_vote(&self, voter_id: &str, candidate_id: &str) -> ElectionResult<CountedBallot> {
        self.lock().cast_vote(voter_id, candidate_id)
    }

    pub fn election_state(&self) -> ElectionStatus {
        self.lock().status()
    }

    pub fn version(&self) -> u64 {
        self.lock().version
    }

    /// Tally the election. Non-admins only see results once they are released.
    pub fn compute_results(&self, requester_is_admin: bool) -> ElectionResult<TallyReport> {
        let candidates = {
            let store = self.lock();
            if !requester_is_admin && !store.state.results_released {
                return Err(ElectionError::ResultsNotAvailable);
            }
            store.candidates.list_all()
        };
        Ok(TallyReport::compute(&candidates))
    }

    pub fn voter(&self, username: &str) -> Option<Voter> {
        self.lock().voters.get(username).cloned()
    }

    pub fn voters(&self) -> Vec<Voter> {
        self.lock().voters.list_all()
    }

    pub fn candidate(&self, party_name: &str) -> Option<Candidate> {
        self.lock().candidates.get(party_name).cloned()
    }

    /// All candidates in registration order.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.lock().candidates.list_all()
    }

    /// Remove a voter who has no counted ballot.
    pub fn remove_voter(&self, username: &str) -> ElectionResult<Voter> {
        self.lock().remove_voter(username)
    }

    /// Remove a candidate holding no votes.
    pub fn remove_candidate(&self, party_name: &str) -> ElectionResult<Candidate> {
        self.lock().remove_candidate(party_name)
    }

    /// Does every counted vote belong to exactly one voter who has voted?
    pub fn is_balanced(&self) -> bool {
        self.lock().is_balanced()
    }
}
