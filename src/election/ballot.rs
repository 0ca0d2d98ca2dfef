use super::candidate::CandidateRegistry;
use super::error::{ElectionError, ElectionResult};
use super::state::ElectionState;
use super::voter::VoterRegistry;

/// A counted ballot: the two rows it touched and their values afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountedBallot {
    pub voter: String,
    pub party_name: String,
    /// The candidate's count including this ballot.
    pub vote_count: u64,
}

/// Count one ballot.
///
/// Checks, in order: the election is active, the voter exists, the voter has not voted,
/// the candidate exists. Nothing is mutated unless every check passes. The caller must
/// hold exclusive access to all three parts for the whole call.
pub fn cast_vote(
    state: &ElectionState,
    voters: &mut VoterRegistry,
    candidates: &mut CandidateRegistry,
    voter_id: &str,
    candidate_id: &str,
) -> ElectionResult<CountedBallot> {
    if !state.is_active() {
        return Err(ElectionError::ElectionNotActive);
    }
    let voter = voters
        .get_mut(voter_id)
        .ok_or_else(|| ElectionError::UnknownVoter(voter_id.to_string()))?;
    if voter.has_voted {
        return Err(ElectionError::AlreadyVoted(voter_id.to_string()));
    }
    let candidate = candidates
        .get_mut(candidate_id)
        .ok_or_else(|| ElectionError::UnknownCandidate(candidate_id.to_string()))?;

    candidate.vote_count += 1;
    voter.has_voted = true;

    Ok(CountedBallot {
        voter: voter.username.clone(),
        party_name: candidate.party_name.clone(),
        vote_count: candidate.vote_count,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::election::{lifecycle, NewCandidate, NewVoter};

    fn setup() -> (ElectionState, VoterRegistry, CandidateRegistry) {
        let mut voters = VoterRegistry::new();
        voters.register(NewVoter::example("v1"), 2025, 1).unwrap();
        voters.register(NewVoter::example("v2"), 2025, 1).unwrap();
        let mut candidates = CandidateRegistry::new();
        candidates
            .register(NewCandidate::example("Red", "Ann"), 1)
            .unwrap();
        candidates
            .register(NewCandidate::example("Blue", "Bo"), 1)
            .unwrap();
        (ElectionState::new(), voters, candidates)
    }

    #[test]
    fn precondition_order() {
        let (mut state, mut voters, mut candidates) = setup();

        // Inactive election wins over every other problem.
        assert_eq!(
            cast_vote(&state, &mut voters, &mut candidates, "nobody", "Nobody"),
            Err(ElectionError::ElectionNotActive)
        );

        lifecycle::start(&mut state, Utc::now()).unwrap();
        assert_eq!(
            cast_vote(&state, &mut voters, &mut candidates, "nobody", "Nobody"),
            Err(ElectionError::UnknownVoter("nobody".to_string()))
        );
        assert_eq!(
            cast_vote(&state, &mut voters, &mut candidates, "v1", "Nobody"),
            Err(ElectionError::UnknownCandidate("Nobody".to_string()))
        );
        // The failed attempt must not have used up the voter's ballot.
        assert!(!voters.get("v1").unwrap().has_voted);

        cast_vote(&state, &mut voters, &mut candidates, "v1", "Red").unwrap();
        assert_eq!(
            cast_vote(&state, &mut voters, &mut candidates, "v1", "Nobody"),
            Err(ElectionError::AlreadyVoted("v1".to_string()))
        );
    }

    #[test]
    fn counts_exactly_once() {
        let (mut state, mut voters, mut candidates) = setup();
        lifecycle::start(&mut state, Utc::now()).unwrap();

        let ballot = cast_vote(&state, &mut voters, &mut candidates, "v1", "Red").unwrap();
        assert_eq!(
            ballot,
            CountedBallot {
                voter: "v1".to_string(),
                party_name: "Red".to_string(),
                vote_count: 1,
            }
        );

        assert_eq!(
            cast_vote(&state, &mut voters, &mut candidates, "v1", "Blue"),
            Err(ElectionError::AlreadyVoted("v1".to_string()))
        );
        assert_eq!(candidates.get("Red").unwrap().vote_count, 1);
        assert_eq!(candidates.get("Blue").unwrap().vote_count, 0);
        assert_eq!(candidates.total_votes(), voters.voted_count());
    }
}
