use serde::Serialize;

use super::error::{ElectionError, ElectionResult};
use super::registry::{Identified, Registry};

/// A party standing in the election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Unique party name.
    pub party_name: String,
    pub leader_name: String,
    /// Opaque credential, owned by whoever authenticates candidates.
    #[serde(skip_serializing)]
    pub credential: String,
    /// Only ever incremented by one ballot at a time, or zeroed by a reset.
    pub vote_count: u64,
    /// Election version at registration, which also orders candidates in storage.
    pub registration: u64,
}

impl Identified for Candidate {
    fn identity(&self) -> &str {
        &self.party_name
    }
}

/// Everything needed to register a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCandidate {
    pub party_name: String,
    pub leader_name: String,
    pub credential: String,
}

impl NewCandidate {
    /// Check the names without registering anything.
    pub fn validate(party_name: &str, leader_name: &str) -> ElectionResult<()> {
        if party_name.trim().is_empty() {
            return Err(ElectionError::MissingField("party_name"));
        }
        if leader_name.trim().is_empty() {
            return Err(ElectionError::MissingField("leader_name"));
        }
        Ok(())
    }

    /// Produce a candidate holding no votes.
    pub fn into_candidate(self, registration: u64) -> ElectionResult<Candidate> {
        Self::validate(&self.party_name, &self.leader_name)?;
        Ok(Candidate {
            party_name: self.party_name,
            leader_name: self.leader_name,
            credential: self.credential,
            vote_count: 0,
            registration,
        })
    }
}

/// All registered candidates, in registration order.
#[derive(Debug, Clone, Default)]
pub struct CandidateRegistry {
    candidates: Registry<Candidate>,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        new_candidate: NewCandidate,
        registration: u64,
    ) -> ElectionResult<()> {
        let candidate = new_candidate.into_candidate(registration)?;
        self.candidates.insert(candidate)
    }

    /// Insert a candidate with an existing count, e.g. one restored from storage.
    pub(crate) fn restore(&mut self, candidate: Candidate) -> ElectionResult<()> {
        self.candidates.insert(candidate)
    }

    pub fn get(&self, party_name: &str) -> Option<&Candidate> {
        self.candidates.get(party_name)
    }

    pub(crate) fn get_mut(&mut self, party_name: &str) -> Option<&mut Candidate> {
        self.candidates.get_mut(party_name)
    }

    /// All candidates in registration order.
    pub fn list_all(&self) -> Vec<Candidate> {
        self.candidates.iter().cloned().collect()
    }

    /// Remove a candidate that holds no votes.
    pub(crate) fn remove(&mut self, party_name: &str) -> ElectionResult<Candidate> {
        let unknown = || ElectionError::UnknownCandidate(party_name.to_string());
        if self.candidates.get(party_name).ok_or_else(unknown)?.vote_count > 0 {
            return Err(ElectionError::CandidateHasVotes(party_name.to_string()));
        }
        self.candidates.remove(party_name).ok_or_else(unknown)
    }

    pub fn total_votes(&self) -> u64 {
        self.candidates.iter().map(|c| c.vote_count).sum()
    }

    pub(crate) fn clear_votes(&mut self) {
        for candidate in self.candidates.iter_mut() {
            candidate.vote_count = 0;
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Example data for tests.
#[cfg(test)]
pub(crate) mod examples {
    use super::*;

    impl NewCandidate {
        pub fn example(party_name: &str, leader_name: &str) -> Self {
            Self {
                party_name: party_name.to_string(),
                leader_name: leader_name.to_string(),
                credential: "manifesto".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_starts_at_zero() {
        let mut candidates = CandidateRegistry::new();
        candidates
            .register(NewCandidate::example("Red", "Ann"), 1)
            .unwrap();

        let red = candidates.get("Red").unwrap();
        assert_eq!(red.leader_name, "Ann");
        assert_eq!(red.vote_count, 0);
        assert_eq!(candidates.total_votes(), 0);
    }

    #[test]
    fn duplicate_party_rejected() {
        let mut candidates = CandidateRegistry::new();
        candidates
            .register(NewCandidate::example("Red", "Ann"), 1)
            .unwrap();
        assert_eq!(
            candidates.register(NewCandidate::example("Red", "Someone Else"), 1),
            Err(ElectionError::DuplicateId("Red".to_string()))
        );
    }

    #[test]
    fn blank_names_rejected() {
        let mut candidates = CandidateRegistry::new();
        assert_eq!(
            candidates.register(NewCandidate::example("", "Ann"), 1),
            Err(ElectionError::MissingField("party_name"))
        );
        assert_eq!(
            candidates.register(NewCandidate::example("Red", " "), 1),
            Err(ElectionError::MissingField("leader_name"))
        );
        assert!(candidates.is_empty());
    }

    #[test]
    fn list_in_registration_order() {
        let mut candidates = CandidateRegistry::new();
        for party in ["Red", "Blue", "Green"] {
            candidates
                .register(NewCandidate::example(party, "Leader"), 1)
                .unwrap();
        }
        let parties: Vec<_> = candidates
            .list_all()
            .into_iter()
            .map(|c| c.party_name)
            .collect();
        assert_eq!(parties, vec!["Red", "Blue", "Green"]);
    }

    #[test]
    fn cannot_orphan_counted_votes() {
        let mut candidates = CandidateRegistry::new();
        candidates
            .register(NewCandidate::example("Red", "Ann"), 1)
            .unwrap();
        candidates.get_mut("Red").unwrap().vote_count = 2;

        assert_eq!(
            candidates.remove("Red"),
            Err(ElectionError::CandidateHasVotes("Red".to_string()))
        );
        assert_eq!(candidates.total_votes(), 2);

        candidates.clear_votes();
        assert!(candidates.remove("Red").is_ok());
        assert_eq!(
            candidates.remove("Red"),
            Err(ElectionError::UnknownCandidate("Red".to_string()))
        );
    }
}
