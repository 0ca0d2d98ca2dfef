use serde::Serialize;

use super::error::{ElectionError, ElectionResult};
use super::registry::{Identified, Registry};

/// Minimum age, in whole years, to register as a voter.
pub const VOTING_AGE: i32 = 18;

/// A registered voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Voter {
    /// Unique username.
    pub username: String,
    /// Opaque credential, owned by whoever authenticates voters.
    #[serde(skip_serializing)]
    pub credential: String,
    pub birth_year: i32,
    /// Flips to true exactly once per election, when the voter's ballot is counted.
    pub has_voted: bool,
    /// Election version at registration. A later voter reusing the username gets a
    /// different one.
    pub registration: u64,
}

impl Identified for Voter {
    fn identity(&self) -> &str {
        &self.username
    }
}

/// Everything needed to register a voter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVoter {
    pub username: String,
    pub credential: String,
    pub birth_year: i32,
}

impl NewVoter {
    /// Check the username and the birth year without registering anybody.
    pub fn validate(username: &str, birth_year: i32, current_year: i32) -> ElectionResult<()> {
        if username.trim().is_empty() {
            return Err(ElectionError::MissingField("username"));
        }
        check_eligibility(birth_year, current_year)
    }

    /// Validate the registration against the given calendar year and produce a voter
    /// who has not voted.
    pub fn into_voter(self, current_year: i32, registration: u64) -> ElectionResult<Voter> {
        Self::validate(&self.username, self.birth_year, current_year)?;
        Ok(Voter {
            username: self.username,
            credential: self.credential,
            birth_year: self.birth_year,
            has_voted: false,
            registration,
        })
    }
}

/// Age is counted in calendar years: anyone turning 18 this year may register.
pub fn check_eligibility(birth_year: i32, current_year: i32) -> ElectionResult<()> {
    if birth_year > current_year {
        return Err(ElectionError::InvalidBirthYear(birth_year));
    }
    if current_year - birth_year < VOTING_AGE {
        return Err(ElectionError::IneligibleVoter {
            birth_year,
            min_age: VOTING_AGE,
        });
    }
    Ok(())
}

/// All registered voters.
#[derive(Debug, Clone, Default)]
pub struct VoterRegistry {
    voters: Registry<Voter>,
}

impl VoterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a voter, validating eligibility once against `current_year`.
    pub fn register(
        &mut self,
        new_voter: NewVoter,
        current_year: i32,
        registration: u64,
    ) -> ElectionResult<()> {
        let voter = new_voter.into_voter(current_year, registration)?;
        self.voters.insert(voter)
    }

    /// Insert an already-validated voter, e.g. one restored from storage.
    pub(crate) fn restore(&mut self, voter: Voter) -> ElectionResult<()> {
        self.voters.insert(voter)
    }

    pub fn get(&self, username: &str) -> Option<&Voter> {
        self.voters.get(username)
    }

    pub(crate) fn get_mut(&mut self, username: &str) -> Option<&mut Voter> {
        self.voters.get_mut(username)
    }

    pub fn list_all(&self) -> Vec<Voter> {
        self.voters.iter().cloned().collect()
    }

    /// Remove a voter who has no counted ballot.
    pub(crate) fn remove(&mut self, username: &str) -> ElectionResult<Voter> {
        let unknown = || ElectionError::UnknownVoter(username.to_string());
        if self.voters.get(username).ok_or_else(unknown)?.has_voted {
            return Err(ElectionError::VoterHasVoted(username.to_string()));
        }
        self.voters.remove(username).ok_or_else(unknown)
    }

    /// Number of voters whose ballot has been counted.
    pub fn voted_count(&self) -> u64 {
        self.voters.iter().filter(|v| v.has_voted).count() as u64
    }

    pub(crate) fn clear_votes(&mut self) {
        for voter in self.voters.iter_mut() {
            voter.has_voted = false;
        }
    }

    pub fn len(&self) -> usize {
        self.voters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voters.is_empty()
    }
}

/// Example data for tests.
#[cfg(test)]
pub(crate) mod examples {
    use super::*;

    impl NewVoter {
        pub fn example(username: &str) -> Self {
            Self {
                username: username.to_string(),
                credential: "hunter22".to_string(),
                birth_year: 2000,
            }
        }
    }
}
