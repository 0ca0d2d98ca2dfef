use serde::{Deserialize, Serialize};

use crate::election::{Candidate, NewCandidate};
use crate::error::{Error, Result};
use crate::model::api::{admin::MIN_PASSWORD_LENGTH, auth::hash_password};

/// A party being put on the ballot by an admin.
#[derive(Clone, Serialize, Deserialize)]
pub struct CandidateRegistration {
    pub party_name: String,
    pub leader_name: String,
    pub password: String,
}

impl TryFrom<CandidateRegistration> for NewCandidate {
    type Error = Error;

    fn try_from(registration: CandidateRegistration) -> Result<Self> {
        NewCandidate::validate(&registration.party_name, &registration.leader_name)?;
        if registration.password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::bad_request(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        Ok(Self {
            credential: hash_password(&registration.password)?,
            party_name: registration.party_name,
            leader_name: registration.leader_name,
        })
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CandidateCredentials {
    pub party_name: String,
    pub password: String,
}

/// A choice on the ballot, without its count.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotOption {
    pub party_name: String,
    pub leader_name: String,
}

impl From<Candidate> for BallotOption {
    fn from(candidate: Candidate) -> Self {
        Self {
            party_name: candidate.party_name,
            leader_name: candidate.leader_name,
        }
    }
}

/// What a candidate may know about themselves.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateStatus {
    pub party_name: String,
    pub leader_name: String,
    /// Only present once results are released.
    pub vote_count: Option<u64>,
}

impl CandidateStatus {
    pub fn new(candidate: Candidate, results_released: bool) -> Self {
        Self {
            vote_count: results_released.then_some(candidate.vote_count),
            party_name: candidate.party_name,
            leader_name: candidate.leader_name,
        }
    }
}
