use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::election::{NewVoter, Voter};
use crate::error::{Error, Result};
use crate::model::api::{admin::MIN_PASSWORD_LENGTH, auth::hash_password};

/// A voter signing themselves up.
#[derive(Clone, Serialize, Deserialize)]
pub struct VoterRegistration {
    pub username: String,
    pub password: String,
    pub birth_year: i32,
}

impl TryFrom<VoterRegistration> for NewVoter {
    type Error = Error;

    /// Check the registration, then hash the password.
    fn try_from(registration: VoterRegistration) -> Result<Self> {
        NewVoter::validate(
            &registration.username,
            registration.birth_year,
            Utc::now().year(),
        )?;
        if registration.password.len() < MIN_PASSWORD_LENGTH {
            return Err(Error::bad_request(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }
        Ok(Self {
            credential: hash_password(&registration.password)?,
            username: registration.username,
            birth_year: registration.birth_year,
        })
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct VoterCredentials {
    pub username: String,
    pub password: String,
}

/// What a voter may know about themselves.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterStatus {
    pub username: String,
    pub has_voted: bool,
}

impl From<Voter> for VoterStatus {
    fn from(voter: Voter) -> Self {
        Self {
            username: voter.username,
            has_voted: voter.has_voted,
        }
    }
}

/// A ballot as submitted by a voter.
#[derive(Clone, Serialize, Deserialize)]
pub struct BallotChoice {
    pub party_name: String,
}
