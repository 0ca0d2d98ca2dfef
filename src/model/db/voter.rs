use serde::{Deserialize, Serialize};

use crate::election::Voter;

/// A voter row as stored in the database, keyed by username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterDoc {
    #[serde(rename = "_id")]
    pub username: String,
    pub credential: String,
    pub birth_year: i32,
    pub has_voted: bool,
    pub registration: u64,
}

impl From<&Voter> for VoterDoc {
    fn from(voter: &Voter) -> Self {
        Self {
            username: voter.username.clone(),
            credential: voter.credential.clone(),
            birth_year: voter.birth_year,
            has_voted: voter.has_voted,
            registration: voter.registration,
        }
    }
}

impl From<VoterDoc> for Voter {
    fn from(doc: VoterDoc) -> Self {
        Self {
            username: doc.username,
            credential: doc.credential,
            birth_year: doc.birth_year,
            has_voted: doc.has_voted,
            registration: doc.registration,
        }
    }
}
