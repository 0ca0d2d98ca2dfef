use serde::{Deserialize, Serialize};

use crate::election::Candidate;

/// A candidate row as stored in the database, keyed by party name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateDoc {
    #[serde(rename = "_id")]
    pub party_name: String,
    pub leader_name: String,
    pub credential: String,
    pub vote_count: u64,
    /// Grows with every registration, so candidates reload in the order they were listed.
    pub registration: u64,
}

impl From<&Candidate> for CandidateDoc {
    fn from(candidate: &Candidate) -> Self {
        Self {
            party_name: candidate.party_name.clone(),
            leader_name: candidate.leader_name.clone(),
            credential: candidate.credential.clone(),
            vote_count: candidate.vote_count,
            registration: candidate.registration,
        }
    }
}

impl From<CandidateDoc> for Candidate {
    fn from(doc: CandidateDoc) -> Self {
        Self {
            party_name: doc.party_name,
            leader_name: doc.leader_name,
            credential: doc.credential,
            vote_count: doc.vote_count,
            registration: doc.registration,
        }
    }
}
