use mongodb::bson::{doc, DateTime, Document};
use serde::{Deserialize, Serialize};

use crate::election::{ElectionState, ElectionStatus, Phase};

/// The `_id` of the only document in the `election_state` collection.
pub const ELECTION_STATE_ID: &str = "election";

/// The singleton election row, with datetimes in MongoDB's own format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionStateDoc {
    #[serde(rename = "_id")]
    id: String,
    pub phase: Phase,
    pub started_at: Option<DateTime>,
    pub ended_at: Option<DateTime>,
    pub results_released: bool,
    pub version: u64,
}

impl ElectionStateDoc {
    /// Filter matching the singleton document.
    pub fn filter() -> Document {
        doc! { "_id": ELECTION_STATE_ID }
    }
}

impl From<&ElectionStatus> for ElectionStateDoc {
    fn from(status: &ElectionStatus) -> Self {
        let state = &status.state;
        Self {
            id: ELECTION_STATE_ID.to_string(),
            phase: state.phase,
            started_at: state.started_at.map(DateTime::from_chrono),
            ended_at: state.ended_at.map(DateTime::from_chrono),
            results_released: state.results_released,
            version: status.version,
        }
    }
}

impl From<ElectionStateDoc> for ElectionStatus {
    fn from(doc: ElectionStateDoc) -> Self {
        Self {
            state: ElectionState {
                phase: doc.phase,
                started_at: doc.started_at.map(DateTime::to_chrono),
                ended_at: doc.ended_at.map(DateTime::to_chrono),
                results_released: doc.results_released,
            },
            version: doc.version,
        }
    }
}
