use thiserror::Error;

/// Every way a core election operation can be refused.
///
/// None of these are fatal: the store is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ElectionError {
    #[error("Identity already registered: {0}")]
    DuplicateId(String),
    #[error("Voter born in {birth_year} is not yet {min_age}")]
    IneligibleVoter { birth_year: i32, min_age: i32 },
    #[error("Birth year {0} is in the future")]
    InvalidBirthYear(i32),
    #[error("Field must not be empty: {0}")]
    MissingField(&'static str),
    #[error("No voter named {0}")]
    UnknownVoter(String),
    #[error("No candidate named {0}")]
    UnknownCandidate(String),
    #[error("Timestamps out of order: {0}")]
    InvalidTimeOrdering(String),
    #[error("The election is not accepting ballots")]
    ElectionNotActive,
    #[error("Voter {0} has already voted")]
    AlreadyVoted(String),
    #[error("Cannot {action} while the election is {from}")]
    InvalidTransition {
        action: &'static str,
        from: super::Phase,
    },
    #[error("Results have already been released")]
    AlreadyReleased,
    #[error("Results have not been released")]
    ResultsNotAvailable,
    #[error("Candidate {0} still holds counted votes")]
    CandidateHasVotes(String),
    #[error("Voter {0} has a counted ballot")]
    VoterHasVoted(String),
}

/// Coarse classification of an [`ElectionError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied bad input and may retry with corrected input.
    Validation,
    /// The operation does not apply in the current election state.
    StateConflict,
}

impl ElectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateId(_)
            | Self::IneligibleVoter { .. }
            | Self::InvalidBirthYear(_)
            | Self::MissingField(_)
            | Self::UnknownVoter(_)
            | Self::UnknownCandidate(_)
            | Self::InvalidTimeOrdering(_) => ErrorKind::Validation,
            Self::ElectionNotActive
            | Self::AlreadyVoted(_)
            | Self::InvalidTransition { .. }
            | Self::AlreadyReleased
            | Self::ResultsNotAvailable
            | Self::CandidateHasVotes(_)
            | Self::VoterHasVoted(_) => ErrorKind::StateConflict,
        }
    }

    /// Stable name of the error, for clients that branch on it.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateId(_) => "DuplicateId",
            Self::IneligibleVoter { .. } => "IneligibleVoter",
            Self::InvalidBirthYear(_) => "InvalidBirthYear",
            Self::MissingField(_) => "MissingField",
            Self::UnknownVoter(_) => "UnknownVoter",
            Self::UnknownCandidate(_) => "UnknownCandidate",
            Self::InvalidTimeOrdering(_) => "InvalidTimeOrdering",
            Self::ElectionNotActive => "ElectionNotActive",
            Self::AlreadyVoted(_) => "AlreadyVoted",
            Self::InvalidTransition { .. } => "InvalidTransition",
            Self::AlreadyReleased => "AlreadyReleased",
            Self::ResultsNotAvailable => "ResultsNotAvailable",
            Self::CandidateHasVotes(_) => "CandidateHasVotes",
            Self::VoterHasVoted(_) => "VoterHasVoted",
        }
    }
}


pub type ElectionResult<T> = Result<T, ElectionError>;
