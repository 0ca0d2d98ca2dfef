use std::fmt::Display;

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::election::{Candidate, Voter};
use crate::model::db::admin::Admin;

/// A user of our application, having defined rights.
pub trait User {
    /// The rights of this user type.
    const RIGHTS: Rights;
    /// Get the user's unique identity.
    fn id(&self) -> String;
    /// Distinguishes this account from any earlier or later one with the same identity.
    fn registration(&self) -> u64;
}

/// Different privilege levels.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum Rights {
    Voter = 0,
    Admin = 1,
    Candidate = 2,
}

impl Display for Rights {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            formatter,
            "{}",
            match self {
                Self::Voter => "voter",
                Self::Admin => "admin",
                Self::Candidate => "candidate",
            }
        )
    }
}

impl User for Voter {
    const RIGHTS: Rights = Rights::Voter;

    fn id(&self) -> String {
        self.username.clone()
    }

    fn registration(&self) -> u64 {
        self.registration
    }
}

impl User for Admin {
    const RIGHTS: Rights = Rights::Admin;

    fn id(&self) -> String {
        self.username.clone()
    }

    fn registration(&self) -> u64 {
        u64::from(self.registration)
    }
}

impl User for Candidate {
    const RIGHTS: Rights = Rights::Candidate;

    fn id(&self) -> String {
        self.party_name.clone()
    }

    fn registration(&self) -> u64 {
        self.registration
    }
}
