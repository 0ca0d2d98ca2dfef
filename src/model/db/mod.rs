//! Database documents and the stores that own them.
//!
//! Identities are stored as `_id`, so MongoDB enforces their uniqueness, and datetimes
//! are stored in MongoDB's own format.

pub mod admin;
pub mod candidate;
pub mod election_state;
pub mod store;
pub mod voter;

pub use admin::{Admin, AdminStore};
pub use store::{ElectionStore, LoadError};
