//! API-compatible types.
//!
//! The types in this module are what clients send and receive. Credentials arrive in
//! plaintext here and are hashed before they reach the election.

pub mod admin;
pub mod auth;
pub mod candidate;
pub mod election;
pub mod voter;
