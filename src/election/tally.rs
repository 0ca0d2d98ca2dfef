use serde::{Deserialize, Serialize};

use super::candidate::Candidate;

/// One row of the results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateResult {
    pub party_name: String,
    pub leader_name: String,
    pub vote_count: u64,
    /// Share of all votes cast, in percent. Zero when no votes have been cast.
    pub percentage: f64,
}

/// How the election currently stands.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// No votes cast, or no candidates.
    NoWinner,
    Winner,
    Tie,
}

/// Ranked results of the election.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TallyReport {
    /// Sorted by vote count, highest first; equal counts keep registration order.
    pub results: Vec<CandidateResult>,
    pub total_votes: u64,
    /// Every party holding the (non-zero) highest count, in registration order.
    pub winners: Vec<String>,
    pub outcome: Outcome,
}

impl TallyReport {
    /// Rank the given candidates, which must be in registration order.
    pub fn compute(candidates: &[Candidate]) -> Self {
        let total_votes: u64 = candidates.iter().map(|c| c.vote_count).sum();
        let max_votes = candidates.iter().map(|c| c.vote_count).max().unwrap_or(0);

        let winners: Vec<String> = if max_votes > 0 {
            candidates
                .iter()
                .filter(|c| c.vote_count == max_votes)
                .map(|c| c.party_name.clone())
                .collect()
        } else {
            Vec::new()
        };

        let mut results: Vec<CandidateResult> = candidates
            .iter()
            .map(|c| CandidateResult {
                party_name: c.party_name.clone(),
                leader_name: c.leader_name.clone(),
                vote_count: c.vote_count,
                percentage: percentage(c.vote_count, total_votes),
            })
            .collect();
        // `sort_by` is stable, so ties stay in registration order.
        results.sort_by(|a, b| b.vote_count.cmp(&a.vote_count));

        let outcome = match winners.len() {
            0 => Outcome::NoWinner,
            1 => Outcome::Winner,
            _ => Outcome::Tie,
        };

        Self {
            results,
            total_votes,
            winners,
            outcome,
        }
    }
}

fn percentage(votes: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        votes as f64 * 100.0 / total as f64
    }
}
