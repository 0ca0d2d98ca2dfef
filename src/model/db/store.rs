use chrono::{DateTime, Utc};
use mongodb::{
    bson::doc,
    error::Error as DbError,
    options::{FindOptions, ReplaceOptions},
    Client, ClientSession, Database,
};
use rocket::{futures::TryStreamExt, tokio::sync::Mutex};
use thiserror::Error;

use crate::election::{
    Candidate, CountedBallot, ElectionResult, ElectionService, ElectionState, ElectionStatus,
    NewCandidate, NewVoter, SnapshotError, Voter,
};
use crate::error::Result;
use crate::model::{
    db::{candidate::CandidateDoc, election_state::ElectionStateDoc, voter::VoterDoc},
    mongodb::Coll,
};

/// Reasons the election cannot be loaded at launch.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Rows touched by one mutation, besides the election state document.
enum Change {
    InsertVoter(VoterDoc),
    InsertCandidate(CandidateDoc),
    Ballot(CountedBallot),
    RemoveVoter(String),
    RemoveCandidate(String),
    ClearVotes,
}

/// Database handles for write-through persistence.
struct Persistence {
    client: Client,
    db: Database,
}

impl Persistence {
    /// Write one mutation in a single transaction.
    async fn commit(&self, changes: Vec<Change>, status: &ElectionStatus) -> Result<()> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;
        for change in changes {
            self.apply(change, &mut session).await?;
        }
        let upsert = ReplaceOptions::builder().upsert(true).build();
        Coll::<ElectionStateDoc>::from_db(&self.db)
            .replace_one_with_session(
                ElectionStateDoc::filter(),
                ElectionStateDoc::from(status),
                upsert,
                &mut session,
            )
            .await?;
        session.commit_transaction().await?;
        Ok(())
    }

    async fn apply(&self, change: Change, session: &mut ClientSession) -> Result<()> {
        let voters = Coll::<VoterDoc>::from_db(&self.db);
        let candidates = Coll::<CandidateDoc>::from_db(&self.db);
        match change {
            Change::InsertVoter(voter) => {
                voters.insert_one_with_session(voter, None, session).await?;
            }
            Change::InsertCandidate(candidate) => {
                candidates
                    .insert_one_with_session(candidate, None, session)
                    .await?;
            }
            Change::Ballot(ballot) => {
                // Absolute values, so replaying a ballot cannot double count it.
                // Both rows change in the same transaction or neither does.
                voters
                    .update_one_with_session(
                        doc! { "_id": ballot.voter.as_str() },
                        doc! { "$set": { "has_voted": true } },
                        None,
                        session,
                    )
                    .await?;
                candidates
                    .update_one_with_session(
                        doc! { "_id": ballot.party_name.as_str() },
                        doc! { "$set": { "vote_count": ballot.vote_count as i64 } },
                        None,
                        session,
                    )
                    .await?;
            }
            Change::RemoveVoter(username) => {
                voters
                    .delete_one_with_session(doc! { "_id": username }, None, session)
                    .await?;
            }
            Change::RemoveCandidate(party_name) => {
                candidates
                    .delete_one_with_session(doc! { "_id": party_name }, None, session)
                    .await?;
            }
            Change::ClearVotes => {
                voters
                    .update_many_with_session(
                        doc! {},
                        doc! { "$set": { "has_voted": false } },
                        None,
                        session,
                    )
                    .await?;
                candidates
                    .update_many_with_session(
                        doc! {},
                        doc! { "$set": { "vote_count": 0_i64 } },
                        None,
                        session,
                    )
                    .await?;
            }
        }
        Ok(())
    }
}

/// The election service, written through to MongoDB when a database is configured.
///
/// Reads go straight to the in-memory service. Mutations are serialized by one async
/// lock. With a database, each mutation is applied to a draft of the election and the
/// draft replaces the live election only once its transaction has committed, so a
/// failed write changes nothing and readers never see uncommitted state.
pub struct ElectionStore {
    service: ElectionService,
    persistence: Option<Persistence>,
    write_lock: Mutex<()>,
}

impl ElectionStore {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(ElectionService::new(), None)
    }

    fn new(service: ElectionService, persistence: Option<Persistence>) -> Self {
        Self {
            service,
            persistence,
            write_lock: Mutex::new(()),
        }
    }

    /// Restore the election from the database.
    pub async fn load(client: Client, db: Database) -> std::result::Result<Self, LoadError> {
        let status = Coll::<ElectionStateDoc>::from_db(&db)
            .find_one(ElectionStateDoc::filter(), None)
            .await?
            .map(ElectionStatus::from)
            .unwrap_or_else(|| ElectionStatus {
                state: ElectionState::new(),
                version: 0,
            });
        let voters: Vec<VoterDoc> = Coll::<VoterDoc>::from_db(&db)
            .find(None, None)
            .await?
            .try_collect()
            .await?;
        let in_order = FindOptions::builder()
            .sort(doc! { "registration": 1 })
            .build();
        let candidates: Vec<CandidateDoc> = Coll::<CandidateDoc>::from_db(&db)
            .find(None, in_order)
            .await?
            .try_collect()
            .await?;
        info!(
            "Loaded {} election with {} voters and {} candidates",
            status.state.phase,
            voters.len(),
            candidates.len()
        );

        let service = ElectionService::restore(
            status.state,
            status.version,
            voters.into_iter().map(Voter::from),
            candidates.into_iter().map(Candidate::from),
        )?;
        Ok(Self::new(service, Some(Persistence { client, db })))
    }

    /// The in-memory election, for reads.
    pub fn service(&self) -> &ElectionService {
        &self.service
    }

    /// Run one mutation, committing `changes` for it before anyone can observe it.
    async fn mutate<T, F, C>(&self, op: F, changes: C) -> Result<T>
    where
        F: FnOnce(&ElectionService) -> ElectionResult<T>,
        C: FnOnce(&ElectionService, &T) -> Vec<Change>,
    {
        let _guard = self.write_lock.lock().await;
        let Some(persistence) = &self.persistence else {
            return Ok(op(&self.service)?);
        };

        let draft = self.service.draft();
        let value = op(&draft)?;
        let status = draft.election_state();
        if let Err(err) = persistence.commit(changes(&draft, &value), &status).await {
            error!("Election version {} not persisted: {err}", status.version);
            return Err(err);
        }
        self.service.install(draft);
        Ok(value)
    }

    pub async fn register_voter(&self, voter: NewVoter) -> Result<()> {
        let username = voter.username.clone();
        self.mutate(
            |service| service.register_voter(voter),
            |draft, _| {
                draft
                    .voter(&username)
                    .map(|voter| Change::InsertVoter(VoterDoc::from(&voter)))
                    .into_iter()
                    .collect()
            },
        )
        .await
    }

    pub async fn register_candidate(&self, candidate: NewCandidate) -> Result<()> {
        let party_name = candidate.party_name.clone();
        self.mutate(
            |service| service.register_candidate(candidate),
            |draft, _| {
                draft
                    .candidate(&party_name)
                    .map(|candidate| Change::InsertCandidate(CandidateDoc::from(&candidate)))
                    .into_iter()
                    .collect()
            },
        )
        .await
    }

    pub async fn start_election(&self, at: Option<DateTime<Utc>>) -> Result<ElectionStatus> {
        self.mutate(|service| service.start_election(at), |_, _| Vec::new())
            .await
    }

    pub async fn end_election(
        &self,
        at: Option<DateTime<Utc>>,
        release: bool,
    ) -> Result<ElectionStatus> {
        self.mutate(
            |service| service.end_election(at, release),
            |_, _| Vec::new(),
        )
        .await
    }

    pub async fn release_results(&self) -> Result<ElectionStatus> {
        self.mutate(|service| service.release_results(), |_, _| Vec::new())
            .await
    }

    pub async fn reset_election(&self) -> Result<ElectionStatus> {
        self.mutate(
            |service| Ok(service.reset_election()),
            |_, _| vec![Change::ClearVotes],
        )
        .await
    }

    pub async fn cast_vote(&self, voter_id: &str, candidate_id: &str) -> Result<CountedBallot> {
        self.mutate(
            |service| service.cast_vote(voter_id, candidate_id),
            |_, ballot| vec![Change::Ballot(ballot.clone())],
        )
        .await
    }

    pub async fn remove_voter(&self, username: &str) -> Result<()> {
        self.mutate(
            |service| service.remove_voter(username),
            |_, _| vec![Change::RemoveVoter(username.to_string())],
        )
        .await?;
        Ok(())
    }

    pub async fn remove_candidate(&self, party_name: &str) -> Result<()> {
        self.mutate(
            |service| service.remove_candidate(party_name),
            |_, _| vec![Change::RemoveCandidate(party_name.to_string())],
        )
        .await?;
        Ok(())
    }
}
