use std::ops::Deref;

use mongodb::{
    bson::doc, error::Error as DbError, options::IndexOptions, Collection, Database, IndexModel,
};

use crate::model::db::{
    admin::Admin, candidate::CandidateDoc, election_state::ElectionStateDoc, voter::VoterDoc,
};

/// A type that can be directly inserted/read to/from the database.
pub trait MongoCollection {
    /// The name of the collection.
    const NAME: &'static str;
}

/// A database collection of the given type.
pub struct Coll<T>(Collection<T>);

impl<T> Coll<T>
where
    T: MongoCollection,
{
    /// Get a handle on this collection in the given database.
    pub fn from_db(db: &Database) -> Self {
        Self(db.collection(T::NAME))
    }
}

// `Derive(Clone)` would only derive if `T: Clone`, but we don't need that bound.
impl<T> Clone for Coll<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T> Deref for Coll<T> {
    type Target = Collection<T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl MongoCollection for Admin {
    const NAME: &'static str = "admins";
}

impl MongoCollection for VoterDoc {
    const NAME: &'static str = "voters";
}

impl MongoCollection for CandidateDoc {
    const NAME: &'static str = "candidates";
}

impl MongoCollection for ElectionStateDoc {
    const NAME: &'static str = "election_state";
}

/// Ensure that all the required indexes exist on the given database.
///
/// Identities are the `_id` of each collection, so uniqueness comes for free; this only
/// adds the index used to reload candidates in registration order.
///
/// This operation is idempotent.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    let registration_index = IndexModel::builder()
        .keys(doc! {"registration": 1})
        .options(IndexOptions::builder().unique(true).build())
        .build();
    Coll::<CandidateDoc>::from_db(db)
        .create_index(registration_index, None)
        .await?;

    Ok(())
}
