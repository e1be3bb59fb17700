use std::ops::Deref;

use log::debug;
use mongodb::{
    bson::{doc, Document},
    error::Error as DbError,
    Collection, Database, IndexModel,
};

use crate::model::{common::election::ElectionId, election::Election};

use super::{counter::Counter, event_log::EventRecord};

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

impl MongoCollection for Election {
    const NAME: &'static str = "elections";
}

impl MongoCollection for EventRecord {
    const NAME: &'static str = "events";
}

impl MongoCollection for Counter {
    const NAME: &'static str = "counters";
}

/// Filter matching the document with the given integer `_id`.
pub fn u32_id_filter(id: ElectionId) -> Document {
    doc! {
        "_id": id,
    }
}

/// Ensure that all the required indexes exist on the given database.
///
/// This operation is idempotent. Creating an index also creates its collection,
/// which must exist before it can be written to inside a transaction.
pub async fn ensure_indexes_exist(db: &Database) -> Result<(), DbError> {
    debug!("Ensuring collection indexes exist");

    // Elections are listed per voter.
    let voter_index = IndexModel::builder()
        .keys(doc! {"voters.identity": 1})
        .build();
    Coll::<Election>::from_db(db)
        .create_index(voter_index, None)
        .await?;

    // Events are read back per election, in order.
    let event_index = IndexModel::builder()
        .keys(doc! {"event.election_id": 1, "recorded_at": 1})
        .build();
    Coll::<EventRecord>::from_db(db)
        .create_index(event_index, None)
        .await?;

    Ok(())
}
