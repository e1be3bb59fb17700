use mongodb::{
    bson::doc,
    error::Error as DbError,
    options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions},
    ClientSession,
};
use rocket::http::Status;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::{errors::is_duplicate_key_error, Coll};

/// ID of the counter that allocates election IDs.
pub const ELECTION_ID_COUNTER_ID: &str = "election_id";

/// A counter object used to implement auto-increment fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counter {
    #[serde(rename = "_id")]
    pub id: String,
    pub next: u32,
}

impl Counter {
    /// Atomically retrieve the next value of the counter with the given ID, as
    /// part of the session's transaction. If the transaction aborts, so does the
    /// increment.
    pub async fn next(
        counters: &Coll<Counter>,
        id: &str,
        session: &mut ClientSession,
    ) -> Result<u32> {
        let update = doc! {
            "$inc": { "next": 1 }
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::Before)
            .build();
        let counter = counters
            .find_one_and_update_with_session(doc! {"_id": id}, update, options, session)
            .await?
            .ok_or_else(|| {
                Error::Status(
                    Status::InternalServerError,
                    format!("Failed to find counter with ID {id}"),
                )
            })?;
        Ok(counter.next)
    }
}

/// Create the election ID counter, starting at 1, unless it already exists.
///
/// This operation is idempotent.
pub async fn ensure_election_id_counter_exists(
    counters: &Coll<Counter>,
) -> std::result::Result<(), DbError> {
    let filter = doc! {
        "_id": ELECTION_ID_COUNTER_ID,
    };
    let update = doc! {
        "$setOnInsert": { "next": 1 }
    };
    let options = UpdateOptions::builder().upsert(true).build();
    let result = counters.update_one(filter, update, options).await;
    // A concurrent upsert may have won the race, which is just as good.
    if is_duplicate_key_error(result.as_ref()) {
        return Ok(());
    }
    result.map(|_| ())
}

#[cfg(test)]
mod tests {
    use mongodb::Database;

    use super::*;

    #[backend_test(mongodb)]
    async fn counter_increment(db: Database) {
        // Sessions must come from the client that owns the collection.
        let client = crate::testing::mongo_client().await;
        let counters = Coll::<Counter>::from_db(&client.database(db.name()));
        ensure_election_id_counter_exists(&counters).await.unwrap();
        // Idempotent; must not reset the counter.
        ensure_election_id_counter_exists(&counters).await.unwrap();

        let mut session = client.start_session(None).await.unwrap();
        session.start_transaction(None).await.unwrap();
        let first = Counter::next(&counters, ELECTION_ID_COUNTER_ID, &mut session)
            .await
            .unwrap();
        let second = Counter::next(&counters, ELECTION_ID_COUNTER_ID, &mut session)
            .await
            .unwrap();
        session.commit_transaction().await.unwrap();
        assert_eq!((first, second), (1, 2));

        // An aborted increment leaves no gap.
        session.start_transaction(None).await.unwrap();
        Counter::next(&counters, ELECTION_ID_COUNTER_ID, &mut session)
            .await
            .unwrap();
        session.abort_transaction().await.unwrap();

        let counter = counters
            .find_one(doc! {"_id": ELECTION_ID_COUNTER_ID}, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(counter.next, 3);
    }
}
