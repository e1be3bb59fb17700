use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use mongodb::{
    bson::{doc, Document},
    error::Error as DbError,
    options::FindOptions,
    Client, ClientSession, Database,
};
use rocket::{async_trait, futures::TryStreamExt};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::model::{
    common::{
        election::{CandidateId, ElectionId},
        identity::Identity,
    },
    election::{
        Election, ElectionError, ElectionEvent, ElectionSpec, ElectionSummary, ElectionView,
        RangeError,
    },
    mongodb::{
        ensure_election_id_counter_exists, ensure_indexes_exist, is_transient_transaction_error,
        u32_id_filter, Coll, Counter, EventRecord, ELECTION_ID_COUNTER_ID,
    },
};

use super::ElectionStore;

/// Keeps one document per election in MongoDB.
///
/// Each mutation is a multi-document transaction, so the deployment must be a
/// replica set. A transaction that loses a write conflict is not retried; the
/// caller sees a conflict and may resubmit.
pub struct MongoStore {
    client: Client,
    db: Database,
    authority: Identity,
    clock: Arc<dyn Clock>,
}

impl MongoStore {
    /// Use the named database through an existing client, creating indexes and
    /// the election ID counter if needed.
    pub async fn new(
        client: Client,
        db_name: &str,
        authority: Identity,
        clock: Arc<dyn Clock>,
    ) -> std::result::Result<Self, DbError> {
        let db = client.database(db_name);
        ensure_indexes_exist(&db).await?;
        ensure_election_id_counter_exists(&Coll::from_db(&db)).await?;
        Ok(Self {
            client,
            db,
            authority,
            clock,
        })
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Every notification record so far, oldest first.
    pub async fn events(&self) -> Result<Vec<ElectionEvent>> {
        let options = FindOptions::builder()
            .sort(doc! {"recorded_at": 1, "_id": 1})
            .build();
        let records: Vec<EventRecord> = Coll::<EventRecord>::from_db(&self.db)
            .find(None, options)
            .await?
            .try_collect()
            .await?;
        Ok(records.into_iter().map(|record| record.event).collect())
    }

    async fn transaction(&self) -> Result<ClientSession> {
        let mut session = self.client.start_session(None).await?;
        session.start_transaction(None).await?;
        Ok(session)
    }

    /// Persist `event` as part of the session's transaction, then commit.
    async fn commit_with(
        &self,
        mut session: ClientSession,
        event: ElectionEvent,
        now: DateTime<Utc>,
    ) -> Result<()> {
        Coll::<EventRecord>::from_db(&self.db)
            .insert_one_with_session(EventRecord::new(event.clone(), now), None, &mut session)
            .await?;
        session.commit_transaction().await?;
        info!("{event}");
        Ok(())
    }

    /// Allocate an ID and insert the election built from an already validated spec.
    async fn insert_election(&self, spec: ElectionSpec, now: DateTime<Utc>) -> Result<ElectionId> {
        let mut session = self.transaction().await?;

        // Allocated inside the transaction, so an abort leaves no gap.
        let counters = Coll::<Counter>::from_db(&self.db);
        let id = Counter::next(&counters, ELECTION_ID_COUNTER_ID, &mut session).await?;

        let election = spec.into_election(id);
        Coll::<Election>::from_db(&self.db)
            .insert_one_with_session(&election, None, &mut session)
            .await?;

        self.commit_with(session, election.created_event(), now)
            .await?;
        Ok(id)
    }

    async fn record_vote(
        &self,
        caller: &Identity,
        election_id: ElectionId,
        candidate_id: CandidateId,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut session = self.transaction().await?;
        let elections = Coll::<Election>::from_db(&self.db);

        // Preconditions are checked against the copy read in this transaction;
        // a concurrent vote on the same election conflicts at commit.
        let mut election = elections
            .find_one_with_session(u32_id_filter(election_id), None, &mut session)
            .await?
            .ok_or_else(|| ElectionError::from(RangeError::NoSuchElection(election_id)))?;

        let event = match election.vote(caller, candidate_id, now) {
            Ok(event) => event,
            Err(err) => {
                debug!("Rejected vote by {caller} in election {election_id}: {err}");
                return Err(err.into());
            }
        };

        elections
            .replace_one_with_session(u32_id_filter(election_id), &election, None, &mut session)
            .await?;

        self.commit_with(session, event, now).await
    }
}

/// Log a conflict distinctly from other failures.
fn log_db_error(err: &DbError, operation: &str) {
    if is_transient_transaction_error(err) {
        debug!("{operation} lost a write conflict: {err}");
    }
}

#[async_trait]
impl ElectionStore for MongoStore {
    async fn create_election(&self, caller: &Identity, spec: ElectionSpec) -> Result<ElectionId> {
        let now = self.clock.now();
        if let Err(err) = spec.validate(caller, &self.authority, now) {
            debug!("Rejected election from {caller}: {err}");
            return Err(err.into());
        }

        let result = self.insert_election(spec, now).await;
        if let Err(Error::Db(ref err)) = result {
            log_db_error(err, "Election creation");
        }
        result
    }

    async fn vote(
        &self,
        caller: &Identity,
        election_id: ElectionId,
        candidate_id: CandidateId,
    ) -> Result<()> {
        let now = self.clock.now();

        let result = self.record_vote(caller, election_id, candidate_id, now).await;
        if let Err(Error::Db(ref err)) = result {
            log_db_error(err, "Vote");
        }
        result
    }

    async fn election_details(
        &self,
        caller: &Identity,
        election_id: ElectionId,
    ) -> Result<ElectionView> {
        let now = self.clock.now();
        let election = Coll::<Election>::from_db(&self.db)
            .find_one(u32_id_filter(election_id), None)
            .await?
            .ok_or_else(|| ElectionError::from(RangeError::NoSuchElection(election_id)))?;
        Ok(ElectionView::project(&election, caller, now))
    }

    async fn elections(&self, caller: &Identity) -> Result<Vec<ElectionSummary>> {
        let now = self.clock.now();
        let filter: Document = if *caller == self.authority {
            doc! {}
        } else {
            doc! { "voters.identity": caller.as_str() }
        };
        let options = FindOptions::builder().sort(doc! {"_id": 1}).build();

        let elections: Vec<Election> = Coll::<Election>::from_db(&self.db)
            .find(filter, options)
            .await?
            .try_collect()
            .await?;
        Ok(elections
            .iter()
            .map(|election| ElectionSummary::project(election, caller, now))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rocket::{http::Status, tokio};

    use crate::clock::ManualClock;
    use crate::model::election::EligibilityError;

    use super::*;

    #[backend_test(mongodb)]
    async fn racing_votes_commit_once(db: Database, clock: Arc<ManualClock>) {
        let store = Arc::new(
            MongoStore::new(
                crate::testing::mongo_client().await,
                db.name(),
                Identity::authority(),
                clock.clone(),
            )
            .await
            .unwrap(),
        );
        let spec = ElectionSpec::example();
        clock.advance_to(spec.start_time);
        let id = store
            .create_election(&Identity::authority(), spec)
            .await
            .unwrap();

        let attempts: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.vote(&Identity::voter(1), id, 1 + i % 2).await })
            })
            .collect();

        let mut successes = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(()) => successes += 1,
                Err(Error::Election(ElectionError::Eligibility(
                    EligibilityError::AlreadyVoted,
                ))) => {}
                // Lost the write conflict against the winning transaction.
                Err(Error::Db(err)) if is_transient_transaction_error(&err) => {
                    assert_eq!(Error::Db(err).status(), Status::Conflict);
                }
                Err(err) => panic!("unexpected error: {err}"),
            }
        }
        assert_eq!(successes, 1);

        clock.advance(Duration::days(1));
        let view = store
            .election_details(&Identity::authority(), id)
            .await
            .unwrap();
        assert_eq!(view.results.iter().sum::<u32>(), 1);
        assert_eq!(view.voter_choices.iter().filter(|&&c| c != 0).count(), 1);

        let votes = store
            .events()
            .await
            .unwrap()
            .into_iter()
            .filter(|event| matches!(event, ElectionEvent::VoteCasted { .. }))
            .count();
        assert_eq!(votes, 1);
    }
}
