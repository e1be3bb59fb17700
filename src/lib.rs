#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;

pub use config::Config;

use config::{ConfigFairing, StoreFairing};
use logging::LoggerFairing;
use store::Store;

/// The server as configured by `Rocket.toml` and the environment.
pub fn build() -> Rocket<Build> {
    // Ignite fairings run in attach order; the store needs the config.
    with_api(rocket::build()).attach(StoreFairing)
}

/// The server around an already constructed store, e.g. one driven by a
/// manual clock.
pub fn rocket_for_store(rocket: Rocket<Build>, store: Store) -> Rocket<Build> {
    with_api(rocket.manage(store))
}

fn with_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
}

/// Shared setup for endpoint tests; see the `backend_test` attribute.
#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, Utc};
    use mongodb::{Client as MongoClient, Database};
    use rocket::{
        figment::providers::Serialized,
        http::{ContentType, Header, Status},
        local::asynchronous::Client,
        serde::json,
    };

    use crate::clock::ManualClock;
    use crate::config::{get_database_name, Config};
    use crate::model::{
        api::CreatedElection,
        auth::AuthToken,
        common::{election::ElectionId, identity::Identity},
        election::ElectionSpec,
    };
    use crate::store::{MemoryStore, MongoStore, Store};

    pub struct TestContext {
        pub client: Client,
        pub clock: Arc<ManualClock>,
        pub db: Option<Database>,
    }

    /// Where test clocks start: one hour before [`ElectionSpec::example`] opens.
    pub fn epoch() -> DateTime<Utc> {
        ElectionSpec::example().start_time - Duration::hours(1)
    }

    /// An `Authorization` header authenticating as `identity`.
    pub fn bearer(identity: &Identity) -> Header<'static> {
        let jwt = AuthToken::new(identity.clone())
            .into_jwt(&Config::example())
            .unwrap();
        Header::new("Authorization", format!("Bearer {jwt}"))
    }

    pub async fn mongo_client() -> MongoClient {
        let db_uri = rocket::Config::figment()
            .extract_inner::<String>("db_uri")
            .expect("`db_uri` not set");
        MongoClient::with_uri_str(&db_uri).await.unwrap()
    }

    pub async fn setup(use_mongodb: bool) -> TestContext {
        log4rs_test_utils::test_logging::init_logging_once_for(["elections_backend"], None, None);

        let clock = Arc::new(ManualClock::new(epoch()));
        let (store, db): (Store, Option<Database>) = if use_mongodb {
            let store = MongoStore::new(
                mongo_client().await,
                &get_database_name(),
                Identity::authority(),
                clock.clone(),
            )
            .await
            .unwrap();
            let db = store.database().clone();
            (Box::new(store), Some(db))
        } else {
            let store = MemoryStore::new(Identity::authority(), clock.clone());
            (Box::new(store), None)
        };

        let figment = rocket::Config::figment().merge(Serialized::globals(Config::example()));
        let rocket = crate::rocket_for_store(rocket::custom(figment), store);
        let client = Client::tracked(rocket).await.unwrap();

        TestContext { client, clock, db }
    }

    pub async fn cleanup(db: Option<Database>) {
        if let Some(db) = db {
            db.drop(None).await.unwrap();
        }
    }

    /// Create `spec` as the authority, returning the new ID.
    pub async fn create_election(client: &Client, spec: &ElectionSpec) -> ElectionId {
        let response = client
            .post("/elections")
            .header(ContentType::JSON)
            .header(bearer(&Identity::authority()))
            .body(json::to_string(spec).unwrap())
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        response.into_json::<CreatedElection>().await.unwrap().id
    }
}
