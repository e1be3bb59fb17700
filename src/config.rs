use std::sync::Arc;

use chrono::Duration;
use log::{error, info};
use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::clock::SystemClock;
use crate::model::common::identity::Identity;
use crate::store::{MemoryStore, MongoStore, Store};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
pub struct Config {
    // non-secrets
    authority: Identity,
    auth_ttl: u32,
    // secrets
    jwt_secret: String,
}

impl Config {
    /// The single identity allowed to create elections.
    pub fn authority(&self) -> &Identity {
        &self.authority
    }

    /// Default lifetime of minted auth tokens in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to sign and verify JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the other fairings and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        if config.authority.as_str().trim().is_empty() {
            error!("`authority` must not be empty");
            return Err(rocket);
        }
        info!("Election authority is {}", config.authority);

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Which substrate holds the elections.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In process memory; lost on restart.
    #[default]
    Memory,
    /// A MongoDB replica set.
    Mongodb,
}

/// Configuration for the election store.
#[derive(Deserialize)]
struct StorageConfig {
    #[serde(default)]
    storage: StorageBackend,
    // secrets
    db_uri: Option<String>,
}

/// A fairing that loads the storage config, builds the configured
/// [`ElectionStore`](crate::store::ElectionStore), performs any setup
/// necessary, and places it into managed state as a [`Store`].
///
/// Must be attached after [`ConfigFairing`].
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Election store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<StorageConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load storage config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        let authority = match rocket.state::<Config>() {
            Some(app_config) => app_config.authority().clone(),
            None => {
                error!("Application config must be loaded before the election store");
                return Err(rocket);
            }
        };

        let store: Store = match config.storage {
            StorageBackend::Memory => {
                info!("Using in-memory election store");
                Box::new(MemoryStore::new(authority, Arc::new(SystemClock)))
            }
            StorageBackend::Mongodb => {
                let Some(db_uri) = config.db_uri else {
                    error!("`db_uri` must be set when `storage = \"mongodb\"`");
                    return Err(rocket);
                };
                info!("Loaded database config, connecting...");
                // Construct the connection.
                let client = match MongoClient::with_uri_str(db_uri).await {
                    Ok(client) => client,
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                };
                // Ensure the required indexes and the election ID counter exist.
                let store = match MongoStore::new(
                    client,
                    &get_database_name(),
                    authority,
                    Arc::new(SystemClock),
                )
                .await
                {
                    Ok(store) => store,
                    Err(e) => {
                        error!("Failed to connect to database: {e}");
                        return Err(rocket);
                    }
                };
                info!("...database connection online!");
                Box::new(store)
            }
        };

        // Manage the state.
        rocket = rocket.manage(store);
        Ok(rocket)
    }
}

/// Get the name of the database to use (production version).
#[cfg(not(test))]
pub(crate) fn get_database_name() -> String {
    "elections".to_string()
}

/// Get the name of the database to use (test version).
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
pub(crate) fn get_database_name() -> String {
    let random: u32 = rand::random();
    let db = format!("test{random}");
    info!("Using database {db}");
    db
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Config {
        pub fn example() -> Self {
            Self {
                authority: Identity::authority(),
                auth_ttl: 300,
                jwt_secret: "test secret, not for production".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rocket::figment::{
        providers::{Format, Toml},
        Figment,
    };

    use super::*;

    #[test]
    fn storage_defaults_to_memory() {
        let figment = Figment::from(Toml::string(""));
        let config: StorageConfig = figment.extract().unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.db_uri.is_none());

        let figment = Figment::from(Toml::string(
            r#"
            storage = "mongodb"
            db_uri = "mongodb://localhost:27017/?replicaSet=rs0"
            "#,
        ));
        let config: StorageConfig = figment.extract().unwrap();
        assert_eq!(config.storage, StorageBackend::Mongodb);
        assert!(config.db_uri.is_some());
    }

    #[test]
    fn app_config() {
        let figment = Figment::from(Toml::string(
            r#"
            authority = "returning-officer"
            auth_ttl = 60
            jwt_secret = "shh"
            "#,
        ));
        let config: Config = figment.extract().unwrap();
        assert_eq!(config.authority(), &Identity::authority());
        assert_eq!(config.auth_ttl(), Duration::minutes(1));
        assert_eq!(config.jwt_secret(), b"shh");
    }
}
