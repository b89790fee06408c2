use std::sync::Arc;

use mongodb::Client as MongoClient;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::assistant::{AssistantClient, AssistantConfig};
use crate::model::mongodb::ensure_indexes_exist;
use crate::store::{MongoStore, Store};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_live_results")]
    live_results: bool,
}

fn default_live_results() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            live_results: default_live_results(),
        }
    }
}

impl Config {
    /// Whether results are published while an election is still running.
    /// When off, results only appear once the election is completed.
    pub fn live_results(&self) -> bool {
        self.live_results
    }

    #[cfg(test)]
    pub fn with_live_results(live_results: bool) -> Self {
        Self { live_results }
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
        // Tests may have managed their own config already.
        if rocket.state::<Config>().is_some() {
            return Ok(rocket);
        }

        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    db_uri: String,
    // non-secrets
    #[serde(default = "default_db_name")]
    db_name: String,
}

fn default_db_name() -> String {
    "cds_portal".to_string()
}

/// A fairing that loads the MongoDB config, connects to the database,
/// ensures the indexes that back the store's uniqueness guarantees exist,
/// and places a [`MongoStore`] into managed state as the [`Store`].
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "MongoDB",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");
        // Construct the connection.
        let client = match MongoClient::with_uri_str(config.db_uri).await {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        let db = client.database(&config.db_name);

        // Ensure the required indexes exist.
        if let Err(e) = ensure_indexes_exist(&db).await {
            error!("Failed to connect to database: {e}");
            return Err(rocket);
        }
        info!("...database connection online!");

        // Manage the state.
        let store: Store = Arc::new(MongoStore::new(client, db));
        rocket = rocket.manage(store);
        Ok(rocket)
    }
}

/// A fairing that loads the assistant config and places an
/// [`AssistantClient`] into managed state. A missing API key is not fatal:
/// the chat route reports itself unavailable instead.
pub struct AssistantFairing;

#[rocket::async_trait]
impl Fairing for AssistantFairing {
    fn info(&self) -> Info {
        Info {
            name: "Assistant",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        if rocket.state::<AssistantClient>().is_some() {
            return Ok(rocket);
        }

        let config = match rocket.figment().extract::<AssistantConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load assistant config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        let client = AssistantClient::new(config);
        if client.is_configured() {
            info!("Loaded assistant config");
        } else {
            warn!("No `assistant_api_key` set, the chat assistant is disabled");
        }

        rocket = rocket.manage(client);
        Ok(rocket)
    }
}
