#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use crate::config::{AssistantFairing, ConfigFairing, DatabaseFairing};
use crate::logging::LoggerFairing;
use crate::store::Store;

pub mod api;
pub mod assistant;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod store;
pub mod voting;

/// Build the server, backed by the MongoDB store described in the config.
pub fn build() -> Rocket<Build> {
    base().attach(DatabaseFairing)
}

/// Build the server around an existing store.
pub fn rocket_for_store(store: Store) -> Rocket<Build> {
    base().manage(store)
}

fn base() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(AssistantFairing)
}
