#[macro_use]
extern crate log;
#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};
use rocket_dyn_templates::Template;

pub mod api;
pub mod config;
pub mod error;
pub mod model;

use config::{ConfigFairing, StoreFairing};

/// Assemble the server: routes, templating, config, and the question store.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount("/", api::routes())
        .attach(Template::fairing())
        .attach(ConfigFairing)
        .attach(StoreFairing)
}

/// Create a fresh scratch directory for a single test.
/// Use a random name to avoid collisions between tests.
#[cfg(test)]
pub(crate) fn test_data_dir() -> std::path::PathBuf {
    let random: u32 = rand::random();
    let dir = std::env::temp_dir().join(format!("askboard-test-{random}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Build the server against the given data file instead of the configured one.
#[cfg(test)]
pub(crate) fn rocket_for_data_file(data_file: &std::path::Path) -> Rocket<Build> {
    let figment = rocket::Config::figment().merge(("data_file", data_file.display().to_string()));
    rocket::custom(figment)
        .mount("/", api::routes())
        .attach(Template::fairing())
        .attach(ConfigFairing)
        .attach(StoreFairing)
}
