use std::path::{Path, PathBuf};

use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::store::{FileStore, QuestionStore};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    data_file: PathBuf,
}

impl Config {
    /// Location of the JSON file holding the stored questions.
    /// Configured via `data_file`.
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the store fairing and control over error
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

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that constructs the question store from the configured data file
/// location and places it into managed state as a trait object, so a
/// different [`QuestionStore`] implementation can stand in for the file.
pub struct StoreFairing;

#[rocket::async_trait]
impl Fairing for StoreFairing {
    fn info(&self) -> Info {
        Info {
            name: "Question store",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        // The config fairing must have run first.
        let store = match rocket.state::<Config>() {
            Some(config) => FileStore::new(config.data_file()),
            None => {
                error!("The question store requires the config to be loaded");
                return Err(rocket);
            }
        };
        info!("Storing questions in {}", store.path().display());

        // Manage the state.
        Ok(rocket.manage(Box::new(store) as Box<dyn QuestionStore>))
    }
}
