//! Process configuration: where the snapshot lives and how to reach the
//! external chooser. Read from an optional `factotum` config file with
//! `FACTOTUM_*` environment overrides; everything has a default, so running
//! with no configuration at all works.

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{FactotumError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub snapshot: PathBuf,
    pub menu_program: String,
    pub menu_arguments: Vec<String>,
    pub prompt: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            snapshot: PathBuf::from("factotum.json"),
            menu_program: String::from("dmenu"),
            menu_arguments: vec![
                String::from("-i"),
                String::from("-l"),
                String::from("15"),
            ],
            prompt: String::from("factotum"),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Config::builder()
            .add_source(File::with_name("factotum").required(false))
            .add_source(Environment::with_prefix("factotum"))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| FactotumError::Config(e.to_string()))
    }
}
