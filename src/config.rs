//! Runtime settings read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::postal::{DEFAULT_LOOKUP_URL, LookupError, ViaCepClient};
use crate::strength::{RuleSet, RulesError};
use crate::typewriter::DEFAULT_SPEED;

pub const LOOKUP_URL_VAR: &str = "FORM_ASSIST_LOOKUP_URL";
pub const TYPEWRITER_SPEED_VAR: &str = "FORM_ASSIST_TYPEWRITER_SPEED_MS";
pub const RULES_PATH_VAR: &str = "FORM_ASSIST_RULES_PATH";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Lookup client setup failed: {0}")]
    Lookup(#[from] LookupError),
    #[error("Password rules could not be loaded: {0}")]
    Rules(#[from] RulesError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub lookup_url: String,
    pub typewriter_speed: Duration,
    /// Rule file replacing the built-in password rules.
    pub rules_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lookup_url: DEFAULT_LOOKUP_URL.to_string(),
            typewriter_speed: DEFAULT_SPEED,
            rules_path: None,
        }
    }
}

impl Settings {
    /// Reads settings from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `FORM_ASSIST_LOOKUP_URL`: lookup service base URL
    ///   (default: `https://viacep.com.br/ws`)
    /// - `FORM_ASSIST_TYPEWRITER_SPEED_MS`: delay between characters
    ///   (default: `50`; unparsable values fall back to the default)
    /// - `FORM_ASSIST_RULES_PATH`: password rule file (default: built-in rules)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let lookup_url = std::env::var(LOOKUP_URL_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.lookup_url);

        let typewriter_speed = match std::env::var(TYPEWRITER_SPEED_VAR) {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        "Ignoring {}={:?}: not a number of milliseconds",
                        TYPEWRITER_SPEED_VAR,
                        raw
                    );
                    defaults.typewriter_speed
                }
            },
            Err(_) => defaults.typewriter_speed,
        };

        let rules_path = std::env::var(RULES_PATH_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self {
            lookup_url,
            typewriter_speed,
            rules_path,
        }
    }

    pub fn lookup_client(&self) -> Result<ViaCepClient, ConfigError> {
        Ok(ViaCepClient::new(&self.lookup_url)?)
    }

    /// The configured rule file, or the built-in rules when none is set.
    pub fn rule_set(&self) -> Result<RuleSet, ConfigError> {
        match &self.rules_path {
            Some(path) => Ok(RuleSet::from_path(path)?),
            None => Ok(RuleSet::default()),
        }
    }
}
