// Configuration: built-in defaults, then an optional JSON file, then
// environment variables. There are no command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::{LabelError, Result};

pub const CONFIG_PATH_ENV: &str = "TWEET_LABELER_CONFIG";
pub const DATASET_ENV: &str = "TWEET_LABELER_DATASET";
pub const TEXT_COLUMN_ENV: &str = "TWEET_LABELER_TEXT_COLUMN";
pub const COLUMN_PREFIX_ENV: &str = "TWEET_LABELER_COLUMN_PREFIX";
pub const CLEAR_SCREEN_ENV: &str = "TWEET_LABELER_CLEAR_SCREEN";

/// Settings for one labeling session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Dataset to label; also the file that gets overwritten.
    pub dataset: PathBuf,
    /// Column whose content is shown to the annotator.
    pub text_column: String,
    /// Prefix of the label column name.
    pub column_prefix: String,
    /// Clear the terminal before each tweet.
    pub clear_screen: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dataset: PathBuf::from("experiment.csv"),
            text_column: "text".into(),
            column_prefix: "test".into(),
            clear_screen: false,
        }
    }
}

impl Config {
    /// Resolve the configuration from the process environment and, if present,
    /// the config file in the user's config directory.
    pub fn from_env() -> Result<Self> {
        Self::resolve(|key| std::env::var(key).ok(), default_config_file())
    }

    /// Layer file and environment values over the defaults. `lookup` stands in
    /// for the environment; `fallback_file` is only read if it exists.
    pub fn resolve<F>(lookup: F, fallback_file: Option<PathBuf>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match lookup(CONFIG_PATH_ENV) {
            Some(explicit) => Self::from_file(Path::new(&explicit))?,
            None => match fallback_file {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Config::default(),
            },
        };
        config.with_overrides(lookup)
    }

    /// Parse a JSON config file. Fields left out keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_err = |reason: String| LabelError::Config {
            path: path.to_path_buf(),
            reason,
        };
        let raw = fs::read_to_string(path).map_err(|e| config_err(e.to_string()))?;
        let config = serde_json::from_str(&raw).map_err(|e| config_err(e.to_string()))?;
        debug!("read config from {}", path.display());
        Ok(config)
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(DATASET_ENV) {
            self.dataset = PathBuf::from(v);
        }
        if let Some(v) = lookup(TEXT_COLUMN_ENV) {
            self.text_column = v;
        }
        if let Some(v) = lookup(COLUMN_PREFIX_ENV) {
            self.column_prefix = v;
        }
        if let Some(v) = lookup(CLEAR_SCREEN_ENV) {
            self.clear_screen = parse_flag(&v).ok_or_else(|| LabelError::Config {
                path: PathBuf::from(CLEAR_SCREEN_ENV),
                reason: format!("`{v}` is not a boolean"),
            })?;
        }
        Ok(self)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `<config dir>/tweet-labeler/config.json`, when the platform has one.
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tweet-labeler").join("config.json"))
}
