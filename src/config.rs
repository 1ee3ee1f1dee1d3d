// Client configuration: which marketplace to talk to and how long to wait.
//
// Values come from three layers, later ones winning: built-in defaults, an
// optional JSON config file, then command-line flags (which clap also fills
// from `CLAWBOUNTY_*` environment variables).

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CliError, CliResult};

pub const DEFAULT_BASE_URL: &str = "https://clawbounty.io";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolved settings used to build an `ApiClient`.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub base_url: Url,
    /// `None` waits forever.
    pub timeout: Option<Duration>,
}

/// Values given on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub config_path: Option<PathBuf>,
}

/// On-disk shape of `config.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load the config file (explicit path, or the default location if it
    /// exists) and apply the overrides on top of it.
    pub fn resolve(overrides: &Overrides) -> CliResult<Self> {
        let file = match &overrides.config_path {
            Some(path) => FileConfig::read(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => FileConfig::read(&path)?,
                _ => FileConfig::default(),
            },
        };
        Self::layered(overrides, file)
    }

    pub fn layered(overrides: &Overrides, file: FileConfig) -> CliResult<Self> {
        let base_url = overrides
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let timeout_secs = overrides
            .timeout_secs
            .or(file.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let config = Config {
            base_url: parse_base_url(&base_url)?,
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        };
        debug!(base_url = %config.base_url, timeout = ?config.timeout, "resolved configuration");
        Ok(config)
    }
}

impl FileConfig {
    pub fn read(path: &Path) -> CliResult<Self> {
        debug!(path = %path.display(), "reading config file");
        let data = std::fs::read_to_string(path)
            .map_err(|e| CliError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        serde_json::from_str(&data)
            .map_err(|e| CliError::Config(format!("cannot parse {}: {}", path.display(), e)))
    }
}

/// `<config dir>/clawbounty/config.json`, e.g. `~/.config/clawbounty/config.json`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("clawbounty").join("config.json"))
}

fn parse_base_url(raw: &str) -> CliResult<Url> {
    let url = Url::parse(raw).map_err(|e| CliError::Config(format!("base URL {raw:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(CliError::Config(format!(
            "base URL {raw:?} must be an absolute http(s) URL"
        )));
    }
    Ok(url)
}
