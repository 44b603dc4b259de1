use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::TrackerError;
use crate::rest::DEFAULT_BASE_URL;

const CONFIG_FILE: &str = "caseboard.toml";
const CONFIG_ENV_VAR: &str = "CASEBOARD_CONFIG";
const CREDS_ENV_VAR: &str = "CASEBOARD_SHEET_CREDS";
const CREDS_FILE: &str = "credentials.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub spreadsheet_id: String,
    pub worksheet: String,
    pub listen: String,
    pub cache_ttl_secs: u64,
    pub logo_path: PathBuf,
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            worksheet: "Client Tracker".to_string(),
            listen: "127.0.0.1:8350".to_string(),
            cache_ttl_secs: 60,
            logo_path: PathBuf::from("logo.jpeg"),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load config from, in order: the explicit override path,
    /// `$CASEBOARD_CONFIG`, `./caseboard.toml`, then
    /// `~/.config/caseboard/caseboard.toml`. No file means defaults.
    /// Environment overrides apply on top either way.
    #[tracing::instrument(skip(override_path))]
    pub fn load(override_path: Option<&Path>) -> Result<Self, TrackerError> {
        let mut cfg = match resolve_config_path(override_path) {
            Some(path) => {
                info!(config = %path.display(), "loading config file");
                Self::from_file(&path)?
            }
            None => {
                warn!("no config file found; using defaults");
                Self::default()
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, TrackerError> {
        let raw = fs::read_to_string(path).map_err(|err| {
            TrackerError::configuration(format!("failed to read {}: {err}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|err| {
            TrackerError::configuration(format!("invalid {}: {err}", path.display()))
        })
    }

    fn apply_env_overrides(&mut self) {
        for (var, slot) in [
            ("CASEBOARD_SPREADSHEET_ID", &mut self.spreadsheet_id),
            ("CASEBOARD_WORKSHEET", &mut self.worksheet),
            ("CASEBOARD_LISTEN", &mut self.listen),
        ] {
            if let Ok(value) = std::env::var(var) {
                let trimmed = value.trim();
                if !trimmed.is_empty() {
                    *slot = trimmed.to_string();
                }
            }
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// The spreadsheet id has no sensible default; its absence is
    /// startup-fatal.
    pub fn require_spreadsheet_id(&self) -> Result<(), TrackerError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(TrackerError::configuration(
                "spreadsheet_id is not set (caseboard.toml or CASEBOARD_SPREADSHEET_ID)",
            ));
        }
        Ok(())
    }
}

/// Service-account style credential: a bearer token for the sheet API.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub token: String,
    #[serde(default)]
    pub client_email: Option<String>,
}

impl Credentials {
    /// Inline JSON from `$CASEBOARD_SHEET_CREDS`, else
    /// `credentials.json` in `search_dir`. Absence or malformed content
    /// is startup-fatal.
    #[tracing::instrument(skip(search_dir))]
    pub fn load(search_dir: &Path) -> Result<Self, TrackerError> {
        if let Ok(raw) = std::env::var(CREDS_ENV_VAR) {
            if !raw.trim().is_empty() {
                info!("loading credentials from {CREDS_ENV_VAR}");
                return Self::parse(&raw, CREDS_ENV_VAR);
            }
        }

        let path = search_dir.join(CREDS_FILE);
        if !path.exists() {
            return Err(TrackerError::configuration(format!(
                "{} not found and {CREDS_ENV_VAR} not set",
                path.display()
            )));
        }

        info!(credentials = %path.display(), "loading credentials file");
        let raw = fs::read_to_string(&path).map_err(|err| {
            TrackerError::configuration(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::parse(&raw, CREDS_FILE)
    }

    pub fn parse(raw: &str, source: &str) -> Result<Self, TrackerError> {
        let creds: Self = serde_json::from_str(raw).map_err(|err| {
            TrackerError::configuration(format!("invalid JSON in {source}: {err}"))
        })?;
        if creds.token.trim().is_empty() {
            return Err(TrackerError::configuration(format!(
                "{source} has an empty token"
            )));
        }
        Ok(creds)
    }
}

fn resolve_config_path(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path.to_path_buf());
    }

    if let Ok(raw) = std::env::var(CONFIG_ENV_VAR) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }

    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    let home_config = dirs::home_dir().map(|home| home.join(".config/caseboard").join(CONFIG_FILE));
    home_config.filter(|path| path.exists())
}
