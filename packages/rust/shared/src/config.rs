//! Application configuration for CivicWatch.
//!
//! User config lives at `~/.civicwatch/civicwatch.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CivicWatchError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "civicwatch.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".civicwatch";

/// Snapshot file name within the data directory.
pub const SNAPSHOT_FILE_NAME: &str = "latest_tenders.json";

/// Citizen report file name within the data directory.
pub const REPORTS_FILE_NAME: &str = "reports.json";

// ---------------------------------------------------------------------------
// Config structs (matching civicwatch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Tender scrape settings.
    #[serde(default)]
    pub scrape: ScrapeSectionConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory holding the tender snapshot and report files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "data".into()
}

/// `[scrape]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSectionConfig {
    /// Department codes to traverse, in order.
    #[serde(default = "default_departments")]
    pub departments: Vec<String>,

    /// Tender listing URL; department and page are appended as query params.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Hard ceiling on pages fetched per department.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Politeness delay between successive page fetches, in ms.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

impl Default for ScrapeSectionConfig {
    fn default() -> Self {
        Self {
            departments: default_departments(),
            base_url: default_base_url(),
            max_pages: default_max_pages(),
            timeout_secs: default_timeout_secs(),
            delay_ms: default_delay_ms(),
        }
    }
}

fn default_departments() -> Vec<String> {
    vec!["ENG".into(), "MAR".into(), "WS".into()]
}
fn default_base_url() -> String {
    "https://www.nwcmc.gov.in/web/tenders.php?uid=NDA4".into()
}
fn default_max_pages() -> u32 {
    3
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_delay_ms() -> u64 {
    1000
}

// ---------------------------------------------------------------------------
// Scrape config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime scrape configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Department codes, processed in this order.
    pub departments: Vec<String>,
    /// Tender listing URL.
    pub base_url: String,
    /// Page ceiling per department.
    pub max_pages: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Politeness delay between page fetches, in ms.
    pub delay_ms: u64,
}

impl From<&AppConfig> for ScrapeConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            departments: config.scrape.departments.clone(),
            base_url: config.scrape.base_url.clone(),
            max_pages: config.scrape.max_pages,
            timeout_secs: config.scrape.timeout_secs,
            delay_ms: config.scrape.delay_ms,
        }
    }
}

impl AppConfig {
    /// Path to the tender snapshot file under the data directory.
    pub fn snapshot_path(&self) -> PathBuf {
        PathBuf::from(&self.defaults.data_dir).join(SNAPSHOT_FILE_NAME)
    }

    /// Path to the citizen report file under the data directory.
    pub fn reports_path(&self) -> PathBuf {
        PathBuf::from(&self.defaults.data_dir).join(REPORTS_FILE_NAME)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.civicwatch/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CivicWatchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.civicwatch/civicwatch.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CivicWatchError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| CivicWatchError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CivicWatchError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CivicWatchError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CivicWatchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
