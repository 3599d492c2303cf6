use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_CITY: &str = "London";

/// Timeout and retry behaviour for the single fetch of a mount.
///
/// The default has no timeout and no retries, so a fetch that never
/// settles leaves the state pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchPolicy {
    pub timeout: Option<Duration>,
    pub retries: u32,
    /// Delay before the first retry; doubled for each following one.
    pub backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self { timeout: None, retries: 0, backoff: Duration::from_millis(500) }
    }
}

impl FetchPolicy {
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Everything a fetch needs, injected at construction.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub api_key: String,
    pub city: String,
    pub base_url: String,
    pub policy: FetchPolicy,
}

impl FetchConfig {
    pub fn new(api_key: impl Into<String>, city: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        let city = city.into();

        if api_key.trim().is_empty() {
            bail!("API key must not be empty");
        }
        if city.trim().is_empty() {
            bail!("City must not be empty");
        }

        Ok(Self {
            api_key,
            city,
            base_url: DEFAULT_BASE_URL.to_string(),
            policy: FetchPolicy::default(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// city = "London"
/// timeout_secs = 10
/// retries = 2
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,

    #[serde(default = "default_city")]
    pub city: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self { api_key: None, city: default_city(), timeout_secs: None, retries: 0 }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn policy(&self) -> FetchPolicy {
        FetchPolicy {
            timeout: self.timeout_secs.map(Duration::from_secs),
            retries: self.retries,
            ..FetchPolicy::default()
        }
    }

    /// Build the injected fetch configuration, failing when no key is stored.
    pub fn fetch_config(&self) -> Result<FetchConfig> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `weather configure` or pass `--api-key` first."
            )
        })?;

        Ok(FetchConfig::new(api_key, self.city.as_str())?.with_policy(self.policy()))
    }
}
