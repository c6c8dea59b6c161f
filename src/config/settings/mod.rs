
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub topics: TopicConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5002,
        }
    }
}

/// Settings for page fetches made while classifying or building datasets
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    /// Pause between consecutive fetches while building a training set
    pub rate_limit_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 10,
            rate_limit_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of examples held out for evaluation
    pub test_size: f64,
    pub seed: u64,
    pub max_iter: usize,
    /// Gradient norm at which the solver stops early
    pub tolerance: f64,
    /// Inverse regularization strength
    pub c: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            seed: 42,
            max_iter: 500,
            tolerance: 1e-4,
            c: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TopicConfig {
    pub max_topics: usize,
    pub passes: usize,
    /// Topics below this probability are left out of results
    pub min_probability: f64,
    pub seed: u64,
    pub no_below: usize,
    pub no_above: f64,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            max_topics: 5,
            passes: 10,
            min_probability: 0.1,
            seed: 100,
            no_below: 1,
            no_above: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub models_dir: PathBuf,
    pub category_map: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            models_dir: PathBuf::from("models"),
            category_map: PathBuf::from("domain_category_map.json"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid host: {0:?} (cannot be empty)")]
    InvalidHost(String),
    #[error("Invalid port: {0} (must be between 1 and 65535)")]
    InvalidPort(u16),
    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),
    #[error("Invalid user agent (cannot be empty)")]
    InvalidUserAgent,
    #[error("Invalid fetch timeout: {0} (must be between 1 and 60 seconds)")]
    InvalidTimeout(u64),
    #[error("Invalid test size: {0} (must be between 0 and 1, exclusive)")]
    InvalidTestSize(f64),
    #[error("Invalid iteration count: {0} (must be at least 1)")]
    InvalidMaxIter(usize),
    #[error("Invalid solver tolerance: {0} (must be positive)")]
    InvalidTolerance(f64),
    #[error("Invalid regularization strength: {0} (must be positive)")]
    InvalidRegularization(f64),
    #[error("Invalid topic count: {0} (must be between 1 and 50)")]
    InvalidMaxTopics(usize),
    #[error("Invalid pass count: {0} (must be at least 1)")]
    InvalidPasses(usize),
    #[error("Invalid minimum topic probability: {0} (must be between 0 and 1)")]
    InvalidMinProbability(f64),
    #[error("Invalid document frequency ceiling: {0} (must be between 0 and 1)")]
    InvalidNoAbove(f64),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    /// Default configuration directory, `~/.browse-intent`
    #[inline]
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".browse-intent"))
            .or_else(|| dirs::config_dir().map(|dir| dir.join("browse-intent")))
            .ok_or(ConfigError::DirectoryError)
    }

    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let config_dir = self.get_base_dir();

        fs::create_dir_all(config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    #[inline]
    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.get_base_dir().join("config.toml")
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.fetch.validate()?;
        self.training.validate()?;
        self.topics.validate()?;
        Ok(())
    }

    #[inline]
    pub fn visits_path(&self) -> PathBuf {
        self.paths.data_dir.join("visits.json")
    }

    #[inline]
    pub fn labeled_data_path(&self) -> PathBuf {
        self.paths.data_dir.join("labeled_data.json")
    }

    #[inline]
    pub fn website_csv_path(&self) -> PathBuf {
        self.paths.data_dir.join("website_classification.csv")
    }

    #[inline]
    pub fn category_map_path(&self) -> &Path {
        &self.paths.category_map
    }

    #[inline]
    pub fn intent_model_path(&self) -> PathBuf {
        self.paths.models_dir.join("intent_classifier.json")
    }

    #[inline]
    pub fn website_model_path(&self) -> PathBuf {
        self.paths.models_dir.join("website_classifier.json")
    }

    #[inline]
    pub fn topic_model_path(&self) -> PathBuf {
        self.paths.models_dir.join("lda_topic_model.json")
    }

    #[inline]
    pub fn topic_dictionary_path(&self) -> PathBuf {
        self.paths.models_dir.join("lda_dictionary.json")
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidHost(self.host.clone()));
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = if self.host == "localhost" {
            IpAddr::from([127, 0, 0, 1])
        } else {
            self.host
                .parse()
                .map_err(|_| ConfigError::InvalidBindAddress(self.host.clone()))?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl FetchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidUserAgent);
        }

        if !(1..=60).contains(&self.timeout_seconds) {
            return Err(ConfigError::InvalidTimeout(self.timeout_seconds));
        }

        Ok(())
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigError::InvalidTestSize(self.test_size));
        }

        if self.max_iter == 0 {
            return Err(ConfigError::InvalidMaxIter(self.max_iter));
        }

        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }

        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(ConfigError::InvalidRegularization(self.c));
        }

        Ok(())
    }
}

impl TopicConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=50).contains(&self.max_topics) {
            return Err(ConfigError::InvalidMaxTopics(self.max_topics));
        }

        if self.passes == 0 {
            return Err(ConfigError::InvalidPasses(self.passes));
        }

        if !(0.0..1.0).contains(&self.min_probability) {
            return Err(ConfigError::InvalidMinProbability(self.min_probability));
        }

        if !(self.no_above > 0.0 && self.no_above <= 1.0) {
            return Err(ConfigError::InvalidNoAbove(self.no_above));
        }

        Ok(())
    }
}
