// Configuration management module
// TOML settings for the service, page fetching, training and topic modelling

mod display;
pub mod settings;

pub use display::show_config;
pub use settings::{
    Config, ConfigError, FetchConfig, PathsConfig, ServerConfig, TopicConfig, TrainingConfig,
};

/// Get the configuration directory path
#[inline]
pub fn get_config_dir() -> Result<std::path::PathBuf, ConfigError> {
    Config::config_dir()
}
