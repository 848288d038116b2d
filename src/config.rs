use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::error::SchemaPatchError;

pub static CONFIG: OnceCell<Config> = OnceCell::new();

/// Read from the working directory after the per-user config file.
const LOCAL_CONFIG_FILE: &str = "schemapatch.toml";
const ENV_PREFIX: &str = "SCHEMAPATCH_";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: PathBuf::from("instance/planner.db"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BackupConfig {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for BackupConfig {
    fn default() -> Self {
        BackupConfig {
            enabled: true,
            dir: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AssetsConfig {
    pub root: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        AssetsConfig {
            root: PathBuf::from("."),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];
    const DEFAULT_LEVEL: &str = "warn";

    fn ensure_valid(&mut self) {
        let str_original = self.level.clone();
        self.level = self.level.trim().to_ascii_lowercase();
        if !Self::LOG_LEVELS.contains(&self.level.as_str()) {
            eprintln!(
                "Config error: log level of '{}' is invalid - using default of '{}'",
                str_original,
                Self::DEFAULT_LEVEL
            );
            self.level = Self::DEFAULT_LEVEL.to_owned();
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: Self::DEFAULT_LEVEL.to_owned(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub backup: BackupConfig,
    pub assets: AssetsConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Defaults, then the per-user `config.toml`, then `schemapatch.toml` in
    /// the working directory, then `SCHEMAPATCH_*` environment variables
    /// (`__` separates sections, e.g. `SCHEMAPATCH_DATABASE__PATH`).
    pub fn figment(user_config: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = user_config {
            figment = figment.merge(Toml::file(path));
        }
        figment
            .merge(Toml::file(LOCAL_CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads the configuration. If a layer fails to parse, the error is
    /// reported and defaults are used.
    pub fn load() -> Self {
        let user_config = ProjectDirs::from("", "", "schemapatch")
            .map(|dirs| dirs.config_dir().join("config.toml"));
        Self::load_from(user_config.as_deref())
    }

    pub fn load_from(user_config: Option<&Path>) -> Self {
        let mut config: Config = Self::figment(user_config).extract().unwrap_or_else(|err| {
            eprintln!(
                "Could not load configuration: {}. Using default configuration.",
                err
            );
            Config::default()
        });

        config.ensure_valid();

        config
    }

    pub fn init(config: Config) -> Result<(), SchemaPatchError> {
        CONFIG
            .set(config)
            .map_err(|_| SchemaPatchError::Config("configuration already initialized".to_string()))
    }

    pub fn get() -> &'static Config {
        CONFIG.get_or_init(Config::load)
    }

    pub fn to_toml(&self) -> Result<String, SchemaPatchError> {
        toml::to_string_pretty(self).map_err(|e| SchemaPatchError::Config(e.to_string()))
    }

    fn ensure_valid(&mut self) {
        self.logging.ensure_valid();
    }
}
