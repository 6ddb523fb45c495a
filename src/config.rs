//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/orgchart/orgchart.toml`
//! 3. Explicit config file passed with `--config`
//! 4. Environment variables: `ORGCHART__*` prefix

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::Language;

/// Language policy for name resolution and node creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LanguageSettings {
    /// Languages a new node must carry a name for
    pub required: Vec<Language>,
    /// Language consulted when the requested one has no name
    pub fallback: Language,
}

impl Default for LanguageSettings {
    fn default() -> Self {
        Self {
            required: Language::ALL.to_vec(),
            fallback: Language::English,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PagingSettings {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            default_page_size: 5,
            max_page_size: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StoreSettings {
    /// How often an insertion that lost a write race is retried before giving up
    pub insert_retries: u32,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { insert_retries: 3 }
    }
}

/// A user allowed to log in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserConfig {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// Lowercase hex SHA-256 of the password
    pub password_sha256: String,
}

/// Unified configuration for orgchart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// SQLite database file; in-memory store when unset
    pub database: Option<PathBuf>,
    /// HTTP listen address
    pub bind: String,
    /// Load the reference org chart into an empty store
    pub seed: bool,
    pub languages: LanguageSettings,
    pub paging: PagingSettings,
    pub store: StoreSettings,
    pub users: Vec<UserConfig>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: None,
            bind: "127.0.0.1:8000".to_string(),
            seed: true,
            languages: LanguageSettings::default(),
            paging: PagingSettings::default(),
            store: StoreSettings::default(),
            users: Vec::new(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` means "not specified, inherit").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub database: Option<PathBuf>,
    pub bind: Option<String>,
    pub seed: Option<bool>,
    pub languages: RawLanguageSettings,
    pub paging: RawPagingSettings,
    pub store: RawStoreSettings,
    pub users: Option<Vec<UserConfig>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLanguageSettings {
    pub required: Option<Vec<Language>>,
    pub fallback: Option<Language>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawPagingSettings {
    pub default_page_size: Option<usize>,
    pub max_page_size: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawStoreSettings {
    pub insert_retries: Option<u32>,
}

/// Get the XDG config directory for orgchart.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "orgchart").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("orgchart.toml"))
}

/// Expand `~`, `$VAR` and `${VAR}`; on failure the input is returned unchanged.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn env_source() -> Environment {
    Environment::with_prefix("ORGCHART")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("languages.required")
        .try_parsing(true)
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(db) = &self.database {
            self.database = Some(PathBuf::from(expand_env_vars(db.to_string_lossy().as_ref())));
        }
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            database: overlay.database.clone().or_else(|| self.database.clone()),
            bind: overlay.bind.clone().unwrap_or_else(|| self.bind.clone()),
            seed: overlay.seed.unwrap_or(self.seed),
            languages: LanguageSettings {
                required: overlay
                    .languages
                    .required
                    .clone()
                    .unwrap_or_else(|| self.languages.required.clone()),
                fallback: overlay.languages.fallback.unwrap_or(self.languages.fallback),
            },
            paging: PagingSettings {
                default_page_size: overlay
                    .paging
                    .default_page_size
                    .unwrap_or(self.paging.default_page_size),
                max_page_size: overlay
                    .paging
                    .max_page_size
                    .unwrap_or(self.paging.max_page_size),
            },
            store: StoreSettings {
                insert_retries: overlay
                    .store
                    .insert_retries
                    .unwrap_or(self.store.insert_retries),
            },
            users: overlay.users.clone().unwrap_or_else(|| self.users.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/orgchart/orgchart.toml` (if present)
    /// 3. `explicit` config file (must exist)
    /// 4. Environment variables: `ORGCHART__*` prefix
    pub fn load(explicit: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(path) = explicit {
            current = current.merge_with(&load_raw_settings(path)?);
        }

        current = current.apply_env_overrides(env_source())?;
        current.expand_paths();
        current.validate()?;
        Ok(current)
    }

    /// Apply environment variables as explicit overrides.
    fn apply_env_overrides(mut self, env: Environment) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(env)
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("database") {
            self.database = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("bind") {
            self.bind = val;
        }
        if let Ok(val) = config.get_bool("seed") {
            self.seed = val;
        }
        if let Ok(val) = config.get::<Vec<Language>>("languages.required") {
            self.languages.required = val;
        }
        if let Ok(val) = config.get::<Language>("languages.fallback") {
            self.languages.fallback = val;
        }
        if let Ok(val) = config.get::<usize>("paging.default_page_size") {
            self.paging.default_page_size = val;
        }
        if let Ok(val) = config.get::<usize>("paging.max_page_size") {
            self.paging.max_page_size = val;
        }
        if let Ok(val) = config.get::<u32>("store.insert_retries") {
            self.store.insert_retries = val;
        }

        Ok(self)
    }

    /// Reject combinations the services cannot run with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        self.bind_addr()?;
        if self.paging.max_page_size == 0 {
            return Err(ApplicationError::Config {
                message: "paging.max_page_size must be positive".into(),
            });
        }
        if self.paging.default_page_size > self.paging.max_page_size {
            return Err(ApplicationError::Config {
                message: format!(
                    "paging.default_page_size ({}) exceeds paging.max_page_size ({})",
                    self.paging.default_page_size, self.paging.max_page_size
                ),
            });
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ApplicationError> {
        self.bind.parse().map_err(|e| ApplicationError::Config {
            message: format!("bind address {:?}: {e}", self.bind),
        })
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# orgchart configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/orgchart/orgchart.toml
#   File:   --config <path>
#   Env:    ORGCHART__* environment variables, e.g.
#           ORGCHART__BIND=0.0.0.0:8080 ORGCHART__PAGING__MAX_PAGE_SIZE=200

# SQLite database file; omit to keep the tree in memory
# database = "~/.local/share/orgchart/orgchart.db"

# HTTP listen address
# bind = "127.0.0.1:8000"

# Load the reference org chart into an empty store
# seed = true

[languages]
# Every new node needs a name in each of these
# required = ["English", "Italian"]
# Used when a node has no name in the requested language
# fallback = "English"

[paging]
# default_page_size = 5
# max_page_size = 1000

[store]
# Retries for an insertion that lost a write race
# insert_retries = 3

# Users allowed to log in; password_sha256 is the hex SHA-256 of the password
# [[users]]
# id = 1
# username = "admin"
# email = "admin@example.com"
# password_sha256 = "2bb80d537b1da3e38bd30361aa855686bde0eacd7162fef6a25fe97bf527a25b"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
