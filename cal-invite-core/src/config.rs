//! Global cal-invite configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{CalInviteError, CalInviteResult};
use crate::event::{DEFAULT_TIMEZONE, EventTimezone};

static DEFAULT_CACHE_PREFIX: &str = "cal_invite";
static DEFAULT_CACHE_EXPIRES_IN: &str = "24h";

/// Environment variables with this prefix override file values,
/// e.g. `CAL_INVITE_TIMEZONE=Europe/Paris`.
pub const ENV_PREFIX: &str = "CAL_INVITE";

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_cache_prefix() -> String {
    DEFAULT_CACHE_PREFIX.to_string()
}

fn default_cache_expires_in() -> String {
    DEFAULT_CACHE_EXPIRES_IN.to_string()
}

/// Configuration at ~/.config/cal-invite/config.toml
///
/// Nothing in the library reads this implicitly; callers load it and pass the
/// values they need.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CalInviteConfig {
    /// Timezone for events that don't name one
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: String,

    /// humantime duration, e.g. "24h" or "30m"
    #[serde(default = "default_cache_expires_in")]
    pub cache_expires_in: String,
}

impl Default for CalInviteConfig {
    fn default() -> Self {
        CalInviteConfig {
            timezone: default_timezone(),
            cache_prefix: default_cache_prefix(),
            cache_expires_in: default_cache_expires_in(),
        }
    }
}

impl CalInviteConfig {
    pub fn config_path() -> CalInviteResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalInviteError::Config("Could not determine config directory".into()))?
            .join("cal-invite");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config path plus `CAL_INVITE_*` environment overrides.
    pub fn load() -> CalInviteResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path` (which may not exist) plus environment overrides.
    pub fn load_from(path: &Path) -> CalInviteResult<Self> {
        let config: CalInviteConfig = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .map_err(|e| CalInviteError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalInviteError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CalInviteResult<()> {
        self.timezone
            .parse::<EventTimezone>()
            .map_err(|e| CalInviteError::Config(format!("timezone: {e}")))?;
        self.cache_ttl()?;
        Ok(())
    }

    /// `cache_expires_in` as a duration.
    pub fn cache_ttl(&self) -> CalInviteResult<Duration> {
        humantime::parse_duration(&self.cache_expires_in).map_err(|e| {
            CalInviteError::Config(format!(
                "Invalid cache_expires_in '{}': {e}",
                self.cache_expires_in
            ))
        })
    }

    /// Write the config to `path` as TOML.
    pub fn save(&self, path: &Path) -> CalInviteResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CalInviteError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)
            .map_err(|e| CalInviteError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalInviteResult<()> {
        let contents = format!(
            "\
# cal-invite configuration

# Timezone for events that don't specify one (IANA name or +HH:MM):
# timezone = \"{}\"

# Prefix for cache keys:
# cache_prefix = \"{}\"

# How long generated URLs stay cached:
# cache_expires_in = \"{}\"
",
            DEFAULT_TIMEZONE, DEFAULT_CACHE_PREFIX, DEFAULT_CACHE_EXPIRES_IN
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalInviteError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalInviteError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
