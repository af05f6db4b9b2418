//! Core configuration loaded from TOML.
//!
//! # Loading priority
//! 1. Explicit path (CLI `--config`)
//! 2. `CASHCARD_CONFIG` environment variable
//! 3. Built-in defaults
//!
//! Every section is `#[serde(default)]`, so a partial file only overrides the
//! keys it names.

use crate::auth::authenticator::PasswordHashConfig;
use crate::logging::LoggingConfig;
use crate::query::page::{PageSettings, PageSettingsError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "CASHCARD_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub paging: PageSettings,
    pub password_hash: PasswordHashConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file. In-memory when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(PageSettingsError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::Invalid(err) => write!(f, "invalid paging config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

impl CoreConfig {
    /// Loads from the explicit path, then `CASHCARD_CONFIG`, then defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match Self::resolve_config_path(explicit) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        std::env::var_os(CONFIG_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.paging.validate().map_err(ConfigError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use crate::query::page::{SortDirection, SortField};
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.paging.default_size, 20);
        assert_eq!(config.paging.default_sort.field, SortField::Amount);
    }

    #[test]
    fn partial_sections_override_only_named_keys() {
        let config = CoreConfig::from_toml_str(
            r#"
            [paging]
            max_size = 50
            default_sort = { field = "id", direction = "desc" }

            [logging]
            level = "warn"
            "#,
        )
        .unwrap();

        assert_eq!(config.paging.max_size, 50);
        assert_eq!(config.paging.default_size, 20);
        assert_eq!(config.paging.default_sort.field, SortField::Id);
        assert_eq!(config.paging.default_sort.direction, SortDirection::Desc);
        assert_eq!(config.logging.level, "warn");
        assert!(config.database.path.is_none());
    }

    #[test]
    fn rejects_inconsistent_paging() {
        let err = CoreConfig::from_toml_str("[paging]\ndefault_size = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_unknown_sort_field_in_config() {
        let err = CoreConfig::from_toml_str(
            "[paging]\ndefault_sort = { field = \"owner\", direction = \"asc\" }\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\npath = \"/tmp/cards.sqlite3\"").unwrap();

        let config = CoreConfig::load(Some(file.path())).unwrap();
        assert_eq!(
            config.database.path.as_deref(),
            Some(std::path::Path::new("/tmp/cards.sqlite3"))
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CoreConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
