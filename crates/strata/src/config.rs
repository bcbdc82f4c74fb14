//! Layered configuration: a required file overlaid with `STRATA__*` variables.

use crate::error::{StrataError, StrataErrorExt};
use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use strata_registry::MemoryStore;
use tracing::info;

const ENV_PREFIX: &str = "STRATA";
const DEFAULT_CONFIG: &str = "strata";

/// Loads `T` from a configuration file with environment overrides.
///
/// The file format follows the extension; without a path, `strata.<ext>` in
/// the working directory is used. Variables such as `STRATA__LOGGING__LEVEL`
/// override `logging.level`.
///
/// # Errors
/// Returns [`StrataError::Config`] if the file is missing or the merged values
/// do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use strata::config::{StrataConfig, load_config};
///
/// let cfg: StrataConfig = load_config(Some("config/missing.toml")).unwrap_or_default();
/// assert_eq!(cfg.logging.level, "info");
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, StrataError>
where
    T: DeserializeOwned,
{
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG), |p| p.as_ref().to_path_buf());
    info!(path = %path.display(), "Loading configuration");

    let config = Config::builder()
        .add_source(File::from(path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

/// Top-level configuration of an application embedding Strata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    pub logging: LoggingConfig,
    /// Initial property values keyed by qualified name, e.g. `".net.Host"`.
    pub properties: BTreeMap<String, String>,
}

impl StrataConfig {
    /// In-memory store pre-populated with [`StrataConfig::properties`].
    #[must_use]
    pub fn property_store(&self) -> MemoryStore {
        self.properties.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub name: String,
    /// `trace`, `debug`, `info`, `warn`, `error` or `off`.
    pub level: String,
    pub console: bool,
    /// Enables rolling file output when set.
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub env_filter: Option<String>,
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "strata".into(),
            level: "info".into(),
            console: true,
            directory: None,
            json: false,
            env_filter: None,
            max_files: 7,
        }
    }
}
