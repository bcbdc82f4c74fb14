//! Facade crate for Strata.
//! Re-exports the registry and event crates and wires them to configuration
//! and logging. Keep this crate thin: it composes other crates.
//!
//! ## Usage
//! - Load a [`config::StrataConfig`] with [`config::load_config`].
//! - Call [`init_logging`] once at startup and keep the returned [`Logger`].
//! - Build registry trees and event hierarchies through [`prelude`].

pub mod config;
mod error;

pub use error::{StrataError, StrataErrorExt};
pub use strata_events as events;
pub use strata_logger::{Logger, LoggerError};
pub use strata_registry as registry;

use crate::config::LoggingConfig;
use strata_logger::FileFormat;

pub mod prelude {
    pub use strata_events::{Event, EventListener, EventSource, SharedListener};
    pub use strata_registry::{
        DEFAULT_GROUP, MemoryStore, PropertyDefinition, PropertyStore, PropertyType, RegistryNode,
        StringType,
    };
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
/// Returns [`StrataError::Logger`] for an unknown level, an invalid filter, or
/// when a subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<Logger, StrataError> {
    let level = strata_logger::parse_level(&config.level).context("logging.level")?;

    let mut builder =
        Logger::builder().name(config.name.as_str()).console(config.console).level(level);
    if let Some(directives) = &config.env_filter {
        builder = builder.env_filter(directives.as_str());
    }
    if let Some(directory) = &config.directory {
        let format = if config.json { FileFormat::Json } else { FileFormat::Text };
        builder = builder.directory(directory).max_files(config.max_files).format(format);
    }

    Ok(builder.init()?)
}
