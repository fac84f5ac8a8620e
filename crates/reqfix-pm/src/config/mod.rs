//! Configuration management for reqfix
//!
//! Values are merged from several sources, later ones winning.
//!
//! # Configuration Sources (in priority order, highest to lowest)
//!
//! 1. Command line flags (applied by the caller through the `set_*` methods)
//! 2. Environment variables (`REQFIX_RESOLVER`, `REQFIX_LOOKUP`, `REQFIX_TIMEOUT`)
//! 3. The nearest `reqfix.toml` at or above the working directory
//! 4. Global `config.toml` in the reqfix home (`REQFIX_HOME` or the platform config dir)
//! 5. Built-in defaults
//!
//! # Example
//!
//! ```rust,no_run
//! use reqfix_pm::config::Config;
//! use std::path::Path;
//!
//! let config = Config::build(Some(Path::new("/path/to/project")), true).unwrap();
//!
//! println!("Resolver: {:?}", config.resolver.command);
//! println!("Timeout: {}s", config.resolver.timeout);
//!
//! let table = config.conflict_fix_table().unwrap();
//! println!("{} conflict fixes", table.len());
//! ```

mod config;
mod source;

pub use config::{CommandConfig, Config};
pub use source::{
    CommandSpec, ConfigLoader, ConfigSource, RawCommandTable, RawConfig, RawFixesTable,
    RawReportTable, PROJECT_CONFIG_FILE,
};
