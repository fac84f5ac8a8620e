use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::source::{ConfigLoader, ConfigSource, RawCommandTable, RawConfig};
use crate::error::{ReqfixError, Result};
use crate::oracle::{PipOracle, DEFAULT_TIMEOUT_SECS};
use crate::report::DiffMode;
use crate::rewrite::ConflictFixTable;
use crate::upgrade::PipIndexLookup;

/// An external command and how long to wait for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandConfig {
    /// Program followed by leading arguments
    pub command: Vec<String>,
    /// Seconds; 0 waits forever
    pub timeout: u64,
}

impl CommandConfig {
    pub fn timeout_duration(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            command: vec!["pip".to_string()],
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Main reqfix configuration
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Command that answers `install --dry-run -r FILE`
    pub resolver: CommandConfig,

    /// Command that answers `index versions PACKAGE`
    pub lookup: CommandConfig,

    /// Drop the builtin conflict fixes and use only `fix_rules`
    pub replace_builtin_fixes: bool,

    /// Extra conflict fixes, applied after the builtin ones in this order
    pub fix_rules: IndexMap<String, String>,

    pub diff_mode: DiffMode,

    #[serde(skip)]
    project_file: Option<PathBuf>,

    #[serde(skip)]
    sources: HashMap<String, ConfigSource>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            resolver: CommandConfig::default(),
            lookup: CommandConfig::default(),
            replace_builtin_fixes: false,
            fix_rules: IndexMap::new(),
            diff_mode: DiffMode::default(),
            project_file: None,
            sources: HashMap::new(),
        }
    }
}

impl Config {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Build configuration from all sources.
    ///
    /// Global config, then the nearest reqfix.toml at or above `start_dir`,
    /// then `REQFIX_*` environment variables when `use_environment` is set.
    pub fn build<P: AsRef<Path>>(start_dir: Option<P>, use_environment: bool) -> Result<Self> {
        Self::build_with(&ConfigLoader::new(use_environment), start_dir)
    }

    pub fn build_with<P: AsRef<Path>>(loader: &ConfigLoader, start_dir: Option<P>) -> Result<Self> {
        let mut config = Self::default();

        for key in Self::config_keys() {
            config.sources.insert(key.to_string(), ConfigSource::Default);
        }

        // 1. Load global config from <home>/config.toml
        let global_config = loader.load_global_config()?;
        config.merge_raw_config(global_config, ConfigSource::Global)?;

        // 2. Load the nearest project reqfix.toml
        if let Some(start_dir) = &start_dir {
            if let Some(path) = loader.find_project_config(start_dir.as_ref()) {
                let project_config = loader.load_config_file(&path)?;
                config.merge_raw_config(project_config, ConfigSource::Project)?;
                config.project_file = Some(path);
            }
        }

        // 3. Apply environment variable overrides
        config.apply_env_overrides(loader)?;

        Ok(config)
    }

    /// The reqfix.toml that was merged, if any
    pub fn project_file(&self) -> Option<&Path> {
        self.project_file.as_deref()
    }

    /// Get the source of a configuration value
    pub fn get_source(&self, key: &str) -> Option<&ConfigSource> {
        self.sources.get(key)
    }

    pub fn set_resolver_command(&mut self, command: Vec<String>) -> Result<()> {
        validate_command("resolver.command", &command)?;
        self.resolver.command = command;
        self.sources.insert("resolver.command".to_string(), ConfigSource::Command);
        Ok(())
    }

    pub fn set_lookup_command(&mut self, command: Vec<String>) -> Result<()> {
        validate_command("lookup.command", &command)?;
        self.lookup.command = command;
        self.sources.insert("lookup.command".to_string(), ConfigSource::Command);
        Ok(())
    }

    /// Timeout in seconds for both resolver and lookup; 0 waits forever
    pub fn set_timeout(&mut self, seconds: u64) {
        self.resolver.timeout = seconds;
        self.lookup.timeout = seconds;
        self.sources.insert("resolver.timeout".to_string(), ConfigSource::Command);
        self.sources.insert("lookup.timeout".to_string(), ConfigSource::Command);
    }

    pub fn set_diff_mode(&mut self, mode: DiffMode) {
        self.diff_mode = mode;
        self.sources.insert("report.diff".to_string(), ConfigSource::Command);
    }

    /// The conflict-fix table: builtin rules (unless replaced) followed by `fix_rules`
    pub fn conflict_fix_table(&self) -> Result<ConflictFixTable> {
        let mut table = if self.replace_builtin_fixes {
            ConflictFixTable::new()
        } else {
            ConflictFixTable::builtin()
        };
        table.extend(self.fix_rules.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        Ok(table)
    }

    pub fn oracle(&self) -> PipOracle {
        PipOracle::new(self.resolver.command.clone(), self.resolver.timeout_duration())
    }

    pub fn version_lookup(&self) -> PipIndexLookup {
        PipIndexLookup::new(self.lookup.command.clone(), self.lookup.timeout_duration())
    }

    fn merge_raw_config(&mut self, raw: RawConfig, source: ConfigSource) -> Result<()> {
        if let Some(resolver) = raw.resolver {
            merge_command_table(&mut self.resolver, resolver, "resolver", &source, &mut self.sources)?;
        }

        if let Some(lookup) = raw.lookup {
            merge_command_table(&mut self.lookup, lookup, "lookup", &source, &mut self.sources)?;
        }

        if let Some(fixes) = raw.fixes {
            if let Some(replace) = fixes.replace_builtin {
                self.replace_builtin_fixes = replace;
                self.sources.insert("fixes.replace_builtin".to_string(), source.clone());
            }
            if !fixes.rules.is_empty() {
                // Later files add rules; a repeated key keeps its first position
                for (constraint, replacement) in fixes.rules {
                    self.fix_rules.insert(constraint, replacement);
                }
                self.sources.insert("fixes.rules".to_string(), source.clone());
            }
        }

        if let Some(diff) = raw.report.and_then(|report| report.diff) {
            self.diff_mode = diff;
            self.sources.insert("report.diff".to_string(), source);
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self, loader: &ConfigLoader) -> Result<()> {
        if let Some(command) = loader.get_env_command("REQFIX_RESOLVER") {
            self.resolver.command = command;
            self.sources.insert(
                "resolver.command".to_string(),
                ConfigSource::Environment("REQFIX_RESOLVER".to_string()),
            );
        }

        if let Some(command) = loader.get_env_command("REQFIX_LOOKUP") {
            self.lookup.command = command;
            self.sources.insert(
                "lookup.command".to_string(),
                ConfigSource::Environment("REQFIX_LOOKUP".to_string()),
            );
        }

        if let Some(timeout) = loader.get_env_u64("REQFIX_TIMEOUT")? {
            self.resolver.timeout = timeout;
            self.lookup.timeout = timeout;
            for key in ["resolver.timeout", "lookup.timeout"] {
                self.sources.insert(
                    key.to_string(),
                    ConfigSource::Environment("REQFIX_TIMEOUT".to_string()),
                );
            }
        }

        Ok(())
    }

    fn config_keys() -> [&'static str; 7] {
        [
            "resolver.command",
            "resolver.timeout",
            "lookup.command",
            "lookup.timeout",
            "fixes.replace_builtin",
            "fixes.rules",
            "report.diff",
        ]
    }
}

fn merge_command_table(
    target: &mut CommandConfig,
    raw: RawCommandTable,
    table: &str,
    source: &ConfigSource,
    sources: &mut HashMap<String, ConfigSource>,
) -> Result<()> {
    if let Some(command) = raw.command {
        let key = format!("{}.command", table);
        let command = command.into_args();
        validate_command(&key, &command)?;
        target.command = command;
        sources.insert(key, source.clone());
    }
    if let Some(timeout) = raw.timeout {
        target.timeout = timeout;
        sources.insert(format!("{}.timeout", table), source.clone());
    }
    Ok(())
}

fn validate_command(key: &str, command: &[String]) -> Result<()> {
    if command.first().map_or(true, |program| program.trim().is_empty()) {
        return Err(ReqfixError::Config(format!("{} must name a program", key)));
    }
    Ok(())
}
