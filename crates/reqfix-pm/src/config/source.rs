use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReqfixError, Result};
use crate::report::DiffMode;

/// File name searched for in the working directory and its parents
pub const PROJECT_CONFIG_FILE: &str = "reqfix.toml";

/// Represents the source of a configuration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Default built-in value
    Default,
    /// From the global config.toml in the reqfix home
    Global,
    /// From the project reqfix.toml
    Project,
    /// From environment variable
    Environment(String),
    /// Set from a command line flag
    Command,
}

impl ConfigSource {
    pub fn as_str(&self) -> &str {
        match self {
            ConfigSource::Default => "default",
            ConfigSource::Global => "global",
            ConfigSource::Project => "project",
            ConfigSource::Environment(var) => var,
            ConfigSource::Command => "command",
        }
    }
}

/// A command given either as one string or as a list of arguments
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CommandSpec {
    Line(String),
    Args(Vec<String>),
}

impl CommandSpec {
    pub fn into_args(self) -> Vec<String> {
        match self {
            CommandSpec::Line(line) => line.split_whitespace().map(String::from).collect(),
            CommandSpec::Args(args) => args,
        }
    }
}

/// `[resolver]` and `[lookup]` tables
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawCommandTable {
    pub command: Option<CommandSpec>,
    pub timeout: Option<u64>,
}

/// `[fixes]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawFixesTable {
    pub replace_builtin: Option<bool>,
    #[serde(default)]
    pub rules: IndexMap<String, String>,
}

/// `[report]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawReportTable {
    pub diff: Option<DiffMode>,
}

/// Raw configuration data as written in a TOML file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawConfig {
    pub resolver: Option<RawCommandTable>,
    pub lookup: Option<RawCommandTable>,
    pub fixes: Option<RawFixesTable>,
    pub report: Option<RawReportTable>,
}

/// Loads configuration from various sources
#[derive(Debug, Default)]
pub struct ConfigLoader {
    use_environment: bool,
    home: Option<PathBuf>,
    vars: Option<HashMap<String, String>>,
}

impl ConfigLoader {
    pub fn new(use_environment: bool) -> Self {
        Self {
            use_environment,
            home: None,
            vars: None,
        }
    }

    /// Use `home` instead of the platform config directory
    pub fn with_home<P: Into<PathBuf>>(mut self, home: P) -> Self {
        self.home = Some(home.into());
        self
    }

    /// Read `REQFIX_*` variables from `vars` instead of the process environment
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.use_environment = true;
        self.vars = Some(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Get REQFIX_* environment variable
    pub fn get_env(&self, var: &str) -> Option<String> {
        if !self.use_environment {
            return None;
        }

        let value = match &self.vars {
            Some(vars) => vars.get(var).cloned(),
            None => env::var(var).ok(),
        };
        value.filter(|s| !s.trim().is_empty())
    }

    /// Get unsigned integer value from environment variable
    pub fn get_env_u64(&self, var: &str) -> Result<Option<u64>> {
        match self.get_env(var) {
            Some(val) => val.trim().parse().map(Some).map_err(|_| {
                ReqfixError::Config(format!("{} must be a number of seconds, got '{}'", var, val))
            }),
            None => Ok(None),
        }
    }

    /// Get a whitespace-separated command from environment variable
    pub fn get_env_command(&self, var: &str) -> Option<Vec<String>> {
        self.get_env(var).map(|val| CommandSpec::Line(val).into_args())
    }

    /// Get the reqfix home directory
    pub fn get_reqfix_home(&self) -> PathBuf {
        if let Some(home) = &self.home {
            return home.clone();
        }

        if let Some(home) = self.get_env("REQFIX_HOME") {
            return PathBuf::from(home);
        }

        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "reqfix") {
            proj_dirs.config_dir().to_path_buf()
        } else if let Some(base_dirs) = directories::BaseDirs::new() {
            base_dirs.home_dir().join(".reqfix")
        } else {
            PathBuf::from(".reqfix")
        }
    }

    /// Load configuration from a TOML file; a missing file is an empty config
    pub fn load_config_file<P: AsRef<Path>>(&self, path: P) -> Result<RawConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(RawConfig::default());
        }

        log::debug!("Loading configuration from {}", path.display());

        let contents = fs::read_to_string(path)
            .map_err(|e| ReqfixError::Config(format!("Failed to read {}: {}", path.display(), e)))?;

        toml::from_str(&contents).map_err(|source| ReqfixError::TomlParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load global configuration from <home>/config.toml
    pub fn load_global_config(&self) -> Result<RawConfig> {
        self.load_config_file(self.get_reqfix_home().join("config.toml"))
    }

    /// Search upward from `start_dir` for reqfix.toml
    pub fn find_project_config(&self, start_dir: &Path) -> Option<PathBuf> {
        let mut current = start_dir.to_path_buf();

        loop {
            let candidate = current.join(PROJECT_CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }
}
