use anyhow::{Context, Result};
use std::path::Path;

use reqfix_pm::config::{CommandSpec, Config};
use reqfix_pm::DiffMode;

/// Settings given on the command line; they win over files and environment
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub resolver: Option<String>,
    pub lookup: Option<String>,
    pub timeout: Option<u64>,
    pub diff: Option<DiffMode>,
}

/// Load reqfix.toml by searching upward from the current working directory
pub fn load_from_cwd(overrides: &ConfigOverrides) -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to resolve working directory")?;
    load(&cwd, overrides)
}

pub fn load(start_dir: &Path, overrides: &ConfigOverrides) -> Result<Config> {
    let mut config = Config::build(Some(start_dir), true).context("Failed to load configuration")?;

    if let Some(path) = config.project_file() {
        log::debug!("Using configuration from {}", path.display());
    }

    apply_overrides(&mut config, overrides)?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, overrides: &ConfigOverrides) -> Result<()> {
    if let Some(command) = &overrides.resolver {
        config
            .set_resolver_command(CommandSpec::Line(command.clone()).into_args())
            .context("Invalid --resolver command")?;
    }

    if let Some(command) = &overrides.lookup {
        config
            .set_lookup_command(CommandSpec::Line(command.clone()).into_args())
            .context("Invalid --lookup command")?;
    }

    if let Some(timeout) = overrides.timeout {
        config.set_timeout(timeout);
    }

    if let Some(diff) = overrides.diff {
        config.set_diff_mode(diff);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqfix_pm::config::ConfigSource;

    #[test]
    fn test_no_overrides_keeps_config() {
        let mut config = Config::default();
        apply_overrides(&mut config, &ConfigOverrides::default()).unwrap();
        assert_eq!(config.resolver.command, vec!["pip"]);
        assert_eq!(config.get_source("resolver.timeout"), None);
    }

    #[test]
    fn test_overrides_win() {
        let mut config = Config::default();
        let overrides = ConfigOverrides {
            resolver: Some("python3 -m pip".to_string()),
            lookup: Some("uv pip".to_string()),
            timeout: Some(0),
            diff: Some(DiffMode::Membership),
        };
        apply_overrides(&mut config, &overrides).unwrap();

        assert_eq!(config.resolver.command, vec!["python3", "-m", "pip"]);
        assert_eq!(config.lookup.command, vec!["uv", "pip"]);
        assert_eq!(config.resolver.timeout_duration(), None);
        assert_eq!(config.diff_mode, DiffMode::Membership);
        assert_eq!(config.get_source("resolver.command"), Some(&ConfigSource::Command));
    }

    #[test]
    fn test_blank_command_rejected() {
        let mut config = Config::default();
        let overrides = ConfigOverrides {
            resolver: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(apply_overrides(&mut config, &overrides).is_err());
    }
}
