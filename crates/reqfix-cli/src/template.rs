//! Template command - write a known-good starter requirements file.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use std::path::PathBuf;

use reqfix_pm::artifact::write_manifest;
use reqfix_pm::cli::Output;
use reqfix_pm::template::template_manifest;

pub const DEFAULT_TEMPLATE_PATH: &str = "requirements-basic.txt";

#[derive(Args, Debug, Clone)]
pub struct TemplateArgs {
    /// Where to write the template
    #[arg(value_name = "PATH", default_value = DEFAULT_TEMPLATE_PATH)]
    pub path: PathBuf,

    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

pub fn execute(args: TemplateArgs, output: &Output) -> Result<i32> {
    if args.path.exists() && !args.force {
        output.error(&format!(
            "{} already exists, use --force to overwrite it",
            args.path.display()
        ));
        return Ok(1);
    }

    let manifest = template_manifest();
    write_manifest(&args.path, &manifest)
        .with_context(|| format!("Failed to write {}", args.path.display()))?;

    output.success(&format!(
        "Basic ML requirements template created: {}",
        args.path.display()
    ));
    output.json(&json!({
        "path": args.path,
        "requirements": manifest.requirements().count(),
    }));

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn quiet() -> Output {
        let mut output = Output::new();
        output.set_verbosity(reqfix_pm::cli::Verbosity::Quiet);
        output
    }

    #[test]
    fn test_writes_template() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("requirements-basic.txt");

        let code = execute(TemplateArgs { path: path.clone(), force: false }, &quiet()).unwrap();

        assert_eq!(code, 0);
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Basic Flask web framework"));
        assert!(written.contains("numpy>=1.24.0,<2.3.0"));
        assert!(!written.ends_with('\n'));
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("requirements.txt");
        fs::write(&path, "flask==1.0.0").unwrap();

        let code = execute(TemplateArgs { path: path.clone(), force: false }, &quiet()).unwrap();
        assert_eq!(code, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), "flask==1.0.0");

        let code = execute(TemplateArgs { path: path.clone(), force: true }, &quiet()).unwrap();
        assert_eq!(code, 0);
        assert!(fs::read_to_string(&path).unwrap().contains("torch>=2.0.0"));
    }
}
