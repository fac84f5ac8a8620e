//! Menu shown when reqfix is started without a subcommand.

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Input, Select};
use std::path::PathBuf;

use reqfix_pm::cli::Output;

use crate::fix::{self, FixArgs};
use crate::template::{self, TemplateArgs, DEFAULT_TEMPLATE_PATH};

const DEFAULT_REQUIREMENTS_PATH: &str = "requirements.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Fix,
    Template,
    Cancel,
}

impl MenuChoice {
    const ALL: [MenuChoice; 3] = [MenuChoice::Fix, MenuChoice::Template, MenuChoice::Cancel];

    fn label(self) -> &'static str {
        match self {
            MenuChoice::Fix => "Fix an existing requirements file",
            MenuChoice::Template => "Create a basic ML requirements template",
            MenuChoice::Cancel => "Cancel",
        }
    }
}

pub fn run(output: &Output) -> Result<i32> {
    let labels: Vec<&str> = MenuChoice::ALL.iter().map(|c| c.label()).collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact_opt()
        .context("Failed to show selection prompt")?;

    let choice = match selection {
        Some(idx) => MenuChoice::ALL[idx],
        None => MenuChoice::Cancel,
    };

    match choice {
        MenuChoice::Fix => {
            let path = ask_path("Requirements file", DEFAULT_REQUIREMENTS_PATH)?;
            fix::execute(
                FixArgs {
                    file: path,
                    ..Default::default()
                },
                output,
            )
        }
        MenuChoice::Template => {
            let path = ask_path("Save template as", DEFAULT_TEMPLATE_PATH)?;
            template::execute(TemplateArgs { path, force: false }, output)
        }
        MenuChoice::Cancel => Ok(0),
    }
}

fn ask_path(prompt: &str, default: &str) -> Result<PathBuf> {
    let path: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()
        .context("Failed to read path")?;
    Ok(PathBuf::from(path.trim()))
}
