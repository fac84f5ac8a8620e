mod config;
mod fix;
mod interactive;
mod template;
mod upgrade;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use env_logger::{Builder, Env};
use std::io::IsTerminal;
use std::process::ExitCode;

use reqfix_pm::cli::{Output, Verbosity};

#[derive(Parser, Debug)]
#[command(name = "reqfix")]
#[command(version, about = "Find a resolvable version of a Python requirements file")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Try the strategy ladder until the requirements resolve
    Fix(fix::FixArgs),

    /// Pin every requirement to its latest published version
    Upgrade(upgrade::UpgradeArgs),

    /// Write a basic ML requirements template
    Template(template::TemplateArgs),
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    let verbosity = Verbosity::from_flags(cli.verbose, cli.quiet);
    Builder::from_env(Env::default().default_filter_or(verbosity.log_filter()))
        .format_timestamp(None)
        .init();

    let mut output = Output::new();
    output.set_verbosity(verbosity);
    output.set_json_mode(cli.format == OutputFormat::Json);

    match cli.command {
        Some(Commands::Fix(args)) => fix::execute(args, &output),
        Some(Commands::Upgrade(args)) => upgrade::execute(args, &output),
        Some(Commands::Template(args)) => template::execute(args, &output),
        None => {
            if !std::io::stdin().is_terminal() {
                Cli::command().print_help()?;
                return Ok(2);
            }
            interactive::run(&output)
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
