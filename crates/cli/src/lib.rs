pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use servicemap_core::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "servicemap",
    about = "Servicemap operator CLI",
    long_about = "Run the service insights pipeline over a directory export, validate input \
                  files, and inspect effective configuration.",
    after_help = "Examples:\n  servicemap analyze --input services.json\n  servicemap validate --input services.json\n  servicemap config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Analyze a services export and write the insights report")]
    Analyze {
        #[arg(long, help = "Services JSON export (bare array or {\"services\": [...]})")]
        input: PathBuf,
        #[arg(
            long,
            help = "Report destination (defaults to service-insights-report-<date>.json)"
        )]
        output: Option<PathBuf>,
        #[arg(long, help = "Pretty-print the report JSON")]
        pretty: bool,
    },
    #[command(about = "Parse a services export and report record counts without analyzing")]
    Validate {
        #[arg(long, help = "Services JSON export to check")]
        input: PathBuf,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

fn init_logging() {
    use tracing::Level;

    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        LogFormat::Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Analyze { input, output, pretty } => {
            commands::analyze::run(&input, output.as_deref(), pretty)
        }
        Command::Validate { input } => commands::validate::run(&input),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
