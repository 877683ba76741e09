//! mups - command-line tools for ring package metadata and filenames.

mod commands;
mod error;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::filename::FilenameCommands;
use commands::info::InfoArgs;
use commands::validate::{EmailCommands, NameCommands, VersionCommands};

#[derive(Debug, Parser)]
#[command(name = "mups", version, about = "Ring package metadata and filename utility")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate or normalize package names
    #[command(subcommand)]
    Name(NameCommands),

    /// Validate or compare versions
    #[command(subcommand)]
    Version(VersionCommands),

    /// Validate email addresses
    #[command(subcommand)]
    Email(EmailCommands),

    /// Build or parse ring filenames
    #[command(subcommand)]
    Filename(FilenameCommands),

    /// Build a ring metadata record
    Info(InfoArgs),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    mups::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Name(command) => commands::validate::run_name(command),
        Commands::Version(command) => commands::validate::run_version(command),
        Commands::Email(command) => commands::validate::run_email(command),
        Commands::Filename(command) => commands::filename::run(command),
        Commands::Info(args) => commands::info::run(args),
        Commands::Config(command) => commands::config::run(command),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
