//! `name`, `version` and `email` commands.
//!
//! Check commands print the accepted value and fail with a non-zero exit
//! status when the input is rejected.

use std::cmp::Ordering;

use clap::Subcommand;
use mups::{is_valid_email, is_valid_name, normalize_name, normalize_name_preserve_case, Version};

use crate::error::CliError;

/// Name subcommands.
#[derive(Debug, Subcommand)]
pub enum NameCommands {
    /// Check that a package name is valid
    Check { name: String },

    /// Print the normalized form of a package name
    Normalize {
        name: String,

        /// Collapse separators but keep the original letter case
        #[arg(long)]
        keep_case: bool,
    },
}

/// Version subcommands.
#[derive(Debug, Subcommand)]
pub enum VersionCommands {
    /// Check that a version is valid and print its canonical form
    Check { version: String },

    /// Compare two versions, printing <, = or >
    Compare { a: String, b: String },
}

/// Email subcommands.
#[derive(Debug, Subcommand)]
pub enum EmailCommands {
    /// Check that an email address is valid
    Check { address: String },
}

pub fn run_name(command: NameCommands) -> Result<(), CliError> {
    match command {
        NameCommands::Check { name } => {
            if !is_valid_name(&name) {
                return Err(CliError::Invalid(format!(
                    "{:?} is not a valid package name",
                    name
                )));
            }
            println!("{}", name);
        }
        NameCommands::Normalize { name, keep_case } => {
            println!("{}", normalize(&name, keep_case));
        }
    }
    Ok(())
}

pub fn run_version(command: VersionCommands) -> Result<(), CliError> {
    match command {
        VersionCommands::Check { version } => {
            let parsed = Version::parse(&version)?;
            println!("{}", parsed);
        }
        VersionCommands::Compare { a, b } => {
            let a = Version::parse(&a)?;
            let b = Version::parse(&b)?;
            println!("{}", ordering_symbol(a.cmp(&b)));
        }
    }
    Ok(())
}

pub fn run_email(command: EmailCommands) -> Result<(), CliError> {
    match command {
        EmailCommands::Check { address } => {
            if !is_valid_email(&address) {
                return Err(CliError::Invalid(format!(
                    "{:?} is not a valid email address",
                    address
                )));
            }
            println!("{}", address);
        }
    }
    Ok(())
}

fn normalize(name: &str, keep_case: bool) -> String {
    if keep_case {
        normalize_name_preserve_case(name)
    } else {
        normalize_name(name)
    }
}

fn ordering_symbol(ordering: Ordering) -> &'static str {
    match ordering {
        Ordering::Less => "<",
        Ordering::Equal => "=",
        Ordering::Greater => ">",
    }
}
