//! `filename build` and `filename parse` commands.

use clap::Subcommand;
use mups::{parse_filename, try_build_filename, BuildTag, RingFilename};

use crate::error::CliError;

/// Filename subcommands.
#[derive(Debug, Subcommand)]
pub enum FilenameCommands {
    /// Encode package metadata as a ring filename
    Build {
        /// Package name
        #[arg(long)]
        name: String,

        /// Package version
        #[arg(long)]
        version: String,

        /// Build tag, e.g. 1 or 2custom
        #[arg(long)]
        build: Option<BuildTag>,

        /// Compatibility tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Decode a ring filename
    Parse {
        filename: String,

        /// Print the decoded value as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: FilenameCommands) -> Result<(), CliError> {
    match command {
        FilenameCommands::Build {
            name,
            version,
            build,
            tags,
        } => {
            let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
            println!("{}", try_build_filename(&name, &version, build.as_ref(), &tags)?);
        }
        FilenameCommands::Parse { filename, json } => {
            let parsed = parse_filename(&filename)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else {
                print!("{}", describe(&parsed));
            }
        }
    }
    Ok(())
}

/// Human-readable summary of a decoded filename.
fn describe(parsed: &RingFilename) -> String {
    let mut out = format!("name:    {}\nversion: {}\n", parsed.name, parsed.version);
    if let Some(build) = &parsed.build_tag {
        out.push_str(&format!("build:   {}\n", build));
    }
    for tag in &parsed.tags {
        out.push_str(&format!("tag:     {}\n", tag));
    }
    out
}
