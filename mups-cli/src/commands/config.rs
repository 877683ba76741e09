//! Configuration management commands.
//!
//! `config get`, `config set`, `config list` and `config path` view and edit
//! the settings file from the command line.

use clap::Subcommand;
use mups::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., author.email)
        key: String,
    },

    /// Set a configuration value (an empty value clears optional keys)
    Set {
        /// Configuration key in format section.key (e.g., author.email)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => {
            println!("{}", config_file_path().display());
            Ok(())
        }
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'mups config list' to see available keys.",
            key
        ))
    })
}

fn run_get(key: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = ConfigFile::load()?;
    let value = config_key.get(&config);

    if value.is_empty() {
        println!("(not set)");
    } else {
        println!("{}", value);
    }
    Ok(())
}

fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let mut config = ConfigFile::load()?;
    config_key.set(&mut config, value)?;
    config.save()?;
    tracing::debug!(key = %config_key, path = %config_file_path().display(), "Saved config");

    println!("Set {} = {}", config_key, config_key.get(&config));
    Ok(())
}

fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    print!("{}", render_list(&config));
    Ok(())
}

/// All keys grouped by section, unset values marked.
fn render_list(config: &ConfigFile) -> String {
    let mut out = String::new();
    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();
        if section != current_section {
            if !current_section.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", section));
            current_section = section;
        }

        let value = key.get(config);
        if value.is_empty() {
            out.push_str(&format!("  {} = (not set)\n", key.key_name()));
        } else {
            out.push_str(&format!("  {} = {}\n", key.key_name(), value));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_unknown() {
        let err = parse_key("author.nickname").unwrap_err();
        assert!(err.to_string().contains("mups config list"));
    }

    #[test]
    fn test_render_list_defaults() {
        let text = render_list(&ConfigFile::default());
        assert!(text.starts_with("[author]\n  name = (not set)\n"));
        assert!(text.contains("[build]\n"));
        assert!(text.contains("  metadata_format = json\n"));
        assert!(text.contains("  use_git = true\n"));
        assert!(text.contains("  git_timeout_secs = 2\n"));
    }
}
