//! User configuration file.
//!
//! Settings are stored as INI at `~/.config/mups/config.ini` (or the platform
//! equivalent), overridable through the `MUPS_CONFIG` environment variable.
//!
//! ```ini
//! [author]
//! name = Jane Doe
//! email = jane@example.com
//!
//! [build]
//! platform = linux_x86_64
//! metadata_format = json
//!
//! [identity]
//! use_git = true
//! git_program = git
//! git_timeout_secs = 2
//! ```
//!
//! A missing file is not an error; defaults are used instead.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::filename::encode_tag_segment;
use crate::identity::{GitConfigIdentity, Identity, DEFAULT_GIT_TIMEOUT};
use crate::metadata::MetadataFormat;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "MUPS_CONFIG";

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("failed to encode configuration: {0}")]
    Encode(String),

    #[error("unknown configuration key {0:?}")]
    UnknownKey(String),

    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// Default author identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorSection {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Archive build defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSection {
    pub platform: Option<String>,
    pub metadata_format: MetadataFormat,
}

/// Git identity lookup settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySection {
    pub use_git: bool,
    pub git_program: String,
    pub git_timeout_secs: u64,
}

impl Default for IdentitySection {
    fn default() -> Self {
        Self {
            use_git: true,
            git_program: "git".to_string(),
            git_timeout_secs: DEFAULT_GIT_TIMEOUT.as_secs(),
        }
    }
}

/// Contents of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub author: AuthorSection,
    pub build: BuildSection,
    pub identity: IdentitySection,
}

/// Location of the configuration file.
///
/// `MUPS_CONFIG` wins when set; otherwise `<config_dir>/mups/config.ini`,
/// falling back to the current directory when no config dir is known.
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mups")
        .join("config.ini")
}

impl ConfigFile {
    /// Load from the default location.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, returning defaults if it does not exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|e| match e {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })?;

        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Parse INI text. Unknown sections and keys are ignored.
    pub fn parse(content: &str) -> ConfigResult<Self> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::new(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini
                .section(Some(key.section()))
                .and_then(|s| s.get(key.key_name()))
            {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> ConfigResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        self.to_ini()
            .write_to_file(path)
            .map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Render as INI text. Unset optional values are omitted.
    pub fn to_ini_string(&self) -> ConfigResult<String> {
        let mut buf = Vec::new();
        self.to_ini()
            .write_to(&mut buf)
            .map_err(|e| ConfigError::Encode(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| ConfigError::Encode(e.to_string()))
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            let value = key.get(self);
            if !value.is_empty() {
                ini.with_section(Some(key.section()))
                    .set(key.key_name(), value);
            }
        }
        ini
    }

    /// Author identity from the `[author]` section.
    pub fn author_identity(&self) -> Identity {
        Identity::new(
            self.author.name.clone().unwrap_or_default(),
            self.author.email.clone().unwrap_or_default(),
        )
    }

    /// Git identity provider, or `None` when git lookup is disabled.
    pub fn git_identity(&self) -> Option<GitConfigIdentity> {
        self.identity.use_git.then(|| {
            GitConfigIdentity::new()
                .with_program(self.identity.git_program.clone())
                .with_timeout(Duration::from_secs(self.identity.git_timeout_secs))
        })
    }
}

/// Every settable configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    AuthorName,
    AuthorEmail,
    BuildPlatform,
    BuildMetadataFormat,
    IdentityUseGit,
    IdentityGitProgram,
    IdentityGitTimeoutSecs,
}

impl ConfigKey {
    /// All keys in display order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::AuthorName,
            ConfigKey::AuthorEmail,
            ConfigKey::BuildPlatform,
            ConfigKey::BuildMetadataFormat,
            ConfigKey::IdentityUseGit,
            ConfigKey::IdentityGitProgram,
            ConfigKey::IdentityGitTimeoutSecs,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::AuthorName | ConfigKey::AuthorEmail => "author",
            ConfigKey::BuildPlatform | ConfigKey::BuildMetadataFormat => "build",
            ConfigKey::IdentityUseGit
            | ConfigKey::IdentityGitProgram
            | ConfigKey::IdentityGitTimeoutSecs => "identity",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::AuthorName => "name",
            ConfigKey::AuthorEmail => "email",
            ConfigKey::BuildPlatform => "platform",
            ConfigKey::BuildMetadataFormat => "metadata_format",
            ConfigKey::IdentityUseGit => "use_git",
            ConfigKey::IdentityGitProgram => "git_program",
            ConfigKey::IdentityGitTimeoutSecs => "git_timeout_secs",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as a string, empty when unset.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::AuthorName => config.author.name.clone().unwrap_or_default(),
            ConfigKey::AuthorEmail => config.author.email.clone().unwrap_or_default(),
            ConfigKey::BuildPlatform => config.build.platform.clone().unwrap_or_default(),
            ConfigKey::BuildMetadataFormat => config.build.metadata_format.to_string(),
            ConfigKey::IdentityUseGit => config.identity.use_git.to_string(),
            ConfigKey::IdentityGitProgram => config.identity.git_program.clone(),
            ConfigKey::IdentityGitTimeoutSecs => config.identity.git_timeout_secs.to_string(),
        }
    }

    /// Set a value from its string form. An empty string clears optional keys.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> ConfigResult<()> {
        let value = value.trim();
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        };
        let optional = || (!value.is_empty()).then(|| value.to_string());

        match self {
            ConfigKey::AuthorName => config.author.name = optional(),
            ConfigKey::AuthorEmail => {
                if !value.is_empty() && !crate::email::is_valid_email(value) {
                    return Err(invalid("not a valid email address"));
                }
                config.author.email = optional();
            }
            ConfigKey::BuildPlatform => {
                if !value.is_empty() && encode_tag_segment(&[value]).is_err() {
                    return Err(invalid("not a single filename tag segment"));
                }
                config.build.platform = optional();
            }
            ConfigKey::BuildMetadataFormat => {
                config.build.metadata_format = value
                    .parse()
                    .map_err(|_| invalid("expected json or ini"))?;
            }
            ConfigKey::IdentityUseGit => {
                config.identity.use_git =
                    parse_bool(value).ok_or_else(|| invalid("expected a boolean"))?;
            }
            ConfigKey::IdentityGitProgram => {
                if value.is_empty() {
                    return Err(invalid("must not be empty"));
                }
                config.identity.git_program = value.to_string();
            }
            ConfigKey::IdentityGitTimeoutSecs => {
                config.identity.git_timeout_secs = value
                    .parse()
                    .map_err(|_| invalid("expected a whole number of seconds"))?;
            }
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert!(config.author.name.is_none());
        assert_eq!(config.build.metadata_format, MetadataFormat::Json);
        assert!(config.identity.use_git);
        assert_eq!(config.identity.git_program, "git");
        assert_eq!(config.identity.git_timeout_secs, 2);
    }

    #[test]
    fn test_parse_all_sections() {
        let config = ConfigFile::parse(
            "[author]\nname=Jane Doe\nemail=jane@example.com\n\
             [build]\nplatform=mac\nmetadata_format=ini\n\
             [identity]\nuse_git=no\ngit_program=/usr/bin/git\ngit_timeout_secs=5\n",
        )
        .unwrap();
        assert_eq!(config.author.name.as_deref(), Some("Jane Doe"));
        assert_eq!(config.author.email.as_deref(), Some("jane@example.com"));
        assert_eq!(config.build.platform.as_deref(), Some("mac"));
        assert_eq!(config.build.metadata_format, MetadataFormat::Ini);
        assert!(!config.identity.use_git);
        assert_eq!(config.identity.git_program, "/usr/bin/git");
        assert_eq!(config.identity.git_timeout_secs, 5);
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let config = ConfigFile::parse("[author]\nnickname=jd\n[other]\nx=1\n").unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_parse_rejects_bad_value() {
        let err = ConfigFile::parse("[identity]\ngit_timeout_secs=soon\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_ini_string_round_trip() {
        let mut config = ConfigFile::default();
        ConfigKey::AuthorName.set(&mut config, "Jane").unwrap();
        ConfigKey::BuildPlatform.set(&mut config, "linux_x86_64").unwrap();
        let text = config.to_ini_string().unwrap();
        assert!(text.contains("[author]"));
        assert!(!text.contains("email"));
        assert_eq!(ConfigFile::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_ini_string_keeps_non_ascii() {
        let mut config = ConfigFile::default();
        ConfigKey::AuthorName.set(&mut config, "Zoë Ørsted").unwrap();
        let text = config.to_ini_string().unwrap();
        assert!(text.contains("Zoë Ørsted"));
        assert_eq!(ConfigFile::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_key_from_str() {
        assert_eq!(
            "author.email".parse::<ConfigKey>().unwrap(),
            ConfigKey::AuthorEmail
        );
        assert!(matches!(
            "author.nickname".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_key_names_are_unique() {
        let names: std::collections::HashSet<String> =
            ConfigKey::all().iter().map(ConfigKey::name).collect();
        assert_eq!(names.len(), ConfigKey::all().len());
    }

    #[test]
    fn test_set_validates_email() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::AuthorEmail.set(&mut config, "nope").is_err());
        ConfigKey::AuthorEmail.set(&mut config, "a@b.org").unwrap();
        assert_eq!(ConfigKey::AuthorEmail.get(&config), "a@b.org");
    }

    #[test]
    fn test_set_empty_clears_optional() {
        let mut config = ConfigFile::default();
        ConfigKey::AuthorName.set(&mut config, "Jane").unwrap();
        ConfigKey::AuthorName.set(&mut config, "").unwrap();
        assert!(config.author.name.is_none());
    }

    #[test]
    fn test_set_rejects_hyphenated_platform() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::BuildPlatform.set(&mut config, "linux-x86").is_err());
        ConfigKey::BuildPlatform.set(&mut config, "py3-none-any").unwrap();
        assert_eq!(config.build.platform.as_deref(), Some("py3-none-any"));
    }

    #[test]
    fn test_git_identity_disabled() {
        let mut config = ConfigFile::default();
        assert!(config.git_identity().is_some());
        config.identity.use_git = false;
        assert!(config.git_identity().is_none());
    }

    #[test]
    fn test_author_identity() {
        let mut config = ConfigFile::default();
        config.author.name = Some("Jane".to_string());
        assert_eq!(config.author_identity(), Identity::new("Jane", ""));
    }
}
