//! Ring package metadata record.
//!
//! [`RingInfo`] is the flat record shipped alongside a ring archive. It is
//! built through [`RingInfoBuilder`], which validates the name, version and
//! author email and derives the archive filename.
//!
//! # File Formats
//!
//! Two text encodings are supported:
//!
//! - JSON, pretty-printed with one key per field
//! - INI, with every field under a single `[ring]` section

use std::fmt;
use std::str::FromStr;

use ini::Ini;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::email::is_valid_email;
use crate::filename::{try_build_filename, BuildTag, FilenameError};
use crate::identity::Identity;
use crate::name::is_valid_name;
use crate::version::{InvalidVersion, Version};

/// INI section holding the record.
const INI_SECTION: &str = "ring";

/// Result type for metadata operations.
pub type MetadataResult<T> = Result<T, MetadataError>;

/// Errors that can occur while building or decoding metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("invalid package name: {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    InvalidVersion(#[from] InvalidVersion),

    #[error("invalid author email: {0:?}")]
    InvalidEmail(String),

    #[error(transparent)]
    Filename(#[from] FilenameError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("INI error: {0}")]
    Ini(String),

    #[error("unknown metadata format {0:?} (expected json or ini)")]
    UnknownFormat(String),
}

/// Text encoding for a [`RingInfo`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetadataFormat {
    #[default]
    Json,
    Ini,
}

impl FromStr for MetadataFormat {
    type Err = MetadataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(MetadataFormat::Json),
            "ini" => Ok(MetadataFormat::Ini),
            _ => Err(MetadataError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for MetadataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataFormat::Json => write!(f, "json"),
            MetadataFormat::Ini => write!(f, "ini"),
        }
    }
}

/// Metadata for a ring package.
///
/// All fields other than `name` and `version` may be empty.
///
/// # Example
///
/// ```
/// use mups::RingInfo;
///
/// let info = RingInfo::builder("my-pkg", "1.0")
///     .platform("linux_x86_64")
///     .author("Jane Doe")
///     .author_email("jane@example.com")
///     .build()
///     .unwrap();
///
/// assert_eq!(info.file_name, "my_pkg-1.0-linux_x86_64.ring");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingInfo {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub requires_dist: String,
    #[serde(default)]
    pub requires_mojo: String,
    #[serde(default)]
    pub file_name: String,
}

impl RingInfo {
    /// Start building a record for `name` at `version`.
    pub fn builder(name: impl Into<String>, version: impl Into<String>) -> RingInfoBuilder {
        RingInfoBuilder {
            info: RingInfo {
                name: name.into(),
                version: version.into(),
                ..Default::default()
            },
            build_tag: None,
        }
    }

    /// Check the name, version and author email.
    pub fn validate(&self) -> MetadataResult<()> {
        if !is_valid_name(&self.name) {
            return Err(MetadataError::InvalidName(self.name.clone()));
        }
        Version::parse(&self.version)?;
        if !self.author_email.is_empty() && !is_valid_email(&self.author_email) {
            return Err(MetadataError::InvalidEmail(self.author_email.clone()));
        }
        Ok(())
    }

    /// Parsed version. Only fails on records that bypassed validation.
    pub fn parsed_version(&self) -> MetadataResult<Version> {
        Ok(Version::parse(&self.version)?)
    }

    fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("name", self.name.as_str()),
            ("version", self.version.as_str()),
            ("platform", self.platform.as_str()),
            ("author", self.author.as_str()),
            ("author_email", self.author_email.as_str()),
            ("requires_dist", self.requires_dist.as_str()),
            ("requires_mojo", self.requires_mojo.as_str()),
            ("file_name", self.file_name.as_str()),
        ]
    }
}

/// Builder for [`RingInfo`].
#[derive(Debug, Clone)]
pub struct RingInfoBuilder {
    info: RingInfo,
    build_tag: Option<BuildTag>,
}

impl RingInfoBuilder {
    /// Opaque platform identifier, embedded as the filename tag.
    pub fn platform(mut self, platform: impl Into<String>) -> Self {
        self.info.platform = platform.into();
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.info.author = author.into();
        self
    }

    pub fn author_email(mut self, email: impl Into<String>) -> Self {
        self.info.author_email = email.into();
        self
    }

    /// Set author name and email from a resolved identity.
    pub fn identity(self, identity: &Identity) -> Self {
        self.author(identity.name.clone())
            .author_email(identity.email.clone())
    }

    pub fn requires_dist(mut self, requires: impl Into<String>) -> Self {
        self.info.requires_dist = requires.into();
        self
    }

    pub fn requires_mojo(mut self, requires: impl Into<String>) -> Self {
        self.info.requires_mojo = requires.into();
        self
    }

    pub fn build_tag(mut self, build_tag: BuildTag) -> Self {
        self.build_tag = Some(build_tag);
        self
    }

    /// Validate the fields and derive `file_name`.
    ///
    /// Fails when the platform or build tag cannot be written into a
    /// filename that decodes back to them.
    pub fn build(self) -> MetadataResult<RingInfo> {
        let mut info = self.info;
        info.validate()?;

        let tags: Vec<&str> = if info.platform.is_empty() {
            Vec::new()
        } else {
            vec![info.platform.as_str()]
        };
        info.file_name =
            try_build_filename(&info.name, &info.version, self.build_tag.as_ref(), &tags)?;

        tracing::debug!(name = %info.name, file_name = %info.file_name, "Built ring metadata");
        Ok(info)
    }
}

/// Serialize a record to text.
pub fn serialize_ring_info(info: &RingInfo, format: MetadataFormat) -> MetadataResult<String> {
    match format {
        MetadataFormat::Json => Ok(serde_json::to_string_pretty(info)?),
        MetadataFormat::Ini => {
            let mut ini = Ini::new();
            for (key, value) in info.fields() {
                ini.with_section(Some(INI_SECTION)).set(key, value);
            }
            let mut buf = Vec::new();
            ini.write_to(&mut buf)
                .map_err(|e| MetadataError::Ini(e.to_string()))?;
            String::from_utf8(buf).map_err(|e| MetadataError::Ini(e.to_string()))
        }
    }
}

/// Parse and validate a record from text.
///
/// Unknown INI keys are ignored; missing optional fields default to empty.
pub fn parse_ring_info(content: &str, format: MetadataFormat) -> MetadataResult<RingInfo> {
    let info = match format {
        MetadataFormat::Json => serde_json::from_str::<RingInfo>(content)?,
        MetadataFormat::Ini => {
            let ini = Ini::load_from_str(content).map_err(|e| MetadataError::Ini(e.to_string()))?;
            let section = ini
                .section(Some(INI_SECTION))
                .ok_or_else(|| MetadataError::Ini(format!("missing [{}] section", INI_SECTION)))?;
            let get = |key: &str| section.get(key).unwrap_or_default().to_string();
            RingInfo {
                name: get("name"),
                version: get("version"),
                platform: get("platform"),
                author: get("author"),
                author_email: get("author_email"),
                requires_dist: get("requires_dist"),
                requires_mojo: get("requires_mojo"),
                file_name: get("file_name"),
            }
        }
    };
    info.validate()?;
    Ok(info)
}
