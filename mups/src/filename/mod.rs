//! Ring archive filename encoding and decoding.
//!
//! This module is the single source of truth for ring archive naming.
//!
//! # Format
//!
//! ```text
//! <escaped-name>-<version>[-<build>][-<tags>].ring
//! ```
//!
//! The name segment is escaped so it never contains `-`: every run of
//! non-alphanumeric characters becomes a single `_`. The remaining segments
//! are told apart by the total number of `-` separators:
//!
//! | dashes | segments                                         |
//! |--------|--------------------------------------------------|
//! | 1      | name, version                                    |
//! | 2      | name, version, platform                          |
//! | 3      | name, version, build, platform                   |
//! | 4      | name, version, interpreter-abi-platform          |
//! | 5      | name, version, build, interpreter-abi-platform   |
//!
//! Any other count is rejected. There is no escaping that bounds segments, so
//! this fixed-arity convention is what makes decoding unambiguous.

mod error;
mod tags;

pub use error::{FilenameDefect, FilenameError, FilenameResult};
pub use tags::{encode_tag_segment, parse_tag_segment, CompatibilityTag};

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::name::{is_valid_name, normalize_name, separator_run_pattern};
use crate::version::Version;

/// Extension every ring archive carries.
pub const RING_EXTENSION: &str = ".ring";

/// Tag emitted when a build tag is present but no tags were given.
///
/// Without it the build segment would decode as a platform.
const UNIVERSAL_PLATFORM: &str = "any";

/// Build number used to order archives of the same name and version.
///
/// Formatted as a decimal number followed by a suffix, e.g. `1`, `2b`,
/// `20240101_nightly`. The suffix never contains `-`, which separates filename
/// segments. Orders by number, then suffix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BuildTag {
    pub number: u64,
    pub suffix: String,
}

impl BuildTag {
    pub fn new(number: u64, suffix: impl Into<String>) -> Self {
        Self {
            number,
            suffix: suffix.into(),
        }
    }
}

/// Get the build tag pattern: leading digits, then anything.
fn build_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([0-9]+)(.*)$").expect("valid build tag regex"))
}

impl FromStr for BuildTag {
    type Err = FilenameDefect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let defect = || FilenameDefect::BuildTag(s.to_string());
        if s.contains('-') {
            return Err(defect());
        }
        let captures = build_tag_pattern().captures(s).ok_or_else(defect)?;
        let number = captures[1].parse::<u64>().map_err(|_| defect())?;
        Ok(Self {
            number,
            suffix: captures[2].to_string(),
        })
    }
}

impl fmt::Display for BuildTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.suffix)
    }
}

impl Serialize for BuildTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A decoded ring filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RingFilename {
    /// Normalized package name (see [`normalize_name`]).
    pub name: String,
    pub version: Version,
    pub build_tag: Option<BuildTag>,
    /// Empty when the filename carries no tag segment.
    pub tags: BTreeSet<CompatibilityTag>,
}

impl FromStr for RingFilename {
    type Err = FilenameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_filename(s)
    }
}

/// Escape a package name for use as a filename segment.
///
/// ```
/// use mups::escape_name;
///
/// assert_eq!(escape_name("my-package"), "my_package");
/// assert_eq!(escape_name("My..Pkg"), "My_Pkg");
/// ```
pub fn escape_name(name: &str) -> String {
    separator_run_pattern().replace_all(name, "_").into_owned()
}

/// Version segment as embedded in a filename.
///
/// Valid versions use their canonical form, which never contains `-`.
fn escape_version(version: &str) -> String {
    match Version::parse(version) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => version.replace('-', "_"),
    }
}

/// Build the filename for a ring archive.
///
/// The name and version are expected to be valid already; this function only
/// formats. Tags are combined by [`encode_tag_segment`], and a `-` in the
/// build tag suffix is written as `_`. Use [`try_build_filename`] for input
/// that has not been validated.
///
/// # Examples
///
/// ```
/// use mups::{build_filename, BuildTag};
///
/// assert_eq!(build_filename("test", "1", None, &[]), "test-1.ring");
/// assert_eq!(build_filename("test", "1", None, &["mac"]), "test-1-mac.ring");
/// assert_eq!(
///     build_filename("my.pkg", "2.0", Some(&BuildTag::new(3, "")), &["linux", "mac"]),
///     "my_pkg-2.0-3-linux.mac.ring"
/// );
/// ```
pub fn build_filename(
    name: &str,
    version: &str,
    build_tag: Option<&BuildTag>,
    tags: &[&str],
) -> String {
    let mut segments = vec![escape_name(name), escape_version(version)];

    if let Some(build) = build_tag {
        segments.push(build.to_string().replace('-', "_"));
    }

    let tag_segment = encode_tag_segment(tags).unwrap_or_else(|_| tags.join("."));
    if !tag_segment.is_empty() {
        segments.push(tag_segment);
    } else if build_tag.is_some() {
        segments.push(UNIVERSAL_PLATFORM.to_string());
    }

    format!("{}{}", segments.join("-"), RING_EXTENSION)
}

/// Build a filename, refusing input that would not decode back unchanged.
///
/// Decoding the result always yields the normalized name, the parsed
/// version, the same build tag and the union of the tags.
///
/// # Errors
///
/// [`FilenameError::InvalidVersion`] when the version does not parse, and
/// [`FilenameError::Unencodable`] when the name escapes to an invalid
/// segment, the build tag does not survive formatting, or the tags cannot
/// share one segment.
///
/// # Examples
///
/// ```
/// use mups::{try_build_filename, FilenameDefect};
///
/// assert_eq!(
///     try_build_filename("pkg", "1.0", None, &["py3-none-any", "py2-none-any"]).unwrap(),
///     "pkg-1.0-py2.py3-none-any.ring"
/// );
///
/// let err = try_build_filename("pkg", "1.0", None, &["linux-x86"]).unwrap_err();
/// assert_eq!(err.defect(), Some(&FilenameDefect::Tags("linux-x86".to_string())));
/// ```
pub fn try_build_filename(
    name: &str,
    version: &str,
    build_tag: Option<&BuildTag>,
    tags: &[&str],
) -> FilenameResult<String> {
    let filename = build_filename(name, version, build_tag, tags);
    let unencodable = |reason: FilenameDefect| FilenameError::Unencodable {
        filename: filename.clone(),
        reason,
    };

    let escaped = escape_name(name);
    if !is_escaped_name(&escaped) {
        return Err(unencodable(FilenameDefect::NameEscaping(escaped)));
    }
    if let Err(source) = Version::parse(version) {
        return Err(FilenameError::InvalidVersion {
            filename: filename.clone(),
            source,
        });
    }
    if let Some(build) = build_tag {
        let written = build.to_string();
        if written.parse::<BuildTag>().as_ref() != Ok(build) {
            return Err(unencodable(FilenameDefect::BuildTag(written)));
        }
    }
    encode_tag_segment(tags).map_err(unencodable)?;

    Ok(filename)
}

/// Parse a ring archive filename into its components.
///
/// # Errors
///
/// [`FilenameError::InvalidRingFilename`] when the extension, separator
/// count, name escaping, build tag or tag segment is malformed, and
/// [`FilenameError::InvalidVersion`] when the version segment fails to parse.
///
/// # Examples
///
/// ```
/// use mups::{parse_filename, FilenameDefect};
///
/// let parsed = parse_filename("test-1.ring").unwrap();
/// assert_eq!(parsed.name, "test");
/// assert!(parsed.build_tag.is_none());
/// assert!(parsed.tags.is_empty());
///
/// let err = parse_filename("bad.ring").unwrap_err();
/// assert_eq!(err.defect(), Some(&FilenameDefect::SegmentCount(0)));
/// ```
pub fn parse_filename(filename: &str) -> FilenameResult<RingFilename> {
    let result = decode(filename);
    if let Err(e) = &result {
        tracing::debug!(filename, error = %e, "Rejected ring filename");
    }
    result
}

fn decode(filename: &str) -> FilenameResult<RingFilename> {
    let invalid = |reason: FilenameDefect| FilenameError::InvalidRingFilename {
        filename: filename.to_string(),
        reason,
    };

    let stem = filename
        .strip_suffix(RING_EXTENSION)
        .ok_or_else(|| invalid(FilenameDefect::MissingExtension))?;

    let dashes = stem.matches('-').count();
    let (has_build, has_tags) = match dashes {
        1 => (false, false),
        2 | 4 => (false, true),
        3 | 5 => (true, true),
        n => return Err(invalid(FilenameDefect::SegmentCount(n))),
    };

    // Name and version never contain '-', so a bounded left split leaves any
    // interpreter-abi-platform triple intact in the last piece.
    let fields = 2 + usize::from(has_build) + usize::from(has_tags);
    let mut segments = stem.splitn(fields, '-');
    let mut next = || segments.next().unwrap_or_default();

    let name_segment = next();
    if !is_escaped_name(name_segment) {
        return Err(invalid(FilenameDefect::NameEscaping(
            name_segment.to_string(),
        )));
    }

    let version_segment = next();
    let version =
        Version::parse(version_segment).map_err(|source| FilenameError::InvalidVersion {
            filename: filename.to_string(),
            source,
        })?;

    let build_tag = if has_build {
        Some(next().parse::<BuildTag>().map_err(invalid)?)
    } else {
        None
    };

    let tags = if has_tags {
        parse_tag_segment(next()).map_err(invalid)?
    } else {
        BTreeSet::new()
    };

    Ok(RingFilename {
        name: normalize_name(name_segment),
        version,
        build_tag,
        tags,
    })
}

/// Whether a segment could have been produced by [`escape_name`] from a
/// valid package name.
fn is_escaped_name(segment: &str) -> bool {
    is_valid_name(segment)
        && !segment.contains("__")
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}
