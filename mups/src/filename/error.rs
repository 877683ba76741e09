//! Error types for the filename codec.

use thiserror::Error;

use crate::version::InvalidVersion;

/// Result type for filename decoding.
pub type FilenameResult<T> = Result<T, FilenameError>;

/// Errors that can occur while encoding or decoding a ring filename.
///
/// Shape problems and version problems are kept apart so callers can tell a
/// malformed filename from a well-formed one carrying a bad version.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameError {
    /// The filename does not have the ring filename shape.
    #[error("invalid ring filename {filename:?}: {reason}")]
    InvalidRingFilename {
        filename: String,
        reason: FilenameDefect,
    },

    /// The inputs cannot be written as a filename that decodes back to
    /// them. `filename` is the best-effort rendering that was refused.
    #[error("cannot encode ring filename {filename:?}: {reason}")]
    Unencodable {
        filename: String,
        reason: FilenameDefect,
    },

    /// The version segment failed to parse.
    #[error("invalid version in ring filename {filename:?}: {source}")]
    InvalidVersion {
        filename: String,
        #[source]
        source: InvalidVersion,
    },
}

impl FilenameError {
    /// The filename that failed to decode, or was refused when encoding.
    pub fn filename(&self) -> &str {
        match self {
            Self::InvalidRingFilename { filename, .. }
            | Self::Unencodable { filename, .. }
            | Self::InvalidVersion { filename, .. } => filename,
        }
    }

    /// Structural defect, if this is a shape error.
    pub fn defect(&self) -> Option<&FilenameDefect> {
        match self {
            Self::InvalidRingFilename { reason, .. } | Self::Unencodable { reason, .. } => {
                Some(reason)
            }
            Self::InvalidVersion { .. } => None,
        }
    }
}

/// The specific structural rule a filename broke.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilenameDefect {
    /// Filename does not end with `.ring`.
    #[error("missing .ring extension")]
    MissingExtension,

    /// Wrong number of `-` separators.
    #[error("expected between 1 and 5 '-' separators, found {0}")]
    SegmentCount(usize),

    /// Name segment is not a validly escaped package name.
    #[error("name segment {0:?} is not a validly escaped package name")]
    NameEscaping(String),

    /// Build segment is not a decimal number followed by a `-`-free suffix.
    #[error("build tag {0:?} must be a decimal number followed by a suffix without '-'")]
    BuildTag(String),

    /// Compatibility tags are empty, have the wrong arity, or cannot share
    /// one segment.
    #[error("malformed compatibility tags {0:?}")]
    Tags(String),
}
