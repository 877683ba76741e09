//! mups - metadata and filename utilities for ring packages
//!
//! Ring packages are distributable archives named after the wheel convention:
//! `<escaped-name>-<version>[-<build>]-<tags>.ring`. This library provides the
//! pieces needed to produce and consume those names:
//!
//! - **Grammar validators**: [`is_valid_name`], [`is_valid_version`], [`is_valid_email`]
//! - **Name normalizer**: [`normalize_name`] for comparison-safe package names
//! - **Version model**: [`Version`] with a PEP 440 style total order
//! - **Filename codec**: [`build_filename`] and [`parse_filename`]
//! - **Metadata record**: [`RingInfo`] with JSON and INI serialization
//!
//! # Example
//!
//! ```
//! use mups::{build_filename, parse_filename};
//!
//! let filename = build_filename("My.Package", "1.0", None, &["linux_x86_64"]);
//! assert_eq!(filename, "My_Package-1.0-linux_x86_64.ring");
//!
//! let parsed = parse_filename(&filename).unwrap();
//! assert_eq!(parsed.name, "my-package");
//! assert_eq!(parsed.version.to_string(), "1.0");
//! ```

pub mod config;
pub mod email;
pub mod filename;
pub mod identity;
pub mod logging;
pub mod metadata;
pub mod name;
pub mod platform;
pub mod version;

pub use email::is_valid_email;
pub use filename::{
    build_filename, encode_tag_segment, escape_name, parse_filename, parse_tag_segment,
    try_build_filename, BuildTag, CompatibilityTag, FilenameDefect, FilenameError, RingFilename,
    RING_EXTENSION,
};
pub use identity::{GitConfigIdentity, Identity, IdentityProvider, StaticIdentity};
pub use metadata::{
    parse_ring_info, serialize_ring_info, MetadataError, MetadataFormat, RingInfo,
    RingInfoBuilder,
};
pub use name::{is_valid_name, normalize_name, normalize_name_preserve_case};
pub use version::{is_valid_version, parse_version, InvalidVersion, LocalSegment, PreRelease, Version};
