//! Compatibility tags carried in the final filename segment.
//!
//! Two shapes are recognised:
//!
//! - a single platform segment: `linux_x86_64`, or alternatives `linux.mac`
//! - a wheel-style triple: `py3.py2-none-any`
//!
//! Alternatives are separated by `.` or `+` and expand to the Cartesian
//! product of the components:
//!
//! ```text
//! py2.py3-none-any  →  {py2-none-any, py3-none-any}
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

use super::error::FilenameDefect;

/// A single compatibility tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompatibilityTag {
    /// An opaque platform identifier (e.g., `mac`, `linux_x86_64`).
    Platform(String),
    /// Interpreter, ABI and platform, as in wheel filenames.
    Triple {
        interpreter: String,
        abi: String,
        platform: String,
    },
}

impl CompatibilityTag {
    /// Create a platform tag.
    pub fn platform(name: impl Into<String>) -> Self {
        CompatibilityTag::Platform(name.into())
    }

    /// Create an interpreter/ABI/platform tag.
    pub fn triple(
        interpreter: impl Into<String>,
        abi: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        CompatibilityTag::Triple {
            interpreter: interpreter.into(),
            abi: abi.into(),
            platform: platform.into(),
        }
    }
}

impl fmt::Display for CompatibilityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompatibilityTag::Platform(name) => f.write_str(name),
            CompatibilityTag::Triple {
                interpreter,
                abi,
                platform,
            } => write!(f, "{}-{}-{}", interpreter, abi, platform),
        }
    }
}

impl Serialize for CompatibilityTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Expand a tag segment into its set of tags.
///
/// # Examples
///
/// ```
/// use mups::{parse_tag_segment, CompatibilityTag};
///
/// let tags = parse_tag_segment("py2.py3-none-any").unwrap();
/// assert_eq!(tags.len(), 2);
/// assert!(tags.contains(&CompatibilityTag::triple("py3", "none", "any")));
///
/// let tags = parse_tag_segment("mac").unwrap();
/// assert!(tags.contains(&CompatibilityTag::platform("mac")));
/// ```
pub fn parse_tag_segment(segment: &str) -> Result<BTreeSet<CompatibilityTag>, FilenameDefect> {
    let malformed = || FilenameDefect::Tags(segment.to_string());
    let components: Vec<&str> = segment.split('-').collect();

    match components.as_slice() {
        [platforms] => Ok(alternatives(platforms)
            .ok_or_else(malformed)?
            .into_iter()
            .map(CompatibilityTag::platform)
            .collect()),
        [interpreters, abis, platforms] => {
            let interpreters = alternatives(interpreters).ok_or_else(malformed)?;
            let abis = alternatives(abis).ok_or_else(malformed)?;
            let platforms = alternatives(platforms).ok_or_else(malformed)?;

            let mut tags = BTreeSet::new();
            for interpreter in &interpreters {
                for abi in &abis {
                    for platform in &platforms {
                        tags.insert(CompatibilityTag::triple(*interpreter, *abi, *platform));
                    }
                }
            }
            Ok(tags)
        }
        _ => Err(malformed()),
    }
}

/// Encode tags as a single filename segment.
///
/// Each input is either a platform segment (`mac`, `linux.mac`) or a triple
/// (`py3-none-any`). Platforms are joined with `.`. Triples are merged into
/// one wheel-style segment with sorted alternatives per component. The
/// result decodes to exactly the union of the inputs, so a mix of platforms
/// and triples, or triples that do not form a full product, is rejected.
///
/// # Examples
///
/// ```
/// use mups::filename::encode_tag_segment;
///
/// assert_eq!(encode_tag_segment(&["mac", "linux"]).unwrap(), "mac.linux");
/// assert_eq!(
///     encode_tag_segment(&["py3-none-any", "py2-none-any"]).unwrap(),
///     "py2.py3-none-any"
/// );
/// assert!(encode_tag_segment(&["linux-x86"]).is_err());
/// ```
pub fn encode_tag_segment(tags: &[&str]) -> Result<String, FilenameDefect> {
    let mut platforms = Vec::new();
    let mut triples = BTreeSet::new();
    for tag in tags {
        let parsed = parse_tag_segment(tag)?;
        if tag.contains('-') {
            triples.extend(parsed);
        } else {
            platforms.push(*tag);
        }
    }

    if triples.is_empty() {
        return Ok(platforms.join("."));
    }
    let unrepresentable = || FilenameDefect::Tags(tags.join(" "));
    if !platforms.is_empty() {
        return Err(unrepresentable());
    }
    merge_triples(&triples).ok_or_else(unrepresentable)
}

/// Write a set of triples as `i.i-a.a-p.p`, if their product is the set.
fn merge_triples(triples: &BTreeSet<CompatibilityTag>) -> Option<String> {
    let mut interpreters = BTreeSet::new();
    let mut abis = BTreeSet::new();
    let mut platforms = BTreeSet::new();
    for tag in triples {
        match tag {
            CompatibilityTag::Triple {
                interpreter,
                abi,
                platform,
            } => {
                interpreters.insert(interpreter.as_str());
                abis.insert(abi.as_str());
                platforms.insert(platform.as_str());
            }
            CompatibilityTag::Platform(_) => return None,
        }
    }

    if interpreters.len() * abis.len() * platforms.len() != triples.len() {
        return None;
    }
    let join = |parts: &BTreeSet<&str>| parts.iter().copied().collect::<Vec<_>>().join(".");
    Some(format!(
        "{}-{}-{}",
        join(&interpreters),
        join(&abis),
        join(&platforms)
    ))
}

/// Split a component on `.`/`+`, rejecting empty alternatives.
fn alternatives(component: &str) -> Option<Vec<&str>> {
    let parts: Vec<&str> = component.split(['.', '+']).collect();
    if parts.iter().any(|part| part.is_empty()) {
        return None;
    }
    Some(parts)
}
