//! Version parsing and ordering.
//!
//! Versions follow the PEP 440 grammar:
//!
//! ```text
//! [v][N!]N(.N)*[{a|b|rc}N][.postN][.devN][+local]
//! ```
//!
//! Parsing is case-insensitive and ignores surrounding whitespace. Spelling
//! variants are accepted and normalized: `alpha` → `a`, `beta` → `b`,
//! `c`/`pre`/`preview` → `rc`, `rev`/`r` → `post`, and `-N` is an implicit
//! post release. Separators (`.`, `-`, `_`) before a letter segment are optional.
//!
//! # Ordering
//!
//! Versions compare by epoch, then release (numerically, with trailing zeros
//! ignored), then pre-release, post-release, dev-release and finally local
//! segment:
//!
//! ```text
//! 1.0.dev0 < 1.0a1 < 1.0rc1 < 1.0 < 1.0+local < 1.0.post1 < 1!0.1
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A version string did not match the version grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version: {0:?}")]
pub struct InvalidVersion(String);

impl InvalidVersion {
    /// The rejected input.
    pub fn input(&self) -> &str {
        &self.0
    }
}

/// Pre-release phase, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreRelease {
    /// `a`, `alpha`
    Alpha(u64),
    /// `b`, `beta`
    Beta(u64),
    /// `rc`, `c`, `pre`, `preview`
    ReleaseCandidate(u64),
}

impl PreRelease {
    fn from_parts(label: &str, number: u64) -> Self {
        match label {
            "a" | "alpha" => PreRelease::Alpha(number),
            "b" | "beta" => PreRelease::Beta(number),
            _ => PreRelease::ReleaseCandidate(number),
        }
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreRelease::Alpha(n) => write!(f, "a{}", n),
            PreRelease::Beta(n) => write!(f, "b{}", n),
            PreRelease::ReleaseCandidate(n) => write!(f, "rc{}", n),
        }
    }
}

/// One dot-separated component of a local version label.
///
/// Numeric segments compare numerically and sort above alphanumeric ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LocalSegment {
    Number(u64),
    Text(String),
}

impl Ord for LocalSegment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (LocalSegment::Number(a), LocalSegment::Number(b)) => a.cmp(b),
            (LocalSegment::Text(a), LocalSegment::Text(b)) => a.cmp(b),
            (LocalSegment::Number(_), LocalSegment::Text(_)) => Ordering::Greater,
            (LocalSegment::Text(_), LocalSegment::Number(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for LocalSegment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for LocalSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocalSegment::Number(n) => write!(f, "{}", n),
            LocalSegment::Text(s) => f.write_str(s),
        }
    }
}

/// A parsed version.
///
/// Equality, ordering and hashing all use the comparison key, so `1.0` and
/// `1.0.0` are equal. [`Display`](fmt::Display) renders the canonical form.
#[derive(Debug, Clone)]
pub struct Version {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<PreRelease>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<Vec<LocalSegment>>,
}

/// Pre-release position in the sort key.
///
/// A dev release with no pre or post component sorts before every
/// pre-release of the same release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum PreKey {
    DevOnly,
    Pre(PreRelease),
    Final,
}

/// Get the version grammar, matched against trimmed lowercase input.
///
/// Groups:
/// - `epoch`, `release`
/// - `pre_l`, `pre_n`
/// - `post_n1` (implicit `-N`), `post_l`, `post_n2`
/// - `dev_l`, `dev_n`
/// - `local`
fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^v?",
            r"(?:(?P<epoch>[0-9]+)!)?",
            r"(?P<release>[0-9]+(?:\.[0-9]+)*)",
            r"(?:[-_.]?(?P<pre_l>alpha|a|beta|b|preview|pre|c|rc)[-_.]?(?P<pre_n>[0-9]+)?)?",
            r"(?:-(?P<post_n1>[0-9]+)|[-_.]?(?P<post_l>post|rev|r)[-_.]?(?P<post_n2>[0-9]+)?)?",
            r"(?:[-_.]?(?P<dev_l>dev)[-_.]?(?P<dev_n>[0-9]+)?)?",
            r"(?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?$",
        ))
        .expect("valid version regex")
    })
}

/// Check whether `version` is a valid version string.
///
/// # Examples
///
/// ```
/// use mups::is_valid_version;
///
/// assert!(is_valid_version("1.2.3"));
/// assert!(is_valid_version("23230123"));
/// assert!(is_valid_version("2023.01.23"));
/// assert!(!is_valid_version("2023-01-23"));
/// assert!(!is_valid_version(".2.3"));
/// ```
pub fn is_valid_version(version: &str) -> bool {
    Version::parse(version).is_ok()
}

/// Parse a version string. Same as [`Version::parse`].
///
/// ```
/// use mups::parse_version;
///
/// assert_eq!(parse_version("1.0.0").unwrap(), parse_version("1.0").unwrap());
/// assert!(parse_version("2023-01-23").is_err());
/// ```
pub fn parse_version(version: &str) -> Result<Version, InvalidVersion> {
    Version::parse(version)
}

impl Version {
    /// Parse a version string.
    ///
    /// # Examples
    ///
    /// ```
    /// use mups::Version;
    ///
    /// let v = Version::parse("1.2.3.alpha").unwrap();
    /// assert_eq!(v.to_string(), "1.2.3a0");
    /// assert!(Version::parse("1.0").unwrap() < Version::parse("1.0.post1").unwrap());
    /// ```
    pub fn parse(input: &str) -> Result<Self, InvalidVersion> {
        let invalid = || InvalidVersion(input.to_string());
        let normalized = input.trim().to_ascii_lowercase();
        let captures = version_pattern()
            .captures(&normalized)
            .ok_or_else(invalid)?;

        let number = |name: &str| -> Result<Option<u64>, InvalidVersion> {
            captures
                .name(name)
                .map(|m| m.as_str().parse::<u64>().map_err(|_| invalid()))
                .transpose()
        };

        let epoch = number("epoch")?.unwrap_or(0);

        let release = captures
            .name("release")
            .ok_or_else(invalid)?
            .as_str()
            .split('.')
            .map(|part| part.parse::<u64>().map_err(|_| invalid()))
            .collect::<Result<Vec<_>, _>>()?;

        let pre = match captures.name("pre_l") {
            Some(label) => Some(PreRelease::from_parts(
                label.as_str(),
                number("pre_n")?.unwrap_or(0),
            )),
            None => None,
        };

        let post = match number("post_n1")? {
            Some(n) => Some(n),
            None if captures.name("post_l").is_some() => Some(number("post_n2")?.unwrap_or(0)),
            None => None,
        };

        let dev = if captures.name("dev_l").is_some() {
            Some(number("dev_n")?.unwrap_or(0))
        } else {
            None
        };

        let local = match captures.name("local") {
            Some(m) => Some(parse_local(m.as_str()).ok_or_else(invalid)?),
            None => None,
        };

        Ok(Self {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }

    /// Epoch component, 0 when absent.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Release components as written (trailing zeros preserved).
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn pre(&self) -> Option<PreRelease> {
        self.pre
    }

    pub fn post(&self) -> Option<u64> {
        self.post
    }

    pub fn dev(&self) -> Option<u64> {
        self.dev
    }

    pub fn local(&self) -> Option<&[LocalSegment]> {
        self.local.as_deref()
    }

    /// True for pre-releases and dev releases.
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    /// The version with only epoch and release retained.
    ///
    /// ```
    /// use mups::Version;
    ///
    /// let v = Version::parse("1!2.0rc1.post3.dev4+abc").unwrap();
    /// assert_eq!(v.base_version().to_string(), "1!2.0");
    /// ```
    pub fn base_version(&self) -> Version {
        Version {
            epoch: self.epoch,
            release: self.release.clone(),
            pre: None,
            post: None,
            dev: None,
            local: None,
        }
    }

    /// Release with trailing zeros removed, for comparison.
    fn release_key(&self) -> &[u64] {
        let significant = self
            .release
            .iter()
            .rposition(|&n| n != 0)
            .map_or(0, |i| i + 1);
        &self.release[..significant]
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PreKey::DevOnly,
            (Some(pre), _, _) => PreKey::Pre(pre),
            (None, _, _) => PreKey::Final,
        }
    }

    /// Dev releases sort before the same version without one.
    fn dev_key(&self) -> (bool, Option<u64>) {
        (self.dev.is_none(), self.dev)
    }
}

fn parse_local(label: &str) -> Option<Vec<LocalSegment>> {
    label
        .split(['.', '-', '_'])
        .map(|part| {
            if part.bytes().all(|b| b.is_ascii_digit()) {
                part.parse::<u64>().ok().map(LocalSegment::Number)
            } else {
                Some(LocalSegment::Text(part.to_string()))
            }
        })
        .collect()
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| self.release_key().cmp(other.release_key()))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
            .then_with(|| self.local().cmp(&other.local()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epoch.hash(state);
        self.release_key().hash(state);
        self.pre_key().hash(state);
        self.post.hash(state);
        self.dev_key().hash(state);
        self.local.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        f.write_str(&release.join("."))?;
        if let Some(pre) = self.pre {
            write!(f, "{}", pre)?;
        }
        if let Some(post) = self.post {
            write!(f, ".post{}", post)?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{}", dev)?;
        }
        if let Some(local) = &self.local {
            let segments: Vec<String> = local.iter().map(ToString::to_string).collect();
            write!(f, "+{}", segments.join("."))?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Version::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    // ========================================================================
    // Grammar acceptance
    // ========================================================================

    #[test]
    fn test_valid_versions() {
        for input in [
            "1.2.3",
            "1.2.3a1",
            "1.2.3.dev1",
            "1.2.3.alpha",
            "23230123",
            "2023.01.23",
            "1!2.0",
            "v1.0",
            "1.0-1",
            "1.0.post",
            "1.0rev2",
            "1.0-r3",
            "1.0c1",
            "1.0preview2",
            "1.0+ubuntu.1",
            "1.0+abc-def_1",
            "  1.0  ",
            "1.0RC1",
            "1.0-dev-1",
        ] {
            assert!(is_valid_version(input), "expected {:?} to be valid", input);
        }
    }

    #[test]
    fn test_invalid_versions() {
        for input in [
            "",
            ".2.3",
            "2023-01-23",
            "1.",
            "1..2",
            "a1",
            "1.0+",
            "1.0+abc..def",
            "1.0 beta",
            "1.0-dev-x",
            "1.0.gamma",
        ] {
            assert!(!is_valid_version(input), "expected {:?} to be invalid", input);
        }
    }

    #[test]
    fn test_overflowing_component_is_invalid() {
        assert!(!is_valid_version("99999999999999999999999"));
        assert!(!is_valid_version("1.0+99999999999999999999999"));
    }

    #[test]
    fn test_invalid_version_keeps_input() {
        let err = Version::parse("2023-01-23").unwrap_err();
        assert_eq!(err.input(), "2023-01-23");
        assert!(err.to_string().contains("2023-01-23"));
    }

    // ========================================================================
    // Component extraction
    // ========================================================================

    #[test]
    fn test_components() {
        let version = v("2!1.2.3rc4.post5.dev6+abc.7");
        assert_eq!(version.epoch(), 2);
        assert_eq!(version.release(), &[1, 2, 3]);
        assert_eq!(version.pre(), Some(PreRelease::ReleaseCandidate(4)));
        assert_eq!(version.post(), Some(5));
        assert_eq!(version.dev(), Some(6));
        assert_eq!(
            version.local(),
            Some(
                &[
                    LocalSegment::Text("abc".to_string()),
                    LocalSegment::Number(7)
                ][..]
            )
        );
    }

    #[test]
    fn test_implicit_numbers_default_to_zero() {
        assert_eq!(v("1.0a").pre(), Some(PreRelease::Alpha(0)));
        assert_eq!(v("1.0.post").post(), Some(0));
        assert_eq!(v("1.0.dev").dev(), Some(0));
        assert_eq!(v("1.0-7").post(), Some(7));
    }

    #[test]
    fn test_spelling_variants() {
        assert_eq!(v("1.0alpha2").pre(), Some(PreRelease::Alpha(2)));
        assert_eq!(v("1.0beta2").pre(), Some(PreRelease::Beta(2)));
        assert_eq!(v("1.0c2").pre(), Some(PreRelease::ReleaseCandidate(2)));
        assert_eq!(v("1.0pre2").pre(), Some(PreRelease::ReleaseCandidate(2)));
        assert_eq!(v("1.0rev2").post(), Some(2));
    }

    #[test]
    fn test_release_flags() {
        assert!(v("1.0a1").is_prerelease());
        assert!(v("1.0.dev1").is_prerelease());
        assert!(!v("1.0").is_prerelease());
        assert!(v("1.0.post1").is_postrelease());
    }

    // ========================================================================
    // Canonical form
    // ========================================================================

    #[test]
    fn test_display_canonical_form() {
        assert_eq!(v("1.2.3").to_string(), "1.2.3");
        assert_eq!(v("1.2.3.alpha").to_string(), "1.2.3a0");
        assert_eq!(v("V1.0-Beta.2").to_string(), "1.0b2");
        assert_eq!(v("0!1.0").to_string(), "1.0");
        assert_eq!(v("1.0-1").to_string(), "1.0.post1");
        assert_eq!(v("1.0_rc_1-r_2_dev_3").to_string(), "1.0rc1.post2.dev3");
        assert_eq!(v("1.0+Ubuntu-1").to_string(), "1.0+ubuntu.1");
        assert_eq!(v("2023.01.23").to_string(), "2023.1.23");
    }

    #[test]
    fn test_canonical_form_reparses_equal() {
        for input in ["1.0-1", "1!2.3.alpha", "1.0+A_b.01", "3.dev"] {
            let parsed = v(input);
            assert_eq!(v(&parsed.to_string()), parsed);
        }
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    #[test]
    fn test_release_ordering() {
        assert!(v("1.2") < v("1.10"));
        assert!(v("1.2") < v("1.2.1"));
        assert_eq!(v("1.0"), v("1.0.0"));
        assert!(v("0.9") < v("1"));
    }

    #[test]
    fn test_phase_ordering() {
        let ordered = [
            "1.0.dev0",
            "1.0a1.dev1",
            "1.0a1",
            "1.0b1",
            "1.0rc1",
            "1.0",
            "1.0+local",
            "1.0.post1.dev1",
            "1.0.post1",
            "1.1.dev1",
        ];
        for pair in ordered.windows(2) {
            assert!(v(pair[0]) < v(pair[1]), "{} < {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_epoch_dominates() {
        assert!(v("1!0.1") > v("99.0"));
    }

    #[test]
    fn test_local_ordering() {
        assert!(v("1.0") < v("1.0+a"));
        assert!(v("1.0+a") < v("1.0+b"));
        assert!(v("1.0+abc") < v("1.0+1"));
        assert!(v("1.0+2") < v("1.0+10"));
        assert!(v("1.0+a") < v("1.0+a.1"));
        assert_eq!(v("1.0+ABC"), v("1.0+abc"));
    }

    #[test]
    fn test_hash_matches_equality() {
        let set: HashSet<Version> = [v("1.0"), v("1.0.0"), v("1.0.0.0")].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    // ========================================================================
    // Serde
    // ========================================================================

    #[test]
    fn test_serde_uses_canonical_string() {
        let json = serde_json::to_string(&v("1.0-1")).unwrap();
        assert_eq!(json, "\"1.0.post1\"");
        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("1.0.post1"));
        assert!(serde_json::from_str::<Version>("\"not a version\"").is_err());
    }
}
