//! Package name validation and normalization.
//!
//! A valid package name consists of ASCII letters, digits, `.`, `_` and `-`,
//! and must start and end with a letter or digit. Two names refer to the same
//! package when their normalized forms are equal:
//!
//! - `Foo.Bar` → `foo-bar`
//! - `foo__bar` → `foo-bar`
//! - `FOO-bar` → `foo-bar`

use regex::Regex;
use std::sync::OnceLock;

/// Anchored package name grammar.
///
/// Uses explicit ASCII classes rather than a case-insensitive flag so that
/// Unicode case folding cannot admit characters such as the Kelvin sign.
fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z0-9]|[A-Za-z0-9][A-Za-z0-9._-]*[A-Za-z0-9])$")
            .expect("valid name regex")
    })
}

/// Any maximal run of characters that are not ASCII alphanumerics.
pub(crate) fn separator_run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^A-Za-z0-9]+").expect("valid separator regex"))
}

/// Check whether `name` is a syntactically valid package name.
///
/// # Examples
///
/// ```
/// use mups::is_valid_name;
///
/// assert!(is_valid_name("abc-123"));
/// assert!(is_valid_name("Abc-123"));
/// assert!(!is_valid_name("abc-"));
/// assert!(!is_valid_name("-abc-"));
/// assert!(!is_valid_name(""));
/// ```
pub fn is_valid_name(name: &str) -> bool {
    name_pattern().is_match(name)
}

/// Normalize a package name for comparison.
///
/// Every run of non-alphanumeric characters collapses to a single `-`, and
/// the result is lowercased. Total over all inputs, including the empty string.
///
/// # Examples
///
/// ```
/// use mups::normalize_name;
///
/// assert_eq!(normalize_name("Foo.Bar"), "foo-bar");
/// assert_eq!(normalize_name("foo__-.bar"), "foo-bar");
/// assert_eq!(normalize_name(""), "");
/// ```
pub fn normalize_name(name: &str) -> String {
    collapse_separators(name).to_lowercase()
}

/// Normalize a package name without changing letter case.
///
/// ```
/// use mups::normalize_name_preserve_case;
///
/// assert_eq!(normalize_name_preserve_case("Foo_.Bar"), "Foo-Bar");
/// ```
pub fn normalize_name_preserve_case(name: &str) -> String {
    collapse_separators(name)
}

fn collapse_separators(name: &str) -> String {
    separator_run_pattern().replace_all(name, "-").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================================================
    // Validation
    // ========================================================================

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("abc-123"));
        assert!(is_valid_name("Abc-123"));
        assert!(is_valid_name("a"));
        assert!(is_valid_name("7"));
        assert!(is_valid_name("a.b_c-d"));
        assert!(is_valid_name("a--b"));
    }

    #[test]
    fn test_invalid_names() {
        assert!(!is_valid_name("abc-"));
        assert!(!is_valid_name("-abc-"));
        assert!(!is_valid_name("_abc"));
        assert!(!is_valid_name("abc."));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("a b"));
        assert!(!is_valid_name("a/b"));
    }

    #[test]
    fn test_rejects_trailing_newline() {
        assert!(!is_valid_name("abc\n"));
    }

    #[test]
    fn test_rejects_non_ascii_letters() {
        assert!(!is_valid_name("caf\u{e9}"));
        // Kelvin sign folds to 'k' under Unicode case-insensitivity
        assert!(!is_valid_name("\u{212a}elvin"));
    }

    // ========================================================================
    // Normalization
    // ========================================================================

    #[test]
    fn test_normalize_collapses_runs() {
        assert_eq!(normalize_name("a._-b"), "a-b");
        assert_eq!(normalize_name("A__B"), "a-b");
        assert_eq!(normalize_name("--a--"), "-a-");
    }

    #[test]
    fn test_normalize_preserve_case() {
        assert_eq!(normalize_name_preserve_case("My.Package"), "My-Package");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_normalize_non_ascii_is_separator() {
        assert_eq!(normalize_name("caf\u{e9}-bar"), "caf-bar");
    }

    // ========================================================================
    // Properties
    // ========================================================================

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(s in "\\PC*") {
            let once = normalize_name(&s);
            prop_assert_eq!(normalize_name(&once), once);
        }

        #[test]
        fn prop_valid_names_have_alphanumeric_ends(s in "[A-Za-z0-9._-]{1,16}") {
            if is_valid_name(&s) {
                let first = s.chars().next().unwrap();
                let last = s.chars().last().unwrap();
                prop_assert!(first.is_ascii_alphanumeric());
                prop_assert!(last.is_ascii_alphanumeric());
            }
        }

        #[test]
        fn prop_valid_names_use_allowed_characters(s in "\\PC{1,16}") {
            if is_valid_name(&s) {
                prop_assert!(s
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')));
            }
        }
    }
}
