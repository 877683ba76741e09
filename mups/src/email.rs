//! Email address validation against the RFC 5322 `addr-spec` grammar.
//!
//! Supports dot-atom and quoted-string local parts, and both hostname and
//! bracketed IPv4 literal domains.
//!
//! The match is anchored at the start of the input only. An address followed
//! by trailing characters (`a@b.com)X`) is accepted because the valid prefix
//! satisfies the grammar.

use regex::Regex;
use std::sync::OnceLock;

/// Get the RFC 5322 address pattern.
///
/// Pattern structure:
/// - local part: dot-atom (`atext+(\.atext+)*`) or a quoted string with
///   backslash escapes
/// - `@`
/// - domain: dot-separated labels with at least one dot, or a bracketed IPv4
///   literal / tagged general address literal
fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r##"^(?:[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*"##,
            r##"|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")"##,
            r##"@(?:(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?"##,
            r##"|\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}"##,
            r##"(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?"##,
            r##"|[A-Za-z0-9-]*[A-Za-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])"##,
        ))
        .expect("valid email regex")
    })
}

/// Check whether `address` starts with a valid RFC 5322 address.
///
/// # Examples
///
/// ```
/// use mups::is_valid_email;
///
/// assert!(is_valid_email("sometest@gmail.com"));
/// assert!(is_valid_email("some+test@gmail.com"));
/// assert!(!is_valid_email("invalíd@mail.com"));
/// assert!(!is_valid_email("invali\"d@domain.com"));
/// ```
pub fn is_valid_email(address: &str) -> bool {
    email_pattern().is_match(address)
}
