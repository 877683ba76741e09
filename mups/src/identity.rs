//! Default author identity lookup.
//!
//! Metadata construction never spawns processes itself. Callers resolve an
//! [`Identity`] up front, usually from explicit input or configuration, and
//! fall back to an [`IdentityProvider`] such as [`GitConfigIdentity`] for
//! whatever is still missing.
//!
//! Providers are infallible: an unavailable value is an empty string.

use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Default time allowed for each `git config` query.
pub const DEFAULT_GIT_TIMEOUT: Duration = Duration::from_secs(2);

/// Interval between child process status polls.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Author name and email. Empty strings mean unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// True when neither field is known.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty()
    }

    /// Fill empty fields from `fallback`.
    ///
    /// ```
    /// use mups::Identity;
    ///
    /// let explicit = Identity::new("Jane", "");
    /// let merged = explicit.merge_missing(Identity::new("git user", "jane@example.com"));
    /// assert_eq!(merged, Identity::new("Jane", "jane@example.com"));
    /// ```
    pub fn merge_missing(self, fallback: Identity) -> Identity {
        Identity {
            name: if self.name.is_empty() {
                fallback.name
            } else {
                self.name
            },
            email: if self.email.is_empty() {
                fallback.email
            } else {
                self.email
            },
        }
    }
}

/// Source of a default author identity.
pub trait IdentityProvider {
    fn identity(&self) -> Identity;
}

/// Fixed identity, e.g. from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity(pub Identity);

impl IdentityProvider for StaticIdentity {
    fn identity(&self) -> Identity {
        self.0.clone()
    }
}

/// Reads `user.name` and `user.email` from the local git configuration.
#[derive(Debug, Clone)]
pub struct GitConfigIdentity {
    program: String,
    timeout: Duration,
}

impl Default for GitConfigIdentity {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            timeout: DEFAULT_GIT_TIMEOUT,
        }
    }
}

impl GitConfigIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different git executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Bound each query to `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Query one git config key. Empty on any failure.
    fn query(&self, key: &str) -> String {
        let child = Command::new(&self.program)
            .args(["config", "--get", key])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                tracing::debug!(program = %self.program, error = %e, "Failed to run git");
                return String::new();
            }
        };

        match wait_with_timeout(child, self.timeout) {
            Some(output) => output.trim().to_string(),
            None => {
                tracing::debug!(key, "git config value unavailable");
                String::new()
            }
        }
    }
}

impl IdentityProvider for GitConfigIdentity {
    fn identity(&self) -> Identity {
        Identity {
            name: self.query("user.name"),
            email: self.query("user.email"),
        }
    }
}

/// Wait for `child` to exit successfully and return its stdout.
///
/// Returns `None` on non-zero exit, I/O failure or timeout. A child still
/// running at the deadline is killed and reaped. A timeout too large to
/// represent as a deadline means waiting without one.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> Option<String> {
    let deadline = Instant::now().checked_add(timeout);
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                if !status.success() {
                    return None;
                }
                let mut output = String::new();
                child.stdout.take()?.read_to_string(&mut output).ok()?;
                return Some(output);
            }
            Ok(None) if deadline.map_or(true, |d| Instant::now() < d) => {
                thread::sleep(POLL_INTERVAL)
            }
            Ok(None) => {
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Child process timed out, killing"
                );
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
            Err(e) => {
                tracing::debug!(error = %e, "Failed to poll child process");
                let _ = child.kill();
                let _ = child.wait();
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_missing_prefers_self() {
        let merged = Identity::new("a", "a@x.org").merge_missing(Identity::new("b", "b@x.org"));
        assert_eq!(merged, Identity::new("a", "a@x.org"));
    }

    #[test]
    fn test_merge_missing_fills_gaps() {
        let merged = Identity::default().merge_missing(Identity::new("b", "b@x.org"));
        assert_eq!(merged, Identity::new("b", "b@x.org"));
    }

    #[test]
    fn test_is_empty() {
        assert!(Identity::default().is_empty());
        assert!(!Identity::new("", "e@x.org").is_empty());
    }

    #[test]
    fn test_static_identity() {
        let provider = StaticIdentity(Identity::new("n", "e@x.org"));
        assert_eq!(provider.identity(), Identity::new("n", "e@x.org"));
    }

    #[test]
    fn test_missing_program_yields_empty_identity() {
        let provider = GitConfigIdentity::new().with_program("/nonexistent/mups-test-git");
        assert!(provider.identity().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program_yields_empty_identity() {
        let provider = GitConfigIdentity::new().with_program("false");
        assert!(provider.identity().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let child = Command::new("sleep")
            .arg("5")
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        let started = Instant::now();
        assert!(wait_with_timeout(child, Duration::from_millis(50)).is_none());
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_huge_timeout_does_not_overflow() {
        let provider = GitConfigIdentity::new()
            .with_program("true")
            .with_timeout(Duration::from_secs(u64::MAX));
        assert!(provider.identity().is_empty());

        let child = Command::new("echo")
            .arg("hi")
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        assert_eq!(
            wait_with_timeout(child, Duration::MAX).as_deref(),
            Some("hi\n")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_successful_child_output() {
        let child = Command::new("echo")
            .arg("hello")
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        assert_eq!(
            wait_with_timeout(child, Duration::from_secs(5)).as_deref(),
            Some("hello\n")
        );
    }
}
