//! Host platform identifier.
//!
//! The filename codec treats platforms as opaque strings. This is only a
//! convenient default for callers that want to tag archives with the
//! platform they were built on.

/// Platform identifier for the compile target, as `{os}_{arch}`.
///
/// ```
/// let platform = mups::platform::host_platform();
/// assert!(platform.contains('_'));
/// assert!(!platform.contains('-'));
/// assert!(!platform.contains('.'));
/// ```
pub fn host_platform() -> String {
    format!("{}_{}", std::env::consts::OS, std::env::consts::ARCH).replace(['-', '.'], "_")
}
