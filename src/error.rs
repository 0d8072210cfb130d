// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Error types shared by the version indexes and the trees.

use thiserror::Error;

use crate::version::Version;

/// Error returned by version lookups and mutating calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The version id was never issued by this tree.
    #[error("invalid version: {0}")]
    InvalidVersion(Version),

    /// No more version ids can be issued under the configured limit.
    #[error("version limit reached: {0} versions")]
    VersionLimit(u32),

    /// A snapshot failed structural validation.
    #[error("invariant violated at version {version}: {reason}")]
    Invariant {
        version: Version,
        reason: &'static str,
    },
}

/// Result type for tree and version index operations.
pub type Result<T> = std::result::Result<T, Error>;
