// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Version identifiers and the indexes that map them to tree roots.
//!
//! Two indexes are provided:
//!
//! | Index | Persistence | New versions extend | Visibility of a change made at `c` from `v` |
//! |-------|-------------|---------------------|---------------------------------------------|
//! | `Timeline` | partial | the latest version | `c <= v` |
//! | `Forest` | full | any issued version | `c` is an ancestor of (or equal to) `v` |
//!
//! Version 0 is always the empty tree. Ids are dense: every id below
//! `len()` has been issued and stays resolvable for the life of the index.

mod forest;
mod timeline;

pub use forest::Forest;
pub use timeline::Timeline;

use std::fmt;
use std::fmt::Debug;

use crate::config::Config;
use crate::error::Result;
use crate::node::NodeId;

/// Identifier of a snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(pub u32);

impl Version {
    /// The empty tree every index starts from.
    pub const EMPTY: Version = Version(0);

    #[inline]
    pub fn index(self) -> usize {
        return self.0 as usize;
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "{}", self.0);
    }
}

/// Maps version ids to roots and decides which changes a version can see.
pub trait VersionIndex {
    /// What a new version is derived from: nothing for a timeline,
    /// a parent version for a forest.
    type Base: Copy + Debug;

    /// Create an index holding only the empty version 0.
    fn with_config(config: &Config) -> Self;

    /// Issue the next version id derived from `base`.
    ///
    /// Returns the new id together with the root it inherits. The new
    /// version resolves to that root until `set_root` says otherwise.
    fn new_version(&mut self, base: Self::Base) -> Result<(Version, Option<NodeId>)>;

    /// Root of the tree as of `version`.
    fn root_for(&self, version: Version) -> Result<Option<NodeId>>;

    /// Install a new root for the in-progress `version`.
    fn set_root(&mut self, version: Version, root: Option<NodeId>);

    /// True if a change recorded at `change` is part of the snapshot `at`.
    ///
    /// Fails with `InvalidVersion` if either id was never issued.
    fn is_visible(&self, change: Version, at: Version) -> Result<bool>;

    /// The latest version of a timeline; `None` for a forest, which has
    /// no single latest version.
    fn current(&self) -> Option<Version>;

    /// Number of issued versions, version 0 included.
    fn len(&self) -> usize;

    /// True if `version` has been issued.
    fn contains(&self, version: Version) -> bool {
        return version.index() < self.len();
    }
}
