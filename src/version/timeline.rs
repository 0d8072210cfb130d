// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Linear version index for partial persistence.
//!
//! Versions form a single chain 0, 1, 2, ... and only the newest one may be
//! extended. Roots are stored sparsely: a version that did not replace the
//! root resolves to the nearest earlier entry (floor lookup).

use std::collections::BTreeMap;

use tracing::debug;

use super::Version;
use super::VersionIndex;
use crate::config::Config;
use crate::error::Error;
use crate::error::Result;
use crate::node::NodeId;

/// A dense, increasing sequence of versions.
#[derive(Clone, Debug)]
pub struct Timeline {
    latest: Version,
    /// Root changes keyed by the version that made them.
    roots: BTreeMap<Version, Option<NodeId>>,
    max_versions: u32,
}

impl Timeline {
    pub fn new() -> Timeline {
        return Timeline::with_config(&Config::default());
    }

    /// The newest issued version.
    pub fn latest(&self) -> Version {
        return self.latest;
    }

    /// Number of versions that replaced the root.
    pub fn root_changes(&self) -> usize {
        return self.roots.len() - 1;
    }
}

impl Default for Timeline {
    fn default() -> Self {
        return Self::new();
    }
}

impl VersionIndex for Timeline {
    type Base = ();

    fn with_config(config: &Config) -> Timeline {
        let mut roots = BTreeMap::new();
        roots.insert(Version::EMPTY, None);
        return Timeline {
            latest: Version::EMPTY,
            roots,
            max_versions: config.max_versions,
        };
    }

    fn new_version(&mut self, _base: ()) -> Result<(Version, Option<NodeId>)> {
        if self.latest.0 + 1 >= self.max_versions {
            return Err(Error::VersionLimit(self.max_versions));
        }
        let root = self.root_for(self.latest)?;
        self.latest = Version(self.latest.0 + 1);
        debug!(version = %self.latest, "issued timeline version");
        return Ok((self.latest, root));
    }

    fn root_for(&self, version: Version) -> Result<Option<NodeId>> {
        if version > self.latest {
            return Err(Error::InvalidVersion(version));
        }
        let (_, root) = self.roots
            .range(..=version)
            .next_back()
            .ok_or(Error::InvalidVersion(version))?;
        return Ok(*root);
    }

    fn set_root(&mut self, version: Version, root: Option<NodeId>) {
        debug_assert_eq!(version, self.latest, "only the latest version may change its root");
        self.roots.insert(version, root);
    }

    #[inline]
    fn is_visible(&self, change: Version, at: Version) -> Result<bool> {
        for version in [change, at] {
            if version > self.latest {
                return Err(Error::InvalidVersion(version));
            }
        }
        return Ok(change <= at);
    }

    fn current(&self) -> Option<Version> {
        return Some(self.latest);
    }

    fn len(&self) -> usize {
        return self.latest.index() + 1;
    }
}
