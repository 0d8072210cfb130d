// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Branching version index for full persistence.
//!
//! Every version records the version it was derived from, so the ids form
//! a tree rooted at version 0. A change made at version `c` is visible from
//! version `v` exactly when `c` is an ancestor of `v` (or `v` itself).
//!
//! Ancestor queries use binary lifting: each entry keeps its 2^k-th
//! ancestors, built from the parent's table when the version is issued.
//!
//! Complexity:
//! - new_version: O(log V)
//! - is_ancestor: O(log V)
//! - root_for: O(1)

use smallvec::SmallVec;
use tracing::debug;

use super::Version;
use super::VersionIndex;
use crate::config::Config;
use crate::error::Error;
use crate::error::Result;
use crate::node::NodeId;

#[derive(Clone, Debug)]
struct Entry {
    parent: Option<Version>,
    depth: u32,
    root: Option<NodeId>,
    /// jumps[k] is the 2^k-th ancestor. Stops where the chain runs out.
    jumps: SmallVec<[Version; 8]>,
}

/// A tree of versions with ancestor queries.
#[derive(Clone, Debug)]
pub struct Forest {
    entries: Vec<Entry>,
    levels: usize,
    max_versions: u32,
}

impl Forest {
    pub fn new() -> Forest {
        return Forest::with_config(&Config::default());
    }

    /// True if `ancestor` lies on the path from `descendant` to version 0.
    /// Every version is its own ancestor.
    pub fn is_ancestor(&self, ancestor: Version, descendant: Version) -> Result<bool> {
        self.entry(ancestor)?;
        self.entry(descendant)?;
        return Ok(self.reaches(ancestor, descendant));
    }

    /// The version `version` was derived from; `None` for version 0.
    pub fn parent(&self, version: Version) -> Result<Option<Version>> {
        return Ok(self.entry(version)?.parent);
    }

    /// Distance from version 0.
    pub fn depth(&self, version: Version) -> Result<u32> {
        return Ok(self.entry(version)?.depth);
    }

    fn entry(&self, version: Version) -> Result<&Entry> {
        return self.entries
            .get(version.index())
            .ok_or(Error::InvalidVersion(version));
    }

    /// Walk `distance` steps towards version 0.
    fn lift(&self, version: Version, distance: u32) -> Option<Version> {
        let mut current = version;
        let mut remaining = distance;
        let mut level = 0;
        while remaining > 0 {
            if remaining & 1 == 1 {
                current = *self.entries[current.index()].jumps.get(level)?;
            }
            remaining >>= 1;
            level += 1;
        }
        return Some(current);
    }

    fn reaches(&self, ancestor: Version, descendant: Version) -> bool {
        if ancestor == descendant {
            return true;
        }
        // Parents are always issued before their children.
        if ancestor > descendant {
            return false;
        }
        let high = self.entries[ancestor.index()].depth;
        let low = self.entries[descendant.index()].depth;
        if high >= low {
            return false;
        }
        return self.lift(descendant, low - high) == Some(ancestor);
    }
}

impl Default for Forest {
    fn default() -> Self {
        return Self::new();
    }
}

impl VersionIndex for Forest {
    type Base = Version;

    fn with_config(config: &Config) -> Forest {
        let empty = Entry {
            parent: None,
            depth: 0,
            root: None,
            jumps: SmallVec::new(),
        };
        return Forest {
            entries: vec![empty],
            levels: config.lifting_levels(),
            max_versions: config.max_versions,
        };
    }

    fn new_version(&mut self, base: Version) -> Result<(Version, Option<NodeId>)> {
        let parent = self.entry(base)?;
        if self.entries.len() >= self.max_versions as usize {
            return Err(Error::VersionLimit(self.max_versions));
        }
        let root = parent.root;
        let depth = parent.depth + 1;

        let mut jumps: SmallVec<[Version; 8]> = SmallVec::new();
        jumps.push(base);
        for level in 1..self.levels {
            let halfway = jumps[level - 1];
            match self.entries[halfway.index()].jumps.get(level - 1) {
                Some(&next) => jumps.push(next),
                None => break,
            }
        }

        let version = Version(self.entries.len() as u32);
        self.entries.push(Entry {
            parent: Some(base),
            depth,
            root,
            jumps,
        });
        debug!(version = %version, base = %base, depth, "issued forest version");
        return Ok((version, root));
    }

    fn root_for(&self, version: Version) -> Result<Option<NodeId>> {
        return Ok(self.entry(version)?.root);
    }

    fn set_root(&mut self, version: Version, root: Option<NodeId>) {
        self.entries[version.index()].root = root;
    }

    #[inline]
    fn is_visible(&self, change: Version, at: Version) -> Result<bool> {
        return self.is_ancestor(change, at);
    }

    fn current(&self) -> Option<Version> {
        return None;
    }

    fn len(&self) -> usize {
        return self.entries.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 0 - 1 - 2 - 3
    ///      \
    ///       4 - 5
    fn sample() -> Forest {
        let mut forest = Forest::new();
        forest.new_version(Version(0)).unwrap();
        forest.new_version(Version(1)).unwrap();
        forest.new_version(Version(2)).unwrap();
        forest.new_version(Version(1)).unwrap();
        forest.new_version(Version(4)).unwrap();
        return forest;
    }

    #[test]
    fn ancestry_follows_branches() {
        let forest = sample();
        assert_eq!(forest.is_ancestor(Version(1), Version(3)), Ok(true));
        assert_eq!(forest.is_ancestor(Version(1), Version(5)), Ok(true));
        assert_eq!(forest.is_ancestor(Version(2), Version(5)), Ok(false));
        assert_eq!(forest.is_ancestor(Version(4), Version(3)), Ok(false));
        assert_eq!(forest.is_ancestor(Version(3), Version(1)), Ok(false));
        assert_eq!(forest.is_ancestor(Version(0), Version(5)), Ok(true));
        assert_eq!(forest.is_ancestor(Version(5), Version(5)), Ok(true));
    }

    #[test]
    fn depth_and_parent() {
        let forest = sample();
        assert_eq!(forest.depth(Version(5)), Ok(3));
        assert_eq!(forest.parent(Version(4)), Ok(Some(Version(1))));
        assert_eq!(forest.parent(Version(0)), Ok(None));
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let mut forest = sample();
        assert_eq!(forest.is_ancestor(Version(1), Version(9)), Err(Error::InvalidVersion(Version(9))));
        assert_eq!(forest.new_version(Version(6)), Err(Error::InvalidVersion(Version(6))));
        assert_eq!(forest.root_for(Version(6)), Err(Error::InvalidVersion(Version(6))));
        assert_eq!(forest.is_visible(Version(1), Version(99)), Err(Error::InvalidVersion(Version(99))));
        assert_eq!(forest.is_visible(Version(99), Version(1)), Err(Error::InvalidVersion(Version(99))));
        assert_eq!(forest.len(), 6);
    }

    #[test]
    fn visibility_is_ancestry() {
        let forest = sample();
        assert_eq!(forest.is_visible(Version(1), Version(5)), Ok(true));
        assert_eq!(forest.is_visible(Version(2), Version(5)), Ok(false));
        assert_eq!(forest.is_visible(Version(3), Version(3)), Ok(true));
    }

    #[test]
    fn new_version_inherits_base_root() {
        let mut forest = Forest::new();
        let (v1, _) = forest.new_version(Version::EMPTY).unwrap();
        forest.set_root(v1, Some(NodeId::new(3)));
        let (v2, root) = forest.new_version(Version::EMPTY).unwrap();
        assert_eq!(root, None);
        assert_eq!(forest.root_for(v2), Ok(None));
        let (v3, root) = forest.new_version(v1).unwrap();
        assert_eq!(root, Some(NodeId::new(3)));
        assert_eq!(forest.root_for(v3), Ok(Some(NodeId::new(3))));
    }

    #[test]
    fn long_chain_matches_naive_walk() {
        let mut forest = Forest::with_config(&Config::new().with_max_versions(4096));
        // A spine with a side branch every seventh version.
        let mut tip = Version::EMPTY;
        for i in 0..1500u32 {
            let base = if i % 7 == 0 { Version(i / 2) } else { tip };
            let (version, _) = forest.new_version(base).unwrap();
            tip = version;
        }

        let naive = |ancestor: Version, descendant: Version| {
            let mut current = Some(descendant);
            while let Some(version) = current {
                if version == ancestor {
                    return true;
                }
                current = forest.parent(version).unwrap();
            }
            return false;
        };

        for a in (0..1501).step_by(37) {
            for d in (0..1501).step_by(41) {
                let (a, d) = (Version(a), Version(d));
                assert_eq!(forest.is_ancestor(a, d).unwrap(), naive(a, d), "{a} -> {d}");
            }
        }
    }

    #[test]
    fn limit_counts_version_zero() {
        let mut forest = Forest::with_config(&Config::new().with_max_versions(2));
        forest.new_version(Version::EMPTY).unwrap();
        assert_eq!(forest.new_version(Version::EMPTY), Err(Error::VersionLimit(2)));
    }
}
