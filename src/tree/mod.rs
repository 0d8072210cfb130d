// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Versioned search trees.
//!
//! Both trees are generic over the version index, so each comes in a
//! partially persistent flavor (`Timeline`) and a fully persistent one
//! (`Forest`). All structural edits go through the store's read and write
//! primitives; nothing else touches node fields.
//!
//! Every mutating call issues exactly one new version, even when it
//! changes nothing: inserting a key that is already present or deleting a
//! key that is absent yields a version identical in content to its base.

pub mod balanced;
pub mod plain;

use std::cmp::Ordering;

use smallvec::smallvec;

use crate::error::Error;
use crate::error::Result;
use crate::node::NodeId;
use crate::node::Side;
use crate::store::Path;
use crate::store::Stats;
use crate::store::Store;
use crate::version::Version;
use crate::version::VersionIndex;

/// Operations shared by every versioned search tree.
///
/// Mutations take the base the new version derives from (`()` for a
/// timeline, a `Version` for a forest) and return the issued version.
/// Queries take the version to read and never mutate.
pub trait SearchTree {
    type Key: Ord + Clone;
    type Index: VersionIndex;

    fn store(&self) -> &Store<Self::Key, Self::Index>;

    /// Add `key` in a new version derived from `base`.
    fn insert_from(&mut self, key: Self::Key, base: <Self::Index as VersionIndex>::Base) -> Result<Version>;

    /// Remove `key` in a new version derived from `base`.
    fn delete_from(&mut self, key: &Self::Key, base: <Self::Index as VersionIndex>::Base) -> Result<Version>;

    /// Validate the snapshot at `version`.
    fn check(&self, version: Version) -> Result<()>;

    /// True if `key` is present at `version`.
    fn contains(&self, key: &Self::Key, version: Version) -> Result<bool> {
        return Ok(self.find(key, version)?.is_some());
    }

    /// The stored key equal to `key` at `version`.
    fn find(&self, key: &Self::Key, version: Version) -> Result<Option<&Self::Key>> {
        let store = self.store();
        let mut current = store.root(version)?;
        while let Some(node) = current {
            let stored = store.node(node).key();
            current = match key.cmp(stored) {
                Ordering::Less => store.read_child(node, Side::Left, version),
                Ordering::Greater => store.read_child(node, Side::Right, version),
                Ordering::Equal => return Ok(Some(stored)),
            };
        }
        return Ok(None);
    }

    /// The greatest stored key not above `key` at `version`.
    fn floor(&self, key: &Self::Key, version: Version) -> Result<Option<&Self::Key>> {
        let store = self.store();
        let mut best = None;
        let mut current = store.root(version)?;
        while let Some(node) = current {
            let stored = store.node(node).key();
            current = match key.cmp(stored) {
                Ordering::Less => store.read_child(node, Side::Left, version),
                Ordering::Greater => {
                    best = Some(stored);
                    store.read_child(node, Side::Right, version)
                }
                Ordering::Equal => return Ok(Some(stored)),
            };
        }
        return Ok(best);
    }

    /// Keys present at `version`, in order.
    fn keys(&self, version: Version) -> Result<Vec<Self::Key>> {
        let store = self.store();
        let mut keys = Vec::new();
        in_order(store, store.root(version)?, version, |node| {
            keys.push(store.node(node).key().clone());
        });
        return Ok(keys);
    }

    /// Number of keys present at `version`.
    fn len(&self, version: Version) -> Result<usize> {
        let store = self.store();
        let mut count = 0;
        in_order(store, store.root(version)?, version, |_| count += 1);
        return Ok(count);
    }

    /// The latest version of a timeline; `None` for a forest.
    fn current_version(&self) -> Option<Version> {
        return self.store().versions().current();
    }

    fn stats(&self) -> Stats {
        return self.store().stats();
    }
}

/// Visit every node of the snapshot rooted at `root` in key order.
fn in_order<K, I, F>(store: &Store<K, I>, root: Option<NodeId>, version: Version, mut visit: F)
where
    K: Clone,
    I: VersionIndex,
    F: FnMut(NodeId),
{
    let mut stack: Path = Path::new();
    let mut current = root;
    loop {
        while let Some(node) = current {
            stack.push(node);
            current = store.read_child(node, Side::Left, version);
        }
        let Some(node) = stack.pop() else {
            return;
        };
        visit(node);
        current = store.read_child(node, Side::Right, version);
    }
}

/// Path from `root` to the node holding `key` at `version`, or `None`.
pub(crate) fn search<K, I>(store: &Store<K, I>, root: Option<NodeId>, key: &K, version: Version) -> Option<Path>
where
    K: Ord + Clone,
    I: VersionIndex,
{
    let mut path: Path = smallvec![root?];
    loop {
        let node = path[path.len() - 1];
        let side = match key.cmp(store.node(node).key()) {
            Ordering::Less => Side::Left,
            Ordering::Greater => Side::Right,
            Ordering::Equal => return Some(path),
        };
        path.push(store.read_child(node, side, version)?);
    }
}

/// Where a new key would hang: the path to its parent and the side.
/// `Err` carries the path to an equal key.
pub(crate) fn locate<K, I>(store: &Store<K, I>, root: NodeId, key: &K, version: Version) -> std::result::Result<(Path, Side), Path>
where
    K: Ord + Clone,
    I: VersionIndex,
{
    let mut path: Path = smallvec![root];
    loop {
        let node = path[path.len() - 1];
        let side = match key.cmp(store.node(node).key()) {
            Ordering::Less => Side::Left,
            Ordering::Greater => Side::Right,
            Ordering::Equal => return Err(path),
        };
        match store.read_child(node, side, version) {
            Some(child) => path.push(child),
            None => return Ok((path, side)),
        }
    }
}

/// Extend `path` (ending at a node with a right child) down to the
/// in-order successor of its last node.
pub(crate) fn push_successor<K, I>(store: &Store<K, I>, path: &mut Path, version: Version)
where
    K: Clone,
    I: VersionIndex,
{
    let last = path[path.len() - 1];
    let mut current = store.read_child(last, Side::Right, version);
    while let Some(node) = current {
        path.push(node);
        current = store.read_child(node, Side::Left, version);
    }
}

/// Check that keys at `version` are strictly increasing in order.
pub(crate) fn check_order<K, I>(store: &Store<K, I>, version: Version) -> Result<()>
where
    K: Ord + Clone,
    I: VersionIndex,
{
    let mut previous: Option<NodeId> = None;
    let mut sorted = true;
    in_order(store, store.root(version)?, version, |node| {
        if let Some(previous) = previous {
            if store.node(previous).key() >= store.node(node).key() {
                sorted = false;
            }
        }
        previous = Some(node);
    });
    if !sorted {
        return Err(Error::Invariant {
            version,
            reason: "keys out of order",
        });
    }
    return Ok(());
}

/// Panic if `tree` was configured to validate and `version` is malformed.
pub(crate) fn audit<T: SearchTree + ?Sized>(tree: &T, version: Version) -> Result<Version> {
    if tree.store().config().check_invariants {
        if let Err(error) = tree.check(version) {
            panic!("{error}");
        }
    }
    return Ok(version);
}
