// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Unbalanced persistent search tree.
//!
//! Insert hangs a fresh leaf below the last node of the search path.
//! Delete splices out a node with at most one child; a node with two
//! children is replaced by a new node carrying its in-order successor's
//! key, after which the successor is spliced out of the right subtree.
//!
//! Height is O(n) in the worst case, which makes this tree a good stress
//! test for the bounded cost of copy propagation.

use tracing::debug;

use super::audit;
use super::check_order;
use super::locate;
use super::push_successor;
use super::search;
use super::SearchTree;
use crate::config::Config;
use crate::error::Result;
use crate::node::Color;
use crate::node::Side;
use crate::store::Store;
use crate::version::Forest;
use crate::version::Timeline;
use crate::version::Version;
use crate::version::VersionIndex;

/// An unbalanced binary search tree that keeps every version.
///
/// ```
/// use palimpsest::PlainTree;
/// use palimpsest::SearchTree;
///
/// let mut tree: PlainTree<i32> = PlainTree::new();
/// let v1 = tree.insert(5).unwrap();
/// let v2 = tree.insert(3).unwrap();
/// let v3 = tree.delete(&5).unwrap();
///
/// assert_eq!(tree.keys(v2).unwrap(), vec![3, 5]);
/// assert_eq!(tree.keys(v3).unwrap(), vec![3]);
/// assert!(!tree.contains(&3, v1).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct PlainTree<K, I = Timeline> {
    store: Store<K, I>,
}

impl<K: Ord + Clone, I: VersionIndex> PlainTree<K, I> {
    pub fn new() -> PlainTree<K, I> {
        return PlainTree::with_config(Config::default());
    }

    pub fn with_config(config: Config) -> PlainTree<K, I> {
        return PlainTree {
            store: Store::with_config(config),
        };
    }
}

impl<K: Ord + Clone, I: VersionIndex> Default for PlainTree<K, I> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<K: Ord + Clone, I: VersionIndex> SearchTree for PlainTree<K, I> {
    type Key = K;
    type Index = I;

    fn store(&self) -> &Store<K, I> {
        return &self.store;
    }

    fn insert_from(&mut self, key: K, base: I::Base) -> Result<Version> {
        let (version, root) = self.store.begin(base)?;
        let Some(root) = root else {
            let leaf = self.store.alloc(key, Color::Black, [None, None], version);
            self.store.set_root(version, Some(leaf));
            return audit(self, version);
        };

        match locate(&self.store, root, &key, version) {
            Ok((mut path, side)) => {
                let leaf = self.store.alloc(key, Color::Black, [None, None], version);
                self.store.write_child(&mut path, side, Some(leaf), version);
            }
            Err(_) => debug!(version = %version, "key already present, version left unchanged"),
        }
        return audit(self, version);
    }

    fn delete_from(&mut self, key: &K, base: I::Base) -> Result<Version> {
        let (version, root) = self.store.begin(base)?;
        let Some(mut path) = search(&self.store, root, key, version) else {
            debug!(version = %version, "key absent, version left unchanged");
            return audit(self, version);
        };

        let at = path.len() - 1;
        let target = path[at];
        let left = self.store.read_child(target, Side::Left, version);
        let right = self.store.read_child(target, Side::Right, version);
        if left.is_some() && right.is_some() {
            push_successor(&self.store, &mut path, version);
            let successor = path[path.len() - 1];
            let successor_key = self.store.node(successor).key().clone();
            let fresh = self.store.alloc(successor_key, Color::Black, [left, right], version);
            self.store.replace(&mut path[..at], target, Some(fresh), version);
            path[at] = fresh;
        }

        // The last node on the path now has at most one child.
        let last = path.len() - 1;
        let doomed = path[last];
        let child = self.store
            .read_child(doomed, Side::Left, version)
            .or(self.store.read_child(doomed, Side::Right, version));
        self.store.replace(&mut path[..last], doomed, child, version);
        return audit(self, version);
    }

    fn check(&self, version: Version) -> Result<()> {
        return check_order(&self.store, version);
    }
}

impl<K: Ord + Clone> PlainTree<K, Timeline> {
    /// Insert `key` into a new latest version.
    pub fn insert(&mut self, key: K) -> Result<Version> {
        return self.insert_from(key, ());
    }

    /// Delete `key` in a new latest version.
    pub fn delete(&mut self, key: &K) -> Result<Version> {
        return self.delete_from(key, ());
    }
}

impl<K: Ord + Clone> PlainTree<K, Forest> {
    /// Insert `key` into a new version branched from `base`.
    pub fn insert(&mut self, key: K, base: Version) -> Result<Version> {
        return self.insert_from(key, base);
    }

    /// Delete `key` in a new version branched from `base`.
    pub fn delete(&mut self, key: &K, base: Version) -> Result<Version> {
        return self.delete_from(key, base);
    }

    pub fn is_ancestor(&self, ancestor: Version, descendant: Version) -> Result<bool> {
        return self.store.versions().is_ancestor(ancestor, descendant);
    }
}
