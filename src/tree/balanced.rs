// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Persistent red-black tree.
//!
//! Colors are versioned like children: a recolor is a write through the
//! store, so it lands in a change slot or forces a copy just as a child
//! update does. Every snapshot, old or new, is therefore a valid red-black
//! tree on its own.
//!
//! Rotations are three child writes:
//!
//! ```text
//!        p                 r
//!       / \               / \
//!      a   r     ==>     p   c
//!         / \           / \
//!        b   c         a   b
//! ```
//!
//! 1. `p` takes `b` in place of `r`.
//! 2. `r` takes `p`'s place under `p`'s parent (or becomes the root).
//! 3. `r` takes `p` as its child.
//!
//! Each write may copy and cascade; the path kept by the caller is
//! updated along the way.
//!
//! Insertion and deletion fixups follow the usual bottom-up case analysis.
//! A missing child counts as black.

use tracing::debug;

use super::audit;
use super::check_order;
use super::locate;
use super::push_successor;
use super::search;
use super::SearchTree;
use crate::config::Config;
use crate::error::Error;
use crate::error::Result;
use crate::node::Color;
use crate::node::NodeId;
use crate::node::Side;
use crate::store::Path;
use crate::store::Store;
use crate::version::Forest;
use crate::version::Timeline;
use crate::version::Version;
use crate::version::VersionIndex;

/// A red-black tree that keeps every version.
///
/// ```
/// use palimpsest::BalancedTree;
/// use palimpsest::SearchTree;
///
/// let mut tree: BalancedTree<u32> = BalancedTree::new();
/// for key in 0..64 {
///     tree.insert(key).unwrap();
/// }
/// let full = tree.current_version().unwrap();
/// let trimmed = tree.delete(&10).unwrap();
///
/// assert!(tree.contains(&10, full).unwrap());
/// assert!(!tree.contains(&10, trimmed).unwrap());
/// tree.check(full).unwrap();
/// tree.check(trimmed).unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct BalancedTree<K, I = Timeline> {
    store: Store<K, I>,
}

impl<K: Ord + Clone, I: VersionIndex> BalancedTree<K, I> {
    pub fn new() -> BalancedTree<K, I> {
        return BalancedTree::with_config(Config::default());
    }

    pub fn with_config(config: Config) -> BalancedTree<K, I> {
        return BalancedTree {
            store: Store::with_config(config),
        };
    }

    /// Number of black nodes on every root-to-leaf path at `version`.
    pub fn black_height(&self, version: Version) -> Result<usize> {
        let root = self.store.root(version)?;
        return self.black_height_below(root, version);
    }

    fn black_height_below(&self, node: Option<NodeId>, version: Version) -> Result<usize> {
        let Some(node) = node else {
            return Ok(0);
        };
        let color = self.store.read_color(Some(node), version);
        let left = self.store.read_child(node, Side::Left, version);
        let right = self.store.read_child(node, Side::Right, version);
        if color == Color::Red
            && (self.store.read_color(left, version) == Color::Red
                || self.store.read_color(right, version) == Color::Red)
        {
            return Err(Error::Invariant {
                version,
                reason: "red node with a red child",
            });
        }
        let left_height = self.black_height_below(left, version)?;
        let right_height = self.black_height_below(right, version)?;
        if left_height != right_height {
            return Err(Error::Invariant {
                version,
                reason: "unequal black height",
            });
        }
        return Ok(left_height + usize::from(color == Color::Black));
    }

    /// Recolor the `side` child of the last node on `path`, if it exists.
    fn paint_child(&mut self, path: &mut Path, side: Side, color: Color, version: Version) {
        let last = path[path.len() - 1];
        let Some(child) = self.store.read_child(last, side, version) else {
            return;
        };
        path.push(child);
        self.store.write_color(path, color, version);
        path.pop();
    }

    /// Rotate the subtree at the last node of `path` so that node moves
    /// down towards `toward`. Afterwards the path ends at the risen node
    /// and the demoted node is its `toward` child.
    fn rotate(&mut self, path: &mut Path, toward: Side, version: Version) {
        let at = path.len() - 1;
        let pivot = path[at];
        let riser = self.store
            .read_child(pivot, toward.opposite(), version)
            .expect("rotation needs a child on the rising side");
        let inner = self.store.read_child(riser, toward, version);

        self.store.write_child(&mut path[..], toward.opposite(), inner, version);
        let pivot = path[at];
        self.store.replace(&mut path[..at], pivot, Some(riser), version);
        path[at] = riser;
        self.store.write_child(&mut path[..], toward, Some(pivot), version);
    }

    /// Restore the red-black rules after a red leaf was hung at the end of
    /// `path`.
    fn insert_fixup(&mut self, path: &mut Path, version: Version) {
        while path.len() >= 3 {
            let n = path.len();
            let (grand, parent, node) = (path[n - 3], path[n - 2], path[n - 1]);
            if self.store.read_color(Some(parent), version) == Color::Black {
                return;
            }

            let parent_side = self.store.side_of(grand, parent, version);
            let uncle = self.store.read_child(grand, parent_side.opposite(), version);
            if self.store.read_color(uncle, version) == Color::Red {
                path.pop();
                self.store.write_color(path, Color::Black, version);
                path.pop();
                self.paint_child(path, parent_side.opposite(), Color::Black, version);
                self.store.write_color(path, Color::Red, version);
                continue;
            }

            path.pop();
            if self.store.side_of(parent, node, version) != parent_side {
                // Inner grandchild: lift it to the parent's place first.
                self.rotate(path, parent_side, version);
            }
            self.store.write_color(path, Color::Black, version);
            path.pop();
            self.store.write_color(path, Color::Red, version);
            self.rotate(path, parent_side.opposite(), version);
            return;
        }
    }

    /// Restore the red-black rules after a black node was removed from the
    /// `side` of the last node on `path`. `node` is what took its place.
    fn delete_fixup(&mut self, path: &mut Path, node: Option<NodeId>, side: Side, version: Version) {
        let mut node = node;
        let mut side = side;

        while !path.is_empty() && self.store.read_color(node, version) == Color::Black {
            let parent = path[path.len() - 1];
            let sibling = self.store
                .read_child(parent, side.opposite(), version)
                .expect("a doubly black node has a sibling");

            if self.store.read_color(Some(sibling), version) == Color::Red {
                self.paint_child(path, side.opposite(), Color::Black, version);
                self.store.write_color(path, Color::Red, version);
                self.rotate(path, side, version);
                let parent = self.store
                    .read_child(path[path.len() - 1], side, version)
                    .expect("rotated parent hangs below its old sibling");
                path.push(parent);
            }

            let parent = path[path.len() - 1];
            let sibling = self.store
                .read_child(parent, side.opposite(), version)
                .expect("a doubly black node has a sibling");
            let near = self.store.read_child(sibling, side, version);
            let far = self.store.read_child(sibling, side.opposite(), version);

            if self.store.read_color(near, version) == Color::Black
                && self.store.read_color(far, version) == Color::Black
            {
                self.paint_child(path, side.opposite(), Color::Red, version);
                node = path.pop();
                if let (Some(&above), Some(node)) = (path.last(), node) {
                    side = self.store.side_of(above, node, version);
                }
                continue;
            }

            if self.store.read_color(far, version) == Color::Black {
                path.push(sibling);
                self.paint_child(path, side, Color::Black, version);
                self.store.write_color(path, Color::Red, version);
                self.rotate(path, side.opposite(), version);
                path.pop();
            }

            let parent = path[path.len() - 1];
            let parent_color = self.store.read_color(Some(parent), version);
            let sibling = self.store
                .read_child(parent, side.opposite(), version)
                .expect("a doubly black node has a sibling");
            path.push(sibling);
            self.store.write_color(path, parent_color, version);
            self.paint_child(path, side.opposite(), Color::Black, version);
            path.pop();
            self.store.write_color(path, Color::Black, version);
            self.rotate(path, side, version);
            return;
        }

        if let Some(node) = node {
            path.push(node);
            self.store.write_color(path, Color::Black, version);
            path.pop();
        }
    }

    fn blacken_root(&mut self, version: Version) -> Result<()> {
        if let Some(root) = self.store.root(version)? {
            self.store.write_color(&mut [root], Color::Black, version);
        }
        return Ok(());
    }
}

impl<K: Ord + Clone, I: VersionIndex> Default for BalancedTree<K, I> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<K: Ord + Clone, I: VersionIndex> SearchTree for BalancedTree<K, I> {
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
                let leaf = self.store.alloc(key, Color::Red, [None, None], version);
                self.store.write_child(&mut path, side, Some(leaf), version);
                path.push(leaf);
                self.insert_fixup(&mut path, version);
                self.blacken_root(version)?;
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
            let color = self.store.read_color(Some(target), version);
            let fresh = self.store.alloc(successor_key, color, [left, right], version);
            self.store.replace(&mut path[..at], target, Some(fresh), version);
            path[at] = fresh;
        }

        let last = path.len() - 1;
        let doomed = path[last];
        let child = self.store
            .read_child(doomed, Side::Left, version)
            .or(self.store.read_child(doomed, Side::Right, version));
        let removed = self.store.read_color(Some(doomed), version);
        let side = match last {
            0 => Side::Left,
            _ => self.store.side_of(path[last - 1], doomed, version),
        };
        self.store.replace(&mut path[..last], doomed, child, version);
        path.pop();

        if removed == Color::Black {
            self.delete_fixup(&mut path, child, side, version);
        }
        self.blacken_root(version)?;
        return audit(self, version);
    }

    fn check(&self, version: Version) -> Result<()> {
        check_order(&self.store, version)?;
        if self.store.read_color(self.store.root(version)?, version) != Color::Black {
            return Err(Error::Invariant {
                version,
                reason: "red root",
            });
        }
        self.black_height(version)?;
        return Ok(());
    }
}

impl<K: Ord + Clone> BalancedTree<K, Timeline> {
    /// Insert `key` into a new latest version.
    pub fn insert(&mut self, key: K) -> Result<Version> {
        return self.insert_from(key, ());
    }

    /// Delete `key` in a new latest version.
    pub fn delete(&mut self, key: &K) -> Result<Version> {
        return self.delete_from(key, ());
    }
}

impl<K: Ord + Clone> BalancedTree<K, Forest> {
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
