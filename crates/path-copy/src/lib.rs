// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Persistent binary search tree by full path copying.
//!
//! Every update copies each node on the path from the root to the edited
//! position, so an update costs O(depth) fresh nodes. Versions share the
//! untouched subtrees through `Rc`.
//!
//! This is the textbook baseline node copying improves on. It is small
//! enough to trust by inspection, which makes it a good differential
//! oracle, and its allocation count is the number to beat in benchmarks.
//!
//! Any version may be used as a base, so the same type models both a
//! linear history and a branching one.

use std::cmp::Ordering;
use std::rc::Rc;

#[derive(Debug)]
struct Node<K> {
    key: K,
    left: Link<K>,
    right: Link<K>,
}

type Link<K> = Option<Rc<Node<K>>>;

/// A set that keeps every version.
#[derive(Debug)]
pub struct PathCopySet<K> {
    roots: Vec<Link<K>>,
    allocations: usize,
}

impl<K: Ord + Clone> PathCopySet<K> {
    /// A set holding only the empty version 0.
    pub fn new() -> PathCopySet<K> {
        return PathCopySet {
            roots: vec![None],
            allocations: 0,
        };
    }

    /// Number of versions, version 0 included.
    pub fn versions(&self) -> usize {
        return self.roots.len();
    }

    /// Index of the newest version.
    pub fn latest(&self) -> usize {
        return self.roots.len() - 1;
    }

    /// Nodes allocated over the life of the set.
    pub fn allocations(&self) -> usize {
        return self.allocations;
    }

    /// Insert into a new version derived from the latest one.
    pub fn insert(&mut self, key: K) -> usize {
        return self.insert_from(key, self.latest());
    }

    /// Delete in a new version derived from the latest one.
    pub fn delete(&mut self, key: &K) -> usize {
        return self.delete_from(key, self.latest());
    }

    /// Insert `key` into a new version derived from `base`.
    ///
    /// Panics if `base` does not exist.
    pub fn insert_from(&mut self, key: K, base: usize) -> usize {
        let root = self.roots[base].clone();
        let root = match self.contains(&key, base) {
            true => root,
            false => Some(self.inserted(&root, key)),
        };
        self.roots.push(root);
        return self.latest();
    }

    /// Delete `key` in a new version derived from `base`.
    ///
    /// Panics if `base` does not exist.
    pub fn delete_from(&mut self, key: &K, base: usize) -> usize {
        let root = self.roots[base].clone();
        let root = match self.contains(key, base) {
            true => self.deleted(&root, key),
            false => root,
        };
        self.roots.push(root);
        return self.latest();
    }

    pub fn contains(&self, key: &K, version: usize) -> bool {
        let mut current = &self.roots[version];
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Less => &node.left,
                Ordering::Greater => &node.right,
                Ordering::Equal => return true,
            };
        }
        return false;
    }

    /// Keys of `version` in order.
    pub fn keys(&self, version: usize) -> Vec<K> {
        let mut keys = Vec::new();
        let mut stack: Vec<&Rc<Node<K>>> = Vec::new();
        let mut current = self.roots[version].as_ref();
        loop {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_ref();
            }
            let Some(node) = stack.pop() else {
                return keys;
            };
            keys.push(node.key.clone());
            current = node.right.as_ref();
        }
    }

    fn node(&mut self, key: K, left: Link<K>, right: Link<K>) -> Rc<Node<K>> {
        self.allocations += 1;
        return Rc::new(Node { key, left, right });
    }

    /// Copy of `link` with `key` added. The key must be absent.
    fn inserted(&mut self, link: &Link<K>, key: K) -> Rc<Node<K>> {
        let Some(node) = link else {
            return self.node(key, None, None);
        };
        return match key.cmp(&node.key) {
            Ordering::Less => {
                let left = self.inserted(&node.left, key);
                self.node(node.key.clone(), Some(left), node.right.clone())
            }
            _ => {
                let right = self.inserted(&node.right, key);
                self.node(node.key.clone(), node.left.clone(), Some(right))
            }
        };
    }

    /// Copy of `link` with `key` removed. The key must be present.
    fn deleted(&mut self, link: &Link<K>, key: &K) -> Link<K> {
        let node = link.as_ref()?;
        return match key.cmp(&node.key) {
            Ordering::Less => {
                let left = self.deleted(&node.left, key);
                Some(self.node(node.key.clone(), left, node.right.clone()))
            }
            Ordering::Greater => {
                let right = self.deleted(&node.right, key);
                Some(self.node(node.key.clone(), node.left.clone(), right))
            }
            Ordering::Equal => match (&node.left, &node.right) {
                (None, right) => right.clone(),
                (left, None) => left.clone(),
                (left, Some(right)) => {
                    let successor = minimum(right).key.clone();
                    let right = self.deleted(&node.right, &successor);
                    Some(self.node(successor, left.clone(), right))
                }
            },
        };
    }
}

impl<K: Ord + Clone> Default for PathCopySet<K> {
    fn default() -> Self {
        return Self::new();
    }
}

fn minimum<K>(node: &Rc<Node<K>>) -> &Rc<Node<K>> {
    let mut node = node;
    while let Some(left) = &node.left {
        node = left;
    }
    return node;
}
