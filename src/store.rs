// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Node storage and the read/write primitives every tree operation goes
//! through.
//!
//! Reads resolve a node's fields as some version sees them. Writes record a
//! change for the in-progress version in the cheapest way the node allows:
//!
//! 1. A node allocated by the in-progress version is edited directly.
//! 2. An empty change slot takes the change.
//! 3. A slot filled earlier by the same version, for the same field, is
//!    overwritten.
//! 4. Otherwise the node is full. It is copied with its visible fields
//!    folded in, the copy takes the change, and the copy replaces the
//!    original in its parent, which is itself a write one level up.
//!
//! The unchecked read and write primitives are crate-private: the trees
//! validate a version once, when they resolve its root, and every later
//! read or write of that operation reuses it. Outside callers read through
//! `child_at` and `color_at`, which reject ids that were never issued.
//!
//! Writes take the path from the version root down to the node being
//! written. A cascade walks back up that path and replaces every entry it
//! copies, so callers keep holding valid ids after a write.
//!
//! Every copy consumes a full node and produces an empty one, so the number
//! of copies over a sequence of updates is bounded by the number of slot
//! fills, which is at most one per top-level write. Tree height does not
//! enter the bound.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::debug;
use tracing::trace;

use crate::config::Config;
use crate::error::Error;
use crate::error::Result;
use crate::node::Color;
use crate::node::Field;
use crate::node::Node;
use crate::node::NodeId;
use crate::node::Recorded;
use crate::node::Side;
use crate::version::Version;
use crate::version::VersionIndex;

/// Node ids from a version root down to the node of interest.
pub type Path = SmallVec<[NodeId; 32]>;

/// Counters describing how writes were absorbed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    /// Nodes allocated, copies included.
    pub nodes: usize,
    /// Copies made because a node's slot was taken.
    pub clones: usize,
    /// Writes absorbed by an empty slot.
    pub slot_fills: usize,
    /// Writes that replaced a same-version slot value.
    pub slot_overwrites: usize,
    /// Writes applied directly to a node of the in-progress version.
    pub in_place: usize,
    /// Writes of a value the field already had.
    pub unchanged: usize,
}

/// Arena of versioned nodes plus the version index that roots them.
#[derive(Clone, Debug)]
pub struct Store<K, I> {
    nodes: Vec<Node<K>>,
    versions: I,
    stats: Stats,
    config: Config,
}

impl<K: Clone, I: VersionIndex> Store<K, I> {
    pub fn with_config(config: Config) -> Store<K, I> {
        return Store {
            nodes: Vec::new(),
            versions: I::with_config(&config),
            stats: Stats::default(),
            config,
        };
    }

    pub fn config(&self) -> &Config {
        return &self.config;
    }

    pub fn versions(&self) -> &I {
        return &self.versions;
    }

    pub fn stats(&self) -> Stats {
        return self.stats;
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node<K> {
        return &self.nodes[id.index()];
    }

    /// Issue a version derived from `base`, returning it and its inherited root.
    pub(crate) fn begin(&mut self, base: I::Base) -> Result<(Version, Option<NodeId>)> {
        return self.versions.new_version(base);
    }

    pub fn root(&self, version: Version) -> Result<Option<NodeId>> {
        return self.versions.root_for(version);
    }

    pub(crate) fn set_root(&mut self, version: Version, root: Option<NodeId>) {
        debug!(version = %version, root = ?root.map(NodeId::index), "replaced root");
        self.versions.set_root(version, root);
    }

    /// Allocate a node owned by the in-progress `version`.
    pub(crate) fn alloc(&mut self, key: K, color: Color, children: [Option<NodeId>; 2], version: Version) -> NodeId {
        return self.push(Node::new(key, color, children, version));
    }

    fn push(&mut self, node: Node<K>) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        self.stats.nodes += 1;
        return id;
    }

    /// Whether `version` sees the slot of `id`. `version` must be issued.
    #[inline]
    fn slot_visible(&self, id: NodeId, version: Version) -> bool {
        let Some(slot) = self.nodes[id.index()].slot() else {
            return false;
        };
        let visible = self.versions.is_visible(slot.version(), version);
        debug_assert!(visible.is_ok(), "read at unissued version {version}");
        return visible.unwrap_or(false);
    }

    /// The `side` child of `node` as `version` sees it.
    pub fn child_at(&self, node: NodeId, side: Side, version: Version) -> Result<Option<NodeId>> {
        self.issued(version)?;
        return Ok(self.read_child(node, side, version));
    }

    /// Color of `node` as `version` sees it.
    pub fn color_at(&self, node: NodeId, version: Version) -> Result<Color> {
        self.issued(version)?;
        return Ok(self.read_color(Some(node), version));
    }

    fn issued(&self, version: Version) -> Result<()> {
        if !self.versions.contains(version) {
            return Err(Error::InvalidVersion(version));
        }
        return Ok(());
    }

    #[inline]
    pub(crate) fn read_child(&self, node: NodeId, side: Side, version: Version) -> Option<NodeId> {
        let visible = self.slot_visible(node, version);
        return self.nodes[node.index()].child(side, visible);
    }

    /// Color of `node` as `version` sees it. Missing nodes are black.
    #[inline]
    pub(crate) fn read_color(&self, node: Option<NodeId>, version: Version) -> Color {
        return match node {
            Some(node) => {
                let visible = self.slot_visible(node, version);
                self.nodes[node.index()].color(visible)
            }
            None => Color::Black,
        };
    }

    /// Which side of `parent` holds `child` at `version`.
    pub(crate) fn side_of(&self, parent: NodeId, child: NodeId, version: Version) -> Side {
        if self.read_child(parent, Side::Left, version) == Some(child) {
            return Side::Left;
        }
        debug_assert_eq!(
            self.read_child(parent, Side::Right, version),
            Some(child),
            "node {} is not a child of {}",
            child.index(),
            parent.index(),
        );
        return Side::Right;
    }

    /// Set the `side` child of the last node on `path` at `version`.
    pub(crate) fn write_child(&mut self, path: &mut [NodeId], side: Side, child: Option<NodeId>, version: Version) {
        self.write(path, Field::Child(side, child), version);
    }

    /// Set the color of the last node on `path` at `version`.
    pub(crate) fn write_color(&mut self, path: &mut [NodeId], color: Color, version: Version) {
        self.write(path, Field::Color(color), version);
    }

    /// Put `new` where `old` hangs below `ancestors`, or make it the root
    /// if `old` was the root.
    pub(crate) fn replace(&mut self, ancestors: &mut [NodeId], old: NodeId, new: Option<NodeId>, version: Version) {
        match ancestors.last() {
            Some(&parent) => {
                let side = self.side_of(parent, old, version);
                self.write_child(ancestors, side, new, version);
            }
            None => self.set_root(version, new),
        }
    }

    fn write(&mut self, path: &mut [NodeId], field: Field, version: Version) {
        debug_assert!(!path.is_empty(), "write without a target node");
        let mut field = field;
        let mut depth = path.len();

        while depth > 0 {
            let at = depth - 1;
            let id = path[at];
            let visible = self.slot_visible(id, version);
            if self.nodes[id.index()].resolve(field.target(), visible) == field {
                self.stats.unchanged += 1;
                return;
            }

            match self.nodes[id.index()].record(version, field) {
                Recorded::InPlace => {
                    self.stats.in_place += 1;
                    return;
                }
                Recorded::Filled => {
                    trace!(node = id.index(), version = %version, "filled change slot");
                    self.stats.slot_fills += 1;
                    return;
                }
                Recorded::Overwritten => {
                    self.stats.slot_overwrites += 1;
                    return;
                }
                Recorded::Full => {}
            }

            let mut copy = self.nodes[id.index()].fold(visible, version);
            copy.set_base(field);
            let clone = self.push(copy);
            self.stats.clones += 1;
            trace!(node = id.index(), clone = clone.index(), depth = at, version = %version, "copied full node");

            path[at] = clone;
            if at == 0 {
                self.set_root(version, Some(clone));
                return;
            }
            let side = self.side_of(path[at - 1], id, version);
            field = Field::Child(side, Some(clone));
            depth = at;
        }
    }

    /// Distinct nodes reachable from the given versions. Measures how much
    /// structure the snapshots share.
    ///
    /// Each version is walked on its own: a node shared by two versions may
    /// lead to different children in each, depending on its slot.
    pub fn reachable<V>(&self, versions: V) -> Result<usize>
    where
        V: IntoIterator<Item = Version>,
    {
        let mut seen: FxHashSet<NodeId> = FxHashSet::default();
        let mut walked: FxHashSet<NodeId> = FxHashSet::default();
        let mut stack: Vec<NodeId> = Vec::new();
        for version in versions {
            walked.clear();
            stack.extend(self.root(version)?);
            while let Some(node) = stack.pop() {
                if !walked.insert(node) {
                    continue;
                }
                seen.insert(node);
                stack.extend(self.read_child(node, Side::Left, version));
                stack.extend(self.read_child(node, Side::Right, version));
            }
        }
        return Ok(seen.len());
    }
}
