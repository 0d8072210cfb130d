// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Versioned tree nodes and their single change slot.
//!
//! A node carries base fields (two children and a color) and at most one
//! pending change. The change is stamped with the version that made it;
//! snapshots that cannot see that version keep reading the base fields.
//!
//! Nodes live in a `Vec` owned by the store and refer to each other by
//! index, so no node is ever freed while a version might still reach it.

use crate::version::Version;

/// Index of a node in the store's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> NodeId {
        return NodeId(index as u32);
    }

    #[inline]
    pub fn index(self) -> usize {
        return self.0 as usize;
    }
}

/// Which child of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub fn opposite(self) -> Side {
        return match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        };
    }

    #[inline]
    fn index(self) -> usize {
        return match self {
            Side::Left => 0,
            Side::Right => 1,
        };
    }
}

/// Node color. Only the balanced tree reads it; the plain tree leaves
/// every node black.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// A field that can be superseded by a change slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Child(Side),
    Color,
}

/// A field together with a value for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Child(Side, Option<NodeId>),
    Color(Color),
}

impl Field {
    #[inline]
    pub fn target(&self) -> Target {
        return match self {
            Field::Child(side, _) => Target::Child(*side),
            Field::Color(_) => Target::Color,
        };
    }
}

/// The one pending change a node may hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeSlot {
    version: Version,
    field: Field,
}

impl ChangeSlot {
    /// Version that installed the change.
    pub fn version(&self) -> Version {
        return self.version;
    }

    pub fn field(&self) -> Field {
        return self.field;
    }

    /// Replace the value of a change made earlier in the same version.
    ///
    /// Sealed versions may already observe this slot, so any other
    /// overwrite would rewrite history.
    fn overwrite(&mut self, version: Version, field: Field) {
        assert!(
            self.version == version && self.field.target() == field.target(),
            "change slot of version {} ({:?}) overwritten by version {} ({:?})",
            self.version,
            self.field.target(),
            version,
            field.target(),
        );
        self.field = field;
    }
}

/// Outcome of trying to record a change on an existing node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Recorded {
    /// The node was created by this version and was edited directly.
    InPlace,
    /// The empty slot now holds the change.
    Filled,
    /// The slot already held a change from this version for the same field.
    Overwritten,
    /// The slot is taken; the node must be copied.
    Full,
}

/// A key with two children, a color and one change slot.
#[derive(Clone, Debug)]
pub struct Node<K> {
    key: K,
    children: [Option<NodeId>; 2],
    color: Color,
    slot: Option<ChangeSlot>,
    /// Version that allocated this node.
    born: Version,
}

impl<K> Node<K> {
    pub(crate) fn new(key: K, color: Color, children: [Option<NodeId>; 2], born: Version) -> Node<K> {
        return Node {
            key,
            children,
            color,
            slot: None,
            born,
        };
    }

    pub fn key(&self) -> &K {
        return &self.key;
    }

    pub fn slot(&self) -> Option<&ChangeSlot> {
        return self.slot.as_ref();
    }

    pub fn born(&self) -> Version {
        return self.born;
    }

    /// Current value of `target`, given whether the slot is visible.
    pub(crate) fn resolve(&self, target: Target, slot_visible: bool) -> Field {
        if slot_visible {
            if let Some(slot) = &self.slot {
                if slot.field.target() == target {
                    return slot.field;
                }
            }
        }
        return match target {
            Target::Child(side) => Field::Child(side, self.children[side.index()]),
            Target::Color => Field::Color(self.color),
        };
    }

    pub(crate) fn child(&self, side: Side, slot_visible: bool) -> Option<NodeId> {
        return match self.resolve(Target::Child(side), slot_visible) {
            Field::Child(_, child) => child,
            Field::Color(_) => unreachable!("child target resolved to a color"),
        };
    }

    pub(crate) fn color(&self, slot_visible: bool) -> Color {
        return match self.resolve(Target::Color, slot_visible) {
            Field::Color(color) => color,
            Field::Child(..) => unreachable!("color target resolved to a child"),
        };
    }

    /// Overwrite a base field. Only valid for nodes no sealed version sees.
    pub(crate) fn set_base(&mut self, field: Field) {
        match field {
            Field::Child(side, child) => self.children[side.index()] = child,
            Field::Color(color) => self.color = color,
        }
    }

    /// Record `field` at `version` without copying, if the slot rules allow it.
    pub(crate) fn record(&mut self, version: Version, field: Field) -> Recorded {
        if self.born == version {
            debug_assert!(self.slot.is_none(), "fresh node holds a change slot");
            self.set_base(field);
            return Recorded::InPlace;
        }
        return match self.slot {
            None => {
                self.slot = Some(ChangeSlot { version, field });
                Recorded::Filled
            }
            Some(ref mut slot) if slot.version == version && slot.field.target() == field.target() => {
                slot.overwrite(version, field);
                Recorded::Overwritten
            }
            Some(_) => Recorded::Full,
        };
    }

    /// A copy holding the fields visible at the copying version, with an
    /// empty slot. The copy belongs to `version` and may be edited in place.
    pub(crate) fn fold(&self, slot_visible: bool, version: Version) -> Node<K>
    where
        K: Clone,
    {
        return Node {
            key: self.key.clone(),
            children: [self.child(Side::Left, slot_visible), self.child(Side::Right, slot_visible)],
            color: self.color(slot_visible),
            slot: None,
            born: version,
        };
    }
}
