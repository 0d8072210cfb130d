// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Palimpsest - persistent ordered sets built on node copying.
//!
//! Every insert and delete produces a new version. Old versions stay
//! readable forever and share almost all of their structure with newer
//! ones: each node holds one extra change slot, and a node is copied only
//! when that slot is already taken. Copies cascade towards the root but the
//! total number of copies is amortized O(1) per update.
//!
//! # Quick Start
//!
//! ```
//! use palimpsest::BalancedTree;
//! use palimpsest::SearchTree;
//! use palimpsest::Version;
//!
//! let mut tree: BalancedTree<&str> = BalancedTree::new();
//! let v1 = tree.insert("pear").unwrap();
//! let v2 = tree.insert("apple").unwrap();
//! let v3 = tree.delete(&"pear").unwrap();
//!
//! assert_eq!(tree.keys(v1).unwrap(), vec!["pear"]);
//! assert_eq!(tree.keys(v2).unwrap(), vec!["apple", "pear"]);
//! assert_eq!(tree.keys(v3).unwrap(), vec!["apple"]);
//! assert_eq!(tree.keys(Version::EMPTY).unwrap(), Vec::<&str>::new());
//! ```
//!
//! # Versions
//!
//! | Index      | Base of a new version | Readable versions        |
//! |------------|-----------------------|--------------------------|
//! | `Timeline` | always the latest     | all, only latest editable |
//! | `Forest`   | any existing version  | all, all editable         |
//!
//! Version 0 is the empty tree. Both indexes hand out versions in
//! increasing order starting at 1.
//!
//! ```
//! use palimpsest::Forest;
//! use palimpsest::PlainTree;
//! use palimpsest::SearchTree;
//! use palimpsest::Version;
//!
//! let mut tree: PlainTree<u32, Forest> = PlainTree::new();
//! let base = tree.insert(1, Version::EMPTY).unwrap();
//! let a = tree.insert(2, base).unwrap();
//! let b = tree.insert(3, base).unwrap();
//!
//! assert_eq!(tree.keys(a).unwrap(), vec![1, 2]);
//! assert_eq!(tree.keys(b).unwrap(), vec![1, 3]);
//! assert!(!tree.is_ancestor(a, b).unwrap());
//! ```

pub mod config;
pub mod error;
pub mod node;
pub mod store;
pub mod tree;
pub mod version;

pub use config::Config;
pub use error::Error;
pub use error::Result;
pub use node::Color;
pub use node::NodeId;
pub use node::Side;
pub use store::Stats;
pub use store::Store;
pub use tree::balanced::BalancedTree;
pub use tree::plain::PlainTree;
pub use tree::SearchTree;
pub use version::Forest;
pub use version::Timeline;
pub use version::Version;
pub use version::VersionIndex;
