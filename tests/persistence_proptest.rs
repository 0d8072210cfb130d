// model = "claude-opus-4-5"
// created = "2026-10-16"
// modified = "2026-10-16"
// driver = "Isaac Clayton"

//! Property-based tests for persistence.
//!
//! Random edit sequences are replayed against a tree and against an oracle
//! that stores a full `BTreeSet` per version. After every sequence each
//! version of the tree must read exactly like its oracle set.

use std::collections::BTreeSet;

use proptest::prelude::*;
use proptest::sample::Index;

use palimpsest::BalancedTree;
use palimpsest::Config;
use palimpsest::Forest;
use palimpsest::PlainTree;
use palimpsest::SearchTree;
use palimpsest::Timeline;
use palimpsest::Version;

// =============================================================================
// Test helpers
// =============================================================================

#[derive(Clone, Debug)]
enum Edit {
    Insert(u8),
    Delete(u8),
}

/// Small keys so inserts collide and deletes usually hit.
fn arbitrary_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => (0u8..48).prop_map(Edit::Insert),
        2 => (0u8..48).prop_map(Edit::Delete),
    ]
}

fn checked() -> Config {
    return Config::new().with_check_invariants(true);
}

/// One full set per version, version 0 included.
struct Oracle {
    sets: Vec<BTreeSet<u8>>,
}

impl Oracle {
    fn new() -> Oracle {
        return Oracle { sets: vec![BTreeSet::new()] };
    }

    fn apply(&mut self, edit: &Edit, base: Version) -> Version {
        let mut set = self.sets[base.index()].clone();
        match edit {
            Edit::Insert(key) => set.insert(*key),
            Edit::Delete(key) => set.remove(key),
        };
        self.sets.push(set);
        return Version(self.sets.len() as u32 - 1);
    }

    fn keys(&self, version: Version) -> Vec<u8> {
        return self.sets[version.index()].iter().copied().collect();
    }
}

fn apply<T: SearchTree<Key = u8>>(
    tree: &mut T,
    edit: &Edit,
    base: <T::Index as palimpsest::VersionIndex>::Base,
) -> Version {
    return match edit {
        Edit::Insert(key) => tree.insert_from(*key, base).unwrap(),
        Edit::Delete(key) => tree.delete_from(key, base).unwrap(),
    };
}

fn assert_matches<T: SearchTree<Key = u8>>(tree: &T, oracle: &Oracle) -> Result<(), TestCaseError> {
    for index in 0..oracle.sets.len() {
        let version = Version(index as u32);
        let expected = oracle.keys(version);
        prop_assert_eq!(tree.keys(version).unwrap(), expected.clone(), "keys at {}", version);
        prop_assert_eq!(tree.len(version).unwrap(), expected.len());
        for key in 0u8..48 {
            prop_assert_eq!(
                tree.contains(&key, version).unwrap(),
                oracle.sets[index].contains(&key),
                "key {} at {}",
                key,
                version,
            );
        }
    }
    return Ok(());
}

fn replay_timeline<T>(tree: &mut T, edits: &[Edit]) -> Oracle
where
    T: SearchTree<Key = u8, Index = Timeline>,
{
    let mut oracle = Oracle::new();
    for edit in edits {
        let base = Version(oracle.sets.len() as u32 - 1);
        let expected = oracle.apply(edit, base);
        assert_eq!(apply(tree, edit, ()), expected);
    }
    return oracle;
}

fn replay_forest<T>(tree: &mut T, edits: &[(Edit, Index)]) -> Oracle
where
    T: SearchTree<Key = u8, Index = Forest>,
{
    let mut oracle = Oracle::new();
    for (edit, pick) in edits {
        let base = Version(pick.index(oracle.sets.len()) as u32);
        let expected = oracle.apply(edit, base);
        assert_eq!(apply(tree, edit, base), expected);
    }
    return oracle;
}

// =============================================================================
// Partial persistence
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every version of a plain timeline reads like its oracle set.
    #[test]
    fn plain_timeline_matches_oracle(edits in prop::collection::vec(arbitrary_edit(), 1..120)) {
        let mut tree: PlainTree<u8, Timeline> = PlainTree::with_config(checked());
        let oracle = replay_timeline(&mut tree, &edits);
        assert_matches(&tree, &oracle)?;
    }

    /// Every version of a balanced timeline reads like its oracle set and
    /// satisfies the red-black rules.
    #[test]
    fn balanced_timeline_matches_oracle(edits in prop::collection::vec(arbitrary_edit(), 1..120)) {
        let mut tree: BalancedTree<u8, Timeline> = BalancedTree::with_config(checked());
        let oracle = replay_timeline(&mut tree, &edits);
        assert_matches(&tree, &oracle)?;
        for index in 0..oracle.sets.len() {
            prop_assert!(tree.check(Version(index as u32)).is_ok());
        }
    }

    /// Reading never changes what a later read returns.
    #[test]
    fn reads_are_idempotent(edits in prop::collection::vec(arbitrary_edit(), 1..60)) {
        let mut tree: BalancedTree<u8, Timeline> = BalancedTree::new();
        replay_timeline(&mut tree, &edits);
        let latest = tree.current_version().unwrap();
        let before = tree.stats();
        let first = tree.keys(latest).unwrap();
        let second = tree.keys(latest).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(tree.stats(), before);
    }
}

// =============================================================================
// Full persistence
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(150))]

    /// Edits branching from random versions match an oracle per version.
    #[test]
    fn plain_forest_matches_oracle(
        edits in prop::collection::vec((arbitrary_edit(), any::<Index>()), 1..120),
    ) {
        let mut tree: PlainTree<u8, Forest> = PlainTree::with_config(checked());
        let oracle = replay_forest(&mut tree, &edits);
        assert_matches(&tree, &oracle)?;
    }

    #[test]
    fn balanced_forest_matches_oracle(
        edits in prop::collection::vec((arbitrary_edit(), any::<Index>()), 1..120),
    ) {
        let mut tree: BalancedTree<u8, Forest> = BalancedTree::with_config(checked());
        let oracle = replay_forest(&mut tree, &edits);
        assert_matches(&tree, &oracle)?;
    }

    /// Ancestry answers agree with walking parent links.
    #[test]
    fn ancestry_matches_parent_walk(
        edits in prop::collection::vec((arbitrary_edit(), any::<Index>()), 1..80),
    ) {
        let mut tree: PlainTree<u8, Forest> = PlainTree::new();
        let mut parents = vec![None];
        for (edit, pick) in &edits {
            let base = Version(pick.index(parents.len()) as u32);
            apply(&mut tree, edit, base);
            parents.push(Some(base));
        }
        let walk = |ancestor: Version, descendant: Version| {
            let mut current = Some(descendant);
            while let Some(version) = current {
                if version == ancestor {
                    return true;
                }
                current = parents[version.index()];
            }
            return false;
        };
        for a in 0..parents.len() {
            for d in 0..parents.len() {
                let (a, d) = (Version(a as u32), Version(d as u32));
                prop_assert_eq!(tree.is_ancestor(a, d).unwrap(), walk(a, d));
            }
        }
    }

    /// Edits on one branch never leak into a sibling branch.
    #[test]
    fn sibling_branches_are_independent(
        shared in prop::collection::vec(arbitrary_edit(), 0..40),
        left in prop::collection::vec(arbitrary_edit(), 1..40),
        right in prop::collection::vec(arbitrary_edit(), 1..40),
    ) {
        let mut tree: BalancedTree<u8, Forest> = BalancedTree::with_config(checked());
        let mut fork = Version::EMPTY;
        for edit in &shared {
            fork = apply(&mut tree, edit, fork);
        }
        let before = tree.keys(fork).unwrap();

        // Interleave the branches so each keeps hitting the other's slots.
        let mut tips = [fork, fork];
        let mut expected = [before.iter().copied().collect::<BTreeSet<u8>>(), before.iter().copied().collect()];
        for step in 0..left.len().max(right.len()) {
            for (branch, edits) in [&left, &right].into_iter().enumerate() {
                if let Some(edit) = edits.get(step) {
                    tips[branch] = apply(&mut tree, edit, tips[branch]);
                    match edit {
                        Edit::Insert(key) => expected[branch].insert(*key),
                        Edit::Delete(key) => expected[branch].remove(key),
                    };
                }
            }
        }

        prop_assert_eq!(tree.keys(fork).unwrap(), before);
        for branch in 0..2 {
            let keys: Vec<u8> = expected[branch].iter().copied().collect();
            prop_assert_eq!(tree.keys(tips[branch]).unwrap(), keys);
        }
    }
}
