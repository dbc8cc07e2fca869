//! This crate provides a binary trie for variable-length bit prefixes, indexing address blocks
//! such as CIDR ranges. Any lookup performs longest-prefix match (with shortest-prefix match also
//! available). It supports both IPv4 and IPv6 keys (from either
//! [ipnet](https://docs.rs/ipnet/2.10.0) or [ipnetwork](https://crates.io/crates/ipnetwork)), as
//! well as any tuple `(R, u8)` where `R` is an unsigned primitive integer (`u8`, `u16`, `u32`,
//! `u64`, or `u128`).
//!
//! # Description of the tree
//!
//! Each node consists of a prefix, an optional value, and two optional children. The shape of the
//! tree is fully determined by the set of keys: nodes the caller inserted are *added*, and the
//! trie maintains additional *junction* nodes as branch points joining exactly two added
//! subtrees. A junction is created when two keys diverge below it and pruned as soon as it has
//! fewer than two children, so removing a key always exactly reverts its insertion. The root sits
//! at the all-wildcard prefix and holds the whole tree together.
//!
//! Keys may be added with a value ([`BinTrie::insert`]) or without one ([`BinTrie::add`], making
//! `BinTrie<P>` a plain key set); lookups therefore yield values as an `Option`. Every node
//! carries the number of added keys in its subtree, maintained incrementally, so the size of any
//! subtree is available in constant time.
//!
//! Traversing into the tree looks at the most significant bit that is not part of the current
//! node's prefix: if it is not set, the walk takes the lower branch, otherwise the upper one.
//!
//! # Traversals
//!
//! Iteration over the added entries yields them in lexicographic order, with every block before
//! the keys it contains. On top of that, [`traverse`] offers whole-tree cursors in sorted,
//! reverse sorted, post-order (contained keys first), pre-order with a parent-to-child value
//! handoff, and block-size order. [`SubTrie`] scopes lookups and traversals to a subtree, and
//! [`AddedTree`] gives a collapsed view with all junctions skipped.
//!
//! # Operations on the tree
//!
//! The following are the computational complexities of the functions, where `n` is the number of
//! added keys in the tree and `w` the width of the key type in bits.
//!
//! | Operation                               | Complexity |
//! |-----------------------------------------|------------|
//! | `add`, `insert`, `entry`, `remap`       | `O(w)`     |
//! | `remove`, `remove_subtree`              | `O(w)`     |
//! | `get`, `get_lpm`, `get_spm`, `covers`   | `O(w)`     |
//! | `floor`, `ceiling`, `lower`, `higher`   | `O(w)`     |
//! | `retain`, `clear` (calling `drop`)      | `O(n)`     |
//! | Operations on [`trie::Entry`]           | `O(1)`     |
//! | `len`, `is_empty`, [`SubTrie::len`]     | `O(1)`     |
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "ipnet")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use bintrie::BinTrie;
//! use ipnet::Ipv4Net;
//!
//! let mut table: BinTrie<Ipv4Net, u32> = BinTrie::new();
//! table.insert("10.0.0.0/8".parse()?, 1);
//! table.insert("10.1.0.0/16".parse()?, 2);
//!
//! // longest-prefix match
//! let (block, value) = table.get_lpm(&"10.1.2.0/24".parse()?).unwrap();
//! assert_eq!(block, &"10.1.0.0/16".parse()?);
//! assert_eq!(value, Some(&2));
//!
//! // containment queries
//! assert!(table.covers(&"10.200.0.0/16".parse()?));
//! assert_eq!(table.covered_by(&"10.0.0.0/8".parse()?).count(), 2);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "ipnet"))]
//! # fn main() {}
//! ```

#![allow(clippy::collapsible_else_if)]
#![deny(missing_docs)]

mod added_tree;
mod fmt;
mod node;
mod prefix;
#[cfg(feature = "serde")]
mod serde;
mod subtrie;
#[cfg(test)]
mod fuzzing;

pub mod traverse;
pub mod trie;

pub use added_tree::{AddedTree, AddedTreeNode};
pub use prefix::{BitMatch, BitPrefix};
pub use subtrie::SubTrie;
pub use traverse::{
    BlockCaching, Blocks, ContainedFirst, ContainedFirstMut, ContainingFirst, Nodes, NodesDesc,
};
pub use trie::{BinTrie, Remap};

/// Whether `child_p` belongs to the upper branch of a node with prefix `branch_p`, decided by the
/// first bit beyond the branch prefix.
#[inline(always)]
pub(crate) fn to_upper<P: BitPrefix>(branch_p: &P, child_p: &P) -> bool {
    child_p.is_bit_set(branch_p.prefix_len())
}
