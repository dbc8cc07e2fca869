//! A borrowed view on a single node of a [`BinTrie`] and the subtree below it.

use crate::node::Direction;
use crate::traverse::{Blocks, ContainedFirst, Nodes};
use crate::trie::{Iter, Keys};
use crate::{BinTrie, BitPrefix};

/// A handle on a node of a [`BinTrie`], added or not, scoping lookups and iteration to the
/// subtree below it. Obtained from [`BinTrie::root`], [`BinTrie::find`], or any of the whole-tree
/// cursors in [`crate::traverse`].
///
/// ```
/// # use bintrie::*;
/// # #[cfg(feature = "ipnet")]
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
/// t.insert("10.0.0.0/8".parse()?, 1);
/// t.insert("10.1.0.0/16".parse()?, 2);
/// t.insert("192.168.0.0/16".parse()?, 3);
/// let sub = t.find_added(&"10.0.0.0/8".parse()?).unwrap();
/// assert_eq!(sub.len(), 2);
/// assert_eq!(sub.iter().count(), 2);
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "ipnet"))]
/// # fn main() {}
/// ```
pub struct SubTrie<'a, P, T> {
    pub(crate) trie: &'a BinTrie<P, T>,
    pub(crate) idx: usize,
}

impl<P, T> Clone for SubTrie<'_, P, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, T> Copy for SubTrie<'_, P, T> {}

impl<'a, P, T> SubTrie<'a, P, T> {
    /// The key of this node.
    pub fn prefix(&self) -> &'a P {
        &self.trie.table[self.idx].prefix
    }

    /// The value stored at this node, if any.
    pub fn value(&self) -> Option<&'a T> {
        self.trie.table[self.idx].value.as_ref()
    }

    /// Whether this node is an added key, as opposed to a junction or the root.
    pub fn is_added(&self) -> bool {
        self.trie.table[self.idx].added
    }

    /// The number of added keys in this subtree, including the node itself. This is O(1), read
    /// off the incrementally maintained subtree sizes.
    pub fn len(&self) -> usize {
        self.trie.table[self.idx].size
    }

    /// Whether the subtree contains no added keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The child covering the lower half of this node's bit range, if present.
    pub fn lower(&self) -> Option<Self> {
        self.trie.table[self.idx].lower.map(|idx| Self {
            trie: self.trie,
            idx,
        })
    }

    /// The child covering the upper half of this node's bit range, if present.
    pub fn upper(&self) -> Option<Self> {
        self.trie.table[self.idx].upper.map(|idx| Self {
            trie: self.trie,
            idx,
        })
    }

    /// The parent node, or `None` on the root.
    pub fn parent(&self) -> Option<Self> {
        self.trie.table[self.idx].parent.map(|idx| Self {
            trie: self.trie,
            idx,
        })
    }

    /// Iterate over the added entries of this subtree in trie order.
    pub fn iter(&self) -> Iter<'a, P, T> {
        Iter {
            trie: self.trie,
            nodes: vec![self.idx],
        }
    }

    /// Iterate over the added keys of this subtree in trie order.
    pub fn keys(&self) -> Keys<'a, P, T> {
        Keys { inner: self.iter() }
    }

    /// Iterate over all nodes of this subtree, junctions included, in sorted order.
    pub fn nodes(&self) -> Nodes<'a, P, T> {
        Nodes::new(self.trie, self.idx)
    }

    /// Iterate over all nodes of this subtree in post-order.
    pub fn contained_first(&self) -> ContainedFirst<'a, P, T> {
        ContainedFirst::new(self.trie, self.idx)
    }
}

impl<'a, P, T> SubTrie<'a, P, T>
where
    P: BitPrefix,
{
    /// Find the node with the given key within this subtree, added or not. Returns `None` if the
    /// key is outside the subtree or has no node.
    pub fn find(&self, prefix: &P) -> Option<Self> {
        if !self.prefix().contains(prefix) {
            return None;
        }
        let mut idx = self.idx;
        loop {
            match self.trie.get_direction(idx, prefix) {
                Direction::Reached => {
                    return Some(Self {
                        trie: self.trie,
                        idx,
                    })
                }
                Direction::Enter { next, .. } => idx = next,
                Direction::Missing => return None,
            }
        }
    }

    /// Iterate over all nodes of this subtree in block-size order.
    pub fn blocks(&self) -> Blocks<'a, P, T> {
        Blocks::new(self.trie, self.idx, false)
    }

    /// Copy the added entries of this subtree into a new, independent trie.
    pub fn to_trie(&self) -> BinTrie<P, T>
    where
        P: Clone,
        T: Clone,
    {
        let mut trie = BinTrie::new();
        for (p, v) in self.iter() {
            trie.put_node(p.clone(), v.cloned());
        }
        trie
    }
}

impl<'a, P, T> IntoIterator for SubTrie<'a, P, T> {
    type Item = (&'a P, Option<&'a T>);
    type IntoIter = Iter<'a, P, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
