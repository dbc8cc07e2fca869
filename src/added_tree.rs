//! A collapsed view of the trie that skips all junctions: every added key is linked directly to
//! its closest added ancestor (or to the root), giving a non-binary tree of only the keys the
//! caller actually inserted.

use std::collections::HashMap;

use crate::{BinTrie, BitPrefix};

impl<P, T> BinTrie<P, T>
where
    P: BitPrefix,
{
    /// Build the collapsed view of only the added keys. Each key becomes a child of its closest
    /// added ancestor, with the root as the anchor for keys without one. Built in a single
    /// pre-order pass, handing the closest added ancestor down to each child.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net> = BinTrie::new();
    /// t.add("10.0.0.0/8".parse()?);
    /// t.add("10.1.0.0/16".parse()?);
    /// t.add("10.2.0.0/16".parse()?);
    /// let view = t.added_tree();
    /// // the junction between the two /16 blocks is skipped
    /// let below: Vec<_> = view
    ///     .root()
    ///     .children()
    ///     .flat_map(|c| c.children())
    ///     .map(|c| *c.prefix())
    ///     .collect();
    /// assert_eq!(below, vec!["10.1.0.0/16".parse()?, "10.2.0.0/16".parse()?]);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn added_tree(&self) -> AddedTree<'_, P, T> {
        let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut cursor = self.containing_first::<usize>();
        while let Some(node) = cursor.next() {
            let idx = node.idx;
            let anchor = if idx == 0 {
                0
            } else if node.is_added() {
                let ancestor = cursor.cached().copied().unwrap_or(0);
                children.entry(ancestor).or_default().push(idx);
                idx
            } else {
                cursor.cached().copied().unwrap_or(0)
            };
            cursor.cache_lower(anchor);
            cursor.cache_upper(anchor);
        }
        AddedTree {
            trie: self,
            children,
        }
    }
}

/// The collapsed added-keys view of a [`BinTrie`], created by [`BinTrie::added_tree`]. Unlike the
/// trie itself it is not binary: a key has one child per added key directly below it.
pub struct AddedTree<'a, P, T> {
    trie: &'a BinTrie<P, T>,
    /// Added children per node index, in sorted order. Index 0 anchors the top-level keys.
    children: HashMap<usize, Vec<usize>>,
}

impl<'a, P, T> AddedTree<'a, P, T> {
    /// The anchor of the view. This is the trie root, which is only an added key itself if the
    /// all-wildcard key was inserted.
    pub fn root(&self) -> AddedTreeNode<'_, 'a, P, T> {
        AddedTreeNode { tree: self, idx: 0 }
    }
}

/// One key in the collapsed view, with its directly contained added keys as children.
pub struct AddedTreeNode<'t, 'a, P, T> {
    tree: &'t AddedTree<'a, P, T>,
    idx: usize,
}

impl<'t, 'a, P, T> AddedTreeNode<'t, 'a, P, T> {
    /// The key of this node.
    pub fn prefix(&self) -> &'a P {
        &self.tree.trie.table[self.idx].prefix
    }

    /// The value stored at this node, if any.
    pub fn value(&self) -> Option<&'a T> {
        self.tree.trie.table[self.idx].value.as_ref()
    }

    /// Whether this node is an added key. Only ever `false` for the anchor returned by
    /// [`AddedTree::root`].
    pub fn is_added(&self) -> bool {
        self.tree.trie.table[self.idx].added
    }

    /// The added keys directly below this one, in sorted order.
    pub fn children(self) -> impl Iterator<Item = AddedTreeNode<'t, 'a, P, T>> + 't {
        let tree = self.tree;
        tree.children
            .get(&self.idx)
            .into_iter()
            .flatten()
            .map(move |&idx| AddedTreeNode { tree, idx })
    }
}

impl<P, T> Clone for AddedTreeNode<'_, '_, P, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, T> Copy for AddedTreeNode<'_, '_, P, T> {}
