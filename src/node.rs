//! Arena node of the binary trie, together with the walk directions computed from the key
//! contract.

use crate::{to_upper, BitPrefix};

/// A single point in bit-address space. Nodes are stored in the arena of the
/// [`BinTrie`](crate::BinTrie), addressed by index. The root sits at index 0 and carries the
/// all-wildcard key.
///
/// A node is either *added* (its key was explicitly inserted) or a *junction* that only exists to
/// branch between two added subtrees. `size` counts the added nodes in the subtree, including the
/// node itself.
#[derive(Clone)]
pub(crate) struct Node<P, T> {
    pub(crate) prefix: P,
    pub(crate) value: Option<T>,
    pub(crate) added: bool,
    pub(crate) parent: Option<usize>,
    pub(crate) lower: Option<usize>,
    pub(crate) upper: Option<usize>,
    pub(crate) size: usize,
}

impl<P, T> Node<P, T> {
    pub(crate) fn root(prefix: P) -> Self {
        Self {
            prefix,
            value: None,
            added: false,
            parent: None,
            lower: None,
            upper: None,
            size: 0,
        }
    }

    /// get the tuple of prefix and value, but only for added nodes.
    pub(crate) fn key_value(&self) -> Option<(&P, Option<&T>)> {
        self.added.then_some((&self.prefix, self.value.as_ref()))
    }

    /// get the tuple of prefix and mutable value, but only for added nodes.
    pub(crate) fn key_value_mut(&mut self) -> Option<(&P, Option<&mut T>)> {
        self.added.then_some((&self.prefix, self.value.as_mut()))
    }

    pub(crate) fn child(&self, upper: bool) -> Option<usize> {
        if upper {
            self.upper
        } else {
            self.lower
        }
    }

    pub(crate) fn num_children(&self) -> usize {
        self.lower.is_some() as usize + self.upper.is_some() as usize
    }
}

/// Where to go next when searching for a prefix that is already in the tree.
pub(crate) enum Direction {
    /// The prefix is already reached.
    Reached,
    /// Enter the next index and search again.
    Enter { next: usize, upper: bool },
    /// The node was not found.
    Missing,
}

/// Where to go next when searching for the place where a prefix belongs.
pub(crate) enum DirectionForInsert<P> {
    /// The prefix is already reached.
    Reached,
    /// Enter the next index and search again.
    Enter { next: usize, upper: bool },
    /// Insert a new child at the given position as a leaf.
    NewLeaf { upper: bool },
    /// Insert a new child at the given position, moving the old child down to be a child of the
    /// new node. `upper` tells where to insert the new node, while `child_upper` tells where to
    /// re-attach the old child below it.
    NewChild { upper: bool, child_upper: bool },
    /// The prefix and the old child diverge. Insert a junction with the given prefix at `upper`,
    /// and place the new node at `prefix_upper` of the junction. The old child goes to
    /// `!prefix_upper`.
    NewBranch {
        branch_prefix: P,
        upper: bool,
        prefix_upper: bool,
    },
}

impl<P: BitPrefix, T> crate::BinTrie<P, T> {
    /// Get the directions from some node `cur` to get to `prefix`.
    #[inline(always)]
    pub(crate) fn get_direction(&self, cur: usize, prefix: &P) -> Direction {
        let cur_p = &self.table[cur].prefix;
        if cur_p.eq(prefix) {
            Direction::Reached
        } else {
            let upper = to_upper(cur_p, prefix);
            match self.table[cur].child(upper) {
                Some(child) if self.table[child].prefix.contains(prefix) => {
                    Direction::Enter { next: child, upper }
                }
                _ => Direction::Missing,
            }
        }
    }

    /// Get the directions from some node `cur` to get to the place where `prefix` belongs.
    #[inline(always)]
    pub(crate) fn get_direction_for_insert(&self, cur: usize, prefix: &P) -> DirectionForInsert<P> {
        let cur_p = &self.table[cur].prefix;
        if cur_p.eq(prefix) {
            DirectionForInsert::Reached
        } else {
            let upper = to_upper(cur_p, prefix);
            if let Some(child) = self.table[cur].child(upper) {
                let child_p = &self.table[child].prefix;
                if child_p.contains(prefix) {
                    DirectionForInsert::Enter { next: child, upper }
                } else if prefix.contains(child_p) {
                    DirectionForInsert::NewChild {
                        upper,
                        child_upper: to_upper(prefix, child_p),
                    }
                } else {
                    let branch_prefix = prefix.longest_common_prefix(child_p);
                    let prefix_upper = to_upper(&branch_prefix, prefix);
                    DirectionForInsert::NewBranch {
                        branch_prefix,
                        upper,
                        prefix_upper,
                    }
                }
            } else {
                DirectionForInsert::NewLeaf { upper }
            }
        }
    }
}
