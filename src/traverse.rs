//! Whole-tree traversal: cursors that walk every node of the trie, junctions included, and yield
//! [`SubTrie`] handles.
//!
//! Three orders are available. *Pre-order* ([`Nodes`], [`NodesDesc`]) coincides with the sorted
//! order of the keys, because a node's key is a proper prefix of every descendant key and sorts
//! before it. *Post-order* ([`ContainedFirst`], [`ContainedFirstMut`]) yields every node after
//! both of its subtrees, so contained keys come before their containers. *Block-size order*
//! ([`Blocks`]) yields shorter prefixes before longer ones regardless of position, driven by a
//! binary heap.
//!
//! [`ContainingFirst`] and [`BlockCaching`] are manual cursors rather than iterators: while
//! walking, the caller may attach a value to either child of the current node and read back the
//! value the parent attached, which gives an O(1) parent-to-child handoff for computations that
//! accumulate along root-to-leaf paths.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::{BinTrie, BitPrefix, SubTrie};

impl<P, T> BinTrie<P, T>
where
    P: BitPrefix,
{
    /// Iterate over all nodes of the trie, junctions included, in sorted order of their keys.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net> = BinTrie::new();
    /// t.add("10.1.0.0/16".parse()?);
    /// t.add("10.2.0.0/16".parse()?);
    /// let keys: Vec<_> = t.nodes().map(|n| *n.prefix()).collect();
    /// // the root, the junction, and the two added keys
    /// assert_eq!(
    ///     keys,
    ///     vec![
    ///         "0.0.0.0/0".parse()?,
    ///         "10.0.0.0/14".parse()?,
    ///         "10.1.0.0/16".parse()?,
    ///         "10.2.0.0/16".parse()?,
    ///     ]
    /// );
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn nodes(&self) -> Nodes<'_, P, T> {
        Nodes::new(self, 0)
    }

    /// Iterate over all nodes of the trie in reverse sorted order of their keys.
    pub fn nodes_desc(&self) -> NodesDesc<'_, P, T> {
        NodesDesc::new(self, 0)
    }

    /// Iterate over all nodes in post-order: both subtrees of a node are yielded before the node
    /// itself, so every key comes before the keys containing it.
    pub fn contained_first(&self) -> ContainedFirst<'_, P, T> {
        ContainedFirst::new(self, 0)
    }

    /// A post-order cursor that can remove the entry it currently points at. [`Self::retain`] is
    /// built on it.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, u32> = BinTrie::new();
    /// t.insert("10.0.0.0/8".parse()?, 1);
    /// t.insert("10.1.0.0/16".parse()?, 2);
    /// let mut cursor = t.contained_first_mut();
    /// while cursor.advance() {
    ///     if cursor.value() == Some(&2) {
    ///         cursor.remove_current();
    ///     }
    /// }
    /// assert_eq!(t.len(), 1);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn contained_first_mut(&mut self) -> ContainedFirstMut<'_, P, T> {
        let generation = self.generation;
        ContainedFirstMut {
            trie: self,
            stack: vec![(0, false)],
            current: None,
            generation,
        }
    }

    /// A pre-order cursor with a value handoff from every node to its children. Containing keys
    /// are visited before the keys they contain.
    pub fn containing_first<C>(&self) -> ContainingFirst<'_, P, T, C> {
        ContainingFirst {
            trie: self,
            stack: vec![0],
            current: None,
            current_cache: None,
            cache: HashMap::new(),
        }
    }

    /// Iterate over all nodes in block-size order: shorter prefixes first, ties broken by the
    /// numerically lower key.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net> = BinTrie::new();
    /// t.add("10.0.5.0/24".parse()?);
    /// t.add("192.168.0.0/16".parse()?);
    /// t.add("10.0.0.0/8".parse()?);
    /// let keys: Vec<_> = t.blocks().filter(|n| n.is_added()).map(|n| *n.prefix()).collect();
    /// assert_eq!(
    ///     keys,
    ///     vec![
    ///         "10.0.0.0/8".parse()?,
    ///         "192.168.0.0/16".parse()?,
    ///         "10.0.5.0/24".parse()?,
    ///     ]
    /// );
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn blocks(&self) -> Blocks<'_, P, T> {
        Blocks::new(self, 0, false)
    }

    /// Like [`Self::blocks`], but with length ties broken by the numerically higher key.
    pub fn blocks_upper_first(&self) -> Blocks<'_, P, T> {
        Blocks::new(self, 0, true)
    }

    /// A block-size-order cursor with the same value handoff as [`Self::containing_first`]. A
    /// node's cached value is available when the node is yielded, because its parent (a shorter
    /// prefix) is always yielded earlier. Length ties are broken by the numerically lower key.
    pub fn block_caching<C>(&self) -> BlockCaching<'_, P, T, C> {
        BlockCaching::new(self, false)
    }

    /// Like [`Self::block_caching`], but with length ties broken by the numerically higher key.
    pub fn block_caching_upper_first<C>(&self) -> BlockCaching<'_, P, T, C> {
        BlockCaching::new(self, true)
    }
}

/// Pre-order iterator over all nodes, created by [`BinTrie::nodes`] or [`SubTrie::nodes`].
pub struct Nodes<'a, P, T> {
    trie: &'a BinTrie<P, T>,
    stack: Vec<usize>,
}

impl<'a, P, T> Nodes<'a, P, T> {
    pub(crate) fn new(trie: &'a BinTrie<P, T>, start: usize) -> Self {
        Self {
            trie,
            stack: vec![start],
        }
    }
}

impl<'a, P, T> Iterator for Nodes<'a, P, T> {
    type Item = SubTrie<'a, P, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = &self.trie.table[idx];
        if let Some(upper) = node.upper {
            self.stack.push(upper);
        }
        if let Some(lower) = node.lower {
            self.stack.push(lower);
        }
        Some(SubTrie {
            trie: self.trie,
            idx,
        })
    }
}

/// Reverse pre-order iterator over all nodes, created by [`BinTrie::nodes_desc`].
pub struct NodesDesc<'a, P, T> {
    trie: &'a BinTrie<P, T>,
    stack: Vec<(usize, bool)>,
}

impl<'a, P, T> NodesDesc<'a, P, T> {
    pub(crate) fn new(trie: &'a BinTrie<P, T>, start: usize) -> Self {
        Self {
            trie,
            stack: vec![(start, false)],
        }
    }
}

impl<'a, P, T> Iterator for NodesDesc<'a, P, T> {
    type Item = SubTrie<'a, P, T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((idx, expanded)) = self.stack.pop() {
            if expanded {
                return Some(SubTrie {
                    trie: self.trie,
                    idx,
                });
            }
            // both subtrees in reverse, then the node itself
            let node = &self.trie.table[idx];
            self.stack.push((idx, true));
            if let Some(lower) = node.lower {
                self.stack.push((lower, false));
            }
            if let Some(upper) = node.upper {
                self.stack.push((upper, false));
            }
        }
        None
    }
}

/// Post-order iterator over all nodes, created by [`BinTrie::contained_first`] or
/// [`SubTrie::contained_first`].
pub struct ContainedFirst<'a, P, T> {
    trie: &'a BinTrie<P, T>,
    stack: Vec<(usize, bool)>,
}

impl<'a, P, T> ContainedFirst<'a, P, T> {
    pub(crate) fn new(trie: &'a BinTrie<P, T>, start: usize) -> Self {
        Self {
            trie,
            stack: vec![(start, false)],
        }
    }
}

impl<'a, P, T> Iterator for ContainedFirst<'a, P, T> {
    type Item = SubTrie<'a, P, T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((idx, expanded)) = self.stack.pop() {
            if expanded {
                return Some(SubTrie {
                    trie: self.trie,
                    idx,
                });
            }
            let node = &self.trie.table[idx];
            self.stack.push((idx, true));
            if let Some(upper) = node.upper {
                self.stack.push((upper, false));
            }
            if let Some(lower) = node.lower {
                self.stack.push((lower, false));
            }
        }
        None
    }
}

/// Remove-capable post-order cursor, created by [`BinTrie::contained_first_mut`].
///
/// The cursor starts before the first node. Call [`Self::advance`] to move to the next node in
/// post-order, then inspect it with [`Self::prefix`], [`Self::value`], [`Self::value_mut`], and
/// [`Self::is_added`], or delete it with [`Self::remove_current`]. Removing the current entry
/// never disturbs the rest of the walk.
pub struct ContainedFirstMut<'a, P, T> {
    trie: &'a mut BinTrie<P, T>,
    stack: Vec<(usize, bool)>,
    current: Option<usize>,
    generation: u64,
}

impl<P, T> ContainedFirstMut<'_, P, T>
where
    P: BitPrefix,
{
    /// Move to the next node in post-order. Returns `false` when the walk is done.
    ///
    /// # Panics
    ///
    /// Panics if the trie was structurally modified by anything other than this cursor since the
    /// cursor was created.
    pub fn advance(&mut self) -> bool {
        assert!(
            self.generation == self.trie.generation,
            "trie was modified while a cursor was active"
        );
        while let Some((idx, expanded)) = self.stack.pop() {
            if expanded {
                self.current = Some(idx);
                return true;
            }
            let node = &self.trie.table[idx];
            self.stack.push((idx, true));
            if let Some(upper) = node.upper {
                self.stack.push((upper, false));
            }
            if let Some(lower) = node.lower {
                self.stack.push((lower, false));
            }
        }
        self.current = None;
        false
    }

    /// The key of the current node.
    ///
    /// # Panics
    ///
    /// Panics if the cursor does not point at a node.
    pub fn prefix(&self) -> &P {
        &self.trie.table[self.current.unwrap()].prefix
    }

    /// The value of the current node, if it has one.
    pub fn value(&self) -> Option<&T> {
        self.trie.table[self.current.unwrap()].value.as_ref()
    }

    /// Mutable access to the value of the current node, if it has one.
    pub fn value_mut(&mut self) -> Option<&mut T> {
        self.trie.table[self.current.unwrap()].value.as_mut()
    }

    /// Whether the current node is an added key (as opposed to a junction or the root).
    pub fn is_added(&self) -> bool {
        self.trie.table[self.current.unwrap()].added
    }

    /// Remove the current entry from the trie, restoring the junction invariant, and continue the
    /// walk as if the entry had never been there. Returns `false` if the current node is not an
    /// added key.
    pub fn remove_current(&mut self) -> bool {
        let Some(idx) = self.current else {
            return false;
        };
        if self.trie.unmark_node(idx).is_none() {
            return false;
        }
        if let Some(freed) = self.trie.prune(idx) {
            // pruning cascaded into the parent, which is still pending on the stack
            self.stack.retain(|&(i, _)| i != freed);
        }
        self.generation = self.trie.generation;
        self.current = None;
        true
    }
}

/// Pre-order cursor with a parent-to-child value handoff, created by
/// [`BinTrie::containing_first`].
///
/// After [`Self::next`] yields a node, [`Self::cached`] returns the value that the node's parent
/// attached to it via [`Self::cache_lower`] or [`Self::cache_upper`]. Since pre-order visits
/// every parent before its children, this threads a computation down all root-to-leaf paths in a
/// single pass.
pub struct ContainingFirst<'a, P, T, C> {
    trie: &'a BinTrie<P, T>,
    stack: Vec<usize>,
    current: Option<usize>,
    current_cache: Option<C>,
    cache: HashMap<usize, C>,
}

impl<'a, P, T, C> ContainingFirst<'a, P, T, C> {
    /// Move to the next node in pre-order and return a handle on it.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<SubTrie<'a, P, T>> {
        let idx = self.stack.pop()?;
        let node = &self.trie.table[idx];
        if let Some(upper) = node.upper {
            self.stack.push(upper);
        }
        if let Some(lower) = node.lower {
            self.stack.push(lower);
        }
        self.current = Some(idx);
        self.current_cache = self.cache.remove(&idx);
        Some(SubTrie {
            trie: self.trie,
            idx,
        })
    }

    /// The value attached to the current node by its parent, if any.
    pub fn cached(&self) -> Option<&C> {
        self.current_cache.as_ref()
    }

    /// Attach a value to the lower child of the current node. Dropped silently if the current
    /// node has no lower child.
    pub fn cache_lower(&mut self, value: C) {
        if let Some(lower) = self.current.and_then(|i| self.trie.table[i].lower) {
            self.cache.insert(lower, value);
        }
    }

    /// Attach a value to the upper child of the current node. Dropped silently if the current
    /// node has no upper child.
    pub fn cache_upper(&mut self, value: C) {
        if let Some(upper) = self.current.and_then(|i| self.trie.table[i].upper) {
            self.cache.insert(upper, value);
        }
    }
}

/// A node waiting in the block-size heap. The `Ord` impl turns `std`'s max-heap into
/// shortest-prefix-first order, with the tie direction chosen at construction.
struct BlockNode<R> {
    idx: usize,
    len: u8,
    bits: R,
    upper_first: bool,
}

fn block_node<P, T>(trie: &BinTrie<P, T>, idx: usize, upper_first: bool) -> BlockNode<P::R>
where
    P: BitPrefix,
{
    let prefix = &trie.table[idx].prefix;
    BlockNode {
        idx,
        len: prefix.prefix_len(),
        bits: prefix.mask(),
        upper_first,
    }
}

impl<R: Ord> Ord for BlockNode<R> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.len.cmp(&self.len).then_with(|| {
            if self.upper_first {
                self.bits.cmp(&other.bits)
            } else {
                other.bits.cmp(&self.bits)
            }
        })
    }
}

impl<R: Ord> PartialOrd for BlockNode<R> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<R: Ord> PartialEq for BlockNode<R> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<R: Ord> Eq for BlockNode<R> {}

/// Block-size-order iterator over all nodes, created by [`BinTrie::blocks`],
/// [`BinTrie::blocks_upper_first`], or [`SubTrie::blocks`].
pub struct Blocks<'a, P, T>
where
    P: BitPrefix,
{
    trie: &'a BinTrie<P, T>,
    heap: BinaryHeap<BlockNode<P::R>>,
    upper_first: bool,
}

impl<'a, P, T> Blocks<'a, P, T>
where
    P: BitPrefix,
{
    pub(crate) fn new(trie: &'a BinTrie<P, T>, start: usize, upper_first: bool) -> Self {
        let mut heap = BinaryHeap::new();
        heap.push(block_node(trie, start, upper_first));
        Self {
            trie,
            heap,
            upper_first,
        }
    }
}

impl<'a, P, T> Iterator for Blocks<'a, P, T>
where
    P: BitPrefix,
{
    type Item = SubTrie<'a, P, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.heap.pop()?;
        let node = &self.trie.table[entry.idx];
        if let Some(lower) = node.lower {
            self.heap.push(block_node(self.trie, lower, self.upper_first));
        }
        if let Some(upper) = node.upper {
            self.heap.push(block_node(self.trie, upper, self.upper_first));
        }
        Some(SubTrie {
            trie: self.trie,
            idx: entry.idx,
        })
    }
}

/// Block-size-order cursor with the same parent-to-child value handoff as [`ContainingFirst`],
/// created by [`BinTrie::block_caching`].
pub struct BlockCaching<'a, P, T, C>
where
    P: BitPrefix,
{
    trie: &'a BinTrie<P, T>,
    heap: BinaryHeap<BlockNode<P::R>>,
    upper_first: bool,
    current: Option<usize>,
    current_cache: Option<C>,
    cache: HashMap<usize, C>,
}

impl<'a, P, T, C> BlockCaching<'a, P, T, C>
where
    P: BitPrefix,
{
    fn new(trie: &'a BinTrie<P, T>, upper_first: bool) -> Self {
        let mut heap = BinaryHeap::new();
        heap.push(block_node(trie, 0, upper_first));
        Self {
            trie,
            heap,
            upper_first,
            current: None,
            current_cache: None,
            cache: HashMap::new(),
        }
    }

    /// Move to the next node in block-size order and return a handle on it. The cached value of
    /// the node is available because its parent was yielded earlier.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<SubTrie<'a, P, T>> {
        let entry = self.heap.pop()?;
        let node = &self.trie.table[entry.idx];
        if let Some(lower) = node.lower {
            self.heap.push(block_node(self.trie, lower, self.upper_first));
        }
        if let Some(upper) = node.upper {
            self.heap.push(block_node(self.trie, upper, self.upper_first));
        }
        self.current = Some(entry.idx);
        self.current_cache = self.cache.remove(&entry.idx);
        Some(SubTrie {
            trie: self.trie,
            idx: entry.idx,
        })
    }

    /// The value attached to the current node by its parent, if any.
    pub fn cached(&self) -> Option<&C> {
        self.current_cache.as_ref()
    }

    /// Attach a value to the lower child of the current node. Dropped silently if the current
    /// node has no lower child.
    pub fn cache_lower(&mut self, value: C) {
        if let Some(lower) = self.current.and_then(|i| self.trie.table[i].lower) {
            self.cache.insert(lower, value);
        }
    }

    /// Attach a value to the upper child of the current node. Dropped silently if the current
    /// node has no upper child.
    pub fn cache_upper(&mut self, value: C) {
        if let Some(upper) = self.current.and_then(|i| self.trie.table[i].upper) {
            self.cache.insert(upper, value);
        }
    }
}
