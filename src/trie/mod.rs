//! Implementation of the binary prefix trie.

use crate::node::{Direction, DirectionForInsert, Node};
use crate::{BitPrefix, SubTrie};

mod entry;
mod iter;
mod near;

pub use entry::*;
pub use iter::*;

/// Binary trie keyed by bit prefixes, with an optional value per added key.
///
/// Every key explicitly inserted by the caller is an *added* node. The trie additionally contains
/// *junction* nodes: structural branch points joining exactly two added subtrees. Junctions are
/// created and pruned automatically; the shape of the tree is fully determined by the set of added
/// keys.
///
/// Keys may be added without a value ([`BinTrie::add`], useful for pure key sets with `T = ()`) or
/// with one ([`BinTrie::insert`]). Lookups therefore yield the value as an `Option`.
///
/// ```
/// # use bintrie::*;
/// # #[cfg(feature = "ipnet")]
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut t: BinTrie<ipnet::Ipv4Net, u32> = BinTrie::new();
/// t.insert("192.168.0.0/16".parse()?, 1);
/// t.insert("192.168.1.0/24".parse()?, 2);
/// assert_eq!(t.get_lpm(&"192.168.1.1/32".parse()?), Some((&"192.168.1.0/24".parse()?, Some(&2))));
/// assert_eq!(t.get_lpm(&"192.168.2.1/32".parse()?), Some((&"192.168.0.0/16".parse()?, Some(&1))));
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "ipnet"))]
/// # fn main() {}
/// ```
#[derive(Clone)]
pub struct BinTrie<P, T = ()> {
    pub(crate) table: Vec<Node<P, T>>,
    pub(crate) free: Vec<usize>,
    pub(crate) count: usize,
    pub(crate) generation: u64,
}

/// Action returned by the function given to [`BinTrie::remap`].
pub enum Remap<T> {
    /// Leave the key and its value as they are.
    Keep,
    /// Store the given value under the key, adding the key if necessary.
    Put(T),
    /// Remove the key from the trie.
    Remove,
}

impl<P, T> Default for BinTrie<P, T>
where
    P: BitPrefix,
{
    fn default() -> Self {
        Self {
            table: vec![Node::root(P::zero())],
            free: Vec::new(),
            count: 0,
            generation: 0,
        }
    }
}

impl<P, T> BinTrie<P, T>
where
    P: BitPrefix,
{
    /// Create an empty trie. The root always carries the all-wildcard key.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of added keys in the trie.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net> = BinTrie::new();
    /// t.add("10.1.0.0/16".parse()?);
    /// t.add("10.2.0.0/16".parse()?);
    /// assert_eq!(t.len(), 2);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the trie contains no added keys.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The number of nodes in the tree, including the root and all junctions.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net> = BinTrie::new();
    /// t.add("10.1.0.0/16".parse()?);
    /// t.add("10.2.0.0/16".parse()?);
    /// // root, the junction at 10.0.0.0/14, and the two added leaves
    /// assert_eq!(t.node_count(), 4);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn node_count(&self) -> usize {
        self.table.len() - self.free.len()
    }

    /// A handle on the root node.
    pub fn root(&self) -> SubTrie<'_, P, T> {
        SubTrie { trie: self, idx: 0 }
    }

    /// Add a key to the trie without touching its value slot. Returns `true` if the key was newly
    /// added, and `false` if it was present before (in which case the trie is unchanged).
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net> = BinTrie::new();
    /// assert!(t.add("10.0.0.0/8".parse()?));
    /// assert!(!t.add("10.0.0.0/8".parse()?));
    /// assert_eq!(t.len(), 1);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn add(&mut self, prefix: P) -> bool {
        let idx = self.get_or_create(prefix);
        self.mark_added(idx)
    }

    /// Insert a value under a key, adding the key if necessary. Returns the value that was stored
    /// before, if any.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// assert_eq!(t.insert("192.168.0.0/23".parse()?, 1), None);
    /// assert_eq!(t.insert("192.168.1.0/24".parse()?, 2), None);
    /// assert_eq!(t.insert("192.168.1.0/24".parse()?, 3), Some(2));
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn insert(&mut self, prefix: P, value: T) -> Option<T> {
        let idx = self.get_or_create(prefix);
        let old = self.table[idx].value.replace(value);
        self.mark_added(idx);
        old
    }

    /// Add a key, and store a value under it if one is given. An existing value is only replaced
    /// when `value` is `Some`. Returns `true` if the key was newly added.
    pub fn put_node(&mut self, prefix: P, value: Option<T>) -> bool {
        let idx = self.get_or_create(prefix);
        if let Some(v) = value {
            self.table[idx].value = Some(v);
        }
        self.mark_added(idx)
    }

    /// Get the value of an added key by matching exactly. Returns `None` both for absent keys and
    /// for keys added without a value; use [`BinTrie::contains`] to distinguish the two.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("192.168.1.0/24".parse()?, 1);
    /// assert_eq!(t.get(&"192.168.1.0/24".parse()?), Some(&1));
    /// assert_eq!(t.get(&"192.168.2.0/24".parse()?), None);
    /// assert_eq!(t.get(&"192.168.0.0/23".parse()?), None);
    /// assert_eq!(t.get(&"192.168.1.128/25".parse()?), None);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn get(&self, prefix: &P) -> Option<&T> {
        let idx = self.find_idx(prefix)?;
        if self.table[idx].added {
            self.table[idx].value.as_ref()
        } else {
            None
        }
    }

    /// Get a mutable reference to the value of an added key by matching exactly.
    pub fn get_mut(&mut self, prefix: &P) -> Option<&mut T> {
        let idx = self.find_idx(prefix)?;
        if self.table[idx].added {
            self.table[idx].value.as_mut()
        } else {
            None
        }
    }

    /// Get the stored key and the optional value of an added key by matching exactly.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, u32> = BinTrie::new();
    /// let prefix = "192.168.1.0/24".parse()?;
    /// t.add(prefix);
    /// assert_eq!(t.get_key_value(&prefix), Some((&prefix, None)));
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn get_key_value(&self, prefix: &P) -> Option<(&P, Option<&T>)> {
        let idx = self.find_idx(prefix)?;
        self.table[idx].key_value()
    }

    /// Check if a key was added to the trie (with or without a value).
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net> = BinTrie::new();
    /// t.add("10.1.0.0/16".parse()?);
    /// t.add("10.2.0.0/16".parse()?);
    /// assert!(t.contains(&"10.1.0.0/16".parse()?));
    /// // the junction joining the two siblings is not an added key
    /// assert!(!t.contains(&"10.0.0.0/14".parse()?));
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn contains(&self, prefix: &P) -> bool {
        self.find_idx(prefix)
            .map(|idx| self.table[idx].added)
            .unwrap_or(false)
    }

    /// Check if any added key contains `prefix` in its range (including the key itself).
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net> = BinTrie::new();
    /// t.add("10.0.0.0/8".parse()?);
    /// assert!(t.covers(&"10.1.2.0/24".parse()?));
    /// assert!(!t.covers(&"11.0.0.0/24".parse()?));
    /// assert!(!t.covers(&"10.0.0.0/7".parse()?));
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn covers(&self, prefix: &P) -> bool {
        self.cover(prefix).next().is_some()
    }

    /// Get the longest added prefix containing `prefix`, together with its value.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("192.168.1.0/24".parse()?, 1);
    /// t.insert("192.168.0.0/23".parse()?, 2);
    /// assert_eq!(
    ///     t.get_lpm(&"192.168.1.1/32".parse()?),
    ///     Some((&"192.168.1.0/24".parse()?, Some(&1)))
    /// );
    /// assert_eq!(
    ///     t.get_lpm(&"192.168.0.0/24".parse()?),
    ///     Some((&"192.168.0.0/23".parse()?, Some(&2)))
    /// );
    /// assert_eq!(t.get_lpm(&"192.168.2.0/24".parse()?), None);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn get_lpm(&self, prefix: &P) -> Option<(&P, Option<&T>)> {
        self.lpm_node(prefix).and_then(|n| self.table[n.idx].key_value())
    }

    /// Get a handle on the node of the longest added prefix containing `prefix`.
    pub fn lpm_node(&self, prefix: &P) -> Option<SubTrie<'_, P, T>> {
        let mut idx = 0;
        let mut best = None;
        loop {
            if self.table[idx].added {
                best = Some(idx);
            }
            match self.get_direction(idx, prefix) {
                Direction::Enter { next, .. } => idx = next,
                _ => return best.map(|idx| SubTrie { trie: self, idx }),
            }
        }
    }

    /// Get the shortest added prefix containing `prefix`, together with its value.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("192.168.1.0/24".parse()?, 1);
    /// t.insert("192.168.0.0/23".parse()?, 2);
    /// assert_eq!(
    ///     t.get_spm(&"192.168.1.1/32".parse()?),
    ///     Some((&"192.168.0.0/23".parse()?, Some(&2)))
    /// );
    /// assert_eq!(t.get_spm(&"192.168.2.0/24".parse()?), None);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn get_spm(&self, prefix: &P) -> Option<(&P, Option<&T>)> {
        self.spm_node(prefix).and_then(|n| self.table[n.idx].key_value())
    }

    /// Get a handle on the node of the shortest added prefix containing `prefix`.
    pub fn spm_node(&self, prefix: &P) -> Option<SubTrie<'_, P, T>> {
        let mut idx = 0;
        loop {
            if self.table[idx].added {
                return Some(SubTrie { trie: self, idx });
            }
            match self.get_direction(idx, prefix) {
                Direction::Enter { next, .. } => idx = next,
                _ => return None,
            }
        }
    }

    /// Get a handle on the node with exactly the given key, whether added or a junction.
    pub fn find(&self, prefix: &P) -> Option<SubTrie<'_, P, T>> {
        self.find_idx(prefix).map(|idx| SubTrie { trie: self, idx })
    }

    /// Get a handle on the added node with exactly the given key.
    pub fn find_added(&self, prefix: &P) -> Option<SubTrie<'_, P, T>> {
        self.find_idx(prefix)
            .filter(|&idx| self.table[idx].added)
            .map(|idx| SubTrie { trie: self, idx })
    }

    /// Remove a key from the trie. Returns `true` if the key was present. Junctions left with
    /// fewer than two children are spliced out, so the tree is always shaped as if the key had
    /// never been added.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net> = BinTrie::new();
    /// t.add("10.1.0.0/16".parse()?);
    /// t.add("10.2.0.0/16".parse()?);
    /// assert!(t.remove(&"10.1.0.0/16".parse()?));
    /// assert!(!t.remove(&"10.1.0.0/16".parse()?));
    /// // the junction at 10.0.0.0/14 is gone as well
    /// assert_eq!(t.node_count(), 2);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn remove(&mut self, prefix: &P) -> bool {
        match self.find_idx(prefix) {
            Some(idx) => self.remove_node(idx),
            None => false,
        }
    }

    /// Remove all added keys contained within `prefix` (including `prefix` itself).
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("192.168.0.0/22".parse()?, 1);
    /// t.insert("192.168.0.0/23".parse()?, 2);
    /// t.insert("192.168.0.0/24".parse()?, 3);
    /// t.insert("192.168.2.0/23".parse()?, 4);
    /// t.remove_subtree(&"192.168.0.0/23".parse()?);
    /// assert_eq!(t.get(&"192.168.0.0/23".parse()?), None);
    /// assert_eq!(t.get(&"192.168.0.0/24".parse()?), None);
    /// assert_eq!(t.get(&"192.168.0.0/22".parse()?), Some(&1));
    /// assert_eq!(t.get(&"192.168.2.0/23".parse()?), Some(&4));
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn remove_subtree(&mut self, prefix: &P) {
        if prefix.prefix_len() == 0 {
            return self.clear();
        }
        let mut idx = 0;
        loop {
            match self.get_direction_for_insert(idx, prefix) {
                DirectionForInsert::Reached => break,
                DirectionForInsert::Enter { next, .. } => idx = next,
                DirectionForInsert::NewChild { upper, .. } => {
                    // the child on that side is entirely contained within `prefix`
                    match self.table[idx].child(upper) {
                        Some(child) => {
                            idx = child;
                            break;
                        }
                        None => return,
                    }
                }
                DirectionForInsert::NewLeaf { .. } | DirectionForInsert::NewBranch { .. } => return,
            }
        }
        self.remove_whole_subtree(idx);
    }

    /// Clear the trie but keep the allocated memory.
    pub fn clear(&mut self) {
        self.table.clear();
        self.free.clear();
        self.table.push(Node::root(P::zero()));
        self.count = 0;
        self.generation += 1;
    }

    /// Keep only the added keys for which the condition holds. The condition sees the key and its
    /// optional value.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("192.168.0.0/24".parse()?, 1);
    /// t.insert("192.168.1.0/24".parse()?, 2);
    /// t.insert("192.168.2.0/24".parse()?, 3);
    /// t.retain(|_, v| v.map(|x| x % 2 == 0).unwrap_or(false));
    /// assert_eq!(t.get(&"192.168.0.0/24".parse()?), None);
    /// assert_eq!(t.get(&"192.168.1.0/24".parse()?), Some(&2));
    /// assert_eq!(t.get(&"192.168.2.0/24".parse()?), None);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&P, Option<&T>) -> bool,
    {
        let mut cursor = self.contained_first_mut();
        while cursor.advance() {
            if cursor.is_added() && !f(cursor.prefix(), cursor.value()) {
                cursor.remove_current();
            }
        }
    }

    /// Look up a key and decide, based on its current state, whether to keep, replace, or remove
    /// it. The function sees the current value of the added key, or `None` if the key is absent.
    /// The whole operation runs in a single walk. Returns whether the key is present afterwards.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, u32> = BinTrie::new();
    /// let p = "10.0.0.0/8".parse()?;
    /// assert!(t.remap(p, |v| match v {
    ///     None => Remap::Put(1),
    ///     Some(_) => Remap::Keep,
    /// }));
    /// assert_eq!(t.get(&p), Some(&1));
    /// assert!(!t.remap(p, |_| Remap::Remove));
    /// assert!(t.is_empty());
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn remap<F>(&mut self, prefix: P, f: F) -> bool
    where
        F: FnOnce(Option<&T>) -> Remap<T>,
    {
        let mut idx = 0;
        loop {
            match self.get_direction_for_insert(idx, &prefix) {
                DirectionForInsert::Enter { next, .. } => idx = next,
                DirectionForInsert::Reached if self.table[idx].added => {
                    return match f(self.table[idx].value.as_ref()) {
                        Remap::Keep => true,
                        Remap::Put(v) => {
                            self.table[idx].value = Some(v);
                            true
                        }
                        Remap::Remove => {
                            self.remove_node(idx);
                            false
                        }
                    };
                }
                direction => {
                    return match f(None) {
                        Remap::Keep | Remap::Remove => false,
                        Remap::Put(v) => {
                            let new = self.create_at(idx, prefix, direction);
                            self.table[new].value = Some(v);
                            self.mark_added(new);
                            true
                        }
                    };
                }
            }
        }
    }

    /// Insert the value produced by `f` only if the key is absent. Returns `true` if the key was
    /// inserted.
    pub fn remap_if_absent<F>(&mut self, prefix: P, f: F) -> bool
    where
        F: FnOnce() -> T,
    {
        match self.entry(prefix) {
            Entry::Occupied(_) => false,
            Entry::Vacant(e) => {
                e.insert(f());
                true
            }
        }
    }

    /// Add all keys of `other` to `self`, without copying values.
    pub fn add_trie(&mut self, other: &Self)
    where
        P: Clone,
    {
        for (p, _) in other.iter() {
            self.add(p.clone());
        }
    }

    /// Add all keys of `other` to `self`, copying their values where present.
    pub fn put_trie(&mut self, other: &Self)
    where
        P: Clone,
        T: Clone,
    {
        for (p, v) in other.iter() {
            self.put_node(p.clone(), v.cloned());
        }
    }

    /// Check whether both tries contain exactly the same added keys, ignoring values.
    pub fn eq_keys(&self, other: &Self) -> bool {
        self.count == other.count && self.keys().zip(other.keys()).all(|(a, b)| a.eq(b))
    }
}

/// Private function implementations
impl<P, T> BinTrie<P, T>
where
    P: BitPrefix,
{
    /// Find the index of the node with exactly the given key, whether added or not.
    fn find_idx(&self, prefix: &P) -> Option<usize> {
        let mut idx = 0;
        loop {
            match self.get_direction(idx, prefix) {
                Direction::Reached => return Some(idx),
                Direction::Enter { next, .. } => idx = next,
                Direction::Missing => return None,
            }
        }
    }

    /// Walk to the node for `prefix`, creating it (and any junction) if needed. The node is not
    /// marked as added.
    pub(crate) fn get_or_create(&mut self, prefix: P) -> usize {
        let mut idx = 0;
        loop {
            match self.get_direction_for_insert(idx, &prefix) {
                DirectionForInsert::Enter { next, .. } => idx = next,
                direction => return self.create_at(idx, prefix, direction),
            }
        }
    }

    /// Complete a walk that ended at node `idx` with the given terminal direction, creating the
    /// node for `prefix` there. Returns the index of that node.
    pub(crate) fn create_at(
        &mut self,
        idx: usize,
        prefix: P,
        direction: DirectionForInsert<P>,
    ) -> usize {
        match direction {
            DirectionForInsert::Reached => {
                if !self.table[idx].added {
                    // a junction is promoted: store the caller's key bits
                    self.table[idx].prefix = prefix;
                }
                idx
            }
            DirectionForInsert::NewLeaf { upper } => {
                let new = self.new_node(prefix);
                self.set_child(idx, new, upper);
                self.generation += 1;
                new
            }
            DirectionForInsert::NewChild { upper, child_upper } => {
                let new = self.new_node(prefix);
                let child = self.set_child(idx, new, upper).unwrap();
                self.set_child(new, child, child_upper);
                self.table[new].size = self.table[child].size;
                self.generation += 1;
                new
            }
            DirectionForInsert::NewBranch {
                branch_prefix,
                upper,
                prefix_upper,
            } => {
                let branch = self.new_node(branch_prefix);
                let new = self.new_node(prefix);
                let child = self.set_child(idx, branch, upper).unwrap();
                self.set_child(branch, new, prefix_upper);
                self.set_child(branch, child, !prefix_upper);
                self.table[branch].size = self.table[child].size;
                self.generation += 1;
                new
            }
            DirectionForInsert::Enter { .. } => unreachable!(),
        }
    }

    /// Mark a node as added, updating the added count and the sizes along the parent chain.
    pub(crate) fn mark_added(&mut self, idx: usize) -> bool {
        if self.table[idx].added {
            return false;
        }
        self.table[idx].added = true;
        self.count += 1;
        self.inc_sizes(idx);
        self.generation += 1;
        true
    }

    /// Un-mark a node, dropping its value. Returns `None` if the node was not added, and the
    /// (optional) stored value otherwise. The caller must prune afterwards.
    pub(crate) fn unmark_node(&mut self, idx: usize) -> Option<Option<T>> {
        if !self.table[idx].added {
            return None;
        }
        self.table[idx].added = false;
        let value = self.table[idx].value.take();
        self.count -= 1;
        self.dec_sizes(idx, 1);
        self.generation += 1;
        Some(value)
    }

    /// Remove an added node and restore the junction invariant. Returns `true` if the node was
    /// added.
    pub(crate) fn remove_node(&mut self, idx: usize) -> bool {
        if self.unmark_node(idx).is_none() {
            return false;
        }
        self.prune(idx);
        true
    }

    /// Splice or drop `idx` if it is a non-added, non-root node with fewer than two children. The
    /// cascade reaches at most one level further: if dropping a leaf leaves its parent junction
    /// with a single child, that parent is spliced as well. Returns the index of the parent if it
    /// was removed too (needed by the remove-capable cursor to fix up its stack).
    pub(crate) fn prune(&mut self, idx: usize) -> Option<usize> {
        if idx == 0 || self.table[idx].added {
            return None;
        }
        let parent = self.table[idx].parent.unwrap();
        let upper = self.table[parent].upper == Some(idx);
        match (self.table[idx].lower.take(), self.table[idx].upper.take()) {
            (Some(lower), Some(upper_child)) => {
                // still a valid junction
                self.table[idx].lower = Some(lower);
                self.table[idx].upper = Some(upper_child);
                None
            }
            (Some(child), None) | (None, Some(child)) => {
                self.set_child(parent, child, upper);
                self.free_node(idx);
                self.generation += 1;
                None
            }
            (None, None) => {
                self.clear_child(parent, upper);
                self.free_node(idx);
                self.generation += 1;
                // a junction parent is now down to one child and gets spliced too
                if parent != 0
                    && !self.table[parent].added
                    && self.table[parent].num_children() == 1
                {
                    let grandparent = self.table[parent].parent.unwrap();
                    let parent_upper = self.table[grandparent].upper == Some(parent);
                    let sibling = self.table[parent]
                        .lower
                        .take()
                        .or_else(|| self.table[parent].upper.take())
                        .unwrap();
                    self.set_child(grandparent, sibling, parent_upper);
                    self.free_node(parent);
                    Some(parent)
                } else {
                    None
                }
            }
        }
    }

    /// Detach and free the whole subtree rooted at `idx` (which must not be the root).
    fn remove_whole_subtree(&mut self, idx: usize) {
        let removed = self.table[idx].size;
        let parent = self.table[idx].parent.unwrap();
        let upper = self.table[parent].upper == Some(idx);
        self.clear_child(parent, upper);
        if removed > 0 {
            self.count -= removed;
            self.dec_sizes(parent, removed);
        }
        let mut to_free = vec![idx];
        while let Some(i) = to_free.pop() {
            let node = &mut self.table[i];
            node.value = None;
            to_free.extend(node.lower.take());
            to_free.extend(node.upper.take());
            self.free_node(i);
        }
        self.generation += 1;
        self.prune(parent);
    }

    /// set the child of a node, fixing the child's parent pointer, and return the index of the old
    /// child (whose parent pointer is left dangling for the caller).
    #[inline(always)]
    pub(crate) fn set_child(&mut self, idx: usize, child: usize, upper: bool) -> Option<usize> {
        self.table[child].parent = Some(idx);
        if upper {
            self.table[idx].upper.replace(child)
        } else {
            self.table[idx].lower.replace(child)
        }
    }

    /// remove a child from a node (just the reference).
    #[inline(always)]
    pub(crate) fn clear_child(&mut self, idx: usize, upper: bool) -> Option<usize> {
        if upper {
            self.table[idx].upper.take()
        } else {
            self.table[idx].lower.take()
        }
    }

    /// insert a new node into the table and return its index.
    #[inline(always)]
    fn new_node(&mut self, prefix: P) -> usize {
        let node = Node {
            prefix,
            value: None,
            added: false,
            parent: None,
            lower: None,
            upper: None,
            size: 0,
        };
        if let Some(idx) = self.free.pop() {
            self.table[idx] = node;
            idx
        } else {
            let idx = self.table.len();
            self.table.push(node);
            idx
        }
    }

    #[inline(always)]
    fn free_node(&mut self, idx: usize) {
        self.free.push(idx);
    }

    fn inc_sizes(&mut self, mut idx: usize) {
        loop {
            self.table[idx].size += 1;
            match self.table[idx].parent {
                Some(parent) => idx = parent,
                None => break,
            }
        }
    }

    fn dec_sizes(&mut self, mut idx: usize, by: usize) {
        loop {
            self.table[idx].size -= by;
            match self.table[idx].parent {
                Some(parent) => idx = parent,
                None => break,
            }
        }
    }
}

impl<P, T> PartialEq for BinTrie<P, T>
where
    P: BitPrefix,
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count
            && self
                .iter()
                .zip(other.iter())
                .all(|((pa, va), (pb, vb))| pa.eq(pb) && va == vb)
    }
}

impl<P, T> Eq for BinTrie<P, T>
where
    P: BitPrefix,
    T: Eq,
{
}
