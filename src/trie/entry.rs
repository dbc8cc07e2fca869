//! The entry pattern for in-place manipulation of single keys.

use crate::node::DirectionForInsert;
use crate::{BinTrie, BitPrefix};

/// A mutable view into a single key of a trie, which may either be vacant or occupied. A junction
/// node counts as vacant: only added keys are occupied.
pub enum Entry<'a, P, T> {
    /// The key is not added to the trie.
    Vacant(VacantEntry<'a, P, T>),
    /// The key is added to the trie.
    Occupied(OccupiedEntry<'a, P, T>),
}

/// A mutable view into a missing key. The information within this structure describes a path
/// towards that missing node, and how to insert it.
pub struct VacantEntry<'a, P, T> {
    pub(super) trie: &'a mut BinTrie<P, T>,
    pub(super) prefix: P,
    pub(super) idx: usize,
    pub(super) direction: DirectionForInsert<P>,
}

/// A mutable view into an added key of the trie.
pub struct OccupiedEntry<'a, P, T> {
    pub(super) trie: &'a mut BinTrie<P, T>,
    pub(super) idx: usize,
}

impl<P, T> BinTrie<P, T>
where
    P: BitPrefix,
{
    /// Gets the given key's corresponding entry in the trie for in-place manipulation.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("192.168.0.0/23".parse()?, vec![1]);
    /// t.entry("192.168.0.0/23".parse()?).or_default().push(2);
    /// t.entry("192.168.0.0/24".parse()?).or_default().push(3);
    /// assert_eq!(t.get(&"192.168.0.0/23".parse()?), Some(&vec![1, 2]));
    /// assert_eq!(t.get(&"192.168.0.0/24".parse()?), Some(&vec![3]));
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn entry(&mut self, prefix: P) -> Entry<'_, P, T> {
        let mut idx = 0;
        loop {
            match self.get_direction_for_insert(idx, &prefix) {
                DirectionForInsert::Enter { next, .. } => idx = next,
                DirectionForInsert::Reached if self.table[idx].added => {
                    return Entry::Occupied(OccupiedEntry { trie: self, idx })
                }
                direction => {
                    return Entry::Vacant(VacantEntry {
                        trie: self,
                        prefix,
                        idx,
                        direction,
                    })
                }
            }
        }
    }
}

impl<P, T> Entry<'_, P, T> {
    /// Get the value if the key is added and carries one.
    pub fn get(&self) -> Option<&T> {
        match self {
            Entry::Vacant(_) => None,
            Entry::Occupied(e) => e.trie.table[e.idx].value.as_ref(),
        }
    }

    /// Get the value mutably if the key is added and carries one.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Entry::Vacant(_) => None,
            Entry::Occupied(e) => e.trie.table[e.idx].value.as_mut(),
        }
    }

    /// get the key of the current entry
    pub fn key(&self) -> &P {
        match self {
            Entry::Vacant(e) => &e.prefix,
            Entry::Occupied(e) => &e.trie.table[e.idx].prefix,
        }
    }
}

impl<'a, P, T> Entry<'a, P, T>
where
    P: BitPrefix,
{
    /// Store the given value under the key, adding the key if needed, and return the value that
    /// was stored before.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("192.168.1.0/24".parse()?, 1);
    /// assert_eq!(t.entry("192.168.1.0/24".parse()?).insert(10), Some(1));
    /// assert_eq!(t.entry("192.168.2.0/24".parse()?).insert(20), None);
    /// assert_eq!(t.get(&"192.168.1.0/24".parse()?), Some(&10));
    /// assert_eq!(t.get(&"192.168.2.0/24".parse()?), Some(&20));
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    #[inline(always)]
    pub fn insert(self, v: T) -> Option<T> {
        match self {
            Entry::Vacant(e) => {
                e.insert(v);
                None
            }
            Entry::Occupied(e) => e.trie.table[e.idx].value.replace(v),
        }
    }

    /// Ensure the key is added and a value is stored under it, inserting the given default if
    /// there is none, and return a mutable reference to the value.
    #[inline(always)]
    pub fn or_insert(self, default: T) -> &'a mut T {
        self.or_insert_with(|| default)
    }

    /// Ensure the key is added and a value is stored under it, inserting the result of the given
    /// function if there is none, and return a mutable reference to the value.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("192.168.1.0/24".parse()?, 1);
    /// assert_eq!(t.entry("192.168.1.0/24".parse()?).or_insert_with(|| 10), &1);
    /// assert_eq!(t.entry("192.168.2.0/24".parse()?).or_insert_with(|| 20), &20);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    #[inline(always)]
    pub fn or_insert_with<F: FnOnce() -> T>(self, default: F) -> &'a mut T {
        match self {
            Entry::Vacant(e) => e.insert_with(default),
            Entry::Occupied(e) => {
                let OccupiedEntry { trie, idx } = e;
                trie.table[idx].value.get_or_insert_with(default)
            }
        }
    }

    /// Ensure the key is added, without storing a value under it. An occupied entry is already
    /// added, so this is a no-op there.
    #[inline(always)]
    pub fn add(self) {
        match self {
            Entry::Vacant(e) => e.add(),
            Entry::Occupied(_) => {}
        }
    }

    /// Provides in-place mutable access to the stored value before any potential insert.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("192.168.1.0/24".parse()?, 1);
    /// assert_eq!(t.entry("192.168.1.0/24".parse()?).and_modify(|x| *x += 1).get(), Some(&2));
    /// assert_eq!(t.entry("192.168.2.0/24".parse()?).and_modify(|x| *x += 1).get(), None);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    #[inline(always)]
    pub fn and_modify<F: FnOnce(&mut T)>(self, f: F) -> Self {
        match self {
            Entry::Vacant(e) => Entry::Vacant(e),
            Entry::Occupied(e) => {
                e.trie.table[e.idx].value.as_mut().map(f);
                Entry::Occupied(e)
            }
        }
    }
}

impl<'a, P, T> Entry<'a, P, T>
where
    P: BitPrefix,
    T: Default,
{
    /// Ensure the key is added and a value is stored under it, inserting the default value if
    /// there is none, and return a mutable reference to the value.
    #[allow(clippy::unwrap_or_default)]
    #[inline(always)]
    pub fn or_default(self) -> &'a mut T {
        self.or_insert_with(Default::default)
    }
}

impl<P, T> VacantEntry<'_, P, T> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &P {
        &self.prefix
    }
}

impl<'a, P, T> VacantEntry<'a, P, T>
where
    P: BitPrefix,
{
    /// Add the key without storing a value under it.
    pub fn add(self) {
        let VacantEntry {
            trie,
            prefix,
            idx,
            direction,
        } = self;
        let new = trie.create_at(idx, prefix, direction);
        trie.mark_added(new);
    }

    /// Add the key and store the given value under it, returning a mutable reference to the
    /// value.
    pub fn insert(self, v: T) -> &'a mut T {
        let VacantEntry {
            trie,
            prefix,
            idx,
            direction,
        } = self;
        let new = trie.create_at(idx, prefix, direction);
        trie.table[new].value = Some(v);
        trie.mark_added(new);
        trie.table[new].value.as_mut().unwrap()
    }

    /// Add the key and store the return value of the given function under it, returning a mutable
    /// reference to the value.
    pub fn insert_with<F: FnOnce() -> T>(self, default: F) -> &'a mut T {
        self.insert(default())
    }
}

impl<P, T> OccupiedEntry<'_, P, T> {
    /// Gets a reference to the key in the entry. This is the key that is currently stored, and
    /// not necessarily the key that was used for the `entry` call.
    pub fn key(&self) -> &P {
        &self.trie.table[self.idx].prefix
    }

    /// Gets a reference to the value stored under the key, if any.
    pub fn get(&self) -> Option<&T> {
        self.trie.table[self.idx].value.as_ref()
    }

    /// Gets a mutable reference to the value stored under the key, if any.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.trie.table[self.idx].value.as_mut()
    }

    /// The number of added keys in the subtree below this key, including the key itself.
    pub fn len(&self) -> usize {
        self.trie.table[self.idx].size
    }

    /// Always `false`: an occupied entry contains at least its own key.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Store a value under the key, returning the previously stored one.
    pub fn insert(&mut self, value: T) -> Option<T> {
        self.trie.table[self.idx].value.replace(value)
    }
}

impl<P, T> OccupiedEntry<'_, P, T>
where
    P: BitPrefix,
{
    /// Remove the key from the trie and return the value that was stored under it. The tree is
    /// re-shaped exactly as if the key had never been added.
    ///
    /// ```
    /// # use bintrie::*;
    /// # use bintrie::trie::Entry;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, i32> = BinTrie::new();
    /// t.insert("192.168.1.0/24".parse()?, 1);
    /// match t.entry("192.168.1.0/24".parse()?) {
    ///     Entry::Occupied(e) => assert_eq!(e.remove(), Some(1)),
    ///     Entry::Vacant(_) => unreachable!(),
    /// }
    /// assert!(t.is_empty());
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn remove(self) -> Option<T> {
        let value = self.trie.unmark_node(self.idx).unwrap_or(None);
        self.trie.prune(self.idx);
        value
    }
}
