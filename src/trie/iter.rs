//! Iterators over the added keys of a [`BinTrie`].

use crate::node::{Direction, Node};
use crate::{BinTrie, BitPrefix, to_upper};

/// An iterator over all added entries of a [`BinTrie`] in trie order (a block before every key it
/// contains, siblings by their bits). The iterator element type is `(&P, Option<&T>)`, as keys may
/// be added without a value.
#[derive(Clone)]
pub struct Iter<'a, P, T> {
    pub(crate) trie: &'a BinTrie<P, T>,
    pub(crate) nodes: Vec<usize>,
}

impl<'a, P, T> Iterator for Iter<'a, P, T> {
    type Item = (&'a P, Option<&'a T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(cur) = self.nodes.pop() {
            let node = &self.trie.table[cur];
            if let Some(upper) = node.upper {
                self.nodes.push(upper);
            }
            if let Some(lower) = node.lower {
                self.nodes.push(lower);
            }
            if node.added {
                return Some((&node.prefix, node.value.as_ref()));
            }
        }
        None
    }
}

/// An iterator over all added entries of a [`BinTrie`] in descending trie order (the exact reverse
/// of [`Iter`]).
#[derive(Clone)]
pub struct Desc<'a, P, T> {
    pub(crate) trie: &'a BinTrie<P, T>,
    pub(crate) nodes: Vec<(usize, bool)>,
}

impl<'a, P, T> Iterator for Desc<'a, P, T> {
    type Item = (&'a P, Option<&'a T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((cur, expanded)) = self.nodes.pop() {
            let node = &self.trie.table[cur];
            if expanded {
                if node.added {
                    return Some((&node.prefix, node.value.as_ref()));
                }
                continue;
            }
            // upper subtree first, then the lower one, then the node itself
            self.nodes.push((cur, true));
            if let Some(lower) = node.lower {
                self.nodes.push((lower, false));
            }
            if let Some(upper) = node.upper {
                self.nodes.push((upper, false));
            }
        }
        None
    }
}

/// An iterator over all added keys of a [`BinTrie`] in trie order.
#[derive(Clone)]
pub struct Keys<'a, P, T> {
    pub(crate) inner: Iter<'a, P, T>,
}

impl<'a, P, T> Iterator for Keys<'a, P, T> {
    type Item = &'a P;

    fn next(&mut self) -> Option<&'a P> {
        self.inner.next().map(|(k, _)| k)
    }
}

/// An iterator over all stored values of a [`BinTrie`] in trie order of their keys. Keys added
/// without a value are skipped.
#[derive(Clone)]
pub struct Values<'a, P, T> {
    pub(crate) inner: Iter<'a, P, T>,
}

impl<'a, P, T> Iterator for Values<'a, P, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            match self.inner.next() {
                Some((_, Some(v))) => return Some(v),
                Some((_, None)) => continue,
                None => return None,
            }
        }
    }
}

/// An iterator over all owned entries of a [`BinTrie`] in trie order.
#[derive(Clone)]
pub struct IntoIter<P, T> {
    trie: BinTrie<P, T>,
    nodes: Vec<usize>,
}

impl<P: BitPrefix, T> Iterator for IntoIter<P, T> {
    type Item = (P, Option<T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(cur) = self.nodes.pop() {
            let node = &mut self.trie.table[cur];
            if let Some(upper) = node.upper {
                self.nodes.push(upper);
            }
            if let Some(lower) = node.lower {
                self.nodes.push(lower);
            }
            if node.added {
                let value = node.value.take();
                return Some((std::mem::replace(&mut node.prefix, P::zero()), value));
            }
        }
        None
    }
}

/// An iterator over all owned keys of a [`BinTrie`] in trie order.
#[derive(Clone)]
pub struct IntoKeys<P, T> {
    inner: IntoIter<P, T>,
}

impl<P: BitPrefix, T> Iterator for IntoKeys<P, T> {
    type Item = P;

    fn next(&mut self) -> Option<P> {
        self.inner.next().map(|(k, _)| k)
    }
}

/// An iterator over all owned values of a [`BinTrie`] in trie order of their keys. Keys added
/// without a value are skipped.
#[derive(Clone)]
pub struct IntoValues<P, T> {
    inner: IntoIter<P, T>,
}

impl<P: BitPrefix, T> Iterator for IntoValues<P, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        loop {
            match self.inner.next() {
                Some((_, Some(v))) => return Some(v),
                Some((_, None)) => continue,
                None => return None,
            }
        }
    }
}

impl<P: BitPrefix, T> IntoIterator for BinTrie<P, T> {
    type Item = (P, Option<T>);

    type IntoIter = IntoIter<P, T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            trie: self,
            nodes: vec![0],
        }
    }
}

impl<'a, P, T> IntoIterator for &'a BinTrie<P, T> {
    type Item = (&'a P, Option<&'a T>);

    type IntoIter = Iter<'a, P, T>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            trie: self,
            nodes: vec![0],
        }
    }
}

unsafe fn extend_lifetime_mut<'short, 'long, T: ?Sized>(v: &'short mut T) -> &'long mut T {
    std::mem::transmute(v)
}

/// A mutable iterator over the added entries of a [`BinTrie`] in trie order. The iterator element
/// type is `(&P, Option<&mut T>)`.
pub struct IterMut<'a, P, T> {
    pub(crate) trie: &'a mut BinTrie<P, T>,
    pub(crate) nodes: Vec<usize>,
}

impl<'a, P, T> Iterator for IterMut<'a, P, T> {
    type Item = (&'a P, Option<&'a mut T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(cur) = self.nodes.pop() {
            let node: &'a mut Node<P, T>;
            // safety: the trie is a tree, so every node index appears at most once during the
            // whole iteration (self.nodes is not public). Extending the lifetime to 'a (for which
            // self holds an exclusive borrow of the trie) can therefore never alias.
            unsafe {
                node = extend_lifetime_mut(&mut self.trie.table[cur]);
            }
            if let Some(upper) = node.upper {
                self.nodes.push(upper);
            }
            if let Some(lower) = node.lower {
                self.nodes.push(lower);
            }
            if node.added {
                return Some((&node.prefix, node.value.as_mut()));
            }
        }
        None
    }
}

/// A mutable iterator over the stored values of a [`BinTrie`] in trie order of their keys.
pub struct ValuesMut<'a, P, T> {
    pub(crate) inner: IterMut<'a, P, T>,
}

impl<'a, P, T> Iterator for ValuesMut<'a, P, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next() {
                Some((_, Some(v))) => return Some(v),
                Some((_, None)) => continue,
                None => return None,
            }
        }
    }
}

impl<P, T> BinTrie<P, T> {
    /// An iterator visiting all added entries in trie order. The iterator element type is
    /// `(&P, Option<&T>)`.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("192.168.0.0/22".parse()?, 1);
    /// t.insert("192.168.0.0/23".parse()?, 2);
    /// t.insert("192.168.2.0/23".parse()?, 3);
    /// t.insert("192.168.0.0/24".parse()?, 4);
    /// assert_eq!(
    ///     t.iter().collect::<Vec<_>>(),
    ///     vec![
    ///         (&"192.168.0.0/22".parse()?, Some(&1)),
    ///         (&"192.168.0.0/23".parse()?, Some(&2)),
    ///         (&"192.168.0.0/24".parse()?, Some(&4)),
    ///         (&"192.168.2.0/23".parse()?, Some(&3)),
    ///     ]
    /// );
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    #[inline(always)]
    pub fn iter(&self) -> Iter<'_, P, T> {
        self.into_iter()
    }

    /// An iterator visiting all added entries in descending trie order, the exact reverse of
    /// [`BinTrie::iter`].
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net> = BinTrie::new();
    /// t.add("192.168.0.0/22".parse()?);
    /// t.add("192.168.2.0/23".parse()?);
    /// t.add("192.168.0.0/24".parse()?);
    /// assert_eq!(
    ///     t.descending().map(|(p, _)| p).collect::<Vec<_>>(),
    ///     vec![
    ///         &"192.168.2.0/23".parse()?,
    ///         &"192.168.0.0/24".parse()?,
    ///         &"192.168.0.0/22".parse()?,
    ///     ]
    /// );
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn descending(&self) -> Desc<'_, P, T> {
        Desc {
            trie: self,
            nodes: vec![(0, false)],
        }
    }

    /// Get a mutable iterator over all added entries, in trie order.
    pub fn iter_mut(&mut self) -> IterMut<'_, P, T> {
        IterMut {
            trie: self,
            nodes: vec![0],
        }
    }

    /// An iterator visiting all added keys in trie order.
    #[inline(always)]
    pub fn keys(&self) -> Keys<'_, P, T> {
        Keys { inner: self.iter() }
    }

    /// Creates a consuming iterator visiting all added keys in trie order.
    #[inline(always)]
    pub fn into_keys(self) -> IntoKeys<P, T> {
        IntoKeys {
            inner: IntoIter {
                trie: self,
                nodes: vec![0],
            },
        }
    }

    /// An iterator visiting all stored values in trie order of their keys.
    #[inline(always)]
    pub fn values(&self) -> Values<'_, P, T> {
        Values { inner: self.iter() }
    }

    /// Creates a consuming iterator visiting all stored values in trie order of their keys.
    #[inline(always)]
    pub fn into_values(self) -> IntoValues<P, T> {
        IntoValues {
            inner: IntoIter {
                trie: self,
                nodes: vec![0],
            },
        }
    }

    /// Get a mutable iterator over all stored values, in trie order of their keys.
    pub fn values_mut(&mut self) -> ValuesMut<'_, P, T> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }
}

impl<P, T> BinTrie<P, T>
where
    P: BitPrefix,
{
    /// An iterator over all added entries whose key contains `prefix` (including `prefix` itself
    /// if added), from the largest block to the smallest.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("10.0.0.0/8".parse()?, 1);
    /// t.insert("10.1.0.0/16".parse()?, 2);
    /// t.insert("10.2.0.0/16".parse()?, 3);
    /// assert_eq!(
    ///     t.cover(&"10.1.2.0/24".parse()?).collect::<Vec<_>>(),
    ///     vec![
    ///         (&"10.0.0.0/8".parse()?, Some(&1)),
    ///         (&"10.1.0.0/16".parse()?, Some(&2)),
    ///     ]
    /// );
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn cover<'a>(&'a self, prefix: &'a P) -> Covering<'a, P, T> {
        Covering {
            trie: self,
            idx: Some(0),
            prefix,
        }
    }

    /// An iterator over all added entries whose key is contained within `prefix` (including
    /// `prefix` itself if added), in trie order.
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
    /// assert_eq!(
    ///     t.covered_by(&"192.168.0.0/23".parse()?).collect::<Vec<_>>(),
    ///     vec![
    ///         (&"192.168.0.0/23".parse()?, Some(&2)),
    ///         (&"192.168.0.0/24".parse()?, Some(&3)),
    ///     ]
    /// );
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn covered_by(&self, prefix: &P) -> Iter<'_, P, T> {
        // find the topmost node contained within `prefix`
        let mut idx = 0;
        let mut cur_p = &self.table[idx].prefix;
        let nodes = loop {
            if cur_p.eq(prefix) {
                break vec![idx];
            }
            let upper = to_upper(cur_p, prefix);
            match self.table[idx].child(upper) {
                Some(c) => {
                    cur_p = &self.table[c].prefix;
                    if cur_p.contains(prefix) {
                        idx = c;
                    } else if prefix.contains(cur_p) {
                        break vec![c];
                    } else {
                        break vec![];
                    }
                }
                None => break vec![],
            }
        };
        Iter { trie: self, nodes }
    }
}

/// An iterator yielding all added entries that cover a given prefix, from the largest block down.
/// See [`BinTrie::cover`].
pub struct Covering<'a, P, T> {
    pub(crate) trie: &'a BinTrie<P, T>,
    pub(crate) idx: Option<usize>,
    pub(crate) prefix: &'a P,
}

impl<'a, P, T> Iterator for Covering<'a, P, T>
where
    P: BitPrefix,
{
    type Item = (&'a P, Option<&'a T>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(idx) = self.idx {
            self.idx = match self.trie.get_direction(idx, self.prefix) {
                Direction::Enter { next, .. } => Some(next),
                _ => None,
            };
            if let Some(kv) = self.trie.table[idx].key_value() {
                return Some(kv);
            }
        }
        None
    }
}

impl<P, T> FromIterator<(P, T)> for BinTrie<P, T>
where
    P: BitPrefix,
{
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<P, T> FromIterator<(P, Option<T>)> for BinTrie<P, T>
where
    P: BitPrefix,
{
    fn from_iter<I: IntoIterator<Item = (P, Option<T>)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<P> FromIterator<P> for BinTrie<P, ()>
where
    P: BitPrefix,
{
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

impl<P, T> Extend<(P, T)> for BinTrie<P, T>
where
    P: BitPrefix,
{
    fn extend<I: IntoIterator<Item = (P, T)>>(&mut self, iter: I) {
        iter.into_iter().for_each(|(p, v)| {
            self.insert(p, v);
        })
    }
}

impl<P, T> Extend<(P, Option<T>)> for BinTrie<P, T>
where
    P: BitPrefix,
{
    fn extend<I: IntoIterator<Item = (P, Option<T>)>>(&mut self, iter: I) {
        iter.into_iter().for_each(|(p, v)| {
            self.put_node(p, v);
        })
    }
}

impl<P> Extend<P> for BinTrie<P, ()>
where
    P: BitPrefix,
{
    fn extend<I: IntoIterator<Item = P>>(&mut self, iter: I) {
        iter.into_iter().for_each(|p| {
            self.add(p);
        })
    }
}
