//! Nearest-neighbor lookups in trie order: floor, ceiling, lower, and higher.
//!
//! All four are a single bounded walk from the root towards the queried key. While walking, the
//! closest subtree lying entirely on the wanted side of the key is remembered; at the end, its
//! maximal (or minimal) added key is resolved by one more descent. No allocation is needed.

use crate::{to_upper, BinTrie, BitPrefix};

/// The best candidate seen so far when searching below a key.
enum Below {
    /// This added node itself.
    Node(usize),
    /// The maximal added key of this subtree.
    Max(usize),
}

impl<P, T> BinTrie<P, T>
where
    P: BitPrefix,
{
    /// Get the largest added entry whose key is smaller than or equal to `prefix` in trie order.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("10.0.0.0/8".parse()?, 1);
    /// t.insert("10.1.0.0/16".parse()?, 2);
    /// assert_eq!(t.floor(&"10.1.0.0/16".parse()?), Some((&"10.1.0.0/16".parse()?, Some(&2))));
    /// assert_eq!(t.floor(&"10.0.255.0/24".parse()?), Some((&"10.0.0.0/8".parse()?, Some(&1))));
    /// assert_eq!(t.floor(&"9.0.0.0/8".parse()?), None);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn floor(&self, prefix: &P) -> Option<(&P, Option<&T>)> {
        self.below(prefix, true)
    }

    /// Get the largest added entry whose key is strictly smaller than `prefix` in trie order.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("10.0.0.0/8".parse()?, 1);
    /// t.insert("10.1.0.0/16".parse()?, 2);
    /// assert_eq!(t.lower(&"10.1.0.0/16".parse()?), Some((&"10.0.0.0/8".parse()?, Some(&1))));
    /// assert_eq!(t.lower(&"10.0.0.0/8".parse()?), None);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn lower(&self, prefix: &P) -> Option<(&P, Option<&T>)> {
        self.below(prefix, false)
    }

    /// Get the smallest added entry whose key is larger than or equal to `prefix` in trie order.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("10.0.0.0/8".parse()?, 1);
    /// t.insert("10.1.0.0/16".parse()?, 2);
    /// assert_eq!(t.ceiling(&"10.0.255.0/24".parse()?), Some((&"10.1.0.0/16".parse()?, Some(&2))));
    /// assert_eq!(t.ceiling(&"11.0.0.0/8".parse()?), None);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn ceiling(&self, prefix: &P) -> Option<(&P, Option<&T>)> {
        self.above(prefix, true)
    }

    /// Get the smallest added entry whose key is strictly larger than `prefix` in trie order.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, _> = BinTrie::new();
    /// t.insert("10.0.0.0/8".parse()?, 1);
    /// t.insert("10.1.0.0/16".parse()?, 2);
    /// assert_eq!(t.higher(&"10.0.0.0/8".parse()?), Some((&"10.1.0.0/16".parse()?, Some(&2))));
    /// assert_eq!(t.higher(&"10.1.0.0/16".parse()?), None);
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn higher(&self, prefix: &P) -> Option<(&P, Option<&T>)> {
        self.above(prefix, false)
    }

    fn below(&self, prefix: &P, allow_equal: bool) -> Option<(&P, Option<&T>)> {
        let mut idx = 0;
        let mut best: Option<Below> = None;
        loop {
            let node = &self.table[idx];
            if node.prefix.eq(prefix) {
                if allow_equal && node.added {
                    return node.key_value();
                }
                // all descendants sort above the key
                break;
            }
            // the node properly contains `prefix` and therefore sorts below it
            if node.added {
                best = Some(Below::Node(idx));
            }
            let upper = to_upper(&node.prefix, prefix);
            if upper {
                // the whole lower subtree sorts below the key
                if let Some(l) = node.lower {
                    best = Some(Below::Max(l));
                }
            }
            match node.child(upper) {
                Some(c) => {
                    let child_p = &self.table[c].prefix;
                    if child_p.contains(prefix) {
                        idx = c;
                    } else if prefix.contains(child_p) {
                        // the child subtree lies entirely above the key
                        break;
                    } else {
                        if child_p.mask() < prefix.mask() {
                            best = Some(Below::Max(c));
                        }
                        break;
                    }
                }
                None => break,
            }
        }
        match best {
            None => None,
            Some(Below::Node(i)) => self.table[i].key_value(),
            Some(Below::Max(i)) => self.table[self.max_added(i)].key_value(),
        }
    }

    fn above(&self, prefix: &P, allow_equal: bool) -> Option<(&P, Option<&T>)> {
        let mut idx = 0;
        // the closest subtree lying entirely above the key
        let mut best: Option<usize> = None;
        loop {
            let node = &self.table[idx];
            if node.prefix.eq(prefix) {
                if allow_equal && node.added {
                    return node.key_value();
                }
                // every descendant sorts above the key
                if let Some(c) = node.lower.or(node.upper) {
                    return self.table[self.min_added(c)].key_value();
                }
                break;
            }
            let upper = to_upper(&node.prefix, prefix);
            if !upper {
                if let Some(u) = node.upper {
                    best = Some(u);
                }
            }
            match node.child(upper) {
                Some(c) => {
                    let child_p = &self.table[c].prefix;
                    if child_p.contains(prefix) {
                        idx = c;
                    } else if prefix.contains(child_p) {
                        best = Some(c);
                        break;
                    } else {
                        if child_p.mask() > prefix.mask() {
                            best = Some(c);
                        }
                        break;
                    }
                }
                None => break,
            }
        }
        best.and_then(|i| self.table[self.min_added(i)].key_value())
    }

    /// The maximal added key in the subtree at `idx`: follow the upper (else lower) child down to
    /// a leaf, which is always added.
    fn max_added(&self, mut idx: usize) -> usize {
        while let Some(c) = self.table[idx].upper.or(self.table[idx].lower) {
            idx = c;
        }
        idx
    }

    /// The minimal added key in the subtree at `idx`: the first added node when preferring the
    /// node itself, then its lower child.
    fn min_added(&self, mut idx: usize) -> usize {
        loop {
            let node = &self.table[idx];
            if node.added {
                return idx;
            }
            // a junction always has children, and a leaf is always added
            idx = node.lower.or(node.upper).unwrap();
        }
    }
}
