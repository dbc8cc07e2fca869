//! Module for testing using fuzzing (quickcheck)
#![allow(clippy::type_complexity)]

use std::fmt::Debug;

use crate::*;
use quickcheck::Arbitrary;

mod basic;
mod traversals;

#[derive(Debug, PartialEq, Clone, Copy)]
enum Operation<P, T> {
    Put(P, T),
    Add(P),
    Remove(P),
}

#[cfg(miri)]
const DEFAULT_NUM_TESTS: usize = 10;
#[cfg(not(miri))]
const DEFAULT_NUM_TESTS: usize = 10000;
const DEFAULT_GEN_SIZE: usize = 100;

fn proptest_runner<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F) {
    let num_tests: usize = std::env::var("QUICKCHECK_TESTS")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_NUM_TESTS);

    let gen_size: usize = std::env::var("QUICKCHECK_GENERATOR_SIZE")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_GEN_SIZE);

    let mut gen = quickcheck::Gen::new(gen_size);

    // sample all inputs
    for _ in 0..num_tests {
        let input = A::arbitrary(&mut gen);
        let input_c = input.clone();
        let success = f(input_c);
        if !success {
            shrink_failure(f, input)
        }
    }
}

fn shrink_failure<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F, input: A) -> ! {
    for i in input.shrink() {
        let i_c = i.clone();
        let success = f(i_c);
        if !success {
            shrink_failure(f, i)
        }
    }
    // if we reach this point, then all shrunken inputs work. Therefore, `input` is the minimal
    // input
    panic!(
        "[QUICKCHECK] Test case failed!\n  Minimal input:\n    {:?}",
        input
    );
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! qc {
    ($name:ident, $f:ident) => {
        #[test]
        fn $name() {
            proptest_runner($f)
        }
    };
}

/// Replay a list of operations on both the trie and a reference model.
fn apply<T: Clone>(
    ops: Vec<Operation<TestPrefix, T>>,
) -> (
    BinTrie<TestPrefix, T>,
    std::collections::HashMap<TestPrefix, Option<T>>,
) {
    let mut trie = BinTrie::new();
    let mut model = std::collections::HashMap::new();
    for op in ops {
        match op {
            Operation::Put(p, t) => {
                trie.insert(p, t.clone());
                model.insert(p, Some(t));
            }
            Operation::Add(p) => {
                trie.add(p);
                model.entry(p).or_insert(None);
            }
            Operation::Remove(p) => {
                trie.remove(&p);
                model.remove(&p);
            }
        }
    }
    (trie, model)
}

fn sorted_entries<T: Clone>(
    model: &std::collections::HashMap<TestPrefix, Option<T>>,
) -> Vec<(TestPrefix, Option<T>)> {
    let mut entries: Vec<_> = model.iter().map(|(p, t)| (*p, t.clone())).collect();
    entries.sort_by_key(|(p, _)| *p);
    entries
}

/// Walk the arena and check every structural invariant: parent pointers, branch directions, the
/// junction rule, the incremental sizes, and the bookkeeping counters.
fn check_integrity<T>(trie: &BinTrie<TestPrefix, T>) -> bool {
    let mut reachable = 0;
    let ok = check_node(trie, 0, &mut reachable);
    ok && trie.node_count() == reachable && trie.len() == trie.table[0].size
}

fn check_node<T>(trie: &BinTrie<TestPrefix, T>, idx: usize, reachable: &mut usize) -> bool {
    *reachable += 1;
    let node = &trie.table[idx];
    // every non-added node except the root is a junction with exactly two children; in
    // particular, every leaf is added
    if idx != 0 && !node.added && node.num_children() != 2 {
        return false;
    }
    let mut size = usize::from(node.added);
    for (child, upper) in [(node.lower, false), (node.upper, true)] {
        let Some(child) = child else { continue };
        let child_node = &trie.table[child];
        if child_node.parent != Some(idx) {
            return false;
        }
        // the child key is a proper sub-block on the correct side
        if !node.prefix.contains(&child_node.prefix)
            || node.prefix.prefix_len() >= child_node.prefix.prefix_len()
            || to_upper(&node.prefix, &child_node.prefix) != upper
        {
            return false;
        }
        if !check_node(trie, child, reachable) {
            return false;
        }
        size += child_node.size;
    }
    node.size == size
}

impl<P: BitPrefix + Arbitrary, T: Arbitrary> Arbitrary for BinTrie<P, T> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        <Vec<(P, Option<T>)> as Arbitrary>::arbitrary(g)
            .into_iter()
            .collect()
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let elems = self.clone().into_iter().collect::<Vec<_>>();
        let shrinked = elems.shrink();
        Box::new(shrinked.map(BinTrie::from_iter))
    }
}

impl<P: Arbitrary, T: Arbitrary> Arbitrary for Operation<P, T> {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        match g.choose(&[0, 0, 0, 0, 0, 1, 1, 2, 2, 2]).copied().unwrap_or(0) {
            0 => Self::Put(P::arbitrary(g), T::arbitrary(g)),
            1 => Self::Add(P::arbitrary(g)),
            _ => Self::Remove(P::arbitrary(g)),
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self {
            Operation::Put(p, t) => {
                let t = t.clone();
                Box::new(p.clone().shrink().map(move |p| Operation::Put(p, t.clone())))
            }
            Operation::Add(p) => Box::new(p.clone().shrink().map(Operation::Add)),
            Operation::Remove(p) => Box::new(p.clone().shrink().map(Operation::Remove)),
        }
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
struct TestPrefix(u32, u8);

impl Debug for TestPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let addr = format!("{:032b}", self.0)[..10].to_string();
        write!(f, "0b{addr}/{}", self.1)
    }
}

impl Arbitrary for TestPrefix {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        #[rustfmt::skip]
        let len: u8 = *g
            .choose(&[
                0,
                1, 1,
                2, 2, 2,
                3, 3, 3, 3,
                4, 4, 4, 4, 4,
                5, 5, 5, 5, 5, 5,
                6, 6, 6, 6, 6, 6, 6,
                7, 7, 7, 7, 7, 7, 7, 7,
                8, 8, 8, 8, 8, 8, 8, 8, 8,
                9, 9, 9, 9, 9, 9, 9, 9, 9, 9,
            ])
            .unwrap();
        let x = u32::arbitrary(g);
        Self::from_repr_len(x, len)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        if self.1 == 0 {
            quickcheck::empty_shrinker()
        } else {
            let len = self.1 - 1;
            let x = Self::from_repr_len(self.0, len);
            quickcheck::single_shrinker(x)
        }
    }
}

impl BitPrefix for TestPrefix {
    type R = u32;

    fn repr(&self) -> Self::R {
        self.0
    }

    fn prefix_len(&self) -> u8 {
        self.1
    }

    fn from_repr_len(repr: Self::R, len: u8) -> Self {
        let x = BitPrefix::mask(&(repr, len));
        Self(x, len)
    }
}
