use std::collections::HashMap;

use super::*;
use itertools::Itertools;

qc!(new, _new);
fn _new(list: Vec<(TestPrefix, i32)>) -> bool {
    let mut trie = BinTrie::new();
    let mut model = HashMap::new();

    for (p, t) in list {
        trie.insert(p, t);
        model.insert(p, Some(t));
    }

    check_integrity(&trie)
        && trie
            .into_iter()
            .eq(model.into_iter().sorted_by_key(|(p, _)| *p))
}

qc!(new_mods, _new_mods);
fn _new_mods(list: Vec<Operation<TestPrefix, i32>>) -> bool {
    let (trie, model) = apply(list);

    check_integrity(&trie)
        && trie.len() == model.len()
        && trie.into_iter().eq(sorted_entries(&model))
}

qc!(new_mods_entry, _new_mods_entry);
fn _new_mods_entry(list: Vec<Operation<TestPrefix, i32>>) -> bool {
    let mut trie = BinTrie::new();
    let mut model = HashMap::new();

    for op in list {
        match op {
            Operation::Put(p, t) => {
                let _ = trie.entry(p).insert(t);
                model.insert(p, Some(t));
            }
            Operation::Add(p) => {
                trie.entry(p).add();
                model.entry(p).or_insert(None);
            }
            Operation::Remove(p) => {
                if let trie::Entry::Occupied(e) = trie.entry(p) {
                    e.remove();
                }
                model.remove(&p);
            }
        }
    }

    check_integrity(&trie) && trie.into_iter().eq(sorted_entries(&model))
}

qc!(equality, _equality);
fn _equality(list: Vec<Operation<TestPrefix, i32>>) -> bool {
    let (trie, _) = apply(list);

    let clone = trie.clone().into_iter().collect::<BinTrie<_, _>>();

    trie == clone
        && trie.eq_keys(&clone)
        && trie.len() == clone.len()
        && trie.is_empty() == clone.is_empty()
        && trie.tree_string(true) == clone.tree_string(true)
}

qc!(get_exact, _get_exact);
fn _get_exact(list: Vec<Operation<TestPrefix, i32>>) -> bool {
    let (trie, model) = apply(list);

    sorted_entries(&model).into_iter().all(|(p, t)| {
        trie.contains(&p)
            && trie.get(&p) == t.as_ref()
            && trie.get_key_value(&p) == Some((&p, t.as_ref()))
    })
}

qc!(get_lpm, _get_lpm);
fn _get_lpm((list, q): (Vec<Operation<TestPrefix, i32>>, TestPrefix)) -> bool {
    let (trie, model) = apply(list);

    let covering = sorted_entries(&model)
        .into_iter()
        .filter(|(p, _)| p.contains(&q))
        .collect::<Vec<_>>();
    let lpm = covering.iter().max_by_key(|(p, _)| p.prefix_len());
    let spm = covering.iter().min_by_key(|(p, _)| p.prefix_len());

    trie.get_lpm(&q) == lpm.map(|(p, t)| (p, t.as_ref()))
        && trie.get_spm(&q) == spm.map(|(p, t)| (p, t.as_ref()))
        && trie.covers(&q) == !covering.is_empty()
}

qc!(remove_subtree, _remove_subtree);
fn _remove_subtree((mut trie, root): (BinTrie<TestPrefix, i32>, TestPrefix)) -> bool {
    let want: Vec<(TestPrefix, Option<i32>)> = trie
        .iter()
        .filter(|(p, _)| !root.contains(p))
        .map(|(p, t)| (*p, t.copied()))
        .collect();
    trie.remove_subtree(&root);
    check_integrity(&trie) && trie.into_iter().eq(want)
}

qc!(retain, _retain);
fn _retain(trie: BinTrie<TestPrefix, i32>) -> bool {
    let mut trie = trie;
    let want: Vec<(TestPrefix, Option<i32>)> = trie
        .iter()
        .filter(|(_, t)| t.map(|x| x % 2 == 0).unwrap_or(false))
        .map(|(p, t)| (*p, t.copied()))
        .collect();
    trie.retain(|_, t| t.map(|x| x % 2 == 0).unwrap_or(false));
    check_integrity(&trie) && trie.into_iter().eq(want)
}

qc!(remap, _remap);
fn _remap(list: Vec<Operation<TestPrefix, i32>>) -> bool {
    let mut trie = BinTrie::new();
    let mut model = HashMap::new();

    for op in list {
        match op {
            Operation::Put(p, t) => {
                trie.remap(p, |_| Remap::Put(t));
                model.insert(p, Some(t));
            }
            Operation::Add(p) => {
                trie.remap(p, |v| match v {
                    Some(v) => Remap::Put(*v),
                    None => Remap::Keep,
                });
                // keep on an absent key is a no-op
            }
            Operation::Remove(p) => {
                trie.remap(p, |_| Remap::Remove);
                model.remove(&p);
            }
        }
    }

    check_integrity(&trie) && trie.into_iter().eq(sorted_entries(&model))
}

qc!(merge, _merge);
fn _merge((a, b): (BinTrie<TestPrefix, i32>, BinTrie<TestPrefix, i32>)) -> bool {
    let mut model: HashMap<TestPrefix, Option<i32>> =
        a.iter().map(|(p, t)| (*p, t.copied())).collect();
    for (p, t) in b.iter() {
        match model.entry(*p) {
            std::collections::hash_map::Entry::Occupied(mut e) => {
                if t.is_some() {
                    e.insert(t.copied());
                }
            }
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(t.copied());
            }
        }
    }

    let mut merged = a.clone();
    merged.put_trie(&b);

    check_integrity(&merged) && merged.into_iter().eq(sorted_entries(&model))
}
