use super::*;

fn entries(trie: &BinTrie<TestPrefix, i32>) -> Vec<(TestPrefix, Option<i32>)> {
    trie.iter().map(|(p, t)| (*p, t.copied())).collect()
}

qc!(covered_by, _covered_by);
fn _covered_by((trie, q): (BinTrie<TestPrefix, i32>, TestPrefix)) -> bool {
    let want: Vec<_> = entries(&trie)
        .into_iter()
        .filter(|(p, _)| q.contains(p))
        .collect();
    trie.covered_by(&q).map(|(p, t)| (*p, t.copied())).eq(want)
}

qc!(covered_by_subtrie, _covered_by_subtrie);
fn _covered_by_subtrie((trie, q): (BinTrie<TestPrefix, i32>, TestPrefix)) -> bool {
    let want: Vec<_> = entries(&trie)
        .into_iter()
        .filter(|(p, _)| q.contains(p))
        .collect();
    match trie.find(&q) {
        // an existing node scopes exactly the contained keys
        Some(sub) if sub.prefix() == &q => {
            sub.len() == want.len() && sub.iter().map(|(p, t)| (*p, t.copied())).eq(want)
        }
        _ => true,
    }
}

qc!(cover, _cover);
fn _cover((trie, q): (BinTrie<TestPrefix, i32>, TestPrefix)) -> bool {
    let mut want: Vec<_> = entries(&trie)
        .into_iter()
        .filter(|(p, _)| p.contains(&q))
        .collect();
    // largest block first
    want.sort_by_key(|(p, _)| p.prefix_len());
    trie.cover(&q).map(|(p, t)| (*p, t.copied())).eq(want)
        && trie.covers(&q) == trie.cover(&q).next().is_some()
}

qc!(descending_is_reverse, _descending_is_reverse);
fn _descending_is_reverse(trie: BinTrie<TestPrefix, i32>) -> bool {
    let mut fwd: Vec<_> = trie.iter().map(|(p, _)| *p).collect();
    fwd.reverse();
    trie.descending().map(|(p, _)| *p).eq(fwd)
}

qc!(nodes_sorted, _nodes_sorted);
fn _nodes_sorted(trie: BinTrie<TestPrefix, i32>) -> bool {
    let keys: Vec<_> = trie.nodes().map(|n| *n.prefix()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    let added: Vec<_> = trie
        .nodes()
        .filter(|n| n.is_added())
        .map(|n| *n.prefix())
        .collect();
    keys == sorted
        && keys.len() == trie.node_count()
        && added == trie.keys().copied().collect::<Vec<_>>()
}

qc!(nodes_desc_is_reverse, _nodes_desc_is_reverse);
fn _nodes_desc_is_reverse(trie: BinTrie<TestPrefix, i32>) -> bool {
    let mut fwd: Vec<_> = trie.nodes().map(|n| *n.prefix()).collect();
    fwd.reverse();
    trie.nodes_desc().map(|n| *n.prefix()).eq(fwd)
}

qc!(contained_first_is_post_order, _contained_first_is_post_order);
fn _contained_first_is_post_order(trie: BinTrie<TestPrefix, i32>) -> bool {
    let post: Vec<_> = trie.contained_first().map(|n| *n.prefix()).collect();
    if post.len() != trie.node_count() {
        return false;
    }
    // no key may appear after a key that contains it
    post.iter().enumerate().all(|(i, p)| {
        post[..i]
            .iter()
            .all(|earlier| !earlier.contains(p) || earlier == p)
    })
}

qc!(blocks_by_size, _blocks_by_size);
fn _blocks_by_size(trie: BinTrie<TestPrefix, i32>) -> bool {
    let order: Vec<_> = trie.blocks().map(|n| *n.prefix()).collect();
    order.len() == trie.node_count()
        && order.windows(2).all(|w| {
            w[0].prefix_len() < w[1].prefix_len()
                || (w[0].prefix_len() == w[1].prefix_len() && w[0].mask() < w[1].mask())
        })
}

qc!(blocks_upper_first_by_size, _blocks_upper_first_by_size);
fn _blocks_upper_first_by_size(trie: BinTrie<TestPrefix, i32>) -> bool {
    let order: Vec<_> = trie.blocks_upper_first().map(|n| *n.prefix()).collect();
    order.windows(2).all(|w| {
        w[0].prefix_len() < w[1].prefix_len()
            || (w[0].prefix_len() == w[1].prefix_len() && w[0].mask() > w[1].mask())
    })
}

qc!(near_brute_force, _near_brute_force);
fn _near_brute_force((trie, q): (BinTrie<TestPrefix, i32>, TestPrefix)) -> bool {
    let keys: Vec<_> = entries(&trie);

    let floor = keys.iter().filter(|(p, _)| *p <= q).next_back();
    let lower = keys.iter().filter(|(p, _)| *p < q).next_back();
    let ceiling = keys.iter().find(|(p, _)| *p >= q);
    let higher = keys.iter().find(|(p, _)| *p > q);

    trie.floor(&q) == floor.map(|(p, t)| (p, t.as_ref()))
        && trie.lower(&q) == lower.map(|(p, t)| (p, t.as_ref()))
        && trie.ceiling(&q) == ceiling.map(|(p, t)| (p, t.as_ref()))
        && trie.higher(&q) == higher.map(|(p, t)| (p, t.as_ref()))
}

qc!(cursor_retain_all, _cursor_retain_all);
fn _cursor_retain_all(trie: BinTrie<TestPrefix, i32>) -> bool {
    let mut trie = trie;
    let mut cursor = trie.contained_first_mut();
    while cursor.advance() {
        if cursor.is_added() {
            cursor.remove_current();
        }
    }
    check_integrity(&trie) && trie.is_empty() && trie.node_count() == 1
}

qc!(added_tree_ancestors, _added_tree_ancestors);
fn _added_tree_ancestors(trie: BinTrie<TestPrefix, i32>) -> bool {
    let keys: Vec<_> = trie.keys().copied().collect();
    let view = trie.added_tree();

    fn walk(
        node: AddedTreeNode<'_, '_, TestPrefix, i32>,
        keys: &[TestPrefix],
        seen: &mut usize,
    ) -> bool {
        node.children().all(|child| {
            *seen += 1;
            let p = child.prefix();
            // the parent is the closest added (or root) ancestor of every child
            let closest = keys
                .iter()
                .filter(|k| k.contains(p) && *k != p)
                .max_by_key(|k| k.prefix_len());
            let parent_ok = match closest {
                Some(k) => node.is_added() && k == node.prefix(),
                None => !node.is_added() || node.prefix().prefix_len() == 0,
            };
            parent_ok && child.is_added() && walk(child, keys, seen)
        })
    }

    // the all-wildcard key is the anchor itself and never appears as a child
    let expected = keys.iter().filter(|k| k.prefix_len() != 0).count();
    let mut seen = 0;
    walk(view.root(), &keys, &mut seen) && seen == expected
}
