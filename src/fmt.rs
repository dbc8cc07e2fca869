//! Formatting: `Debug` for the trie and the human-readable tree renderings.

use std::fmt::{Debug, Formatter, Result};

use crate::added_tree::AddedTreeNode;
use crate::node::Node;
use crate::{BinTrie, BitPrefix, SubTrie};

impl<P: Debug, T: Debug> Debug for BinTrie<P, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        DebugNode(self, 0).fmt(f)
    }
}

impl<P: Debug, T: Debug> Debug for SubTrie<'_, P, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        DebugNode(self.trie, self.idx).fmt(f)
    }
}

struct DebugNode<'a, P, T>(&'a BinTrie<P, T>, usize);

impl<P: Debug, T: Debug> Debug for DebugNode<'_, P, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let trie = self.0;
        let node = &trie.table[self.1];
        match (node.value.as_ref(), node.lower, node.upper) {
            (None, None, None) => node.prefix.fmt(f),
            (None, None, Some(child)) | (None, Some(child), None) => f
                .debug_map()
                .entry(&node.prefix, &Self(trie, child))
                .finish(),
            (None, Some(lower), Some(upper)) => f
                .debug_map()
                .entry(&node.prefix, &(Self(trie, lower), Self(trie, upper)))
                .finish(),
            (Some(v), None, None) => f.debug_map().entry(&node.prefix, v).finish(),
            (Some(v), None, Some(child)) | (Some(v), Some(child), None) => f
                .debug_map()
                .entry(&node.prefix, &(v, Self(trie, child)))
                .finish(),
            (Some(v), Some(lower), Some(upper)) => f
                .debug_map()
                .entry(&node.prefix, &(v, Self(trie, lower), Self(trie, upper)))
                .finish(),
        }
    }
}

/// One line of the tree rendering: glyph, key, subtree size, and the value if present.
fn node_line<P: Debug, T: Debug>(node: &Node<P, T>) -> String {
    let glyph = if node.added { '●' } else { '○' };
    match node.value.as_ref() {
        Some(v) => format!("{} {:?} ({}) = {:?}", glyph, node.prefix, node.size, v),
        None => format!("{} {:?} ({})", glyph, node.prefix, node.size),
    }
}

fn render<P: Debug, T: Debug>(trie: &BinTrie<P, T>, idx: usize, indent: &str, out: &mut String) {
    let node = &trie.table[idx];
    let children: Vec<usize> = node.lower.into_iter().chain(node.upper).collect();
    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        let last = i + 1 == count;
        out.push_str(indent);
        out.push_str(if last { "└─ " } else { "├─ " });
        out.push_str(&node_line(&trie.table[child]));
        out.push('\n');
        let deeper = format!("{}{}", indent, if last { "   " } else { "│  " });
        render(trie, child, &deeper, out);
    }
}

fn render_added<P: Debug, T: Debug>(node: AddedTreeNode<'_, '_, P, T>, indent: &str, out: &mut String) {
    let children: Vec<_> = node.children().collect();
    let count = children.len();
    for (i, child) in children.into_iter().enumerate() {
        let last = i + 1 == count;
        out.push_str(indent);
        out.push_str(if last { "└─ " } else { "├─ " });
        out.push(if child.is_added() { '●' } else { '○' });
        out.push(' ');
        out.push_str(&format!("{:?}", child.prefix()));
        if let Some(v) = child.value() {
            out.push_str(&format!(" = {v:?}"));
        }
        out.push('\n');
        let deeper = format!("{}{}", indent, if last { "   " } else { "│  " });
        render_added(child, &deeper, out);
    }
}

impl<P, T> BinTrie<P, T>
where
    P: BitPrefix + Debug,
    T: Debug,
{
    /// Render the trie as an indented tree, one node per line. Added keys carry a `●`, junctions
    /// and the root a `○`; the number in parentheses is the added count of the subtree, and `=`
    /// shows the stored value. With `with_non_added` set to `false`, junctions are collapsed away
    /// and only the added keys are shown (see [`BinTrie::added_tree_string`]).
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, u32> = BinTrie::new();
    /// t.insert("10.1.0.0/16".parse()?, 1);
    /// t.insert("10.2.0.0/16".parse()?, 2);
    /// assert_eq!(
    ///     t.tree_string(true),
    ///     "\
    /// ○ 0.0.0.0/0 (2)
    /// └─ ○ 10.0.0.0/14 (2)
    ///    ├─ ● 10.1.0.0/16 (1) = 1
    ///    └─ ● 10.2.0.0/16 (1) = 2"
    /// );
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn tree_string(&self, with_non_added: bool) -> String {
        if !with_non_added {
            return self.added_tree_string();
        }
        let mut out = node_line(&self.table[0]);
        out.push('\n');
        render(self, 0, "", &mut out);
        out.pop();
        out
    }

    /// Render only the added keys as an indented tree, skipping all junctions. The first line is
    /// always the root anchor.
    ///
    /// ```
    /// # use bintrie::*;
    /// # #[cfg(feature = "ipnet")]
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut t: BinTrie<ipnet::Ipv4Net, u32> = BinTrie::new();
    /// t.insert("10.1.0.0/16".parse()?, 1);
    /// t.insert("10.2.0.0/16".parse()?, 2);
    /// assert_eq!(
    ///     t.added_tree_string(),
    ///     "\
    /// ○ 0.0.0.0/0
    /// ├─ ● 10.1.0.0/16 = 1
    /// └─ ● 10.2.0.0/16 = 2"
    /// );
    /// # Ok(())
    /// # }
    /// # #[cfg(not(feature = "ipnet"))]
    /// # fn main() {}
    /// ```
    pub fn added_tree_string(&self) -> String {
        let view = self.added_tree();
        let root = view.root();
        let mut out = String::new();
        out.push(if root.is_added() { '●' } else { '○' });
        out.push(' ');
        out.push_str(&format!("{:?}", root.prefix()));
        if let Some(v) = root.value() {
            out.push_str(&format!(" = {v:?}"));
        }
        out.push('\n');
        render_added(root, "", &mut out);
        out.pop();
        out
    }
}

impl<P, T> SubTrie<'_, P, T>
where
    P: Debug,
    T: Debug,
{
    /// Render this subtree as an indented tree, in the format of [`BinTrie::tree_string`].
    pub fn tree_string(&self) -> String {
        let mut out = node_line(&self.trie.table[self.idx]);
        out.push('\n');
        render(self.trie, self.idx, "", &mut out);
        out.pop();
        out
    }
}
