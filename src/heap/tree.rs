// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! In-memory suffix tree backend.
//!
//! Nodes live in a flat arena (`Vec<HeapNode>`); handles are arena indices.
//! No allocation happens on the hot path beyond occasional children-map
//! promotion and the arena's own amortized growth.

use super::node::{HeapNode, NULL, OPEN_END};
use crate::builder::TreeStore;
use crate::error::{SuffixError, SuffixResult};
use crate::navigator::Navigator;
use crate::text::{Symbol, TextSource};

/// An in-memory suffix tree over a [`TextSource`] `T`.
///
/// Built once via [`crate::builder::build`] and then read through
/// [`Navigator`]; construction and reading share the same arena so there is
/// no copy between "building" and "built" states.
pub struct HeapTree<T: TextSource> {
    text: T,
    nodes: Vec<HeapNode>,
    /// Current text length as seen by construction, for `OPEN_END` edges.
    /// Equals the final text length once `finalize` has run.
    current_len: u64,
    deepest_internal: u32,
}

impl<T: TextSource> HeapTree<T> {
    /// Allocates a tree with only the root node present, ready for
    /// [`crate::builder::build`] to populate.
    pub fn new(text: T) -> Self {
        Self {
            text,
            nodes: vec![HeapNode::new_root()],
            current_len: 0,
            deepest_internal: 0,
        }
    }

    pub fn text(&self) -> &T {
        &self.text
    }

    /// Total number of nodes, including the root.
    pub fn node_count(&self) -> u64 {
        self.nodes.len() as u64
    }

    fn effective_end(&self, h: u32) -> u64 {
        let node = &self.nodes[h as usize];
        if node.end == OPEN_END {
            self.current_len
        } else {
            node.end as u64
        }
    }
}

impl<T: TextSource> Navigator for HeapTree<T> {
    type Handle = u32;

    fn root(&self) -> u32 {
        0
    }

    fn null(&self) -> u32 {
        NULL
    }

    fn is_null(&self, h: u32) -> bool {
        h == NULL
    }

    fn is_root(&self, h: u32) -> bool {
        h == 0
    }

    fn child(&self, h: u32, sym: i32) -> u32 {
        self.nodes[h as usize].children.get(sym).unwrap_or(NULL)
    }

    fn children_symbols(&self, h: u32) -> Vec<i32> {
        self.nodes[h as usize].children.symbols()
    }

    fn edge_symbol_at(&self, h: u32, offset: u64) -> i32 {
        let start = self.nodes[h as usize].start as u64;
        self.text.symbol_at(start + offset)
    }

    fn edge_start(&self, h: u32) -> u64 {
        self.nodes[h as usize].start as u64
    }

    fn edge_length(&self, h: u32) -> u64 {
        if h == 0 {
            return 0;
        }
        self.effective_end(h) - self.nodes[h as usize].start as u64
    }

    fn depth_from_root(&self, h: u32) -> u64 {
        self.nodes[h as usize].depth_from_root as u64
    }

    fn suffix_link(&self, h: u32) -> u32 {
        self.nodes[h as usize].suffix_link
    }

    fn leaf_count(&self, h: u32) -> u64 {
        self.nodes[h as usize].leaf_count as u64
    }

    fn text_len(&self) -> u64 {
        self.text.len()
    }

    fn text_symbol(&self, i: u64) -> i32 {
        self.text.symbol_at(i)
    }

    fn text_range(&self, a: u64, b: u64) -> Vec<Symbol> {
        self.text.slice(a, b)
    }
}

impl<T: TextSource> TreeStore for HeapTree<T> {
    fn create_leaf(&mut self, parent: u32, sym: i32, start: u64) -> SuffixResult<u32> {
        let depth = self.depth_from_root(parent) + self.edge_length(parent);
        if self.nodes.len() >= NULL as usize {
            return Err(SuffixError::OutOfCapacity {
                reason: "heap arena exhausted its u32 index space".to_string(),
            });
        }
        let node = HeapNode::new_leaf(start as u32, depth as u32);
        let id = self.nodes.len() as u32;
        self.nodes.push(node);
        self.nodes[parent as usize].children.insert(sym, id);
        Ok(id)
    }

    fn split_edge(&mut self, parent: u32, sym: i32, split_len: u64) -> SuffixResult<u32> {
        let child = self.child(parent, sym);
        debug_assert!(!self.is_null(child));

        let internal_depth_from_root = self.depth_from_root(parent) + self.edge_length(parent);
        let child_start = self.nodes[child as usize].start as u64;
        let new_internal_end = child_start + split_len;

        if self.nodes.len() >= NULL as usize {
            return Err(SuffixError::OutOfCapacity {
                reason: "heap arena exhausted its u32 index space".to_string(),
            });
        }

        let mut internal = HeapNode::new_internal(
            child_start as u32,
            new_internal_end as u32,
            internal_depth_from_root as u32,
        );
        internal.children.insert(self.edge_symbol_at(child, split_len), child);
        let internal_id = self.nodes.len() as u32;
        self.nodes.push(internal);

        self.nodes[parent as usize].children.insert(sym, internal_id);

        let child_node = &mut self.nodes[child as usize];
        child_node.start = new_internal_end as u32;
        child_node.depth_from_root = (internal_depth_from_root + split_len) as u32;

        Ok(internal_id)
    }

    fn set_suffix_link(&mut self, h: u32, target: u32) -> SuffixResult<()> {
        self.nodes[h as usize].suffix_link = target;
        Ok(())
    }

    fn set_current_len(&mut self, len: u64) {
        self.current_len = len;
    }

    fn finalize(&mut self) -> SuffixResult<()> {
        // Stack-based post-order: push each node twice; first pop recurses
        // into children, second pop aggregates leaf_count from them.
        let mut stack: Vec<(u32, bool)> = vec![(0, false)];
        let mut deepest_internal = 0u32;
        let mut deepest_total_depth = 0u64;

        while let Some((id, visited)) = stack.pop() {
            if visited {
                let kids = self.nodes[id as usize].children.pairs();
                let sum: u32 = kids.iter().map(|(_, c)| self.nodes[*c as usize].leaf_count).sum();
                let node = &mut self.nodes[id as usize];
                node.leaf_count = if kids.is_empty() { 1 } else { sum };

                if id != 0 && !kids.is_empty() {
                    let total_depth = self.depth_from_root(id) + self.edge_length(id);
                    if total_depth > deepest_total_depth {
                        deepest_total_depth = total_depth;
                        deepest_internal = id;
                    }
                }
                continue;
            }
            stack.push((id, true));
            for (_, child) in self.nodes[id as usize].children.pairs() {
                stack.push((child, false));
            }
        }

        self.deepest_internal = deepest_internal;
        Ok(())
    }
}

impl<T: TextSource> HeapTree<T> {
    /// The deepest internal node found by the finalize pass (`0`/root if the
    /// tree is trivial), used for O(1) longest-repeated-substring lookup.
    pub(crate) fn deepest_internal_node(&self) -> u32 {
        self.deepest_internal
    }

    /// Allocates an empty root-only tree over `text` without running the
    /// Ukkonen builder, for [`crate::serializer::import`] to populate
    /// directly from a decoded record stream.
    pub(crate) fn raw_new(text: T) -> Self {
        let n = text.len();
        Self {
            text,
            nodes: vec![HeapNode::new_root()],
            // Matches the builder's quiescent state (`builder.rs`'s last
            // `set_current_len` call passes `n + 1`), so open leaf edges
            // resolve to the same effective end as a tree built normally.
            current_len: n + 1,
            deepest_internal: 0,
        }
    }

    /// Allocates a node with explicit fields (as opposed to the builder's
    /// `create_leaf`/`split_edge`, which derive them from the active
    /// point). `end: None` means an open leaf edge.
    pub(crate) fn raw_alloc_node(&mut self, start: u32, end: Option<u32>, depth_from_root: u32, leaf_count: u32) -> u32 {
        let mut node = HeapNode::new_internal(start, end.unwrap_or(OPEN_END), depth_from_root);
        node.leaf_count = leaf_count;
        self.nodes.push(node);
        (self.nodes.len() - 1) as u32
    }

    pub(crate) fn raw_set_child(&mut self, parent: u32, sym: i32, child: u32) {
        self.nodes[parent as usize].children.insert(sym, child);
    }

    pub(crate) fn raw_set_root_leaf_count(&mut self, leaf_count: u32) {
        self.nodes[0].leaf_count = leaf_count;
    }

    /// Recomputes the deepest-internal-node cache after a direct import,
    /// where nodes arrive with their final fields already set rather than
    /// through the builder's bottom-up pass.
    pub(crate) fn raw_finalize_deepest(&mut self) {
        let mut deepest = 0u32;
        let mut deepest_depth = 0u64;
        for id in 1..self.nodes.len() as u32 {
            if self.nodes[id as usize].children.is_empty() {
                continue;
            }
            let total_depth = self.depth_from_root(id) + self.edge_length(id);
            if total_depth > deepest_depth {
                deepest_depth = total_depth;
                deepest = id;
            }
        }
        self.deepest_internal = deepest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::text::InMemoryText;

    fn build_tree(s: &str) -> HeapTree<InMemoryText> {
        let text = InMemoryText::from_str(s);
        let n = text.len();
        let mut tree = HeapTree::new(text);
        build(&mut tree, n).unwrap();
        tree
    }

    #[test]
    fn test_banana_leaf_count_equals_suffix_count() {
        let tree = build_tree("banana");
        // n + 1 suffixes, including the empty suffix at the terminator.
        assert_eq!(tree.leaf_count(tree.root()), 7);
    }

    #[test]
    fn test_banana_has_child_for_each_leading_symbol() {
        let tree = build_tree("banana");
        for ch in ['b', 'a', 'n'] {
            let next = tree.child(tree.root(), ch as i32);
            assert!(!tree.is_null(next), "expected a root edge for {ch}");
        }
    }

    #[test]
    fn test_single_character_text() {
        let tree = build_tree("a");
        assert_eq!(tree.leaf_count(tree.root()), 2);
    }

    #[test]
    fn test_empty_text() {
        let tree = build_tree("");
        assert_eq!(tree.leaf_count(tree.root()), 1);
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn test_all_distinct_symbols_star_shaped() {
        let tree = build_tree("abcd");
        // Every suffix is distinct and starts with a different symbol, so
        // the root should have exactly 5 children (one per suffix start).
        assert_eq!(tree.children_symbols(tree.root()).len(), 5);
    }
}
