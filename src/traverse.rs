// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Deterministic structural traversal and the SHA-256 structural hash built
//! on top of it.
//!
//! Both are written once against [`Navigator`], so two trees built by
//! different backends (or rebuilt from scratch, or reopened from disk) hash
//! identically iff they are structurally identical — the acceptance
//! criterion for the [`crate::serializer`] round trip and for
//! construction-determinism tests.

use crate::navigator::Navigator;
use sha2::{Digest, Sha256};

/// Fixed stand-in for a leaf's open-ended edge, so the hash does not depend
/// on which backend-specific sentinel (`u32::MAX` heap-side, `i64::MAX`
/// large-record persistent-side) happened to represent it.
pub const OPEN_END_MARKER: u64 = u64::MAX;

/// Fixed sentinel written once per branch exit, distinguishable from any
/// real symbol (`0..=65535`) or the terminator (`-1`).
const BRANCH_EXIT_SENTINEL: i32 = -999;

/// Receives deterministic DFS callbacks from [`traverse`].
///
/// `depth` is the visited node's `depth_from_root` (the node model's own
/// field, not its total depth including its own edge).
pub trait Visitor {
    fn visit_node(&mut self, start: u64, end: u64, leaf_count: u64, child_count: usize, depth: u64);
    fn enter_branch(&mut self, symbol: i32);
    fn exit_branch(&mut self);
}

/// Deterministic recursive DFS in ascending symbol order.
pub fn traverse<N: Navigator, V: Visitor>(nav: &N, visitor: &mut V) {
    traverse_node(nav, nav.root(), visitor);
}

fn traverse_node<N: Navigator, V: Visitor>(nav: &N, h: N::Handle, visitor: &mut V) {
    let symbols = nav.children_symbols(h);
    let start = nav.edge_start(h);
    let end = if symbols.is_empty() {
        OPEN_END_MARKER
    } else {
        start + nav.edge_length(h)
    };
    visitor.visit_node(start, end, nav.leaf_count(h), symbols.len(), nav.depth_from_root(h));
    for sym in symbols {
        visitor.enter_branch(sym);
        traverse_node(nav, nav.child(h, sym), visitor);
        visitor.exit_branch();
    }
}

struct HashVisitor {
    hasher: Sha256,
}

impl Visitor for HashVisitor {
    fn visit_node(&mut self, start: u64, end: u64, leaf_count: u64, child_count: usize, _depth: u64) {
        self.hasher.update((start as u32).to_le_bytes());
        let end_field: u32 = if end == OPEN_END_MARKER { u32::MAX } else { end as u32 };
        self.hasher.update(end_field.to_le_bytes());
        self.hasher.update((leaf_count as u32).to_le_bytes());
        self.hasher.update((child_count as u32).to_le_bytes());
    }

    fn enter_branch(&mut self, symbol: i32) {
        self.hasher.update(symbol.to_le_bytes());
    }

    fn exit_branch(&mut self) {
        self.hasher.update(BRANCH_EXIT_SENTINEL.to_le_bytes());
    }
}

/// SHA-256 over the text followed by a deterministic traversal encoding.
/// Two trees over the same text are structurally identical iff their
/// hashes match.
pub fn logical_hash<N: Navigator>(nav: &N) -> [u8; 32] {
    let mut visitor = HashVisitor { hasher: Sha256::new() };
    for sym in nav.text_range(0, nav.text_len()) {
        visitor.hasher.update(sym.to_le_bytes());
    }
    traverse(nav, &mut visitor);
    visitor.hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::heap::HeapTree;
    use crate::text::InMemoryText;

    fn build_tree(s: &str) -> HeapTree<InMemoryText> {
        let text = InMemoryText::from_str(s);
        let n = text.len();
        let mut tree = HeapTree::new(text);
        build(&mut tree, n).unwrap();
        tree
    }

    #[test]
    fn test_same_text_same_hash() {
        let a = build_tree("abcabxabcd");
        let b = build_tree("abcabxabcd");
        assert_eq!(logical_hash(&a), logical_hash(&b));
    }

    #[test]
    fn test_different_text_different_hash() {
        let a = build_tree("banana");
        let b = build_tree("ananab");
        assert_ne!(logical_hash(&a), logical_hash(&b));
    }

    #[test]
    fn test_visitor_sees_matching_enter_exit_counts() {
        struct Counter {
            enters: usize,
            exits: usize,
        }
        impl Visitor for Counter {
            fn visit_node(&mut self, _: u64, _: u64, _: u64, _: usize, _: u64) {}
            fn enter_branch(&mut self, _: i32) {
                self.enters += 1;
            }
            fn exit_branch(&mut self) {
                self.exits += 1;
            }
        }
        let tree = build_tree("mississippi");
        let mut counter = Counter { enters: 0, exits: 0 };
        traverse(&tree, &mut counter);
        assert_eq!(counter.enters, counter.exits);
        assert!(counter.enters > 0);
    }
}
