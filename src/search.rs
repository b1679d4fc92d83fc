// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Pattern search over a built tree: `contains`, `find_all_occurrences`,
//! `count_occurrences`. Written once, generic over [`Navigator`], so both
//! backends share the exact same walk.
//!
//! Empty-pattern convention (spec's own open question, fixed here):
//! `contains("")` is `true`, `find_all_occurrences("")` returns every index
//! `0..n`, `count_occurrences("")` returns `n`.

use crate::navigator::Navigator;
use crate::text::Symbol;
use std::cell::RefCell;

thread_local! {
    /// Scratch buffer for leaf-position collection, reused across calls on
    /// the same thread. Cleared, not freed, between uses.
    static LEAF_SCRATCH: RefCell<Vec<u64>> = RefCell::new(Vec::with_capacity(256));
}

/// Walks `pattern` from the root, returning the handle reached and how many
/// pattern symbols were consumed. If the full pattern was consumed, the
/// second element equals `pattern.len()`.
fn walk<N: Navigator>(nav: &N, pattern: &[Symbol]) -> (N::Handle, usize) {
    let mut node = nav.root();
    let mut consumed = 0usize;

    while consumed < pattern.len() {
        let sym = pattern[consumed] as i32;
        let child = nav.child(node, sym);
        if nav.is_null(child) {
            return (node, consumed);
        }
        let edge_len = nav.edge_length(child);
        let mut offset = 0u64;
        while offset < edge_len && consumed < pattern.len() {
            if nav.edge_symbol_at(child, offset) as i32 != pattern[consumed] as i32 {
                return (child, consumed);
            }
            offset += 1;
            consumed += 1;
        }
        node = child;
    }
    (node, consumed)
}

/// `true` iff `pattern` occurs at least once in the indexed text.
pub fn contains<N: Navigator>(nav: &N, pattern: &[Symbol]) -> bool {
    if pattern.is_empty() {
        return true;
    }
    let (_, consumed) = walk(nav, pattern);
    consumed == pattern.len()
}

/// Every starting position of `pattern` in the text, in traversal order
/// (not sorted). Empty pattern returns every index `0..n`.
pub fn find_all_occurrences<N: Navigator>(nav: &N, pattern: &[Symbol]) -> Vec<u64> {
    let n = nav.text_len();
    if pattern.is_empty() {
        return (0..n).collect();
    }
    let (handle, consumed) = walk(nav, pattern);
    if consumed != pattern.len() {
        return Vec::new();
    }
    LEAF_SCRATCH.with(|scratch| {
        let mut buf = scratch.borrow_mut();
        buf.clear();
        nav.collect_leaf_positions(handle, &mut buf);
        buf.iter().copied().filter(|&p| p < n).collect()
    })
}

/// Number of occurrences of `pattern`, in O(m) once the subtree root is
/// located (reads the cached `leaf_count`, no leaf enumeration). Empty
/// pattern returns `n`.
pub fn count_occurrences<N: Navigator>(nav: &N, pattern: &[Symbol]) -> u64 {
    let n = nav.text_len();
    if pattern.is_empty() {
        return n;
    }
    let (handle, consumed) = walk(nav, pattern);
    if consumed != pattern.len() {
        return 0;
    }
    nav.leaf_count(handle)
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

    fn symbols(s: &str) -> Vec<Symbol> {
        s.encode_utf16().collect()
    }

    #[test]
    fn test_banana_ana_occurrences() {
        let tree = build_tree("banana");
        let mut occ = find_all_occurrences(&tree, &symbols("ana"));
        occ.sort_unstable();
        assert_eq!(occ, vec![1, 3]);
        assert_eq!(count_occurrences(&tree, &symbols("na")), 2);
    }

    #[test]
    fn test_contains_and_count_agree_with_occurrence_len() {
        let tree = build_tree("abcabxabcd");
        for pat in ["abc", "ab", "x", "zzz", ""] {
            let occ = find_all_occurrences(&tree, &symbols(pat));
            assert_eq!(occ.len() as u64, count_occurrences(&tree, &symbols(pat)));
            assert_eq!(contains(&tree, &symbols(pat)), !occ.is_empty() || pat.is_empty());
        }
    }

    #[test]
    fn test_empty_pattern_matches_everywhere() {
        let tree = build_tree("banana");
        assert!(contains(&tree, &[]));
        let mut occ = find_all_occurrences(&tree, &[]);
        occ.sort_unstable();
        assert_eq!(occ, (0..6).collect::<Vec<u64>>());
        assert_eq!(count_occurrences(&tree, &[]), 6);
    }

    #[test]
    fn test_every_substring_is_contained() {
        let s = "GCGCGAATTCATGGATCCATAT";
        let tree = build_tree(s);
        let syms: Vec<Symbol> = symbols(s);
        for i in 0..=syms.len() {
            for j in i..=syms.len() {
                assert!(contains(&tree, &syms[i..j]), "missing substring [{i},{j})");
            }
        }
    }

    #[test]
    fn test_find_exact_occurrences_dna() {
        let tree = build_tree("GCGCGAATTCATGGATCCATAT");
        assert_eq!(find_all_occurrences(&tree, &symbols("GAATTC")), vec![4]);
        assert_eq!(find_all_occurrences(&tree, &symbols("GGATCC")), vec![12]);
    }
}
