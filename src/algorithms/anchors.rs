// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Exact-match anchors: maximal runs of agreement between the indexed text
//! and a query, found with the same streaming cursor [`super::lcs`] uses.
//!
//! A match is reported the instant it is about to shrink (a "peak" in the
//! running match length) rather than only at the very end, so a single pass
//! over `query` yields every right-maximal match at once instead of one
//! longest match.

use super::lcs::Cursor;
use crate::error::{SuffixError, SuffixResult};
use crate::navigator::Navigator;
use crate::text::Symbol;

/// One maximal exact match between the indexed text and a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub tree_start: u64,
    pub query_start: usize,
    pub length: u64,
}

/// Finds every exact match of at least `min_length` symbols, reported at the
/// query position where it is right-maximal (the next query symbol, if any,
/// does not extend it). Anchors never overlap in query coordinates.
///
/// ## Error Conditions
/// - `InvalidInput`: `min_length` is zero.
pub fn find_exact_match_anchors<N: Navigator>(nav: &N, query: &[Symbol], min_length: u64) -> SuffixResult<Vec<Anchor>> {
    if min_length < 1 {
        return Err(SuffixError::InvalidInput {
            reason: "min_length must be at least 1".to_string(),
        });
    }

    let mut cursor = Cursor::new(nav);
    let mut anchors = Vec::new();
    let mut prev_length = 0u64;
    let mut prev_handle = nav.root();
    let mut prev_handle_depth = 0u64;
    let mut prev_end = 0usize;

    let mut emit = |length: u64, handle: N::Handle, handle_depth: u64, end: usize, out: &mut Vec<Anchor>| {
        if length >= min_length {
            let leaf_pos = nav.any_leaf_position(handle);
            let tree_start = leaf_pos + handle_depth - length;
            out.push(Anchor {
                tree_start,
                query_start: end - length as usize,
                length,
            });
        }
    };

    for i in 0..query.len() {
        cursor.advance(nav, query, i);
        let new_length = cursor.match_length;
        if new_length < prev_length {
            emit(prev_length, prev_handle, prev_handle_depth, prev_end, &mut anchors);
        }
        prev_length = new_length;
        prev_handle = cursor.handle();
        prev_handle_depth = cursor.handle_depth(nav);
        prev_end = i + 1;
    }
    emit(prev_length, prev_handle, prev_handle_depth, prev_end, &mut anchors);

    // Defensive non-overlap filter: the streaming cursor already produces
    // anchors in non-decreasing query order, but guard against any residual
    // overlap explicitly rather than relying on that invariant holding for
    // every possible tree shape.
    anchors.sort_unstable_by_key(|a| a.query_start);
    let mut filtered: Vec<Anchor> = Vec::with_capacity(anchors.len());
    let mut last_end = 0usize;
    for a in anchors {
        if filtered.is_empty() || a.query_start >= last_end {
            last_end = a.query_start + a.length as usize;
            filtered.push(a);
        } else if a.length as usize + a.query_start > last_end {
            last_end = a.query_start + a.length as usize;
            filtered.pop();
            filtered.push(a);
        }
    }
    Ok(filtered)
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
    fn test_rejects_zero_min_length() {
        let tree = build_tree("abc");
        let err = find_exact_match_anchors(&tree, &symbols("abc"), 0).unwrap_err();
        assert!(matches!(err, SuffixError::InvalidInput { .. }));
    }

    #[test]
    fn test_finds_two_separated_anchors() {
        let tree = build_tree("ATGCATGCATGC");
        let anchors = find_exact_match_anchors(&tree, &symbols("XXATGCAXATGCY"), 3).unwrap();
        assert!(anchors.iter().any(|a| a.length >= 5 && a.query_start == 2));
        assert!(anchors.iter().any(|a| a.length >= 4 && a.query_start == 8));
    }

    #[test]
    fn test_no_overlap_in_query_coordinates() {
        let tree = build_tree("abcabcabcabc");
        let anchors = find_exact_match_anchors(&tree, &symbols("xabcabcabcy"), 2).unwrap();
        for w in anchors.windows(2) {
            assert!(w[0].query_start + (w[0].length as usize) <= w[1].query_start);
        }
    }

    #[test]
    fn test_min_length_filters_short_matches() {
        let tree = build_tree("abcdefgh");
        let anchors = find_exact_match_anchors(&tree, &symbols("xyzabz"), 5).unwrap();
        assert!(anchors.is_empty());
    }
}
