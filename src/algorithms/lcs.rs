// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Longest common substring between the indexed text and an external
//! `query`, found by streaming `query` through the tree with Gusfield's
//! suffix-link "matching statistics" technique: O(n + m) amortized, no
//! second tree built over `query`.
//!
//! The active position is tracked the same way the builder tracks its
//! active point — `(cur_node, cur_child, offset)` — except here it only
//! ever moves forward or follows a suffix link; nothing is ever written.

use crate::navigator::Navigator;
use crate::text::Symbol;

/// Result of a streaming match: how long it is, where it ends in `query`,
/// and a tree handle whose subtree contains at least one occurrence.
#[derive(Debug, Clone, Copy)]
pub struct LcsMatch<H> {
    pub length: u64,
    /// Exclusive end index into `query` of the matched substring.
    pub query_end: usize,
    /// Node such that some leaf beneath it, read `total_depth(handle) -
    /// length` symbols before its own suffix-start position, spells the
    /// match.
    pub handle: H,
    /// `total_depth(handle)` at the moment this match was recorded (a node
    /// reached by a later, unrelated call could have a different depth).
    pub handle_depth: u64,
}

impl<H: Copy> LcsMatch<H> {
    pub fn query_start(&self) -> usize {
        self.query_end - self.length as usize
    }

    /// Any one position in the indexed text where this match occurs.
    pub fn text_position<N: Navigator<Handle = H>>(&self, nav: &N) -> u64 {
        let leaf_pos = nav.any_leaf_position(self.handle);
        leaf_pos + self.handle_depth - self.length
    }

    /// Every position in the indexed text where this match occurs.
    pub fn all_text_positions<N: Navigator<Handle = H>>(&self, nav: &N) -> Vec<u64> {
        nav.leaf_positions(self.handle)
            .into_iter()
            .map(|p| p + self.handle_depth - self.length)
            .collect()
    }
}

/// Internal streaming cursor shared by [`longest_common_substring`] and
/// [`super::anchors::find_exact_match_anchors`].
pub(crate) struct Cursor<N: Navigator> {
    cur_node: N::Handle,
    cur_child: Option<N::Handle>,
    offset: u64,
    pub(crate) match_length: u64,
}

impl<N: Navigator> Cursor<N> {
    pub(crate) fn new(nav: &N) -> Self {
        Self {
            cur_node: nav.root(),
            cur_child: None,
            offset: 0,
            match_length: 0,
        }
    }

    pub(crate) fn handle(&self) -> N::Handle {
        self.cur_child.unwrap_or(self.cur_node)
    }

    pub(crate) fn handle_depth(&self, nav: &N) -> u64 {
        nav.total_depth(self.handle())
    }

    /// Repositions the cursor so its total matched length becomes
    /// `total_len`, starting the walk at `start` (a suffix-link target or
    /// root) and descending only the part of `total_len` not already
    /// accounted for by `start`'s own depth — the Gusfield "skip/count"
    /// trick. `start` always already spells a prefix of the needed string
    /// (it is reached via a suffix link from a node on the previous match
    /// path, or is root), so only `total_len - total_depth(start)` symbols
    /// of `query` remain to walk, ending at `query[end_pos - remaining ..
    /// end_pos)`.
    fn descend_and_set(&mut self, nav: &N, start: N::Handle, total_len: u64, query: &[Symbol], end_pos: usize) {
        let start_depth = nav.total_depth(start);
        let mut remaining = total_len - start_depth;
        let mut node = start;
        let mut pos = end_pos - remaining as usize;
        loop {
            if remaining == 0 {
                self.cur_node = node;
                self.cur_child = None;
                self.offset = 0;
                break;
            }
            let child = nav.child(node, query[pos] as i32);
            if nav.is_null(child) {
                // Should never happen once the active point stays on a real
                // path; fail safe to "no match" rather than index a null
                // handle.
                debug_assert!(false, "skip/count descent fell off the tree");
                self.cur_node = node;
                self.cur_child = None;
                self.offset = 0;
                self.match_length = nav.total_depth(node);
                return;
            }
            let edge_len = nav.edge_length(child);
            if remaining < edge_len {
                self.cur_node = node;
                self.cur_child = Some(child);
                self.offset = remaining;
                break;
            }
            remaining -= edge_len;
            pos += edge_len as usize;
            node = child;
        }
        self.match_length = total_len;
    }

    /// Attempts to match `query[i]` at the current position; on failure,
    /// follows suffix links (with skip/count rescanning) until either a
    /// shorter position matches `query[i]` or root offers nothing, in which
    /// case `query[i]` is skipped and the match resets to zero.
    pub(crate) fn advance(&mut self, nav: &N, query: &[Symbol], i: usize) {
        let q = query[i] as i32;
        loop {
            if let Some(child) = self.cur_child {
                if nav.edge_symbol_at(child, self.offset) as i32 == q {
                    self.offset += 1;
                    self.match_length += 1;
                    if self.offset == nav.edge_length(child) {
                        self.cur_node = child;
                        self.cur_child = None;
                        self.offset = 0;
                    }
                    return;
                }
            } else {
                let child = nav.child(self.cur_node, q);
                if !nav.is_null(child) {
                    self.match_length += 1;
                    if nav.edge_length(child) == 1 {
                        self.cur_node = child;
                    } else {
                        self.cur_child = Some(child);
                        self.offset = 1;
                    }
                    return;
                }
            }

            // Mismatch.
            if nav.is_root(self.cur_node) && self.cur_child.is_none() {
                // Nothing shorter to try; this symbol contributes nothing.
                self.match_length = 0;
                return;
            }
            let new_len = self.match_length - 1;
            if nav.is_root(self.cur_node) {
                // Root has no suffix link; the window just slides by one.
                self.descend_and_set(nav, nav.root(), new_len, query, i);
            } else {
                let target = nav.suffix_link(self.cur_node);
                let target = if nav.is_null(target) { nav.root() } else { target };
                self.descend_and_set(nav, target, new_len, query, i);
            }
            // Retry the same symbol from the repositioned cursor.
        }
    }
}

/// Streams `query` through the tree, returning the single longest match (the
/// first one found, if several tie for longest).
pub fn longest_common_substring<N: Navigator>(nav: &N, query: &[Symbol]) -> LcsMatch<N::Handle> {
    let mut cursor = Cursor::new(nav);
    let mut best = LcsMatch {
        length: 0,
        query_end: 0,
        handle: nav.root(),
        handle_depth: 0,
    };

    for i in 0..query.len() {
        cursor.advance(nav, query, i);
        if cursor.match_length > best.length {
            best = LcsMatch {
                length: cursor.match_length,
                query_end: i + 1,
                handle: cursor.handle(),
                handle_depth: cursor.handle_depth(nav),
            };
        }
    }
    best
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
    fn test_atgcatgcatgc_lcs_length_five() {
        let tree = build_tree("ATGCATGCATGC");
        let query = symbols("XXATGCAXATGCY");
        let best = longest_common_substring(&tree, &query);
        assert_eq!(best.length, 5);
        let slice = &query[best.query_start()..best.query_end];
        assert_eq!(String::from_utf16_lossy(slice), "ATGCA");
    }

    #[test]
    fn test_no_overlap_gives_zero_length() {
        let tree = build_tree("abcdef");
        let query = symbols("xyz");
        let best = longest_common_substring(&tree, &query);
        assert_eq!(best.length, 0);
    }

    #[test]
    fn test_full_match_equals_query_length() {
        let tree = build_tree("mississippi");
        let query = symbols("ississ");
        let best = longest_common_substring(&tree, &query);
        assert_eq!(best.length, query.len() as u64);
    }

    #[test]
    fn test_suffix_link_redescent_past_internal_node_does_not_panic() {
        let tree = build_tree("abxaby");
        let query = symbols("abz");
        let best = longest_common_substring(&tree, &query);
        assert_eq!(best.length, 2);
        let slice = &query[best.query_start()..best.query_end];
        assert_eq!(String::from_utf16_lossy(slice), "ab");
    }

    #[test]
    fn test_symmetry_up_to_length() {
        let text = "ATGCATGCATGC";
        let other = "XXATGCAXATGCY";
        let t1 = build_tree(text);
        let t2 = build_tree(other);
        let l1 = longest_common_substring(&t1, &symbols(other)).length;
        let l2 = longest_common_substring(&t2, &symbols(text)).length;
        assert_eq!(l1, l2);
    }
}
