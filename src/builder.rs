// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Ukkonen's on-line suffix-tree construction.
//!
//! One generic implementation, shared by both backends via the
//! [`TreeStore`] capability trait. The algorithm itself never touches a
//! concrete node representation — it only calls `TreeStore` methods, so the
//! heap and persistent backends compile to specialized code with no
//! virtual dispatch (the same "navigator over a capability trait" pattern
//! as [`crate::navigator::Navigator`], just with mutation added).
//!
//! ## Active point
//!
//! Construction tracks `(active_node, active_edge, active_length,
//! remaining)` exactly as described in the textbook algorithm (Ukkonen
//! 1995; see also Gusfield's exposition). `active_edge` is kept as a text
//! index rather than a bare symbol, because canonicalization needs to
//! recompute which symbol it denotes after walking down past a node
//! boundary — the symbol at a fixed index can change as `active_edge` is
//! advanced, but the arithmetic on the index itself is simple addition.

use crate::error::SuffixResult;
use crate::navigator::Navigator;

/// Mutation capability the Ukkonen builder needs from a backend.
///
/// Supertrait of [`Navigator`] — every read the builder needs (child
/// lookup, edge length, depth, suffix link) is already on `Navigator`; this
/// trait adds exactly the writes construction performs.
pub trait TreeStore: Navigator {
    /// Creates a new leaf as a child of `parent`, keyed by `sym`, with an
    /// open-ended edge starting at text index `start`.
    fn create_leaf(&mut self, parent: Self::Handle, sym: i32, start: u64) -> SuffixResult<Self::Handle>;

    /// Splits the edge from `parent` to its existing child keyed by `sym`
    /// at `split_len` symbols from the edge's start. The existing child is
    /// reparented under a new internal node, which takes the child's place
    /// under `parent` (still keyed by `sym`). Returns the new internal
    /// node.
    fn split_edge(&mut self, parent: Self::Handle, sym: i32, split_len: u64) -> SuffixResult<Self::Handle>;

    /// Sets `h`'s suffix link to `target`.
    fn set_suffix_link(&mut self, h: Self::Handle, target: Self::Handle) -> SuffixResult<()>;

    /// Advances the shared "current length" used to compute the length of
    /// every open (leaf) edge — called once per phase, before extending.
    fn set_current_len(&mut self, len: u64);

    /// Runs the post-construction bottom-up pass: assigns `leaf_count` to
    /// every node and records the deepest internal non-root node (for
    /// O(1) longest-repeated-substring).
    fn finalize(&mut self) -> SuffixResult<()>;
}

/// Builds a suffix tree for a text of `n` symbols (the terminator is
/// appended internally; callers never pass it explicitly).
pub fn build<S: TreeStore>(store: &mut S, n: u64) -> SuffixResult<()> {
    let root = store.root();
    let mut active_node = root;
    let mut active_edge: i64 = -1;
    let mut active_length: u64 = 0;
    let mut remaining: u64 = 0;

    for i in 0..=n {
        store.set_current_len(i + 1);
        remaining += 1;
        let mut last_new_node: Option<S::Handle> = None;

        while remaining > 0 {
            if active_length == 0 {
                active_edge = i as i64;
            }
            let edge_symbol = store.text_symbol(active_edge as u64);
            let next = store.child(active_node, edge_symbol);

            if store.is_null(next) {
                // Rule 2: no outgoing edge for this symbol — new leaf.
                let leaf = store.create_leaf(active_node, edge_symbol, i)?;
                let _ = leaf;
                if let Some(pending) = last_new_node.take() {
                    store.set_suffix_link(pending, active_node)?;
                }
            } else {
                let edge_len = store.edge_length(next);
                if active_length >= edge_len {
                    // Canonicalize: active point lands at or past `next`.
                    active_edge += edge_len as i64;
                    active_length -= edge_len;
                    active_node = next;
                    continue;
                }

                let next_symbol = store.edge_symbol_at(next, active_length);
                let current_symbol = store.text_symbol(i);
                if next_symbol == current_symbol {
                    // Rule 3: already present — observe and stop the phase.
                    if let Some(pending) = last_new_node.take() {
                        store.set_suffix_link(pending, active_node)?;
                    }
                    active_length += 1;
                    break;
                }

                // Rule 2: the edge diverges here — split it.
                let new_internal = store.split_edge(active_node, edge_symbol, active_length)?;
                store.create_leaf(new_internal, current_symbol, i)?;
                if let Some(pending) = last_new_node.take() {
                    store.set_suffix_link(pending, new_internal)?;
                }
                last_new_node = Some(new_internal);
            }

            remaining -= 1;

            if store.is_root(active_node) && active_length > 0 {
                active_length -= 1;
                active_edge = (i as i64) + 1 - (remaining as i64);
            } else if !store.is_root(active_node) {
                let link = store.suffix_link(active_node);
                active_node = if store.is_null(link) { root } else { link };
            }
        }
    }

    store.finalize()
}
