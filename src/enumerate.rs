// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Suffix enumeration: a lazy depth-first iterator plus a sorted,
//! materialized convenience collection.
//!
//! Descending children in ascending symbol order visits leaves in
//! lexicographic order of the suffixes they represent, so [`SuffixIter`]
//! produces its items pre-sorted; [`get_all_suffixes`] still sorts
//! explicitly rather than depending on that as an unstated invariant.

use crate::navigator::Navigator;
use crate::text::Symbol;

/// Explicit DFS stack frame: a node, its children in ascending symbol
/// order, and how many of them have already been descended into.
struct Frame<H> {
    node: H,
    symbols: Vec<i32>,
    next: usize,
}

/// Lazy depth-first walk over every suffix in the tree, in ascending
/// lexicographic order. The terminator-only suffix (position `n`) is
/// skipped — it is never a real suffix of the indexed text.
pub struct SuffixIter<'a, N: Navigator> {
    nav: &'a N,
    stack: Vec<Frame<N::Handle>>,
}

impl<'a, N: Navigator> SuffixIter<'a, N> {
    pub fn new(nav: &'a N) -> Self {
        let root = nav.root();
        let symbols = nav.children_symbols(root);
        Self {
            nav,
            stack: vec![Frame { node: root, symbols, next: 0 }],
        }
    }
}

impl<'a, N: Navigator> Iterator for SuffixIter<'a, N> {
    type Item = Vec<Symbol>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            if frame.next >= frame.symbols.len() {
                self.stack.pop();
                continue;
            }
            let sym = frame.symbols[frame.next];
            frame.next += 1;
            let node = frame.node;
            let child = self.nav.child(node, sym);
            let child_symbols = self.nav.children_symbols(child);
            if child_symbols.is_empty() {
                let pos = self.nav.leaf_position(child);
                if pos < self.nav.text_len() {
                    return Some(self.nav.text_range(pos, self.nav.text_len()));
                }
                // The single synthetic terminator leaf; not a real suffix.
                continue;
            }
            self.stack.push(Frame {
                node: child,
                symbols: child_symbols,
                next: 0,
            });
        }
    }
}

/// Materializes every suffix, sorted ascending.
pub fn get_all_suffixes<N: Navigator>(nav: &N) -> Vec<Vec<Symbol>> {
    let mut all: Vec<Vec<Symbol>> = SuffixIter::new(nav).collect();
    all.sort_unstable();
    all
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

    fn decode(symbols: &[Symbol]) -> String {
        String::from_utf16_lossy(symbols)
    }

    #[test]
    fn test_banana_suffix_count_and_order() {
        let tree = build_tree("banana");
        let suffixes: Vec<String> = get_all_suffixes(&tree).iter().map(|s| decode(s)).collect();
        assert_eq!(suffixes.len(), 6);
        let mut expected = vec!["a", "anana", "banana", "na", "nana", "ana"];
        expected.sort_unstable();
        assert_eq!(suffixes, expected);
    }

    #[test]
    fn test_iterator_is_already_sorted() {
        let tree = build_tree("mississippi");
        let lazy: Vec<Vec<Symbol>> = SuffixIter::new(&tree).collect();
        let mut sorted = lazy.clone();
        sorted.sort_unstable();
        assert_eq!(lazy, sorted);
        assert_eq!(lazy.len(), 11);
    }

    #[test]
    fn test_empty_text_yields_no_suffixes() {
        let tree = build_tree("");
        assert_eq!(get_all_suffixes(&tree).len(), 0);
    }
}
