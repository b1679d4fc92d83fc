// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! The unified `Tree` facade: a sum type over the two backends, bundling
//! every operation `spec`'s external interface lists. Algorithms below this
//! layer are monomorphized per backend with no virtual dispatch; `Tree`
//! itself is the one place a runtime backend choice is unavoidable, so it
//! is a plain `enum` matched explicitly in each method rather than a
//! trait object.

use crate::algorithms::{anchors, chain, lcs, lrs};
use crate::builder::build;
use crate::config::BuilderConfig;
use crate::enumerate::{self, SuffixIter};
use crate::error::SuffixResult;
use crate::heap::HeapTree;
use crate::metrics;
use crate::navigator::Navigator;
use crate::persistent::{PersistentReader, PersistentWriter};
use crate::search;
use crate::serializer;
use crate::text::{InMemoryText, Symbol};
use crate::traverse::{self, Visitor};
use serde::Serialize;
use std::path::Path;

/// A built suffix tree, backed either by a heap arena or a memory-mapped
/// file.
///
/// Every query method re-checks disposal on the persistent backend before
/// touching the mapping, so a `close()`d tree fails with
/// [`crate::error::SuffixError::Disposed`] rather than reading stale memory
/// — the heap backend has no such state and always succeeds at this check.
pub enum Tree {
    Heap(HeapTree<InMemoryText>),
    Persistent(PersistentReader),
}

/// Bundled read-only snapshot of a tree's shape, for callers (and the
/// metrics layer) that want one diagnostic value instead of four separate
/// accessor calls.
#[derive(Debug, Clone, Serialize)]
pub struct TreeStats {
    pub node_count: u64,
    pub leaf_count: u64,
    pub max_depth: u64,
    pub text_length: u64,
    pub backend: &'static str,
}

fn encode(s: &str) -> Vec<Symbol> {
    s.encode_utf16().collect()
}

fn decode(symbols: &[Symbol]) -> String {
    String::from_utf16_lossy(symbols)
}

fn max_depth_over<N: Navigator>(nav: &N) -> u64 {
    fn walk<N: Navigator>(nav: &N, h: N::Handle) -> u64 {
        nav.children_symbols(h)
            .into_iter()
            .map(|s| walk(nav, nav.child(h, s)))
            .fold(nav.total_depth(h), u64::max)
    }
    walk(nav, nav.root())
}

fn naive_positions(haystack: &[Symbol], needle: &[Symbol]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    (0..=haystack.len() - needle.len()).filter(|&i| &haystack[i..i + needle.len()] == needle).collect()
}

impl Tree {
    fn guard(&self) -> SuffixResult<()> {
        match self {
            Tree::Heap(_) => Ok(()),
            Tree::Persistent(r) => r.guard(),
        }
    }

    pub fn text_length(&self) -> SuffixResult<u64> {
        self.guard()?;
        Ok(match self {
            Tree::Heap(t) => t.text_len(),
            Tree::Persistent(r) => r.text_len(),
        })
    }

    pub fn node_count(&self) -> SuffixResult<u64> {
        self.guard()?;
        Ok(match self {
            Tree::Heap(t) => t.node_count(),
            Tree::Persistent(r) => r.node_count(),
        })
    }

    /// The user-visible leaf count (the terminator's own leaf is excluded;
    /// see invariant #3).
    pub fn leaf_count(&self) -> SuffixResult<u64> {
        self.guard()?;
        let raw = match self {
            Tree::Heap(t) => t.leaf_count(t.root()),
            Tree::Persistent(r) => r.leaf_count(r.root()),
        };
        Ok(raw.saturating_sub(1))
    }

    pub fn max_depth(&self) -> SuffixResult<u64> {
        self.guard()?;
        Ok(match self {
            Tree::Heap(t) => max_depth_over(t),
            Tree::Persistent(r) => max_depth_over(r),
        })
    }

    pub fn is_empty(&self) -> SuffixResult<bool> {
        Ok(self.text_length()? == 0)
    }

    pub fn contains(&self, pattern: &str) -> SuffixResult<bool> {
        self.guard()?;
        let p = encode(pattern);
        Ok(match self {
            Tree::Heap(t) => search::contains(t, &p),
            Tree::Persistent(r) => search::contains(r, &p),
        })
    }

    pub fn find_all_occurrences(&self, pattern: &str) -> SuffixResult<Vec<u64>> {
        self.guard()?;
        let p = encode(pattern);
        Ok(match self {
            Tree::Heap(t) => search::find_all_occurrences(t, &p),
            Tree::Persistent(r) => search::find_all_occurrences(r, &p),
        })
    }

    pub fn count_occurrences(&self, pattern: &str) -> SuffixResult<u64> {
        self.guard()?;
        let p = encode(pattern);
        Ok(match self {
            Tree::Heap(t) => search::count_occurrences(t, &p),
            Tree::Persistent(r) => search::count_occurrences(r, &p),
        })
    }

    pub fn longest_repeated_substring(&self) -> SuffixResult<String> {
        self.guard()?;
        let symbols = match self {
            Tree::Heap(t) => lrs::longest_repeated_substring(t, t.deepest_internal_node()),
            Tree::Persistent(r) => lrs::longest_repeated_substring(r, r.deepest_internal_offset()),
        };
        Ok(decode(&symbols))
    }

    pub fn longest_common_substring(&self, other: &str) -> SuffixResult<String> {
        self.guard()?;
        let q = encode(other);
        let matched = match self {
            Tree::Heap(t) => {
                let best = lcs::longest_common_substring(t, &q);
                q[best.query_start()..best.query_end].to_vec()
            }
            Tree::Persistent(r) => {
                let best = lcs::longest_common_substring(r, &q);
                q[best.query_start()..best.query_end].to_vec()
            }
        };
        Ok(decode(&matched))
    }

    /// The longest common substring plus one position in this tree's text
    /// and one position in `other` where it occurs.
    pub fn longest_common_substring_info(&self, other: &str) -> SuffixResult<(String, u64, usize)> {
        self.guard()?;
        let q = encode(other);
        let (symbols, pos_in_text, pos_in_other) = match self {
            Tree::Heap(t) => {
                let best = lcs::longest_common_substring(t, &q);
                (
                    q[best.query_start()..best.query_end].to_vec(),
                    best.text_position(t),
                    best.query_start(),
                )
            }
            Tree::Persistent(r) => {
                let best = lcs::longest_common_substring(r, &q);
                (
                    q[best.query_start()..best.query_end].to_vec(),
                    best.text_position(r),
                    best.query_start(),
                )
            }
        };
        Ok((decode(&symbols), pos_in_text, pos_in_other))
    }

    /// The longest common substring plus every position it occurs at in
    /// this tree's text and every position it occurs at in `other`.
    pub fn find_all_longest_common_substrings(&self, other: &str) -> SuffixResult<(String, Vec<u64>, Vec<usize>)> {
        self.guard()?;
        let q = encode(other);
        let (symbols, positions_in_text) = match self {
            Tree::Heap(t) => {
                let best = lcs::longest_common_substring(t, &q);
                (q[best.query_start()..best.query_end].to_vec(), best.all_text_positions(t))
            }
            Tree::Persistent(r) => {
                let best = lcs::longest_common_substring(r, &q);
                (q[best.query_start()..best.query_end].to_vec(), best.all_text_positions(r))
            }
        };
        let positions_in_other = naive_positions(&q, &symbols);
        Ok((decode(&symbols), positions_in_text, positions_in_other))
    }

    /// Every right-maximal exact match of at least `min_length` symbols
    /// between this tree's text and `other`, as `(tree_pos, other_pos,
    /// length)` triples.
    pub fn find_exact_match_anchors(&self, other: &str, min_length: u64) -> SuffixResult<Vec<(u64, usize, u64)>> {
        self.guard()?;
        let q = encode(other);
        let raw = match self {
            Tree::Heap(t) => anchors::find_exact_match_anchors(t, &q, min_length)?,
            Tree::Persistent(r) => anchors::find_exact_match_anchors(r, &q, min_length)?,
        };
        Ok(raw.into_iter().map(|a| (a.tree_start, a.query_start, a.length)).collect())
    }

    pub fn enumerate_suffixes(&self) -> SuffixResult<Box<dyn Iterator<Item = String> + '_>> {
        self.guard()?;
        Ok(match self {
            Tree::Heap(t) => Box::new(SuffixIter::new(t).map(|s| decode(&s))) as Box<dyn Iterator<Item = String>>,
            Tree::Persistent(r) => Box::new(SuffixIter::new(r).map(|s| decode(&s))),
        })
    }

    pub fn get_all_suffixes(&self) -> SuffixResult<Vec<String>> {
        self.guard()?;
        Ok(match self {
            Tree::Heap(t) => enumerate::get_all_suffixes(t).into_iter().map(|s| decode(&s)).collect(),
            Tree::Persistent(r) => enumerate::get_all_suffixes(r).into_iter().map(|s| decode(&s)).collect(),
        })
    }

    pub fn traverse(&self, visitor: &mut dyn Visitor) -> SuffixResult<()> {
        self.guard()?;
        match self {
            Tree::Heap(t) => traverse::traverse(t, visitor),
            Tree::Persistent(r) => traverse::traverse(r, visitor),
        }
        Ok(())
    }

    pub fn logical_hash(&self) -> SuffixResult<[u8; 32]> {
        self.guard()?;
        Ok(match self {
            Tree::Heap(t) => traverse::logical_hash(t),
            Tree::Persistent(r) => traverse::logical_hash(r),
        })
    }

    /// Exports this tree's structure via the `STLOGICA` logical format (see
    /// [`crate::serializer`]).
    pub fn export(&self) -> SuffixResult<Vec<u8>> {
        self.guard()?;
        Ok(match self {
            Tree::Heap(t) => serializer::export(t),
            Tree::Persistent(r) => serializer::export(r),
        })
    }

    /// Marks a persistent tree disposed; a no-op on the heap backend.
    pub fn close(&self) {
        if let Tree::Persistent(r) = self {
            r.close();
        }
    }

    pub fn stats(&self) -> SuffixResult<TreeStats> {
        Ok(TreeStats {
            node_count: self.node_count()?,
            leaf_count: self.leaf_count()?,
            max_depth: self.max_depth()?,
            text_length: self.text_length()?,
            backend: match self {
                Tree::Heap(_) => "heap",
                Tree::Persistent(_) => "persistent",
            },
        })
    }
}

/// Builds an in-memory tree, panicking only if the heap arena's `u32`
/// index space is exhausted (billions of nodes) — use
/// [`try_build_in_memory`] to handle that case explicitly.
pub fn build_in_memory(text: &str) -> Tree {
    try_build_in_memory(text).expect("suffix tree construction failed")
}

pub fn try_build_in_memory(text: &str) -> SuffixResult<Tree> {
    metrics::timed("build_in_memory", || {
        let source = InMemoryText::from_str(text);
        let n = source.len();
        let mut tree = HeapTree::new(source);
        build(&mut tree, n)?;
        Ok(Tree::Heap(tree))
    })
}

/// Builds a tree into a file at `path` and immediately reopens it
/// read-only, matching the persistent backend's build-then-reopen
/// lifecycle.
pub fn build_persistent(text: &str, path: impl AsRef<Path>) -> SuffixResult<Tree> {
    metrics::timed("build_persistent", || {
        let source = InMemoryText::from_str(text);
        let n = source.len();
        let config = BuilderConfig::default();
        let mut writer = PersistentWriter::new(path, source, &config)?;
        build(&mut writer, n)?;
        let written_path = writer.finish()?;
        Ok(Tree::Persistent(PersistentReader::open(written_path)?))
    })
}

pub fn load_persistent(path: impl AsRef<Path>) -> SuffixResult<Tree> {
    metrics::timed("load_persistent", || Ok(Tree::Persistent(PersistentReader::open(path)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_banana_in_memory_scenario() {
        let tree = build_in_memory("banana");
        assert_eq!(tree.longest_repeated_substring().unwrap(), "ana");
        let mut occ = tree.find_all_occurrences("ana").unwrap();
        occ.sort_unstable();
        assert_eq!(occ, vec![1, 3]);
        assert_eq!(tree.count_occurrences("na").unwrap(), 2);
        assert_eq!(tree.leaf_count().unwrap(), 6);
    }

    #[test]
    fn test_persistent_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dat");
        let tree = build_persistent("abcabxabcd", &path).unwrap();
        let mut occ = tree.find_all_occurrences("abc").unwrap();
        occ.sort_unstable();
        assert_eq!(occ, vec![0, 6]);
        tree.close();
        assert!(tree.contains("abc").is_err());

        let reloaded = load_persistent(&path).unwrap();
        assert_eq!(reloaded.longest_repeated_substring().unwrap(), "abc");
    }

    #[test]
    fn test_lcs_dna_scenario() {
        let tree = build_in_memory("ATGCATGCATGC");
        let substring = tree.longest_common_substring("XXATGCAXATGCY").unwrap();
        assert_eq!(substring.len(), 5);
    }

    #[test]
    fn test_stats_reports_backend() {
        let tree = build_in_memory("mississippi");
        let stats = tree.stats().unwrap();
        assert_eq!(stats.backend, "heap");
        assert_eq!(stats.text_length, 11);
        assert_eq!(stats.leaf_count, 11);
    }

    #[test]
    fn test_surrogate_pair_round_trips() {
        let tree = build_in_memory("a\u{1F600}b");
        assert!(tree.contains("\u{1F600}").unwrap());
        assert_eq!(tree.find_all_occurrences("\u{1F600}").unwrap().len(), 1);
    }
}
