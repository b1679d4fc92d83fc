// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end scenarios against the public `Tree` facade: the concrete
//! texts and expected results, plus the universal invariants that must
//! hold for any built tree regardless of backend.

use suffixdex::{build_in_memory, build_persistent, load_persistent};
use tempfile::tempdir;

fn sorted(mut v: Vec<u64>) -> Vec<u64> {
    v.sort_unstable();
    v
}

#[test]
fn s1_banana() {
    let tree = build_in_memory("banana");
    assert_eq!(tree.longest_repeated_substring().unwrap(), "ana");
    assert_eq!(sorted(tree.find_all_occurrences("ana").unwrap()), vec![1, 3]);
    assert_eq!(tree.count_occurrences("na").unwrap(), 2);
    assert_eq!(tree.leaf_count().unwrap(), 6);
}

#[test]
fn s2_abcabxabcd() {
    let tree = build_in_memory("abcabxabcd");
    assert_eq!(tree.longest_repeated_substring().unwrap(), "abc");
    assert_eq!(sorted(tree.find_all_occurrences("abc").unwrap()), vec![0, 6]);
}

#[test]
fn s3_dna_restriction_sites() {
    let tree = build_in_memory("GCGCGAATTCATGGATCCATAT");
    assert_eq!(tree.find_all_occurrences("GAATTC").unwrap(), vec![4]);
    assert_eq!(tree.find_all_occurrences("GGATCC").unwrap(), vec![12]);
}

#[test]
fn s4_homopolymer_run() {
    let tree = build_in_memory("AAAAAA");
    assert_eq!(tree.longest_repeated_substring().unwrap(), "AAAAA");
    assert_eq!(tree.count_occurrences("AA").unwrap(), 5);
}

#[test]
fn s5_lcs_length() {
    let tree = build_in_memory("ATGCATGCATGC");
    let lcs = tree.longest_common_substring("XXATGCAXATGCY").unwrap();
    assert_eq!(lcs.chars().count(), 5);
}

#[test]
fn s6_surrogate_pair_emoji() {
    let tree = build_in_memory("a\u{1F600}b");
    assert!(tree.contains("\u{1F600}").unwrap());
    assert_eq!(tree.find_all_occurrences("\u{1F600}").unwrap().len(), 1);
    let first = tree.logical_hash().unwrap();
    let rebuilt = build_in_memory("a\u{1F600}b");
    assert_eq!(first, rebuilt.logical_hash().unwrap());
}

#[test]
fn property_suffix_existence() {
    let text = "mississippi";
    let tree = build_in_memory(text);
    let chars: Vec<char> = text.chars().collect();
    for i in 0..chars.len() {
        let suffix: String = chars[i..].iter().collect();
        assert!(tree.contains(&suffix).unwrap(), "missing suffix {suffix:?}");
    }
}

#[test]
fn property_count_parity() {
    let tree = build_in_memory("abcabxabcd");
    for p in ["a", "b", "ab", "abc", "z", ""] {
        let count = tree.count_occurrences(p).unwrap();
        let all = tree.find_all_occurrences(p).unwrap();
        assert_eq!(count, all.len() as u64, "mismatch for {p:?}");
        assert_eq!(count == 0, !tree.contains(p).unwrap(), "parity with contains for {p:?}");
    }
}

#[test]
fn property_leaf_and_node_count_bounds() {
    let text = "GCGCGAATTCATGGATCCATAT";
    let tree = build_in_memory(text);
    let n = text.chars().count() as u64;
    assert_eq!(tree.leaf_count().unwrap(), n);
    let nodes = tree.node_count().unwrap();
    assert!(nodes >= n + 1 && nodes <= 2 * n + 1, "node_count {nodes} out of bounds for n={n}");
}

#[test]
fn property_anchors_respect_min_length_and_no_overlap() {
    let tree = build_in_memory("ATGCATGCATGCAAAGGGTTTATGCATGC");
    let anchors = tree.find_exact_match_anchors("ZZATGCATGCYYYGGGTTTZZ", 4).unwrap();
    assert!(!anchors.is_empty());
    for &(_, _, length) in &anchors {
        assert!(length >= 4);
    }
    let mut by_query: Vec<_> = anchors.clone();
    by_query.sort_by_key(|&(_, q, _)| q);
    for pair in by_query.windows(2) {
        let (_, q0, len0) = pair[0];
        let (_, q1, _) = pair[1];
        assert!(q0 + (len0 as usize) <= q1, "anchors overlap in query coordinates: {pair:?}");
    }
}

#[test]
fn property_determinism_across_independent_builds() {
    let a = build_in_memory("abcabxabcd");
    let b = build_in_memory("abcabxabcd");
    assert_eq!(a.logical_hash().unwrap(), b.logical_hash().unwrap());
}

#[test]
fn property_persistent_round_trip_hash_matches() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("roundtrip.dat");
    let built = build_persistent("GCGCGAATTCATGGATCCATAT", &path).unwrap();
    let hash_before = built.logical_hash().unwrap();
    built.close();

    let reloaded = load_persistent(&path).unwrap();
    assert_eq!(reloaded.logical_hash().unwrap(), hash_before);
}

#[test]
fn property_export_import_round_trip() {
    let tree = build_in_memory("abcabxabcd");
    let bytes = tree.export().unwrap();
    let reimported = suffixdex::serializer::import(&bytes).unwrap();
    assert_eq!(
        suffixdex::traverse::logical_hash(&reimported),
        tree.logical_hash().unwrap()
    );
}

#[test]
fn disposed_persistent_tree_surfaces_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("disposed.dat");
    let tree = build_persistent("banana", &path).unwrap();
    tree.close();
    assert!(tree.contains("ana").is_err());
    assert!(tree.find_all_occurrences("ana").is_err());
    assert!(tree.stats().is_err());
}
