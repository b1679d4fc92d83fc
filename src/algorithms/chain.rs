// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Colinear chaining of anchors: picks the subset whose tree and query
//! positions are both strictly increasing, maximizing total covered length
//! — the classic weighted increasing-subsequence dynamic program, O(k^2) in
//! the anchor count (never in the text or query length).

use super::anchors::Anchor;

/// Returns the highest-scoring chain, in query order. Empty input yields an
/// empty chain.
pub fn chain_anchors(anchors: &[Anchor]) -> Vec<Anchor> {
    if anchors.is_empty() {
        return Vec::new();
    }
    let mut sorted: Vec<Anchor> = anchors.to_vec();
    sorted.sort_unstable_by_key(|a| (a.query_start, a.tree_start));

    let k = sorted.len();
    let mut dp = vec![0u64; k];
    let mut prev: Vec<Option<usize>> = vec![None; k];
    let mut best = 0usize;

    for i in 0..k {
        dp[i] = sorted[i].length;
        for j in 0..i {
            let compatible = sorted[j].query_start + sorted[j].length as usize <= sorted[i].query_start
                && sorted[j].tree_start + sorted[j].length <= sorted[i].tree_start;
            if compatible {
                let candidate = dp[j] + sorted[i].length;
                if candidate > dp[i] {
                    dp[i] = candidate;
                    prev[i] = Some(j);
                }
            }
        }
        if dp[i] > dp[best] {
            best = i;
        }
    }

    let mut chain = Vec::new();
    let mut cur = Some(best);
    while let Some(idx) = cur {
        chain.push(sorted[idx]);
        cur = prev[idx];
    }
    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(tree_start: u64, query_start: usize, length: u64) -> Anchor {
        Anchor {
            tree_start,
            query_start,
            length,
        }
    }

    #[test]
    fn test_empty_input_yields_empty_chain() {
        assert!(chain_anchors(&[]).is_empty());
    }

    #[test]
    fn test_picks_colinear_subset_over_crossing_pair() {
        // Two anchors that are colinear (both coordinates increasing) plus
        // one that crosses the first — the crossing one must lose out.
        let anchors = vec![anchor(0, 0, 4), anchor(10, 4, 4), anchor(2, 4, 3)];
        let chain = chain_anchors(&anchors);
        assert_eq!(chain, vec![anchor(0, 0, 4), anchor(10, 4, 4)]);
    }

    #[test]
    fn test_single_anchor_chains_to_itself() {
        let anchors = vec![anchor(5, 5, 7)];
        assert_eq!(chain_anchors(&anchors), anchors);
    }

    #[test]
    fn test_overlapping_anchors_keep_only_one() {
        let anchors = vec![anchor(0, 0, 5), anchor(2, 2, 5)];
        let chain = chain_anchors(&anchors);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].length, 5);
    }
}
