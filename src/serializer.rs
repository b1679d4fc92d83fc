// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! `STLOGICA` — a layout-independent logical export/import format, distinct
//! from the on-disk `.dat` format in [`crate::persistent`]. Where the
//! persistent format is a stable binary contract tied to a specific backend
//! (offsets, zone transitions, record widths), this one is purely
//! structural: a preorder dump of whatever [`Navigator`] exposes, re-buildable
//! into a fresh [`crate::heap::HeapTree`] regardless of which backend
//! produced the export.
//!
//! Round-trip correctness is checked by comparing [`crate::traverse::logical_hash`]
//! before and after, not byte-for-byte — the format only has to reconstruct
//! the same structure, not the same bytes.

use crate::error::{SuffixError, SuffixResult};
use crate::heap::HeapTree;
use crate::navigator::Navigator;
use crate::text::InMemoryText;

const MAGIC: i64 = i64::from_le_bytes(*b"STLOGICA");
const VERSION: i32 = 1;

fn format_err(reason: impl Into<String>) -> SuffixError {
    SuffixError::FormatError { reason: reason.into() }
}

fn read_i32(data: &[u8], pos: &mut usize) -> SuffixResult<i32> {
    let end = *pos + 4;
    let bytes: [u8; 4] = data
        .get(*pos..end)
        .ok_or_else(|| format_err("truncated STLOGICA stream"))?
        .try_into()
        .unwrap();
    *pos = end;
    Ok(i32::from_le_bytes(bytes))
}

fn read_i64(data: &[u8], pos: &mut usize) -> SuffixResult<i64> {
    let end = *pos + 8;
    let bytes: [u8; 8] = data
        .get(*pos..end)
        .ok_or_else(|| format_err("truncated STLOGICA stream"))?
        .try_into()
        .unwrap();
    *pos = end;
    Ok(i64::from_le_bytes(bytes))
}

/// Exports `nav`'s tree (and its text) into a self-contained byte stream.
pub fn export<N: Navigator>(nav: &N) -> Vec<u8> {
    let mut body = Vec::new();
    let mut node_count: u32 = 0;
    export_node(nav, nav.root(), &mut body, &mut node_count);

    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC.to_le_bytes());
    out.extend_from_slice(&VERSION.to_le_bytes());
    let text = nav.text_range(0, nav.text_len());
    out.extend_from_slice(&(text.len() as i32).to_le_bytes());
    for sym in &text {
        out.extend_from_slice(&(*sym as i32).to_le_bytes());
    }
    out.extend_from_slice(&(node_count as i32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

fn export_node<N: Navigator>(nav: &N, h: N::Handle, out: &mut Vec<u8>, count: &mut u32) {
    *count += 1;
    let symbols = nav.children_symbols(h);
    let start = nav.edge_start(h);
    let end: i32 = if symbols.is_empty() { -1 } else { (start + nav.edge_length(h)) as i32 };

    out.extend_from_slice(&(start as i32).to_le_bytes());
    out.extend_from_slice(&end.to_le_bytes());
    out.extend_from_slice(&(nav.leaf_count(h) as i32).to_le_bytes());
    out.extend_from_slice(&(symbols.len() as i32).to_le_bytes());
    out.extend_from_slice(&(nav.depth_from_root(h) as i32).to_le_bytes());

    for sym in symbols {
        out.extend_from_slice(&sym.to_le_bytes());
        export_node(nav, nav.child(h, sym), out, count);
    }
}

/// Reconstructs a tree from bytes produced by [`export`]. Always rebuilds
/// into a heap-backed tree, regardless of the backend that exported it.
///
/// ## Error Conditions
/// - `FormatError`: bad magic, unsupported version, or a stream that ends
///   before a declared field or child count is satisfied.
pub fn import(data: &[u8]) -> SuffixResult<HeapTree<InMemoryText>> {
    let mut pos = 0usize;

    let magic = read_i64(data, &mut pos)?;
    if magic != MAGIC {
        return Err(format_err("bad STLOGICA magic"));
    }
    let version = read_i32(data, &mut pos)?;
    if version != VERSION {
        return Err(format_err(format!("unsupported STLOGICA version {version}")));
    }

    let text_len = read_i32(data, &mut pos)?;
    if text_len < 0 {
        return Err(format_err("negative text length"));
    }
    let mut symbols = Vec::with_capacity(text_len as usize);
    for _ in 0..text_len {
        symbols.push(read_i32(data, &mut pos)? as u16);
    }
    let _node_count = read_i32(data, &mut pos)?;

    let text = InMemoryText::from_symbols(symbols);
    let mut tree = HeapTree::raw_new(text);

    let _root_start = read_i32(data, &mut pos)?;
    let _root_end = read_i32(data, &mut pos)?;
    let root_leaf_count = read_i32(data, &mut pos)?;
    let root_child_count = read_i32(data, &mut pos)?;
    let _root_depth = read_i32(data, &mut pos)?;
    if root_leaf_count < 0 || root_child_count < 0 {
        return Err(format_err("negative count in root record"));
    }
    tree.raw_set_root_leaf_count(root_leaf_count as u32);

    for _ in 0..root_child_count {
        let key = read_i32(data, &mut pos)?;
        import_node(&mut tree, 0, key, data, &mut pos)?;
    }
    tree.raw_finalize_deepest();
    Ok(tree)
}

fn import_node(tree: &mut HeapTree<InMemoryText>, parent: u32, sym: i32, data: &[u8], pos: &mut usize) -> SuffixResult<u32> {
    let start = read_i32(data, pos)?;
    let end_raw = read_i32(data, pos)?;
    let leaf_count = read_i32(data, pos)?;
    let child_count = read_i32(data, pos)?;
    let depth_from_root = read_i32(data, pos)?;
    if start < 0 || leaf_count < 0 || child_count < 0 || depth_from_root < 0 {
        return Err(format_err("negative field in node record"));
    }

    let end = if end_raw < 0 { None } else { Some(end_raw as u32) };
    let node_id = tree.raw_alloc_node(start as u32, end, depth_from_root as u32, leaf_count as u32);
    tree.raw_set_child(parent, sym, node_id);

    for _ in 0..child_count {
        let key = read_i32(data, pos)?;
        import_node(tree, node_id, key, data, pos)?;
    }
    Ok(node_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::traverse::logical_hash;

    fn build_tree(s: &str) -> HeapTree<InMemoryText> {
        let text = InMemoryText::from_str(s);
        let n = text.len();
        let mut tree = HeapTree::new(text);
        build(&mut tree, n).unwrap();
        tree
    }

    #[test]
    fn test_export_import_preserves_structural_hash() {
        for s in ["banana", "abcabxabcd", "AAAAAA", "a\u{1F600}b", ""] {
            let original = build_tree(s);
            let bytes = export(&original);
            let reimported = import(&bytes).unwrap();
            assert_eq!(logical_hash(&original), logical_hash(&reimported), "mismatch for {s:?}");
        }
    }

    #[test]
    fn test_import_rejects_bad_magic() {
        let bytes = vec![0u8; 64];
        assert!(import(&bytes).is_err());
    }

    #[test]
    fn test_import_rejects_truncated_stream() {
        let tree = build_tree("banana");
        let mut bytes = export(&tree);
        bytes.truncate(bytes.len() - 4);
        assert!(import(&bytes).is_err());
    }

    #[test]
    fn test_reimported_tree_answers_queries_correctly() {
        let original = build_tree("abcabxabcd");
        let bytes = export(&original);
        let reimported = import(&bytes).unwrap();
        let mut occ = crate::search::find_all_occurrences(&reimported, &"abc".encode_utf16().collect::<Vec<_>>());
        occ.sort_unstable();
        assert_eq!(occ, vec![0, 6]);
    }
}
