// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Read-only access to a persisted suffix tree.
//!
//! Opening a file validates the header and nothing else — node records are
//! read directly out of the mapping on demand, so a query allocates nothing
//! but its own result list. Dispatch between compact and large record
//! layouts is per-reference (via [`super::is_compact_addr`]), not per-file,
//! so a single reader transparently serves v3 (large-only), v4
//! (compact-only) and v5 (hybrid) files with the same code path.

use super::header::FileHeader;
use super::record::{CompactChildEntry, CompactNodeRecord, LargeChildEntry, LargeNodeRecord};
use super::{is_compact_addr, jump, COMPACT_CHILD_SIZE, COMPACT_NODE_SIZE, HEADER_SIZE, LARGE_CHILD_SIZE, NULL_REF, OPEN_END};
use crate::error::{SuffixError, SuffixResult};
use crate::navigator::Navigator;
use crate::text::{MappedText, Symbol, TextSource};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A suffix tree opened read-only from a `.dat` file written by
/// [`super::PersistentWriter`].
///
/// Owns its memory mapping for the lifetime of the reader; [`Self::close`]
/// marks the reader disposed so further queries fail fast with
/// [`SuffixError::Disposed`] instead of reading stale or unmapped memory —
/// useful when a `Tree` is shared behind an `Arc` and one holder wants to
/// release it without waiting for every other holder to drop its reference.
pub struct PersistentReader {
    mmap: Arc<Mmap>,
    header: FileHeader,
    text: MappedText,
    closed: AtomicBool,
}

impl PersistentReader {
    /// Opens `path` read-only and validates the header.
    ///
    /// ## Error Conditions
    /// - `FormatError`: bad magic, unsupported version, or any offset/length
    ///   field that would read past the end of the file.
    pub fn open(path: impl AsRef<Path>) -> SuffixResult<Self> {
        let file = File::open(path.as_ref())?;
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_mmap(Arc::new(mmap))
    }

    fn from_mmap(mmap: Arc<Mmap>) -> SuffixResult<Self> {
        let header = FileHeader::read_from(&mmap)?;
        if header.root_offset as usize >= mmap.len()
            || header.text_offset as usize > mmap.len()
            || header.deepest_internal as usize >= mmap.len()
        {
            return Err(SuffixError::FormatError {
                reason: "header offset lies outside the mapped file".to_string(),
            });
        }
        let text_end = (header.text_offset as usize).checked_add(2 * header.text_length as usize);
        match text_end {
            Some(end) if end <= mmap.len() => {}
            _ => {
                return Err(SuffixError::FormatError {
                    reason: "text span exceeds file size".to_string(),
                })
            }
        }
        if (header.total_size as usize) > mmap.len() {
            return Err(SuffixError::FormatError {
                reason: format!(
                    "recorded total_size {} exceeds actual file size {}",
                    header.total_size,
                    mmap.len()
                ),
            });
        }
        let text = MappedText::new(mmap.clone(), header.text_offset as usize, header.text_length)?;
        Ok(Self {
            mmap,
            header,
            text,
            closed: AtomicBool::new(false),
        })
    }

    /// Marks this reader disposed. The mapping itself is only actually
    /// unmapped once the last reference to it drops (per-process readers
    /// may share the underlying `Mmap`); this flag makes any *further* use
    /// through this handle fail explicitly rather than silently continuing
    /// to read a mapping its owner considers released.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn check_open(&self) -> SuffixResult<()> {
        if self.is_closed() {
            Err(SuffixError::Disposed)
        } else {
            Ok(())
        }
    }

    pub fn text_len(&self) -> u64 {
        self.header.text_length
    }

    pub fn node_count(&self) -> u64 {
        self.header.node_count
    }

    /// Label of the deepest internal non-root node, read in O(1) from the
    /// header's cached offset — backs [`crate::algorithms::lrs`].
    pub(crate) fn deepest_internal_offset(&self) -> u64 {
        self.header.deepest_internal
    }

    pub(crate) fn root_offset(&self) -> u64 {
        self.header.root_offset
    }

    fn read_u64(&self, off: u64) -> u64 {
        let at = off as usize;
        u64::from_le_bytes(self.mmap[at..at + 8].try_into().unwrap())
    }

    fn read_node_fields(&self, h: u64) -> NodeView {
        if is_compact_addr(h) {
            let at = h as usize;
            let rec = CompactNodeRecord::decode(&self.mmap[at..at + COMPACT_NODE_SIZE as usize]);
            NodeView {
                start: rec.start,
                end: rec.end,
                depth_from_root: rec.depth_from_root,
                leaf_count: rec.leaf_count,
                suffix_link: jump::resolve(rec.suffix_link, |o| self.read_u64(o)),
                children_head: jump::resolve(rec.children_head, |o| self.read_u64(o)),
            }
        } else {
            let at = h as usize;
            let rec = LargeNodeRecord::decode(&self.mmap[at..at + super::LARGE_NODE_SIZE as usize]);
            NodeView {
                start: rec.start,
                end: rec.end,
                depth_from_root: rec.depth_from_root,
                leaf_count: rec.leaf_count,
                suffix_link: rec.suffix_link,
                children_head: rec.children_head,
            }
        }
    }

    fn children_list(&self, head: u64) -> Vec<(i32, u64)> {
        let mut out = Vec::new();
        let mut cur = head;
        while cur != NULL_REF {
            let (sym, child, next) = self.read_child_entry(cur);
            out.push((sym, child));
            cur = next;
        }
        out
    }

    fn read_child_entry(&self, h: u64) -> (i32, u64, u64) {
        if is_compact_addr(h) {
            let at = h as usize;
            let e = CompactChildEntry::decode(&self.mmap[at..at + COMPACT_CHILD_SIZE as usize]);
            let child = jump::resolve(e.child, |o| self.read_u64(o));
            let next = jump::resolve(e.next, |o| self.read_u64(o));
            (e.symbol, child, next)
        } else {
            let at = h as usize;
            let e = LargeChildEntry::decode(&self.mmap[at..at + LARGE_CHILD_SIZE as usize]);
            (e.symbol, e.child, e.next)
        }
    }

    fn find_child(&self, parent: u64, sym: i32) -> u64 {
        let head = self.read_node_fields(parent).children_head;
        let mut cur = head;
        while cur != NULL_REF {
            let (s, child, next) = self.read_child_entry(cur);
            if s == sym {
                return child;
            }
            cur = next;
        }
        NULL_REF
    }
}

/// Fields of a node record after cross-zone references have been resolved
/// to absolute offsets.
struct NodeView {
    start: u32,
    end: u32,
    depth_from_root: u32,
    leaf_count: u32,
    suffix_link: u64,
    children_head: u64,
}

impl Navigator for PersistentReader {
    type Handle = u64;

    fn root(&self) -> u64 {
        self.header.root_offset
    }

    fn null(&self) -> u64 {
        NULL_REF
    }

    fn is_null(&self, h: u64) -> bool {
        h == NULL_REF
    }

    fn is_root(&self, h: u64) -> bool {
        h == self.header.root_offset
    }

    fn child(&self, h: u64, sym: i32) -> u64 {
        self.find_child(h, sym)
    }

    fn children_symbols(&self, h: u64) -> Vec<i32> {
        let head = self.read_node_fields(h).children_head;
        let mut symbols: Vec<i32> = self.children_list(head).into_iter().map(|(s, _)| s).collect();
        symbols.sort_unstable();
        symbols
    }

    fn edge_symbol_at(&self, h: u64, offset: u64) -> i32 {
        let start = self.read_node_fields(h).start as u64;
        self.text.symbol_at(start + offset)
    }

    fn edge_start(&self, h: u64) -> u64 {
        self.read_node_fields(h).start as u64
    }

    fn edge_length(&self, h: u64) -> u64 {
        if h == self.header.root_offset {
            return 0;
        }
        let f = self.read_node_fields(h);
        let end = if f.end == OPEN_END { self.header.text_length + 1 } else { f.end as u64 };
        end - f.start as u64
    }

    fn depth_from_root(&self, h: u64) -> u64 {
        self.read_node_fields(h).depth_from_root as u64
    }

    fn suffix_link(&self, h: u64) -> u64 {
        self.read_node_fields(h).suffix_link
    }

    fn leaf_count(&self, h: u64) -> u64 {
        self.read_node_fields(h).leaf_count as u64
    }

    fn text_len(&self) -> u64 {
        self.header.text_length
    }

    fn text_symbol(&self, i: u64) -> i32 {
        self.text.symbol_at(i)
    }

    fn text_range(&self, a: u64, b: u64) -> Vec<Symbol> {
        self.text.slice(a, b)
    }
}

impl PersistentReader {
    /// Disposal-aware wrapper used by [`crate::tree::Tree`]; every public
    /// query goes through this before touching the mapping.
    pub(crate) fn guard(&self) -> SuffixResult<()> {
        self.check_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::config::BuilderConfig;
    use crate::persistent::PersistentWriter;
    use crate::text::InMemoryText;
    use tempfile::tempdir;

    fn build_and_reopen(s: &str) -> PersistentReader {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.dat");
        let text = InMemoryText::from_str(s);
        let n = text.len();
        let config = BuilderConfig::default();
        let mut writer = PersistentWriter::new(&path, text, &config).unwrap();
        build(&mut writer, n).unwrap();
        writer.finish().unwrap();
        PersistentReader::open(&path).unwrap()
    }

    #[test]
    fn test_reopen_preserves_leaf_count() {
        let reader = build_and_reopen("banana");
        assert_eq!(reader.leaf_count(reader.root()), 7);
    }

    #[test]
    fn test_rejects_truncated_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.dat");
        std::fs::write(&path, [0u8; 10]).unwrap();
        assert!(PersistentReader::open(&path).is_err());
    }

    #[test]
    fn test_close_disposes() {
        let reader = build_and_reopen("banana");
        assert!(reader.guard().is_ok());
        reader.close();
        assert!(matches!(reader.guard(), Err(SuffixError::Disposed)));
    }
}
