// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Byte layout for node and child-entry records.
//!
//! These codecs are pure — they only pack/unpack fields, they never decide
//! *where* a record lives or how a reference field should be encoded for
//! cross-zone addressing. That decision belongs to [`super::writer`], which
//! owns the allocator and the jump table.

use super::{COMPACT_CHILD_SIZE, COMPACT_NODE_SIZE, LARGE_CHILD_SIZE, LARGE_NODE_SIZE};

/// A node record with reference fields still in their raw on-disk width
/// (`u32` for the compact zone). Resolving `suffix_link`/`children_head` to
/// an absolute address is [`super::jump::resolve`]'s job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct CompactNodeRecord {
    pub start: u32,
    pub end: u32,
    pub depth_from_root: u32,
    pub suffix_link: u32,
    pub children_head: u32,
    pub leaf_count: u32,
    pub child_count: u32,
}

impl CompactNodeRecord {
    pub(crate) fn encode(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= COMPACT_NODE_SIZE as usize);
        buf[0..4].copy_from_slice(&self.start.to_le_bytes());
        buf[4..8].copy_from_slice(&self.end.to_le_bytes());
        buf[8..12].copy_from_slice(&self.depth_from_root.to_le_bytes());
        buf[12..16].copy_from_slice(&self.suffix_link.to_le_bytes());
        buf[16..20].copy_from_slice(&self.children_head.to_le_bytes());
        buf[20..24].copy_from_slice(&self.leaf_count.to_le_bytes());
        buf[24..28].copy_from_slice(&self.child_count.to_le_bytes());
    }

    pub(crate) fn decode(buf: &[u8]) -> Self {
        debug_assert!(buf.len() >= COMPACT_NODE_SIZE as usize);
        let u32_at = |o: usize| u32::from_le_bytes(buf[o..o + 4].try_into().unwrap());
        Self {
            start: u32_at(0),
            end: u32_at(4),
            depth_from_root: u32_at(8),
            suffix_link: u32_at(12),
            children_head: u32_at(16),
            leaf_count: u32_at(20),
            child_count: u32_at(24),
        }
    }
}

/// A node record in the large zone: the two reference fields are full
/// 64-bit absolute offsets, no jump table involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct LargeNodeRecord {
    pub start: u32,
    pub end: u32,
    pub depth_from_root: u32,
    pub leaf_count: u32,
    pub child_count: u32,
    pub suffix_link: u64,
    pub children_head: u64,
}

impl LargeNodeRecord {
    pub(crate) fn encode(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= LARGE_NODE_SIZE as usize);
        buf[0..4].copy_from_slice(&self.start.to_le_bytes());
        buf[4..8].copy_from_slice(&self.end.to_le_bytes());
        buf[8..12].copy_from_slice(&self.depth_from_root.to_le_bytes());
        buf[12..16].copy_from_slice(&self.leaf_count.to_le_bytes());
        buf[16..20].copy_from_slice(&self.child_count.to_le_bytes());
        buf[20..24].fill(0); // alignment padding
        buf[24..32].copy_from_slice(&self.suffix_link.to_le_bytes());
        buf[32..40].copy_from_slice(&self.children_head.to_le_bytes());
    }

    pub(crate) fn decode(buf: &[u8]) -> Self {
        debug_assert!(buf.len() >= LARGE_NODE_SIZE as usize);
        let u32_at = |o: usize| u32::from_le_bytes(buf[o..o + 4].try_into().unwrap());
        let u64_at = |o: usize| u64::from_le_bytes(buf[o..o + 8].try_into().unwrap());
        Self {
            start: u32_at(0),
            end: u32_at(4),
            depth_from_root: u32_at(8),
            leaf_count: u32_at(12),
            child_count: u32_at(16),
            suffix_link: u64_at(24),
            children_head: u64_at(32),
        }
    }
}

/// One link in a node's singly linked child-entry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct CompactChildEntry {
    pub symbol: i32,
    pub child: u32,
    pub next: u32,
}

impl CompactChildEntry {
    pub(crate) fn encode(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= COMPACT_CHILD_SIZE as usize);
        buf[0..4].copy_from_slice(&self.symbol.to_le_bytes());
        buf[4..8].copy_from_slice(&self.child.to_le_bytes());
        buf[8..12].copy_from_slice(&self.next.to_le_bytes());
    }

    pub(crate) fn decode(buf: &[u8]) -> Self {
        debug_assert!(buf.len() >= COMPACT_CHILD_SIZE as usize);
        Self {
            symbol: i32::from_le_bytes(buf[0..4].try_into().unwrap()),
            child: u32::from_le_bytes(buf[4..8].try_into().unwrap()),
            next: u32::from_le_bytes(buf[8..12].try_into().unwrap()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct LargeChildEntry {
    pub symbol: i32,
    pub child: u64,
    pub next: u64,
}

impl LargeChildEntry {
    pub(crate) fn encode(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= LARGE_CHILD_SIZE as usize);
        buf[0..4].copy_from_slice(&self.symbol.to_le_bytes());
        buf[4..8].fill(0);
        buf[8..16].copy_from_slice(&self.child.to_le_bytes());
        buf[16..24].copy_from_slice(&self.next.to_le_bytes());
    }

    pub(crate) fn decode(buf: &[u8]) -> Self {
        debug_assert!(buf.len() >= LARGE_CHILD_SIZE as usize);
        Self {
            symbol: i32::from_le_bytes(buf[0..4].try_into().unwrap()),
            child: u64::from_le_bytes(buf[8..16].try_into().unwrap()),
            next: u64::from_le_bytes(buf[16..24].try_into().unwrap()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_node_roundtrip() {
        let rec = CompactNodeRecord {
            start: 3,
            end: 7,
            depth_from_root: 2,
            suffix_link: 512,
            children_head: 1024,
            leaf_count: 4,
            child_count: 2,
        };
        let mut buf = [0u8; COMPACT_NODE_SIZE as usize];
        rec.encode(&mut buf);
        assert_eq!(CompactNodeRecord::decode(&buf), rec);
    }

    #[test]
    fn test_large_node_roundtrip() {
        let rec = LargeNodeRecord {
            start: 3,
            end: 7,
            depth_from_root: 2,
            leaf_count: 4,
            child_count: 2,
            suffix_link: 9_000_000_000,
            children_head: 10_000_000_000,
        };
        let mut buf = [0u8; LARGE_NODE_SIZE as usize];
        rec.encode(&mut buf);
        assert_eq!(LargeNodeRecord::decode(&buf), rec);
    }

    #[test]
    fn test_compact_child_entry_roundtrip() {
        let e = CompactChildEntry {
            symbol: -1,
            child: 42,
            next: 0,
        };
        let mut buf = [0u8; COMPACT_CHILD_SIZE as usize];
        e.encode(&mut buf);
        assert_eq!(CompactChildEntry::decode(&buf), e);
    }
}
