// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Fixed 128-byte file header, written and read as explicit little-endian
//! fields rather than through a serialization crate — the format must stay
//! byte-stable across versions of this library, including ones that add
//! fields in the still-reserved tail, so the layout is spelled out by hand.

use super::{
    FORMAT_VERSION_COMPACT, FORMAT_VERSION_HYBRID, FORMAT_VERSION_LARGE_ONLY, HEADER_SIZE, HEADER_USED, MAGIC,
};
use crate::error::{SuffixError, SuffixResult};

/// In-order byte layout of the header. Offsets are implicit in write/read
/// order; see the `offsets` module below for the single source of truth
/// used by both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub version: u32,
    /// Absolute byte offset of the root node record.
    pub root_offset: u64,
    /// Absolute byte offset where the text region begins.
    pub text_offset: u64,
    /// Number of symbols in the text (excludes the terminator).
    pub text_length: u64,
    /// Total number of node records (including the root).
    pub node_count: u64,
    /// File size at the time construction finished.
    pub total_size: u64,
    /// Absolute byte offset of the deepest internal non-root node, cached
    /// for O(1) longest-repeated-substring queries.
    pub deepest_internal: u64,
    /// Absolute byte offset marking the start of the large zone (equal to
    /// `total_size` if construction never left the compact zone).
    pub zone_transition: u64,
}

mod offsets {
    pub const MAGIC: usize = 0;
    pub const VERSION: usize = 8;
    pub const RESERVED: usize = 12;
    pub const ROOT_OFFSET: usize = 16;
    pub const TEXT_OFFSET: usize = 24;
    pub const TEXT_LENGTH: usize = 32;
    pub const NODE_COUNT: usize = 40;
    pub const TOTAL_SIZE: usize = 48;
    pub const DEEPEST_INTERNAL: usize = 56;
    pub const ZONE_TRANSITION: usize = 64;
}

impl FileHeader {
    /// Writes the header into the first [`HEADER_SIZE`] bytes of `buf`.
    ///
    /// ## Error Conditions
    /// - `buf.len() < HEADER_SIZE`.
    pub fn write_to(&self, buf: &mut [u8]) -> SuffixResult<()> {
        if buf.len() < HEADER_SIZE {
            return Err(SuffixError::InvalidInput {
                reason: format!("header buffer too small: {} < {}", buf.len(), HEADER_SIZE),
            });
        }
        buf[offsets::MAGIC..offsets::MAGIC + 8].copy_from_slice(MAGIC);
        buf[offsets::VERSION..offsets::VERSION + 4].copy_from_slice(&self.version.to_le_bytes());
        buf[offsets::RESERVED..offsets::RESERVED + 4].copy_from_slice(&0u32.to_le_bytes());
        buf[offsets::ROOT_OFFSET..offsets::ROOT_OFFSET + 8].copy_from_slice(&self.root_offset.to_le_bytes());
        buf[offsets::TEXT_OFFSET..offsets::TEXT_OFFSET + 8].copy_from_slice(&self.text_offset.to_le_bytes());
        buf[offsets::TEXT_LENGTH..offsets::TEXT_LENGTH + 8].copy_from_slice(&self.text_length.to_le_bytes());
        buf[offsets::NODE_COUNT..offsets::NODE_COUNT + 8].copy_from_slice(&self.node_count.to_le_bytes());
        buf[offsets::TOTAL_SIZE..offsets::TOTAL_SIZE + 8].copy_from_slice(&self.total_size.to_le_bytes());
        buf[offsets::DEEPEST_INTERNAL..offsets::DEEPEST_INTERNAL + 8]
            .copy_from_slice(&self.deepest_internal.to_le_bytes());
        buf[offsets::ZONE_TRANSITION..offsets::ZONE_TRANSITION + 8]
            .copy_from_slice(&self.zone_transition.to_le_bytes());
        buf[HEADER_USED..HEADER_SIZE].fill(0);
        Ok(())
    }

    /// Parses and validates a header out of `buf`'s first [`HEADER_SIZE`]
    /// bytes.
    ///
    /// ## Error Conditions
    /// - `buf.len() < HEADER_SIZE`.
    /// - Magic mismatch — not a file this library wrote.
    /// - Unsupported version.
    pub fn read_from(buf: &[u8]) -> SuffixResult<Self> {
        if buf.len() < HEADER_SIZE {
            return Err(SuffixError::FormatError {
                reason: format!("file too small to hold a header: {} bytes", buf.len()),
            });
        }
        let magic = &buf[offsets::MAGIC..offsets::MAGIC + 8];
        if magic != MAGIC {
            return Err(SuffixError::FormatError {
                reason: "magic bytes do not match this library's format".to_string(),
            });
        }
        let version = u32::from_le_bytes(buf[offsets::VERSION..offsets::VERSION + 4].try_into().unwrap());
        if !matches!(
            version,
            FORMAT_VERSION_LARGE_ONLY | FORMAT_VERSION_COMPACT | FORMAT_VERSION_HYBRID
        ) {
            return Err(SuffixError::FormatError {
                reason: format!("unsupported format version {version}"),
            });
        }
        let read_u64 = |off: usize| u64::from_le_bytes(buf[off..off + 8].try_into().unwrap());
        Ok(Self {
            version,
            root_offset: read_u64(offsets::ROOT_OFFSET),
            text_offset: read_u64(offsets::TEXT_OFFSET),
            text_length: read_u64(offsets::TEXT_LENGTH),
            node_count: read_u64(offsets::NODE_COUNT),
            total_size: read_u64(offsets::TOTAL_SIZE),
            deepest_internal: read_u64(offsets::DEEPEST_INTERNAL),
            zone_transition: read_u64(offsets::ZONE_TRANSITION),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_roundtrip() {
        let header = FileHeader {
            version: FORMAT_VERSION_HYBRID,
            root_offset: 128,
            text_offset: 200,
            text_length: 6,
            node_count: 11,
            total_size: 4096,
            deepest_internal: 256,
            zone_transition: 4096,
        };
        let mut buf = [0u8; HEADER_SIZE];
        header.write_to(&mut buf).unwrap();
        let parsed = FileHeader::read_from(&buf).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let buf = [0u8; HEADER_SIZE];
        assert!(FileHeader::read_from(&buf).is_err());
    }

    #[test]
    fn test_rejects_truncated_buffer() {
        let buf = [0u8; 10];
        assert!(FileHeader::read_from(&buf).is_err());
    }
}
