// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Cross-zone reference resolution.
//!
//! Every node/child-entry reference field in the compact zone is either a
//! direct byte offset (when the target is itself in the compact zone) or
//! the offset of a jump-table entry (when the target has moved to the large
//! zone). Both cases share one 32-bit field; [`resolve`] tells them apart.

use super::JUMP_BIT;

/// A jump-table entry: just the 8-byte absolute target offset, always
/// allocated in the compact zone. The indirection is flagged on the
/// *referencing* field (its top bit), not on the entry's own bytes — a
/// content-based tag would collide with ordinary record data (e.g. a
/// child-entry's `symbol` field holding the terminator, whose encoded bytes
/// equal `0xFFFF_FFFF`).
pub(crate) fn encode_entry(target_addr: u64) -> [u8; super::JUMP_ENTRY_SIZE as usize] {
    target_addr.to_le_bytes()
}

/// Resolves a compact reference field to the absolute byte offset of the
/// record it names.
///
/// `field` is the raw 32-bit value stored in the record: either a direct
/// offset, or — when [`JUMP_BIT`] is set — the offset of a jump-table entry
/// holding the real 64-bit target. `read_u64_at` reads eight little-endian
/// bytes at a given absolute compact-zone offset (the caller supplies this
/// so the function works the same way over a live `MmapMut` during a build
/// and over a read-only `Mmap` after reopening).
pub(crate) fn resolve(field: u32, read_u64_at: impl Fn(u64) -> u64) -> u64 {
    if field & JUMP_BIT != 0 {
        let entry_off = (field & !JUMP_BIT) as u64;
        read_u64_at(entry_off)
    } else {
        field as u64
    }
}

/// Encodes a reference to `target_addr` for storage in a compact-zone
/// reference field. Returns `Some(direct_offset)` when the target fits
/// within the direct address space, or `None` to signal the caller must
/// allocate a jump-table entry instead.
pub(crate) fn encode_direct(target_addr: u64) -> Option<u32> {
    if target_addr < super::COMPACT_LIMIT {
        Some(target_addr as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_roundtrip() {
        let addr = 1234u64;
        let field = encode_direct(addr).unwrap();
        let resolved = resolve(field, |_| 0);
        assert_eq!(resolved, addr);
    }

    #[test]
    fn test_jump_roundtrip() {
        let target = 9_000_000_000u64; // beyond u32 range
        let entry = encode_entry(target);
        let entry_off = 512u32;
        let field = entry_off | JUMP_BIT;
        let resolved = resolve(field, |off| {
            if off == entry_off as u64 {
                u64::from_le_bytes(entry)
            } else {
                0
            }
        });
        assert_eq!(resolved, target);
    }

    #[test]
    fn test_direct_offset_with_terminator_like_bytes_is_not_misread() {
        // A direct offset whose target record happens to start with bytes
        // that would equal the old content-based tag must still resolve as
        // a plain direct offset, since the tag now lives on the field, not
        // on the target's bytes.
        let addr = 999u64;
        let field = encode_direct(addr).unwrap();
        let resolved = resolve(field, |_| panic!("direct offsets must not dereference the target"));
        assert_eq!(resolved, addr);
    }
}
