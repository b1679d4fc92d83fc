// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Memory-mapped, on-disk suffix tree backend.
//!
//! A build produces a single `.dat` file laid out as:
//!
//! ```text
//! [ FileHeader (128 B) ][ text (2 B/symbol) ][ compact zone ][ large zone ]
//! ```
//!
//! Nodes and child-entry records start in the *compact zone*, using 32-bit
//! reference fields. Once the compact zone's direct address range (2 GiB)
//! would be exceeded, new allocations move to the *large zone*, which uses
//! 64-bit reference fields for its own records. A compact-zone record that
//! needs to reference something in the large zone cannot widen its own
//! fields in place — doing so retroactively would shift every following
//! offset — so it instead points at a small *jump-table entry*: an 8-byte
//! record, itself allocated in the compact zone, carrying the real 64-bit
//! target. The indirection is flagged on the *referencing* field's top bit
//! ([`JUMP_BIT`]), not on the jump entry's own bytes — tagging the bytes at
//! the target address would collide with ordinary record data that happens
//! to encode the same pattern (a child entry keyed by the text terminator
//! encodes to exactly the bytes a content-based tag would have used).
//!
//! This keeps every compact-zone reference field 32 bits wide for the common
//! case (a tree that never leaves the compact zone pays no indirection at
//! all) while still supporting arbitrarily large trees.

mod header;
mod jump;
mod reader;
mod record;
mod writer;

pub use header::FileHeader;
pub use reader::PersistentReader;
pub use writer::PersistentWriter;

/// Size in bytes of [`FileHeader`] on disk, including reserved padding.
pub const HEADER_SIZE: usize = 128;

/// Bytes of header actually assigned meaning; the remainder is reserved for
/// future fields and currently zero-filled.
pub(crate) const HEADER_USED: usize = 72;

pub(crate) const MAGIC: &[u8; 8] = b"SFXDEX01";

/// Legacy large-only format: every node/child-entry record uses 64-bit
/// reference fields from the first allocation on. This writer never
/// produces it (it always starts in the compact zone), but a reader must
/// still accept a file written this way by an earlier tool version.
pub const FORMAT_VERSION_LARGE_ONLY: u32 = 3;
/// The whole tree fit in the compact (32-bit) zone; no jump table exists.
pub const FORMAT_VERSION_COMPACT: u32 = 4;
/// Construction crossed into the large zone partway through; compact-zone
/// records that reference large-zone nodes go through a jump-table entry.
pub const FORMAT_VERSION_HYBRID: u32 = 5;

/// Size of a compact node record, in bytes.
pub(crate) const COMPACT_NODE_SIZE: u64 = 28;
/// Size of a large-zone node record, in bytes.
pub(crate) const LARGE_NODE_SIZE: u64 = 40;
/// Size of a compact child-entry record, in bytes.
pub(crate) const COMPACT_CHILD_SIZE: u64 = 12;
/// Size of a large-zone child-entry record, in bytes.
pub(crate) const LARGE_CHILD_SIZE: u64 = 24;
/// Size of a jump-table entry, in bytes (always allocated in the compact
/// zone, since it is what makes the compact zone's 32-bit fields usable at
/// all once the large zone exists). Just the 8-byte absolute target — the
/// entry carries no tag of its own; see [`JUMP_BIT`].
pub(crate) const JUMP_ENTRY_SIZE: u64 = 8;

/// Top bit of a compact-zone 32-bit reference field: set when the field
/// names a jump-table entry rather than a direct offset. Real direct
/// offsets are always below [`COMPACT_LIMIT`] (`2^31`), so this bit is
/// otherwise always clear and can't collide with one.
pub(crate) const JUMP_BIT: u32 = 0x8000_0000;

/// Upper bound on direct compact-zone addressing, and simultaneously the
/// fixed base address of the large zone: every node/child-entry record at
/// an absolute offset below this lives in the compact zone and is encoded
/// with 32-bit reference fields; everything at or above it lives in the
/// large zone with 64-bit fields. Fixing the large zone's base rather than
/// letting it float right after wherever the compact zone happened to stop
/// keeps the two zones' address ranges disjoint without any bookkeeping
/// beyond this one constant. Capped at `2^31` (rather than `2^32`) to leave
/// [`JUMP_BIT`] free in every direct reference field.
pub(crate) const COMPACT_LIMIT: u64 = 1u64 << 31;

/// Sentinel for "no node" / "no suffix link yet" / "no children" at the
/// persistent layer. `0` always falls inside the header, never a valid
/// record offset, so it is unambiguous without a dedicated tag.
pub(crate) const NULL_REF: u64 = 0;

pub(crate) fn is_compact_addr(addr: u64) -> bool {
    addr < COMPACT_LIMIT
}

/// Sentinel edge-end meaning "grows with the tree" (a leaf's edge always
/// reaches the current end of text), mirroring [`crate::heap`]'s `OPEN_END`.
pub(crate) const OPEN_END: u32 = u32::MAX;
