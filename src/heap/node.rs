// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Arena-indexed node representation for [`super::tree::HeapTree`].

use super::children::Children;

/// Sentinel marking "no node" / "no suffix link yet" in arena indices.
pub(crate) const NULL: u32 = u32::MAX;

/// Sentinel edge-end meaning "grows with the tree" (a leaf's edge always
/// reaches the current end of text).
pub(crate) const OPEN_END: u32 = u32::MAX;

#[derive(Debug, Clone)]
pub(crate) struct HeapNode {
    /// Text index where this node's incoming edge label starts.
    pub start: u32,
    /// Exclusive end of the incoming edge label, or [`OPEN_END`] for a leaf.
    pub end: u32,
    /// Symbol-depth from the root to the parent side of this edge.
    pub depth_from_root: u32,
    /// Suffix link target, or [`NULL`].
    pub suffix_link: u32,
    /// Populated by the bottom-up finalize pass; `0` until then.
    pub leaf_count: u32,
    pub children: Children,
}

impl HeapNode {
    pub(crate) fn new_leaf(start: u32, depth_from_root: u32) -> Self {
        Self {
            start,
            end: OPEN_END,
            depth_from_root,
            suffix_link: NULL,
            leaf_count: 0,
            children: Children::default(),
        }
    }

    pub(crate) fn new_root() -> Self {
        Self {
            start: 0,
            end: 0,
            depth_from_root: 0,
            suffix_link: NULL,
            leaf_count: 0,
            children: Children::default(),
        }
    }

    pub(crate) fn new_internal(start: u32, end: u32, depth_from_root: u32) -> Self {
        Self {
            start,
            end,
            depth_from_root,
            suffix_link: NULL,
            leaf_count: 0,
            children: Children::default(),
        }
    }
}
