// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Generic streaming algorithms written once against [`crate::navigator::Navigator`]
//! so both backends inherit them with no duplication.

pub mod anchors;
pub mod chain;
pub mod lcs;
pub mod lrs;

pub use anchors::{find_exact_match_anchors, Anchor};
pub use chain::chain_anchors;
pub use lcs::{longest_common_substring, LcsMatch};
pub use lrs::longest_repeated_substring;
