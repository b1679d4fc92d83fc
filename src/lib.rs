// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! suffixdex — a generalized suffix tree library with two interchangeable
//! backends: an in-memory arena for building and querying small-to-medium
//! texts, and a memory-mapped persistent format for indexes too large (or
//! too valuable) to rebuild on every process start.
//!
//! ```
//! use suffixdex::build_in_memory;
//!
//! let tree = build_in_memory("banana");
//! assert_eq!(tree.longest_repeated_substring().unwrap(), "ana");
//! assert!(tree.contains("nan").unwrap());
//! ```
//!
//! The [`navigator::Navigator`] trait is the seam: [`builder::build`] and
//! every algorithm in [`algorithms`], [`search`], [`enumerate`], and
//! [`traverse`] are written once, generic over it, and monomorphize per
//! backend. [`tree::Tree`] is the one place a runtime backend choice is
//! unavoidable and wraps both behind a single API.

pub mod algorithms;
pub mod builder;
pub mod config;
pub mod enumerate;
pub mod error;
pub mod heap;
pub mod metrics;
pub mod navigator;
pub mod persistent;
pub mod search;
pub mod serializer;
pub mod text;
pub mod traverse;
mod tree;

pub use algorithms::{chain_anchors, find_exact_match_anchors, longest_common_substring, longest_repeated_substring, Anchor, LcsMatch};
pub use config::BuilderConfig;
pub use error::{SuffixError, SuffixResult};
pub use navigator::Navigator;
pub use text::{InMemoryText, MappedText, TextSource, Symbol, TERMINATOR};
pub use traverse::Visitor;
pub use tree::{build_in_memory, build_persistent, load_persistent, try_build_in_memory, Tree, TreeStats};
