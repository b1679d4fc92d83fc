// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Uniform random-access views over a symbol sequence.
//!
//! `TextSource` is the one abstraction both backends and every generic
//! algorithm use to read the underlying text. Two concrete implementations
//! are provided: [`InMemoryText`], which owns a `Vec<u16>`, and
//! [`MappedText`], which borrows a zero-copy view into a memory-mapped file
//! region. Both report the same length and the same symbol per index.

use crate::error::{SuffixError, SuffixResult};
use std::sync::Arc;

/// A non-negative 16-bit code unit. The reserved sentinel [`TERMINATOR`] is
/// appended once, conceptually, after the last real symbol so that every
/// suffix ends at an explicit leaf; it is never a valid `Symbol` value.
pub type Symbol = u16;

/// Sentinel for the synthetic terminator appended after the text.
///
/// `i32` so it can share a key space with real symbols (`0..=65535`) in
/// lookups such as `Navigator::child`.
pub const TERMINATOR: i32 = -1;

/// Delivers a symbol at index `i` and a substring `[a, b)` as owned values.
///
/// ## Contract
/// - `len()` is stable for the lifetime of the source.
/// - `symbol_at(i)` for `i < len()` returns the real symbol at that index.
/// - `symbol_at(len())` returns [`TERMINATOR`] — a convenience used by
///   construction and traversal so the builder can iterate `0..=n` instead
///   of special-casing the last phase.
/// - Indices beyond `len()` are never requested.
pub trait TextSource: Send + Sync {
    /// Number of real symbols (excludes the terminator).
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Symbol at `i`, or [`TERMINATOR`] when `i == len()`.
    fn symbol_at(&self, i: u64) -> i32;

    /// Owned copy of `text[a..b)`. Callers never request `b > len()`.
    fn slice(&self, a: u64, b: u64) -> Vec<Symbol>;
}

/// Owned, in-memory symbol buffer.
#[derive(Debug, Clone)]
pub struct InMemoryText {
    symbols: Arc<[Symbol]>,
}

impl InMemoryText {
    /// Builds a text source from a Rust string, one `Symbol` per UTF-16 code
    /// unit (so surrogate-paired characters occupy two symbols, matching
    /// how the persistent backend stores code units on disk).
    pub fn from_str(s: &str) -> Self {
        Self {
            symbols: s.encode_utf16().collect::<Vec<_>>().into(),
        }
    }

    /// Builds a text source directly from code units.
    pub fn from_symbols(symbols: Vec<Symbol>) -> Self {
        Self {
            symbols: symbols.into(),
        }
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Decodes the stored code units back to a `String`, replacing any
    /// unpaired surrogate with the Unicode replacement character.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.symbols)
    }
}

impl TextSource for InMemoryText {
    fn len(&self) -> u64 {
        self.symbols.len() as u64
    }

    fn symbol_at(&self, i: u64) -> i32 {
        if i == self.len() {
            TERMINATOR
        } else {
            self.symbols[i as usize] as i32
        }
    }

    fn slice(&self, a: u64, b: u64) -> Vec<Symbol> {
        self.symbols[a as usize..b as usize].to_vec()
    }
}

/// Zero-copy view into a memory-mapped region storing little-endian `u16`
/// code units.
///
/// Used by the persistent backend: the text lives inside the `.dat` file
/// itself, at the offset recorded in the file header, and is read directly
/// out of the mapping rather than copied into a buffer.
pub struct MappedText {
    mmap: Arc<memmap2::Mmap>,
    byte_offset: usize,
    len_symbols: u64,
}

impl MappedText {
    /// ## Error Conditions
    /// - `FormatError` if `byte_offset + 2 * len_symbols` would read past
    ///   the end of the mapping.
    pub fn new(mmap: Arc<memmap2::Mmap>, byte_offset: usize, len_symbols: u64) -> SuffixResult<Self> {
        let end = byte_offset
            .checked_add((len_symbols as usize).saturating_mul(2))
            .ok_or_else(|| SuffixError::FormatError {
                reason: "text span overflows address space".to_string(),
            })?;
        if end > mmap.len() {
            return Err(SuffixError::FormatError {
                reason: format!(
                    "text span [{}, {}) exceeds mapped file size {}",
                    byte_offset,
                    end,
                    mmap.len()
                ),
            });
        }
        Ok(Self {
            mmap,
            byte_offset,
            len_symbols,
        })
    }

    fn read_symbol(&self, i: u64) -> Symbol {
        let at = self.byte_offset + (i as usize) * 2;
        let bytes = &self.mmap[at..at + 2];
        u16::from_le_bytes([bytes[0], bytes[1]])
    }
}

impl TextSource for MappedText {
    fn len(&self) -> u64 {
        self.len_symbols
    }

    fn symbol_at(&self, i: u64) -> i32 {
        if i == self.len_symbols {
            TERMINATOR
        } else {
            self.read_symbol(i) as i32
        }
    }

    fn slice(&self, a: u64, b: u64) -> Vec<Symbol> {
        (a..b).map(|i| self.read_symbol(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_roundtrip() {
        let t = InMemoryText::from_str("banana");
        assert_eq!(t.len(), 6);
        assert_eq!(t.symbol_at(0), 'b' as i32);
        assert_eq!(t.symbol_at(6), TERMINATOR);
        assert_eq!(t.slice(1, 4), vec!['a' as u16, 'n' as u16, 'a' as u16]);
    }

    #[test]
    fn test_in_memory_surrogate_pair() {
        let t = InMemoryText::from_str("a\u{1F600}b");
        // 'a' + surrogate pair (2 units) + 'b' = 4 code units
        assert_eq!(t.len(), 4);
        assert_eq!(t.to_string_lossy(), "a\u{1F600}b");
    }
}
