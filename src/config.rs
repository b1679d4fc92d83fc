// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Builder configuration.
//!
//! Tuning knobs for the persistent backend's bump allocator and for the
//! thread-local scratch buffers shared algorithms use during traversal.
//! Mirrors the validated-newtype pattern the storage-engine core uses for
//! its own tunables (see `btree::types::Order`).

use crate::error::{SuffixError, SuffixResult};

/// Initial backing-file size, in bytes, for a persistent build.
const DEFAULT_INITIAL_FILE_SIZE: u64 = 64 * 1024;

/// Capacity hint for thread-local DFS/scratch buffers.
const DEFAULT_SCRATCH_CAPACITY: usize = 256;

/// Configuration for the Ukkonen builder.
///
/// ## Example
/// ```
/// use suffixdex::config::BuilderConfig;
///
/// let config = BuilderConfig::new(1024 * 1024, 512).unwrap();
/// assert_eq!(config.initial_file_size(), 1024 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderConfig {
    initial_file_size: u64,
    scratch_capacity: usize,
}

impl BuilderConfig {
    /// Creates a validated configuration.
    ///
    /// ## Error Conditions
    /// - `initial_file_size` below the header size: a build could never
    ///   even place its header.
    pub fn new(initial_file_size: u64, scratch_capacity: usize) -> SuffixResult<Self> {
        if initial_file_size < crate::persistent::HEADER_SIZE as u64 {
            return Err(SuffixError::InvalidInput {
                reason: format!(
                    "initial_file_size must be >= {} bytes, got {}",
                    crate::persistent::HEADER_SIZE,
                    initial_file_size
                ),
            });
        }
        Ok(Self {
            initial_file_size,
            scratch_capacity,
        })
    }

    pub fn initial_file_size(&self) -> u64 {
        self.initial_file_size
    }

    pub fn scratch_capacity(&self) -> usize {
        self.scratch_capacity
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            initial_file_size: DEFAULT_INITIAL_FILE_SIZE,
            scratch_capacity: DEFAULT_SCRATCH_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BuilderConfig::default();
        assert_eq!(config.initial_file_size(), DEFAULT_INITIAL_FILE_SIZE);
        assert_eq!(config.scratch_capacity(), DEFAULT_SCRATCH_CAPACITY);
    }

    #[test]
    fn test_rejects_tiny_file_size() {
        assert!(BuilderConfig::new(4, 16).is_err());
    }

    #[test]
    fn test_accepts_reasonable_size() {
        assert!(BuilderConfig::new(65536, 64).is_ok());
    }
}
