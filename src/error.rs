// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Error types for suffixdex operations.
//!
//! Provides structured error handling with detailed context for debugging,
//! mirroring the four failure kinds the core is allowed to surface: invalid
//! caller input, corrupt/foreign persisted files, builder capacity exhaustion,
//! and use-after-release of a persistent tree.

use std::fmt;

/// Standard Result type for all suffixdex operations.
pub type SuffixResult<T> = Result<T, SuffixError>;

/// Error types for suffixdex operations.
#[derive(Debug, Clone)]
pub enum SuffixError {
    /// Caller supplied input the core cannot act on: a null/forbidden empty
    /// string where one isn't allowed, `min_length < 1` to the anchor
    /// finder, or an out-of-range index.
    InvalidInput { reason: String },

    /// The persisted file is not a well-formed tree of any supported
    /// version: bad magic, unknown version, an offset outside the file, or
    /// a text span that would read past the end of the file.
    FormatError { reason: String },

    /// The builder ran out of addressable offset space even after
    /// promoting to large records.
    OutOfCapacity { reason: String },

    /// Operation attempted on a persistent tree whose mapping has already
    /// been released.
    Disposed,

    /// I/O error while reading or writing the backing file.
    IoError { operation: String, reason: String },
}

impl fmt::Display for SuffixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { reason } => write!(f, "invalid input: {}", reason),
            Self::FormatError { reason } => write!(f, "format error: {}", reason),
            Self::OutOfCapacity { reason } => write!(f, "out of capacity: {}", reason),
            Self::Disposed => write!(f, "operation on a disposed persistent tree"),
            Self::IoError { operation, reason } => {
                write!(f, "I/O error during '{}': {}", operation, reason)
            }
        }
    }
}

impl std::error::Error for SuffixError {}

impl From<std::io::Error> for SuffixError {
    fn from(err: std::io::Error) -> Self {
        SuffixError::IoError {
            operation: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            SuffixError::InvalidInput {
                reason: "empty".into()
            }
            .to_string(),
            "invalid input: empty"
        );
        assert_eq!(SuffixError::Disposed.to_string(), "operation on a disposed persistent tree");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SuffixError = io_err.into();
        matches!(err, SuffixError::IoError { .. });
    }
}
