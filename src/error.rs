//! Error types for divquery.
//!
//! Only construction can fail. Once a structure exists, every operation has a
//! normal result; misuse of internal preconditions is a bug and is caught by
//! debug assertions.

use thiserror::Error;

/// A configuration or option set that no structure can be built from.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("configuration has no variables")]
    NoVariables,

    #[error("leaf size must be at least 2, got {0}")]
    LeafSizeTooSmall(usize),

    #[error("tree div masks require per-entry div masks")]
    TreeMaskWithoutEntryMask,

    #[error("rebuild ratio must be positive and finite, got {0}")]
    InvalidRebuildRatio(f64),
}

/// Result type for fallible construction.
pub type Result<T> = std::result::Result<T, ConfigError>;
