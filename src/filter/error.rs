use std::fmt;

use thiserror::Error;

/// Which buffer failed a size check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferRole {
    Input,
    Output,
}

impl fmt::Display for BufferRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferRole::Input => write!(f, "input"),
            BufferRole::Output => write!(f, "output"),
        }
    }
}

/// Pixel filter errors. Recoverable: the offending frame is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("{role} buffer size mismatch: expected {expected} bytes, got {actual}")]
    DimensionMismatch {
        role: BufferRole,
        expected: usize,
        actual: usize,
    },

    #[error("unsupported filter selector: {0}")]
    UnsupportedSelector(u8),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, FilterError>;
