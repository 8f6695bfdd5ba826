//! Error handling for the NScope framework
//!
//! Provides the error types shared by every crate in the workspace.

use core::fmt;

/// Result type alias for NScope operations
pub type ScopeResult<T> = Result<T, ScopeError>;

/// Error type for all NScope operations
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ScopeError {
    /// Requested stream name is not known to the acquisition source
    UnknownStream {
        /// The stream name that was requested
        name: String,
    },

    /// Band-pass cutoffs are non-monotonic or outside the valid normalized range
    InvalidFilterConfig {
        /// Description of the configuration error
        reason: String,
    },

    /// Chunk channel count does not match the buffer it is appended to
    ChannelMismatch {
        /// Channel count the buffer was allocated for
        expected: usize,
        /// Channel count carried by the chunk
        actual: usize,
    },

    /// Chunk data cannot be interpreted with the declared channel count
    MalformedChunk {
        /// Description of the shape issue
        reason: String,
    },

    /// Failure raised by the acquisition collaborator, propagated unmodified
    Source {
        /// Upstream error description
        message: String,
    },
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeError::UnknownStream { name } => {
                write!(f, "Unknown stream: '{}' is not exposed by the acquisition source", name)
            }
            ScopeError::InvalidFilterConfig { reason } => {
                write!(f, "Invalid filter configuration: {}", reason)
            }
            ScopeError::ChannelMismatch { expected, actual } => {
                write!(f, "Channel mismatch: buffer holds {} channels, chunk carries {}",
                       expected, actual)
            }
            ScopeError::MalformedChunk { reason } => {
                write!(f, "Malformed chunk: {}", reason)
            }
            ScopeError::Source { message } => {
                write!(f, "Acquisition source error: {}", message)
            }
        }
    }
}

impl std::error::Error for ScopeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ScopeError::ChannelMismatch {
            expected: 16,
            actual: 17,
        };
        let display = format!("{}", error);
        assert!(display.contains("Channel mismatch"));
        assert!(display.contains("16"));
        assert!(display.contains("17"));
    }

    #[test]
    fn test_error_equality() {
        let error1 = ScopeError::UnknownStream {
            name: "openbci_eeg".to_string(),
        };
        let error2 = ScopeError::UnknownStream {
            name: "openbci_eeg".to_string(),
        };
        assert_eq!(error1, error2);
    }
}
