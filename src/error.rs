//! Error types for fiwgan
//!
//! Every failure the training system can report, with enough context to act
//! on it without reading the source.

use thiserror::Error;

/// Result type alias for fiwgan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by training, data loading and persistence
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or inconsistent run configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Requested variant or mode is not implemented
    #[error("Not implemented: {0}\n  → Supported loss variants: dcgan, lsgan, wgan, wgan-gp")]
    NotImplemented(String),

    /// Tensor or batch shape differs from what the run expects
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch { expected: Vec<usize>, actual: Vec<usize> },

    /// The batch schedule for the current epoch is exhausted
    #[error("End of data: batch schedule exhausted")]
    EndOfData,

    /// A loss evaluated to NaN or infinity
    #[error("Non-finite {name} at step {step}: {value}\n  → Lower the learning rate or check the input data")]
    NonFinite { name: String, step: u64, value: f32 },

    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Audio decoding or encoding failure
    #[error("Audio error: {0}")]
    Audio(String),
}

impl Error {
    /// Whether the error only ends the current epoch rather than the run
    pub fn is_end_of_data(&self) -> bool {
        matches!(self, Self::EndOfData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_message_names_step() {
        let err = Error::NonFinite { name: "D_loss".into(), step: 12, value: f32::NAN };
        let msg = err.to_string();
        assert!(msg.contains("D_loss"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_end_of_data());
        assert!(Error::EndOfData.is_end_of_data());
    }
}
