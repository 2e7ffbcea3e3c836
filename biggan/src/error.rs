use thiserror::Error;

/// The error type for `biggan-burn` operations.
///
/// Every error is fatal to the call that produced it; nothing is retried or recovered
/// internally.
#[derive(Error, Debug)]
pub enum BigGanError {
    /// Error for when the upsampling ratio has no channel schedule.
    #[error("Unsupported upsampling ratio: {ratio} (expected one of 8, 16, 32)")]
    UnsupportedRatio {
        /// The requested ratio.
        ratio: usize,
    },

    /// Error for when a backbone preset is requested that does not exist.
    #[error("Backbone not implemented: {backbone}")]
    NotImplemented {
        /// The name of the requested backbone.
        backbone: String,
    },

    /// Error for when an invalid decoder configuration is provided.
    /// This can happen if configuration parameters are logically inconsistent.
    #[error("Invalid decoder configuration: {reason}")]
    InvalidConfiguration {
        /// The reason why the configuration is invalid.
        reason: String,
    },

    /// Error for when an input tensor has an invalid shape.
    #[error("Invalid input tensor shape: expected {expected}, got {actual}")]
    InvalidTensorShape {
        /// The expected tensor shape.
        expected: String,
        /// The actual tensor shape.
        actual: String,
    },
}

/// A specialized `Result` type for `biggan-burn` operations.
pub type BigGanResult<T> = Result<T, BigGanError>;
