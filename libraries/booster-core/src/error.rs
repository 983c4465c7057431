/// Core error types for Sound Booster
use thiserror::Error;

/// Result type alias using `BoosterError`
pub type Result<T> = std::result::Result<T, BoosterError>;

/// Error type returned by every processing stage
///
/// A failing stage aborts the rest of the run; callers only ever see one of
/// these, never a partially processed buffer.
#[derive(Error, Debug)]
pub enum BoosterError {
    /// Input could not be parsed as audio
    #[error("Decode error: {0}")]
    Decode(String),

    /// Input RMS is zero, so no gain can be solved for it
    #[error("Input is silent (RMS is zero), cannot solve gain")]
    SilentInput,

    /// Sample width / channel layout the pipeline cannot process
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Sample data that breaks a buffer invariant
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Output could not be written
    #[error("Encode error: {0}")]
    Encode(String),

    /// Export requested before any run succeeded
    #[error("No processed audio available to export")]
    NothingProcessed,

    /// Run was cancelled at a stage boundary
    #[error("Processing cancelled")]
    Cancelled,

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Discriminant of a [`BoosterError`], for callers that branch on the failure class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ErrorKind {
    Decode,
    SilentInput,
    UnsupportedFormat,
    InvalidBuffer,
    InvalidConfig,
    Encode,
    NothingProcessed,
    Cancelled,
    Io,
}

impl BoosterError {
    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an unsupported format error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }

    /// Create an invalid buffer error
    pub fn invalid_buffer(msg: impl Into<String>) -> Self {
        Self::InvalidBuffer(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an encode error
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_) => ErrorKind::Decode,
            Self::SilentInput => ErrorKind::SilentInput,
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::InvalidBuffer(_) => ErrorKind::InvalidBuffer,
            Self::InvalidConfig(_) => ErrorKind::InvalidConfig,
            Self::Encode(_) => ErrorKind::Encode,
            Self::NothingProcessed => ErrorKind::NothingProcessed,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(BoosterError::SilentInput.kind(), ErrorKind::SilentInput);
        assert_eq!(BoosterError::decode("bad").kind(), ErrorKind::Decode);
        assert_eq!(
            BoosterError::unsupported("3 channels").kind(),
            ErrorKind::UnsupportedFormat
        );
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(BoosterError::from(io).kind(), ErrorKind::Io);
    }

    #[test]
    fn messages_carry_context() {
        let err = BoosterError::invalid_config("target_rms_level 50 outside [2000, 12000]");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: target_rms_level 50 outside [2000, 12000]"
        );
    }
}
