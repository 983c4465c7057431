/// Codec traits consumed by the processing pipeline
use crate::error::Result;
use crate::types::SampleBuffer;
use std::path::Path;

/// Audio decoder trait
///
/// Implementers turn an audio file into a `SampleBuffer`. Containers are
/// decoded whole; the pipeline never streams.
pub trait AudioDecoder: Send {
    /// Decode an audio file from the given path
    ///
    /// # Errors
    /// Returns `BoosterError::Decode` if the file cannot be read or parsed
    fn decode(&mut self, path: &Path) -> Result<SampleBuffer>;

    /// Check if the decoder supports the given file format
    fn supports_format(&self, path: &Path) -> bool;
}

/// Audio encoder trait
///
/// Implementers write a finished `SampleBuffer` to disk.
pub trait AudioEncoder: Send {
    /// Write the buffer to `path`
    ///
    /// # Errors
    /// Returns `BoosterError::Encode` if the container cannot be written
    fn export(&self, buffer: &SampleBuffer, path: &Path) -> Result<()>;

    /// File extension produced by this encoder (without the dot)
    fn extension(&self) -> &str;
}
