/// WAV export using hound
use booster_core::{AudioEncoder, BoosterError, Result, SampleBuffer};
use std::path::Path;

/// Integer PCM WAV writer
///
/// Writes the buffer's own rate, channel count and sample width. Samples
/// must already be in range for the width (run `ClipGuard` first).
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEncoder;

impl WavEncoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self
    }

    fn spec(buffer: &SampleBuffer) -> hound::WavSpec {
        hound::WavSpec {
            channels: buffer.format().channels,
            sample_rate: buffer.sample_rate(),
            bits_per_sample: buffer.sample_width().bits(),
            sample_format: hound::SampleFormat::Int,
        }
    }
}

impl AudioEncoder for WavEncoder {
    fn export(&self, buffer: &SampleBuffer, path: &Path) -> Result<()> {
        let width = buffer.sample_width();
        if let Some(position) = buffer
            .samples()
            .iter()
            .position(|&s| s < width.min_value() || s > width.max_value())
        {
            return Err(BoosterError::encode(format!(
                "sample {} at index {} is out of range for {}-bit output",
                buffer.samples()[position],
                position,
                width.bits()
            )));
        }

        let mut writer = hound::WavWriter::create(path, Self::spec(buffer)).map_err(|e| {
            BoosterError::encode(format!("failed to create {}: {}", path.display(), e))
        })?;

        for &sample in buffer.samples() {
            let written = match width.bits() {
                8 => writer.write_sample(sample as i8),
                16 => writer.write_sample(sample as i16),
                _ => writer.write_sample(sample),
            };
            written.map_err(|e| BoosterError::encode(format!("write failed: {}", e)))?;
        }

        writer
            .finalize()
            .map_err(|e| BoosterError::encode(format!("failed to finalize WAV: {}", e)))?;

        tracing::debug!(
            path = %path.display(),
            frames = buffer.frames(),
            channels = buffer.channels(),
            bits = width.bits(),
            "Exported WAV"
        );

        Ok(())
    }

    fn extension(&self) -> &str {
        "wav"
    }
}
