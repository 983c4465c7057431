//! Format ingestion
//!
//! Turns a file on disk into a `SampleBuffer` ready for the pipeline. Lossy
//! input is decoded as-is. Uncompressed input is additionally converted to
//! the configured width and rate and peak-normalized.

use crate::config::IngestSettings;
use crate::decoder::SymphoniaDecoder;
use crate::resampling::resample;
use booster_core::{AudioDecoder, BoosterError, Result, SampleBuffer};
use booster_loudness::LoudnessNormalizer;
use std::path::Path;

/// Container class, decided by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// MP3
    Lossy,
    /// WAV
    Uncompressed,
}

impl ContainerKind {
    /// Classify a path by its extension (case-insensitive)
    ///
    /// # Errors
    /// `UnsupportedFormat` for any extension other than mp3, wav or wave
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "mp3" => Ok(Self::Lossy),
            "wav" | "wave" => Ok(Self::Uncompressed),
            "" => Err(BoosterError::unsupported(format!(
                "{} has no file extension",
                path.display()
            ))),
            other => Err(BoosterError::unsupported(format!(
                "unsupported file type: .{other}"
            ))),
        }
    }
}

/// Loads files into pipeline-ready buffers
pub struct FormatIngestor<D: AudioDecoder = SymphoniaDecoder> {
    decoder: D,
    settings: IngestSettings,
}

impl FormatIngestor<SymphoniaDecoder> {
    /// Ingestor backed by the Symphonia decoder
    pub fn new(settings: IngestSettings) -> Self {
        Self::with_decoder(SymphoniaDecoder::new(), settings)
    }
}

impl<D: AudioDecoder> FormatIngestor<D> {
    /// Ingestor backed by a custom decoder
    pub fn with_decoder(decoder: D, settings: IngestSettings) -> Self {
        Self { decoder, settings }
    }

    /// Conversion settings for uncompressed input
    pub fn settings(&self) -> &IngestSettings {
        &self.settings
    }

    /// Decode and condition a file
    ///
    /// # Errors
    /// - `UnsupportedFormat` for unknown extensions
    /// - `Decode` if the file cannot be read or decoded
    /// - `InvalidConfig` for a bad target width
    pub fn load(&mut self, path: &Path) -> Result<SampleBuffer> {
        let kind = ContainerKind::from_path(path)?;
        let buffer = self.decoder.decode(path)?;

        tracing::info!(
            path = %path.display(),
            kind = ?kind,
            sample_rate = buffer.sample_rate(),
            channels = buffer.channels(),
            duration_secs = buffer.duration_secs(),
            "Loaded audio"
        );

        match kind {
            ContainerKind::Lossy => Ok(buffer),
            ContainerKind::Uncompressed => self.condition(buffer),
        }
    }

    /// Width conversion, resampling and peak normalization
    fn condition(&self, buffer: SampleBuffer) -> Result<SampleBuffer> {
        let width = self.settings.width()?;
        let buffer = buffer.with_sample_width(width);
        let buffer = resample(buffer, self.settings.sample_rate)?;
        let normalizer = LoudnessNormalizer::with_headroom_db(self.settings.headroom_db);
        Ok(normalizer.normalize(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booster_core::{AudioFormat, ErrorKind, SampleRate, SampleWidth};
    use std::path::PathBuf;

    /// Decoder that hands back a fixed buffer
    struct FixedDecoder(SampleBuffer);

    impl AudioDecoder for FixedDecoder {
        fn decode(&mut self, _path: &Path) -> Result<SampleBuffer> {
            Ok(self.0.clone())
        }

        fn supports_format(&self, _path: &Path) -> bool {
            true
        }
    }

    #[test]
    fn classifies_extensions() {
        assert_eq!(
            ContainerKind::from_path(Path::new("a.MP3")).unwrap(),
            ContainerKind::Lossy
        );
        assert_eq!(
            ContainerKind::from_path(Path::new("a.wave")).unwrap(),
            ContainerKind::Uncompressed
        );
        for bad in ["a.flac", "a.ogg", "noext"] {
            let err = ContainerKind::from_path(Path::new(bad)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        }
    }

    #[test]
    fn lossy_input_is_passed_through() {
        let format = AudioFormat::new(SampleRate::CD_QUALITY, 2, SampleWidth::Two);
        let buffer = SampleBuffer::new(vec![100, -100, 50, -50], format).unwrap();
        let mut ingestor =
            FormatIngestor::with_decoder(FixedDecoder(buffer.clone()), IngestSettings::default());
        let loaded = ingestor.load(&PathBuf::from("song.mp3")).unwrap();
        assert_eq!(loaded, buffer);
    }

    #[test]
    fn uncompressed_input_is_conditioned() {
        let format = AudioFormat::new(SampleRate::DVD_QUALITY, 1, SampleWidth::Four);
        let buffer = SampleBuffer::new(vec![1 << 20, -(1 << 20), 0, 1 << 19], format).unwrap();
        let mut ingestor =
            FormatIngestor::with_decoder(FixedDecoder(buffer), IngestSettings::default());
        let loaded = ingestor.load(&PathBuf::from("song.wav")).unwrap();

        assert_eq!(loaded.sample_width(), SampleWidth::Two);
        assert_eq!(loaded.sample_rate(), 48_000);
        // 32768 * 10^(-0.1/20)
        assert_eq!(LoudnessNormalizer::peak(&loaded), 32393);
    }

    #[test]
    fn silent_wav_is_not_normalized() {
        let buffer = SampleBuffer::silent(16, AudioFormat::pcm16(48_000, 1)).unwrap();
        let mut ingestor =
            FormatIngestor::with_decoder(FixedDecoder(buffer.clone()), IngestSettings::default());
        assert_eq!(ingestor.load(Path::new("quiet.wav")).unwrap(), buffer);
    }

    #[test]
    fn unsupported_extension_skips_decoding() {
        let buffer = SampleBuffer::silent(16, AudioFormat::pcm16(48_000, 1)).unwrap();
        let mut ingestor =
            FormatIngestor::with_decoder(FixedDecoder(buffer), IngestSettings::default());
        let err = ingestor.load(Path::new("song.flac")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }
}
