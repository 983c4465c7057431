/// Audio-related types
use crate::error::{BoosterError, Result};
use serde::{Deserialize, Serialize};

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// Common sample rates
    pub const CD_QUALITY: Self = Self(44_100);
    pub const DVD_QUALITY: Self = Self(48_000);

    /// Create a new sample rate
    #[must_use]
    pub fn new(hz: u32) -> Self {
        Self(hz)
    }

    /// Get the sample rate as Hz
    pub fn as_hz(&self) -> u32 {
        self.0
    }
}

/// Bytes per sample
///
/// Samples are stored as `i32` regardless of width; the width decides the
/// representable range and what the encoder writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleWidth {
    /// 8-bit
    One,
    /// 16-bit
    Two,
    /// 32-bit
    Four,
}

impl SampleWidth {
    /// Map a byte count to a width
    ///
    /// # Errors
    /// `UnsupportedFormat` for anything other than 1, 2 or 4 bytes
    pub fn from_bytes(bytes: u16) -> Result<Self> {
        match bytes {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            other => Err(BoosterError::unsupported(format!(
                "sample width of {other} bytes (expected 1, 2 or 4)"
            ))),
        }
    }

    /// Bytes per sample
    pub fn bytes(self) -> u16 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
        }
    }

    /// Bits per sample
    pub fn bits(self) -> u16 {
        self.bytes() * 8
    }

    /// Largest representable sample value
    pub fn max_value(self) -> i32 {
        match self {
            Self::One => i32::from(i8::MAX),
            Self::Two => i32::from(i16::MAX),
            Self::Four => i32::MAX,
        }
    }

    /// Smallest representable sample value
    pub fn min_value(self) -> i32 {
        match self {
            Self::One => i32::from(i8::MIN),
            Self::Two => i32::from(i16::MIN),
            Self::Four => i32::MIN,
        }
    }
}

/// Audio format information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Sample rate
    pub sample_rate: SampleRate,

    /// Number of channels (1 = mono, 2 = stereo, etc.)
    pub channels: u16,

    /// Bytes per sample
    pub sample_width: SampleWidth,
}

impl AudioFormat {
    /// Create a new audio format
    pub fn new(sample_rate: SampleRate, channels: u16, sample_width: SampleWidth) -> Self {
        Self {
            sample_rate,
            channels,
            sample_width,
        }
    }

    /// 16-bit PCM at the given rate and channel count
    pub fn pcm16(sample_rate: u32, channels: u16) -> Self {
        Self::new(SampleRate::new(sample_rate), channels, SampleWidth::Two)
    }

    /// Calculate the byte rate (bytes per second)
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate.as_hz() * u32::from(self.channels) * u32::from(self.sample_width.bytes())
    }

    fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(BoosterError::unsupported("zero channels"));
        }
        if self.sample_rate.as_hz() == 0 {
            return Err(BoosterError::unsupported("sample rate of 0 Hz"));
        }
        Ok(())
    }
}

/// Buffer of decoded PCM samples
///
/// Samples are signed integers, interleaved (`[L, R, L, R, ...]` for stereo).
/// The sample count is always a multiple of the channel count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleBuffer {
    samples: Vec<i32>,
    format: AudioFormat,
}

impl SampleBuffer {
    /// Create a new sample buffer
    ///
    /// # Errors
    /// - `UnsupportedFormat` if the format has zero channels or a zero sample rate
    /// - `InvalidBuffer` if the sample count is not a multiple of the channel count
    pub fn new(samples: Vec<i32>, format: AudioFormat) -> Result<Self> {
        format.validate()?;
        if samples.len() % usize::from(format.channels) != 0 {
            return Err(BoosterError::invalid_buffer(format!(
                "{} samples is not a multiple of {} channels",
                samples.len(),
                format.channels
            )));
        }
        Ok(Self { samples, format })
    }

    /// Buffer of `frames` frames of digital silence
    pub fn silent(frames: usize, format: AudioFormat) -> Result<Self> {
        Self::new(vec![0; frames * usize::from(format.channels)], format)
    }

    /// Interleave per-channel sample vectors into one buffer
    ///
    /// Channels shorter than the longest one are padded with silence.
    pub fn from_channels(
        channels: &[Vec<i32>],
        sample_rate: SampleRate,
        width: SampleWidth,
    ) -> Result<Self> {
        let count = u16::try_from(channels.len())
            .map_err(|_| BoosterError::unsupported(format!("{} channels", channels.len())))?;
        let format = AudioFormat::new(sample_rate, count, width);
        format.validate()?;

        let frames = channels.iter().map(Vec::len).max().unwrap_or(0);
        let mut samples = Vec::with_capacity(frames * channels.len());
        for frame in 0..frames {
            for channel in channels {
                samples.push(channel.get(frame).copied().unwrap_or(0));
            }
        }

        Ok(Self { samples, format })
    }

    /// New buffer with the same format and different samples
    pub fn spawn(&self, samples: Vec<i32>) -> Result<Self> {
        Self::new(samples, self.format)
    }

    /// Apply `f` to every sample, keeping the format
    pub fn map_samples(self, f: impl FnMut(i32) -> i32) -> Self {
        Self {
            samples: self.samples.into_iter().map(f).collect(),
            format: self.format,
        }
    }

    /// Borrow the interleaved samples
    pub fn samples(&self) -> &[i32] {
        &self.samples
    }

    /// Take the interleaved samples
    pub fn into_samples(self) -> Vec<i32> {
        self.samples
    }

    /// Format metadata
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.format.sample_rate.as_hz()
    }

    /// Number of channels
    pub fn channels(&self) -> usize {
        usize::from(self.format.channels)
    }

    /// Sample width
    pub fn sample_width(&self) -> SampleWidth {
        self.format.sample_width
    }

    /// Get the number of frames (samples per channel)
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels()
    }

    /// Get the duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate())
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get the length in samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// De-interleave into one vector per channel
    pub fn split_channels(&self) -> Vec<Vec<i32>> {
        let channels = self.channels();
        (0..channels)
            .map(|ch| self.samples.iter().skip(ch).step_by(channels).copied().collect())
            .collect()
    }

    /// Same samples, labelled with a different sample rate
    ///
    /// The data is untouched, so playback at the new rate changes pitch and
    /// duration together.
    pub fn reinterpret_rate(mut self, sample_rate: u32) -> Result<Self> {
        self.format.sample_rate = SampleRate::new(sample_rate);
        self.format.validate()?;
        Ok(self)
    }

    /// Convert to a different sample width by shifting bits
    ///
    /// Widening shifts left, narrowing shifts right (arithmetic). Values that
    /// already exceed the source range keep their relative headroom and are
    /// only limited to the `i32` range.
    pub fn with_sample_width(self, width: SampleWidth) -> Self {
        let from = self.format.sample_width;
        if from == width {
            return self;
        }

        let samples = if width.bits() > from.bits() {
            let shift = u32::from(width.bits() - from.bits());
            self.samples
                .into_iter()
                .map(|s| {
                    (i64::from(s) << shift).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
                })
                .collect()
        } else {
            let shift = u32::from(from.bits() - width.bits());
            self.samples.into_iter().map(|s| s >> shift).collect()
        };

        Self {
            samples,
            format: AudioFormat {
                sample_width: width,
                ..self.format
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_rate_common_values() {
        assert_eq!(SampleRate::CD_QUALITY.as_hz(), 44_100);
        assert_eq!(SampleRate::DVD_QUALITY.as_hz(), 48_000);
    }

    #[test]
    fn sample_width_ranges() {
        assert_eq!(SampleWidth::One.max_value(), 127);
        assert_eq!(SampleWidth::Two.max_value(), 32767);
        assert_eq!(SampleWidth::Two.min_value(), -32768);
        assert_eq!(SampleWidth::Four.max_value(), i32::MAX);
        assert!(SampleWidth::from_bytes(3).is_err());
        assert_eq!(SampleWidth::from_bytes(2).unwrap(), SampleWidth::Two);
    }

    #[test]
    fn audio_format_byte_rate() {
        let format = AudioFormat::pcm16(44_100, 2);
        // 44100 Hz * 2 channels * 2 bytes = 176,400 bytes/sec
        assert_eq!(format.byte_rate(), 176_400);
    }

    #[test]
    fn buffer_rejects_partial_frames() {
        let format = AudioFormat::pcm16(48_000, 2);
        let err = SampleBuffer::new(vec![0; 3], format).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidBuffer);
    }

    #[test]
    fn buffer_rejects_zero_channels() {
        let format = AudioFormat::pcm16(48_000, 0);
        let err = SampleBuffer::new(vec![], format).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn buffer_frames_and_duration() {
        let format = AudioFormat::pcm16(48_000, 2);
        // 96000 samples with 2 channels = 48000 frames = 1 second
        let buffer = SampleBuffer::new(vec![0; 96_000], format).unwrap();
        assert_eq!(buffer.frames(), 48_000);
        assert!((buffer.duration_secs() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn split_and_interleave_round_trip() {
        let format = AudioFormat::pcm16(48_000, 2);
        let buffer = SampleBuffer::new(vec![1, -1, 2, -2, 3, -3], format).unwrap();
        let channels = buffer.split_channels();
        assert_eq!(channels, vec![vec![1, 2, 3], vec![-1, -2, -3]]);

        let rebuilt =
            SampleBuffer::from_channels(&channels, format.sample_rate, format.sample_width)
                .unwrap();
        assert_eq!(rebuilt, buffer);
    }

    #[test]
    fn from_channels_pads_short_channel() {
        let rebuilt = SampleBuffer::from_channels(
            &[vec![1, 2, 3], vec![9]],
            SampleRate::DVD_QUALITY,
            SampleWidth::Two,
        )
        .unwrap();
        assert_eq!(rebuilt.samples(), &[1, 9, 2, 0, 3, 0]);
    }

    #[test]
    fn reinterpret_rate_keeps_data() {
        let format = AudioFormat::pcm16(48_000, 1);
        let buffer = SampleBuffer::new(vec![5, 6, 7], format).unwrap();
        let shifted = buffer.clone().reinterpret_rate(56_000).unwrap();
        assert_eq!(shifted.samples(), buffer.samples());
        assert_eq!(shifted.sample_rate(), 56_000);
        assert!(shifted.duration_secs() < buffer.duration_secs());
    }

    #[test]
    fn sample_width_conversion_shifts_bits() {
        let format = AudioFormat::new(SampleRate::DVD_QUALITY, 1, SampleWidth::Four);
        let buffer = SampleBuffer::new(vec![i32::MAX, -65536, 131072], format).unwrap();
        let narrowed = buffer.with_sample_width(SampleWidth::Two);
        assert_eq!(narrowed.samples(), &[32767, -1, 2]);
        assert_eq!(narrowed.sample_width(), SampleWidth::Two);

        let widened = narrowed.with_sample_width(SampleWidth::Four);
        assert_eq!(widened.samples(), &[32767 << 16, -65536, 131072]);
    }
}
