//! RMS measurement and full-band gain
//!
//! Everything here works on the raw integer sample values, across all
//! channels at once.

use crate::{db_to_linear, linear_to_db, NORMALIZE_HEADROOM_DB};
use booster_core::SampleBuffer;

/// Loudness measurement and full-scale normalization
///
/// # Example
///
/// ```ignore
/// use booster_loudness::LoudnessNormalizer;
///
/// let normalizer = LoudnessNormalizer::new();
/// let rms = LoudnessNormalizer::rms(&buffer);
/// let normalized = normalizer.normalize(buffer);
/// ```
#[derive(Debug, Clone)]
pub struct LoudnessNormalizer {
    /// Headroom below full scale left by `normalize`, in dB
    headroom_db: f64,
}

impl LoudnessNormalizer {
    /// Create a normalizer with the default 0.1 dB headroom
    pub fn new() -> Self {
        Self {
            headroom_db: NORMALIZE_HEADROOM_DB,
        }
    }

    /// Create a normalizer with custom headroom
    pub fn with_headroom_db(headroom_db: f64) -> Self {
        Self {
            headroom_db: headroom_db.max(0.0),
        }
    }

    /// Headroom in dB
    pub fn headroom_db(&self) -> f64 {
        self.headroom_db
    }

    /// Root-mean-square of every sample in the buffer
    ///
    /// Returns 0.0 for an empty buffer.
    pub fn rms(buffer: &SampleBuffer) -> f64 {
        if buffer.is_empty() {
            return 0.0;
        }
        let sum_squares: f64 = buffer
            .samples()
            .iter()
            .map(|&s| {
                let s = f64::from(s);
                s * s
            })
            .sum();
        (sum_squares / buffer.len() as f64).sqrt()
    }

    /// Largest absolute sample value
    pub fn peak(buffer: &SampleBuffer) -> u32 {
        buffer
            .samples()
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0)
    }

    /// RMS level relative to full scale, in dB
    ///
    /// Silence reports negative infinity.
    pub fn rms_dbfs(buffer: &SampleBuffer) -> f64 {
        let full_scale = f64::from(buffer.sample_width().max_value());
        linear_to_db(Self::rms(buffer) / full_scale)
    }

    /// Scale every sample by `gain_db`
    ///
    /// Results are rounded to the nearest integer and are not limited to the
    /// sample width's range; `ClipGuard` handles overs at the end of the
    /// pipeline.
    pub fn apply_gain_db(buffer: SampleBuffer, gain_db: f64) -> SampleBuffer {
        let factor = db_to_linear(gain_db);
        Self::scale(buffer, factor, None)
    }

    /// Peak-normalize to full scale minus the configured headroom
    ///
    /// Silent buffers are returned unchanged. Output is limited to the
    /// sample width's range.
    pub fn normalize(&self, buffer: SampleBuffer) -> SampleBuffer {
        let peak = Self::peak(&buffer);
        if peak == 0 {
            return buffer;
        }

        let width = buffer.sample_width();
        // Full scale is the magnitude of the most negative value (e.g. 32768)
        let full_scale = -f64::from(width.min_value());
        let target_peak = full_scale * db_to_linear(-self.headroom_db);
        let factor = target_peak / f64::from(peak);

        tracing::debug!(
            peak,
            gain_db = linear_to_db(factor),
            "Peak-normalizing buffer"
        );

        Self::scale(buffer, factor, Some((width.min_value(), width.max_value())))
    }

    fn scale(buffer: SampleBuffer, factor: f64, limits: Option<(i32, i32)>) -> SampleBuffer {
        let (lo, hi) = limits.unwrap_or((i32::MIN, i32::MAX));
        buffer.map_samples(|s| {
            (f64::from(s) * factor)
                .round()
                .clamp(f64::from(lo), f64::from(hi)) as i32
        })
    }
}

impl Default for LoudnessNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
