//! Post-hoc clip detection and repair
//!
//! Earlier stages are allowed to push samples past the range of the buffer's
//! sample width. `ClipGuard` runs last and hard-limits anything over
//! `max_value` to `sign(sample) * max_value`.

use booster_core::SampleBuffer;

/// Outcome of a clip scan
#[derive(Debug, Clone)]
pub struct ClippingReport {
    /// Indices (into the interleaved samples) that were repaired
    indices: Vec<usize>,
    /// Corrected buffer
    buffer: SampleBuffer,
    /// Limit the samples were held to
    max_value: i32,
}

impl ClippingReport {
    /// Whether any sample had to be repaired
    pub fn clipped(&self) -> bool {
        !self.indices.is_empty()
    }

    /// Number of repaired samples
    pub fn clipped_count(&self) -> usize {
        self.indices.len()
    }

    /// Indices of repaired samples
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Limit used for the sample width
    pub fn max_value(&self) -> i32 {
        self.max_value
    }

    /// Borrow the corrected buffer
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    /// Take the corrected buffer
    pub fn into_buffer(self) -> SampleBuffer {
        self.buffer
    }
}

/// Hard limiter for out-of-range samples
///
/// Idempotent: a second pass over its own output finds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipGuard;

impl ClipGuard {
    /// Create a clip guard
    pub fn new() -> Self {
        Self
    }

    /// Indices whose magnitude exceeds the sample width's maximum
    pub fn scan(&self, buffer: &SampleBuffer) -> Vec<usize> {
        let limit = buffer.sample_width().max_value().unsigned_abs();
        buffer
            .samples()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.unsigned_abs() > limit)
            .map(|(i, _)| i)
            .collect()
    }

    /// Limit every offending sample and report what changed
    pub fn process(&self, buffer: SampleBuffer) -> ClippingReport {
        let max_value = buffer.sample_width().max_value();
        let indices = self.scan(&buffer);

        if indices.is_empty() {
            return ClippingReport {
                indices,
                buffer,
                max_value,
            };
        }

        tracing::warn!(
            clipped = indices.len(),
            max_value,
            "Clipping detected, hard-limiting samples"
        );

        let limit = max_value.unsigned_abs();
        let buffer = buffer.map_samples(|s| {
            if s.unsigned_abs() > limit {
                s.signum() * max_value
            } else {
                s
            }
        });

        ClippingReport {
            indices,
            buffer,
            max_value,
        }
    }
}
