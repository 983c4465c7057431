//! One-pole RC filters
//!
//! Discrete RC low-pass and high-pass sections over interleaved integer
//! samples. State is per channel and seeded from the first frame of each
//! call, so every call filters its input as an independent segment.

use booster_core::{BoosterError, Result};

/// Filter response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Attenuate above the cutoff
    LowPass,
    /// Attenuate below the cutoff
    HighPass,
}

/// First-order RC filter
#[derive(Debug, Clone, Copy)]
pub struct OnePoleFilter {
    kind: FilterKind,
    cutoff_hz: f64,
    alpha: f64,
}

impl OnePoleFilter {
    /// Low-pass at `cutoff_hz`
    pub fn low_pass(cutoff_hz: f64, sample_rate: u32) -> Result<Self> {
        Self::new(FilterKind::LowPass, cutoff_hz, sample_rate)
    }

    /// High-pass at `cutoff_hz`
    pub fn high_pass(cutoff_hz: f64, sample_rate: u32) -> Result<Self> {
        Self::new(FilterKind::HighPass, cutoff_hz, sample_rate)
    }

    /// Create a filter of the given kind
    ///
    /// # Errors
    /// `InvalidConfig` for a non-positive cutoff or sample rate
    pub fn new(kind: FilterKind, cutoff_hz: f64, sample_rate: u32) -> Result<Self> {
        if !(cutoff_hz.is_finite() && cutoff_hz > 0.0) {
            return Err(BoosterError::invalid_config(format!(
                "filter cutoff must be positive, got {cutoff_hz} Hz"
            )));
        }
        if sample_rate == 0 {
            return Err(BoosterError::invalid_config("filter sample rate of 0 Hz"));
        }

        let rc = 1.0 / (2.0 * std::f64::consts::PI * cutoff_hz);
        let dt = 1.0 / f64::from(sample_rate);
        let alpha = match kind {
            FilterKind::LowPass => dt / (rc + dt),
            FilterKind::HighPass => rc / (rc + dt),
        };

        Ok(Self {
            kind,
            cutoff_hz,
            alpha,
        })
    }

    /// Filter response
    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    /// Cutoff frequency in Hz
    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }

    /// Smoothing coefficient
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Filter interleaved samples in place
    ///
    /// The first frame passes through unchanged. Outputs are truncated
    /// toward zero; the running state keeps full precision.
    pub fn process(&self, samples: &mut [i32], channels: usize) {
        if channels == 0 || samples.len() < channels {
            return;
        }

        // Running output per channel
        let mut state: Vec<f64> = samples[..channels].iter().map(|&s| f64::from(s)).collect();
        // Previous raw input per channel (high-pass only)
        let mut previous: Vec<i32> = samples[..channels].to_vec();

        for frame in samples[channels..].chunks_mut(channels) {
            for (ch, sample) in frame.iter_mut().enumerate() {
                let input = *sample;
                let y = &mut state[ch];
                match self.kind {
                    FilterKind::LowPass => {
                        *y += self.alpha * (f64::from(input) - *y);
                    }
                    FilterKind::HighPass => {
                        *y = self.alpha * (*y + f64::from(input) - f64::from(previous[ch]));
                        previous[ch] = input;
                    }
                }
                *sample = *y as i32;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_cutoff() {
        assert!(OnePoleFilter::low_pass(0.0, 48_000).is_err());
        assert!(OnePoleFilter::high_pass(-40.0, 48_000).is_err());
        assert!(OnePoleFilter::low_pass(f64::NAN, 48_000).is_err());
        assert!(OnePoleFilter::low_pass(350.0, 0).is_err());
    }

    #[test]
    fn coefficients() {
        let lp = OnePoleFilter::low_pass(350.0, 48_000).unwrap();
        let hp = OnePoleFilter::high_pass(40.0, 48_000).unwrap();
        assert!(lp.alpha() > 0.0 && lp.alpha() < 0.1);
        assert!(hp.alpha() > 0.99 && hp.alpha() < 1.0);
        assert_eq!(lp.kind(), FilterKind::LowPass);
    }

    #[test]
    fn first_frame_passes_through() {
        let lp = OnePoleFilter::low_pass(350.0, 48_000).unwrap();
        let mut samples = vec![1234, -500, 0, 0];
        lp.process(&mut samples, 2);
        assert_eq!(&samples[..2], &[1234, -500]);
    }

    #[test]
    fn low_pass_keeps_dc() {
        let lp = OnePoleFilter::low_pass(350.0, 48_000).unwrap();
        let mut samples = vec![1000; 2000];
        lp.process(&mut samples, 1);
        assert!(samples.iter().all(|&s| s == 1000));
    }

    #[test]
    fn high_pass_removes_dc() {
        let hp = OnePoleFilter::high_pass(40.0, 48_000).unwrap();
        let mut samples = vec![10_000; 48_000];
        hp.process(&mut samples, 1);
        assert_eq!(samples[0], 10_000);
        assert!(samples[47_999].abs() < 10, "residual {}", samples[47_999]);
    }

    #[test]
    fn low_pass_attenuates_high_frequency() {
        let lp = OnePoleFilter::low_pass(350.0, 48_000).unwrap();
        // Nyquist-rate square wave
        let mut samples: Vec<i32> = (0..4800)
            .map(|i| if i % 2 == 0 { 10_000 } else { -10_000 })
            .collect();
        lp.process(&mut samples, 1);
        let tail_peak = samples[100..].iter().map(|s| s.abs()).max().unwrap();
        assert!(tail_peak < 1000, "tail peak {tail_peak}");
    }

    #[test]
    fn channels_are_independent() {
        let lp = OnePoleFilter::low_pass(350.0, 48_000).unwrap();
        let mut samples: Vec<i32> = (0..200).flat_map(|_| [5000, 0]).collect();
        lp.process(&mut samples, 2);
        assert!(samples.chunks(2).all(|f| f[0] == 5000 && f[1] == 0));
    }
}
