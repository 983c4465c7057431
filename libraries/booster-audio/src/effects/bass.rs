//! Window-wise bass analysis and attenuation
//!
//! `BandEnergyAnalyzer` cuts a buffer into fixed-length windows of
//! interleaved samples and flags the ones whose mean energy is above a
//! threshold. `BassAttenuator` band-limits each flagged window (low-pass,
//! then high-pass), cuts it by a fixed amount, and stitches the windows back
//! together.

use super::filter::OnePoleFilter;
use booster_core::{BoosterError, Result, SampleBuffer};
use booster_loudness::LoudnessNormalizer;
use serde::{Deserialize, Serialize};

/// Interleaved samples per analysis window
pub const WINDOW_SAMPLES: usize = 5000;

/// Energy above which a window counts as bass-heavy
pub const BASS_THRESHOLD: f64 = -2.0;

/// Low-pass cutoff applied to flagged windows
pub const LOW_PASS_HZ: f64 = 350.0;

/// High-pass cutoff applied to flagged windows
pub const HIGH_PASS_HZ: f64 = 40.0;

/// Cut applied to flagged windows after filtering
pub const BASS_CUT_DB: f64 = 5.0;

/// One analysis window
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    /// Position of the window in the buffer
    pub index: usize,
    /// Offset of the first sample (interleaved)
    pub start: usize,
    /// Interleaved samples
    pub samples: Vec<i32>,
    /// Mean squared sample value
    pub energy: f64,
    /// Whether the window was flagged for attenuation
    pub bass_heavy: bool,
}

impl Window {
    /// Number of interleaved samples in the window
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the window holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Mean of squared sample values
fn mean_energy(samples: &[i32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples
        .iter()
        .map(|&s| {
            let s = f64::from(s);
            s * s
        })
        .sum();
    sum / samples.len() as f64
}

/// Windowed energy analyzer
#[derive(Debug, Clone)]
pub struct BandEnergyAnalyzer {
    window_samples: usize,
    threshold: f64,
}

impl BandEnergyAnalyzer {
    /// Create an analyzer
    pub fn new(window_samples: usize, threshold: f64) -> Self {
        Self {
            window_samples,
            threshold,
        }
    }

    /// Interleaved samples per window
    pub fn window_samples(&self) -> usize {
        self.window_samples
    }

    /// Flagging threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether a window with `energy` counts as bass-heavy
    pub fn is_bass_heavy(&self, energy: f64) -> bool {
        energy > self.threshold
    }

    /// Split into `ceil(len / window_samples)` windows with their energy
    ///
    /// The last window holds the remainder. No window is flagged yet.
    ///
    /// # Errors
    /// `InvalidConfig` unless the window length is a positive multiple of
    /// the channel count
    pub fn partition(&self, buffer: &SampleBuffer) -> Result<Vec<Window>> {
        let channels = buffer.channels();
        if self.window_samples == 0 || self.window_samples % channels != 0 {
            return Err(BoosterError::invalid_config(format!(
                "window of {} samples is not a positive multiple of {} channels",
                self.window_samples, channels
            )));
        }

        Ok(buffer
            .samples()
            .chunks(self.window_samples)
            .enumerate()
            .map(|(index, chunk)| Window {
                index,
                start: index * self.window_samples,
                samples: chunk.to_vec(),
                energy: mean_energy(chunk),
                bass_heavy: false,
            })
            .collect())
    }

    /// Partition and flag bass-heavy windows
    pub fn analyze(&self, buffer: &SampleBuffer) -> Result<Vec<Window>> {
        let mut windows = self.partition(buffer)?;
        for window in &mut windows {
            window.bass_heavy = self.is_bass_heavy(window.energy);
        }

        let flagged = windows.iter().filter(|w| w.bass_heavy).count();
        tracing::debug!(
            windows = windows.len(),
            flagged,
            threshold = self.threshold,
            "Analyzed window energy"
        );

        Ok(windows)
    }
}

impl Default for BandEnergyAnalyzer {
    fn default() -> Self {
        Self::new(WINDOW_SAMPLES, BASS_THRESHOLD)
    }
}

/// How windows are stitched back together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReassemblyMode {
    /// Every window in order; flagged windows processed, others as-is
    #[default]
    Concatenate,
    /// Only the processed flagged windows, in order
    FlaggedOnly,
}

impl ReassemblyMode {
    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "concatenate" => Some(Self::Concatenate),
            "flagged-only" | "flagged_only" => Some(Self::FlaggedOnly),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Concatenate => "concatenate",
            Self::FlaggedOnly => "flagged-only",
        }
    }
}

/// Band-limit and cut flagged windows
#[derive(Debug, Clone)]
pub struct BassAttenuator {
    low_pass_hz: f64,
    high_pass_hz: f64,
    cut_db: f64,
    reassembly: ReassemblyMode,
}

impl BassAttenuator {
    /// Create an attenuator
    pub fn new(low_pass_hz: f64, high_pass_hz: f64, cut_db: f64) -> Self {
        Self {
            low_pass_hz,
            high_pass_hz,
            cut_db,
            reassembly: ReassemblyMode::default(),
        }
    }

    /// Set the reassembly mode
    #[must_use]
    pub fn with_reassembly(mut self, reassembly: ReassemblyMode) -> Self {
        self.reassembly = reassembly;
        self
    }

    /// Reassembly mode
    pub fn reassembly(&self) -> ReassemblyMode {
        self.reassembly
    }

    /// Band-limit and cut one window's samples
    fn attenuate(
        &self,
        samples: &[i32],
        buffer: &SampleBuffer,
        low_pass: &OnePoleFilter,
        high_pass: &OnePoleFilter,
    ) -> Result<Vec<i32>> {
        let mut filtered = samples.to_vec();
        low_pass.process(&mut filtered, buffer.channels());
        high_pass.process(&mut filtered, buffer.channels());

        let segment = buffer.spawn(filtered)?;
        Ok(LoudnessNormalizer::apply_gain_db(segment, -self.cut_db).into_samples())
    }

    /// Process `windows` (from `buffer`) and reassemble them
    ///
    /// In `FlaggedOnly` mode a run with no flagged windows yields an empty
    /// buffer.
    ///
    /// # Errors
    /// `InvalidConfig` for a non-positive filter cutoff
    pub fn process(&self, buffer: &SampleBuffer, windows: &[Window]) -> Result<SampleBuffer> {
        let low_pass = OnePoleFilter::low_pass(self.low_pass_hz, buffer.sample_rate())?;
        let high_pass = OnePoleFilter::high_pass(self.high_pass_hz, buffer.sample_rate())?;

        let mut output = Vec::with_capacity(buffer.len());
        let mut dropped = 0usize;

        for window in windows {
            if window.bass_heavy {
                output.extend(self.attenuate(&window.samples, buffer, &low_pass, &high_pass)?);
            } else {
                match self.reassembly {
                    ReassemblyMode::Concatenate => output.extend_from_slice(&window.samples),
                    ReassemblyMode::FlaggedOnly => dropped += 1,
                }
            }
        }

        if dropped > 0 {
            tracing::warn!(
                dropped,
                total = windows.len(),
                "Dropping unflagged windows from output"
            );
        }

        tracing::debug!(
            flagged = windows.iter().filter(|w| w.bass_heavy).count(),
            reassembly = self.reassembly.as_str(),
            output_samples = output.len(),
            "Attenuated bass windows"
        );

        buffer.spawn(output)
    }
}

impl Default for BassAttenuator {
    fn default() -> Self {
        Self::new(LOW_PASS_HZ, HIGH_PASS_HZ, BASS_CUT_DB)
    }
}
