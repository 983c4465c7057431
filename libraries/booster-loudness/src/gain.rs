//! Target-RMS gain solving
//!
//! The solver compares the buffer's RMS against a user-chosen target and
//! derives a dB figure from the ratio. By default that figure is *subtracted*
//! from the signal, so a higher target means less boost; the figure is capped
//! at [`MAX_GAIN_DB`] and has no floor.

use crate::normalizer::LoudnessNormalizer;
use crate::{db_to_linear, MAX_GAIN_DB, MAX_TARGET_RMS, MIN_TARGET_RMS};
use booster_core::{BoosterError, Result, SampleBuffer};
use serde::{Deserialize, Serialize};

/// Loudness goal chosen by the user, in raw sample units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct TargetRmsLevel(u32);

impl TargetRmsLevel {
    /// Create a target level
    ///
    /// # Errors
    /// `InvalidConfig` when `level` is outside `[2000, 12000]`
    pub fn new(level: u32) -> Result<Self> {
        if !(MIN_TARGET_RMS..=MAX_TARGET_RMS).contains(&level) {
            return Err(BoosterError::invalid_config(format!(
                "target_rms_level {level} outside [{MIN_TARGET_RMS}, {MAX_TARGET_RMS}]"
            )));
        }
        Ok(Self(level))
    }

    /// Get the level
    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for TargetRmsLevel {
    fn default() -> Self {
        Self(MIN_TARGET_RMS)
    }
}

impl TryFrom<u32> for TargetRmsLevel {
    type Error = BoosterError;

    fn try_from(level: u32) -> Result<Self> {
        Self::new(level)
    }
}

impl From<TargetRmsLevel> for u32 {
    fn from(level: TargetRmsLevel) -> Self {
        level.0
    }
}

/// Direction in which the solved gain is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GainPolarity {
    /// Subtract the solved gain (higher target ⇒ quieter output)
    #[default]
    Subtract,
    /// Add the solved gain, moving the output RMS onto the target
    TowardTarget,
}

impl GainPolarity {
    /// Parse from string (for config files and CLI flags)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "subtract" | "reference" => Some(Self::Subtract),
            "toward-target" | "toward_target" | "boost" => Some(Self::TowardTarget),
            _ => None,
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subtract => "subtract",
            Self::TowardTarget => "toward-target",
        }
    }
}

/// Result of solving for a target level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainAdjustment {
    /// RMS of the input buffer
    pub current_rms: f64,
    /// Requested RMS
    pub target_rms: f64,
    /// Gain in dB after the ceiling was applied
    pub gain_db: f64,
    /// Whether the ceiling reduced the raw figure
    pub clamped: bool,
}

impl GainAdjustment {
    /// Linear factor applied to every sample under `polarity`
    pub fn linear_factor(&self, polarity: GainPolarity) -> f64 {
        match polarity {
            GainPolarity::Subtract => db_to_linear(-self.gain_db),
            GainPolarity::TowardTarget => db_to_linear(self.gain_db),
        }
    }
}

/// Computes and applies the gain that moves a buffer toward a target RMS
///
/// # Example
///
/// ```ignore
/// use booster_loudness::{GainSolver, TargetRmsLevel};
///
/// let solver = GainSolver::new();
/// let gain = solver.solve(&buffer, TargetRmsLevel::new(8000)?)?;
/// assert!(gain.gain_db <= 10.0);
/// let adjusted = solver.apply(buffer, &gain);
/// ```
#[derive(Debug, Clone)]
pub struct GainSolver {
    /// Upper bound on the solved gain in dB
    ceiling_db: f64,
    /// Add or subtract the solved gain
    polarity: GainPolarity,
}

impl GainSolver {
    /// Create a solver with the 10 dB ceiling and subtractive polarity
    pub fn new() -> Self {
        Self {
            ceiling_db: MAX_GAIN_DB,
            polarity: GainPolarity::default(),
        }
    }

    /// Replace the gain ceiling
    #[must_use]
    pub fn with_ceiling_db(mut self, ceiling_db: f64) -> Self {
        self.ceiling_db = ceiling_db;
        self
    }

    /// Replace the polarity
    #[must_use]
    pub fn with_polarity(mut self, polarity: GainPolarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Gain ceiling in dB
    pub fn ceiling_db(&self) -> f64 {
        self.ceiling_db
    }

    /// Current polarity
    pub fn polarity(&self) -> GainPolarity {
        self.polarity
    }

    /// Solve for the gain needed to reach `target`
    ///
    /// # Errors
    /// `SilentInput` when the buffer's RMS is zero (including empty buffers)
    pub fn solve(&self, buffer: &SampleBuffer, target: TargetRmsLevel) -> Result<GainAdjustment> {
        let current_rms = LoudnessNormalizer::rms(buffer);
        if current_rms <= 0.0 {
            return Err(BoosterError::SilentInput);
        }

        let target_rms = f64::from(target.value());
        let raw_gain_db = 20.0 * (target_rms.log10() - current_rms.log10());
        let clamped = raw_gain_db > self.ceiling_db;
        let gain_db = if clamped { self.ceiling_db } else { raw_gain_db };

        tracing::debug!(
            current_rms,
            target_rms,
            raw_gain_db,
            gain_db,
            clamped,
            "Solved gain"
        );

        Ok(GainAdjustment {
            current_rms,
            target_rms,
            gain_db,
            clamped,
        })
    }

    /// Apply a solved adjustment
    pub fn apply(&self, buffer: SampleBuffer, adjustment: &GainAdjustment) -> SampleBuffer {
        let signed_db = match self.polarity {
            GainPolarity::Subtract => -adjustment.gain_db,
            GainPolarity::TowardTarget => adjustment.gain_db,
        };
        LoudnessNormalizer::apply_gain_db(buffer, signed_db)
    }

    /// Solve and apply in one step
    pub fn process(
        &self,
        buffer: SampleBuffer,
        target: TargetRmsLevel,
    ) -> Result<(SampleBuffer, GainAdjustment)> {
        let adjustment = self.solve(&buffer, target)?;
        Ok((self.apply(buffer, &adjustment), adjustment))
    }
}

impl Default for GainSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booster_core::{AudioFormat, ErrorKind};

    fn mono(samples: Vec<i32>) -> SampleBuffer {
        SampleBuffer::new(samples, AudioFormat::pcm16(48_000, 1)).unwrap()
    }

    #[test]
    fn target_level_range() {
        assert!(TargetRmsLevel::new(2000).is_ok());
        assert!(TargetRmsLevel::new(12000).is_ok());
        assert_eq!(
            TargetRmsLevel::new(1999).unwrap_err().kind(),
            ErrorKind::InvalidConfig
        );
        assert!(TargetRmsLevel::new(12001).is_err());
        assert_eq!(TargetRmsLevel::default().value(), 2000);
    }

    #[test]
    fn polarity_parsing() {
        assert_eq!(GainPolarity::from_str("subtract"), Some(GainPolarity::Subtract));
        assert_eq!(
            GainPolarity::from_str("Toward-Target"),
            Some(GainPolarity::TowardTarget)
        );
        assert_eq!(GainPolarity::from_str("sideways"), None);
        assert_eq!(GainPolarity::TowardTarget.as_str(), "toward-target");
    }

    #[test]
    fn silence_is_an_error() {
        let err = GainSolver::new()
            .solve(&mono(vec![0; 480]), TargetRmsLevel::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SilentInput);
    }

    #[test]
    fn empty_buffer_is_silent() {
        let err = GainSolver::new()
            .solve(&mono(vec![]), TargetRmsLevel::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SilentInput);
    }

    #[test]
    fn gain_above_ceiling_is_clamped() {
        // 20*log10(12000/100) ≈ 41.6 dB
        let gain = GainSolver::new()
            .solve(&mono(vec![100, -100]), TargetRmsLevel::new(12000).unwrap())
            .unwrap();
        assert!(gain.clamped);
        assert_eq!(gain.gain_db, MAX_GAIN_DB);
    }

    #[test]
    fn negative_gain_is_not_floored() {
        // 20*log10(2000/30000) ≈ -23.5 dB
        let gain = GainSolver::new()
            .solve(&mono(vec![30000, -30000]), TargetRmsLevel::new(2000).unwrap())
            .unwrap();
        assert!(!gain.clamped);
        assert!((gain.gain_db - (-23.52)).abs() < 0.01);
    }

    #[test]
    fn subtract_polarity_lowers_level() {
        let solver = GainSolver::new();
        let (adjusted, gain) = solver
            .process(mono(vec![4000, -4000]), TargetRmsLevel::new(8000).unwrap())
            .unwrap();
        assert!((gain.gain_db - 6.0206).abs() < 1e-3);
        assert_eq!(adjusted.samples(), &[2000, -2000]);
    }

    #[test]
    fn toward_target_polarity_reaches_target() {
        let solver = GainSolver::new().with_polarity(GainPolarity::TowardTarget);
        let (adjusted, _) = solver
            .process(mono(vec![4000, -4000]), TargetRmsLevel::new(8000).unwrap())
            .unwrap();
        assert_eq!(adjusted.samples(), &[8000, -8000]);
    }

    #[test]
    fn custom_ceiling() {
        let solver = GainSolver::new().with_ceiling_db(3.0);
        let gain = solver
            .solve(&mono(vec![4000, -4000]), TargetRmsLevel::new(8000).unwrap())
            .unwrap();
        assert!(gain.clamped);
        assert_eq!(gain.gain_db, 3.0);
    }
}
