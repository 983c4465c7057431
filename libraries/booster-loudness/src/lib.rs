//! Loudness measurement, gain solving and clip repair for Sound Booster
//!
//! This crate provides:
//! - RMS / peak measurement and dB gain application
//! - Full-scale peak normalization (used when ingesting uncompressed input)
//! - Target-RMS gain solving with a fixed ceiling
//! - Post-hoc clip detection and hard limiting
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌────────────────┐
//! │ SampleBuffer│ ──► │ GainSolver   │ ──► │ GainAdjustment │
//! └─────────────┘     └──────────────┘     └────────────────┘
//!                            │
//!                            ▼
//!                     ┌──────────────┐      (other stages)
//!                     │ apply gain   │ ──► ... ──► ┌───────────┐
//!                     └──────────────┘             │ ClipGuard │
//!                                                  └───────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use booster_loudness::{ClipGuard, GainSolver, TargetRmsLevel};
//!
//! let solver = GainSolver::new();
//! let (adjusted, gain) = solver.process(buffer, TargetRmsLevel::new(8000)?)?;
//! println!("Applied {:.2} dB", gain.gain_db);
//!
//! let report = ClipGuard::new().process(adjusted);
//! if report.clipped() {
//!     println!("Repaired {} samples", report.clipped_count());
//! }
//! ```

#![deny(unsafe_code)]

mod clip_guard;
mod gain;
mod normalizer;

pub use clip_guard::{ClipGuard, ClippingReport};
pub use gain::{GainAdjustment, GainPolarity, GainSolver, TargetRmsLevel};
pub use normalizer::LoudnessNormalizer;

/// Lowest accepted target RMS level (most boost)
pub const MIN_TARGET_RMS: u32 = 2000;

/// Highest accepted target RMS level (least boost)
pub const MAX_TARGET_RMS: u32 = 12000;

/// Ceiling on the solved gain in dB
pub const MAX_GAIN_DB: f64 = 10.0;

/// Headroom left below full scale by peak normalization, in dB
pub const NORMALIZE_HEADROOM_DB: f64 = 0.1;

/// Convert decibels to a linear amplitude factor
#[inline]
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Convert a linear amplitude ratio to decibels
///
/// A ratio of zero maps to negative infinity.
#[inline]
pub fn linear_to_db(ratio: f64) -> f64 {
    20.0 * ratio.log10()
}
