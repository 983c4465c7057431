//! Stereo widening
//!
//! The widener builds two copies of the input panned in opposite directions,
//! reinterprets the right copy at a higher sample rate, and overlays the
//! result on the left copy. Because the reinterpreted copy plays back faster,
//! the two sides drift apart in time and pitch, which decorrelates them.

use booster_core::{BoosterError, Result, SampleBuffer};

/// Default pan amount for the opposing copies
pub const DEFAULT_WIDENING_FACTOR: f64 = 0.8;

/// Rate added to the right copy's sample rate before overlaying
pub const RATE_OFFSET_HZ: u32 = 8000;

/// Linear gain ceiling for the pan law (≈ +6.02 dB)
const PAN_MAX_RATIO: f64 = 2.0;

/// Left and right gains for a pan amount in [-1, 1]
///
/// Negative values favor the left side. The favored side receives half of
/// the `2^|amount|` boost in dB; the other side is scaled by
/// `2 - 2^|amount|`. At zero both gains are exactly 1.
pub fn pan_gains(amount: f64) -> (f64, f64) {
    let boost = PAN_MAX_RATIO.powf(amount.abs());
    let reduce = PAN_MAX_RATIO - boost;
    let favored = boost.sqrt();

    if amount < 0.0 {
        (favored, reduce)
    } else {
        (reduce, favored)
    }
}

/// Pan a mono or stereo buffer, always producing stereo
///
/// # Errors
/// - `InvalidConfig` if `|amount| > 1`
/// - `UnsupportedFormat` for more than two channels
pub fn pan(buffer: &SampleBuffer, amount: f64) -> Result<SampleBuffer> {
    if !(amount.is_finite() && amount.abs() <= 1.0) {
        return Err(BoosterError::invalid_config(format!(
            "pan amount must be within [-1, 1], got {amount}"
        )));
    }

    let (left_gain, right_gain) = pan_gains(amount);
    let scale = |s: i32, gain: f64| (f64::from(s) * gain).round() as i32;

    let (left, right): (Vec<i32>, Vec<i32>) = match buffer.channels() {
        1 => buffer
            .samples()
            .iter()
            .map(|&s| (scale(s, left_gain), scale(s, right_gain)))
            .unzip(),
        2 => buffer
            .samples()
            .chunks_exact(2)
            .map(|f| (scale(f[0], left_gain), scale(f[1], right_gain)))
            .unzip(),
        n => {
            return Err(BoosterError::unsupported(format!(
                "panning needs mono or stereo input, got {n} channels"
            )))
        }
    };

    SampleBuffer::from_channels(
        &[left, right],
        buffer.format().sample_rate,
        buffer.sample_width(),
    )
}

/// Overlay a buffer recorded at another sample rate onto `base`
///
/// `overlay` is mapped onto `base`'s timeline: it occupies
/// `ceil(frames * base_rate / overlay_rate)` frames, and output frame `n`
/// reads source position `n * overlay_rate / base_rate` with linear
/// interpolation. The operands are then summed sample by sample from the
/// start; the shorter one is padded with silence. The result keeps `base`'s
/// format and is not limited to the sample width's range.
///
/// # Errors
/// `InvalidBuffer` if the channel counts or sample widths differ
pub fn rate_reinterpretation_overlay(
    base: SampleBuffer,
    overlay: &SampleBuffer,
) -> Result<SampleBuffer> {
    if base.channels() != overlay.channels() || base.sample_width() != overlay.sample_width() {
        return Err(BoosterError::invalid_buffer(format!(
            "cannot overlay {}ch/{}-bit onto {}ch/{}-bit",
            overlay.channels(),
            overlay.sample_width().bits(),
            base.channels(),
            base.sample_width().bits()
        )));
    }

    let format = base.format();
    let channels = base.channels();
    let base_rate = u64::from(base.sample_rate());
    let source_rate = u64::from(overlay.sample_rate());
    let source = overlay.samples();
    let source_frames = overlay.frames() as u64;

    // ceil(source_frames * base_rate / source_rate)
    let mapped_frames = (source_frames * base_rate).div_ceil(source_rate) as usize;
    let total_frames = base.frames().max(mapped_frames);

    let mut samples = base.into_samples();
    samples.resize(total_frames * channels, 0);

    for n in 0..mapped_frames {
        let position = n as u64 * source_rate;
        let index = (position / base_rate) as usize;
        let frac = (position % base_rate) as f64 / base_rate as f64;

        for ch in 0..channels {
            let a = f64::from(source[index * channels + ch]);
            let b = source
                .get((index + 1) * channels + ch)
                .map_or(a, |&s| f64::from(s));
            let value = (a + (b - a) * frac).round() as i32;
            let out = &mut samples[n * channels + ch];
            *out = out.saturating_add(value);
        }
    }

    SampleBuffer::new(samples, format)
}

/// Stereo widener
///
/// ```text
/// left  = pan(input, -factor)
/// right = pan(input, +factor) reinterpreted at rate + offset
/// out   = left overlaid with right
/// ```
#[derive(Debug, Clone)]
pub struct StereoWidener {
    factor: f64,
    rate_offset_hz: u32,
}

impl StereoWidener {
    /// Create a widener
    ///
    /// # Errors
    /// `InvalidConfig` if `|factor| > 1`
    pub fn new(factor: f64, rate_offset_hz: u32) -> Result<Self> {
        if !(factor.is_finite() && factor.abs() <= 1.0) {
            return Err(BoosterError::invalid_config(format!(
                "widening factor must be within [-1, 1], got {factor}"
            )));
        }
        Ok(Self {
            factor,
            rate_offset_hz,
        })
    }

    /// Pan amount applied to each copy
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Rate offset for the reinterpreted copy
    pub fn rate_offset_hz(&self) -> u32 {
        self.rate_offset_hz
    }

    /// Widen a mono or stereo buffer into stereo
    ///
    /// # Errors
    /// `UnsupportedFormat` for more than two channels
    pub fn process(&self, buffer: SampleBuffer) -> Result<SampleBuffer> {
        let left = pan(&buffer, -self.factor)?;
        let right = pan(&buffer, self.factor)?;
        drop(buffer);

        let shifted_rate = right
            .sample_rate()
            .checked_add(self.rate_offset_hz)
            .ok_or_else(|| BoosterError::invalid_config("rate offset overflows sample rate"))?;
        let right = right.reinterpret_rate(shifted_rate)?;

        tracing::debug!(
            factor = self.factor,
            base_rate = left.sample_rate(),
            shifted_rate,
            "Widening stereo image"
        );

        rate_reinterpretation_overlay(left, &right)
    }
}

impl Default for StereoWidener {
    fn default() -> Self {
        Self {
            factor: DEFAULT_WIDENING_FACTOR,
            rate_offset_hz: RATE_OFFSET_HZ,
        }
    }
}
