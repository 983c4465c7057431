//! Audio effects processing
//!
//! Effects operate on integer `SampleBuffer`s and never saturate; the
//! pipeline's `ClipGuard` pass brings samples back in range at the end.
//!
//! Available effects:
//! - **StereoWidener**: opposing pans plus a rate-reinterpretation overlay
//! - **BandEnergyAnalyzer**: fixed-length windows with bass-heavy flagging
//! - **BassAttenuator**: band-limits and cuts flagged windows
//! - **OnePoleFilter**: RC low-pass / high-pass used by the attenuator

mod bass;
mod filter;
mod stereo;

pub use bass::{
    BandEnergyAnalyzer, BassAttenuator, ReassemblyMode, Window, BASS_CUT_DB, BASS_THRESHOLD,
    HIGH_PASS_HZ, LOW_PASS_HZ, WINDOW_SAMPLES,
};
pub use filter::{FilterKind, OnePoleFilter};
pub use stereo::{
    pan, pan_gains, rate_reinterpretation_overlay, StereoWidener, DEFAULT_WIDENING_FACTOR,
    RATE_OFFSET_HZ,
};

#[cfg(test)]
pub(crate) mod tests {
    use booster_core::{AudioFormat, SampleBuffer};

    /// Generate a 16-bit sine wave with `channels` identical channels
    pub(crate) fn generate_sine(
        freq: f64,
        sample_rate: u32,
        channels: u16,
        amplitude: f64,
        frames: usize,
    ) -> SampleBuffer {
        let mut samples = Vec::with_capacity(frames * usize::from(channels));
        for i in 0..frames {
            let t = i as f64 / f64::from(sample_rate);
            let sample = (amplitude * (2.0 * std::f64::consts::PI * freq * t).sin()).round() as i32;
            for _ in 0..channels {
                samples.push(sample);
            }
        }
        SampleBuffer::new(samples, AudioFormat::pcm16(sample_rate, channels)).unwrap()
    }
}
