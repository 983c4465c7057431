//! Sample-rate conversion
//!
//! Offline sinc resampling of a whole `SampleBuffer` with rubato. The
//! output has exactly `ceil(frames * out_rate / in_rate)` frames; the
//! resampler's delay is trimmed from the front.

use booster_core::{AudioFormat, BoosterError, Result, SampleBuffer, SampleRate};
use rubato::{
    Resampler as RubatoResamplerTrait, SincFixedIn, SincInterpolationParameters,
    SincInterpolationType, WindowFunction,
};

/// Input frames handed to rubato per call
const CHUNK_FRAMES: usize = 1024;

fn sinc_params() -> SincInterpolationParameters {
    SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    }
}

/// Resample `buffer` to `output_rate`
///
/// Returns the buffer unchanged if the rates already match. Output values
/// are rounded but not limited to the sample width's range.
///
/// # Errors
/// `InvalidConfig` for a zero output rate, `UnsupportedFormat` if rubato
/// cannot be set up for the conversion
pub fn resample(buffer: SampleBuffer, output_rate: u32) -> Result<SampleBuffer> {
    let input_rate = buffer.sample_rate();
    if output_rate == 0 {
        return Err(BoosterError::invalid_config("resample target of 0 Hz"));
    }
    if input_rate == output_rate {
        return Ok(buffer);
    }

    let width = buffer.sample_width();
    let channels = buffer.channels();
    let frames = buffer.frames();
    let ratio = f64::from(output_rate) / f64::from(input_rate);
    let expected =
        (frames as u64 * u64::from(output_rate)).div_ceil(u64::from(input_rate)) as usize;

    if frames == 0 {
        let format = AudioFormat {
            sample_rate: SampleRate::new(output_rate),
            ..buffer.format()
        };
        return SampleBuffer::silent(0, format);
    }

    tracing::debug!(input_rate, output_rate, frames, "Resampling buffer");

    let input: Vec<Vec<f64>> = buffer
        .split_channels()
        .into_iter()
        .map(|ch| ch.into_iter().map(f64::from).collect())
        .collect();
    drop(buffer);

    let mut resampler =
        SincFixedIn::<f64>::new(ratio, 1.0, sinc_params(), CHUNK_FRAMES, channels).map_err(
            |e| BoosterError::unsupported(format!("resampler setup failed: {}", e)),
        )?;

    let delay = resampler.output_delay();
    let wanted = expected + delay;
    let mut output: Vec<Vec<f64>> = vec![Vec::with_capacity(wanted); channels];

    let append = |output: &mut Vec<Vec<f64>>, chunk: Vec<Vec<f64>>| {
        for (out, produced) in output.iter_mut().zip(chunk) {
            out.extend(produced);
        }
    };

    let mut position = 0;
    while position + CHUNK_FRAMES <= frames {
        let chunk: Vec<&[f64]> = input
            .iter()
            .map(|ch| &ch[position..position + CHUNK_FRAMES])
            .collect();
        let produced = resampler
            .process(&chunk, None)
            .map_err(|e| BoosterError::decode(format!("resampling failed: {}", e)))?;
        append(&mut output, produced);
        position += CHUNK_FRAMES;
    }

    if position < frames {
        let chunk: Vec<&[f64]> = input.iter().map(|ch| &ch[position..]).collect();
        let produced = resampler
            .process_partial(Some(chunk.as_slice()), None)
            .map_err(|e| BoosterError::decode(format!("resampling failed: {}", e)))?;
        append(&mut output, produced);
    }

    // Flush the filter tail
    while output[0].len() < wanted {
        let produced = resampler
            .process_partial(None::<&[Vec<f64>]>, None)
            .map_err(|e| BoosterError::decode(format!("resampling failed: {}", e)))?;
        if produced.first().map_or(true, Vec::is_empty) {
            break;
        }
        append(&mut output, produced);
    }

    let resampled: Vec<Vec<i32>> = output
        .into_iter()
        .map(|ch| {
            let mut ch: Vec<i32> = ch
                .into_iter()
                .skip(delay)
                .take(expected)
                .map(|s| s.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
                .collect();
            // Pad if the flush fell short
            ch.resize(expected, 0);
            ch
        })
        .collect();

    SampleBuffer::from_channels(&resampled, SampleRate::new(output_rate), width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::tests::generate_sine;
    use booster_core::{AudioFormat, ErrorKind};
    use booster_loudness::LoudnessNormalizer;

    #[test]
    fn same_rate_is_untouched() {
        let buffer = generate_sine(440.0, 48_000, 2, 1000.0, 100);
        assert_eq!(resample(buffer.clone(), 48_000).unwrap(), buffer);
    }

    #[test]
    fn zero_rate_is_rejected() {
        let buffer = generate_sine(440.0, 48_000, 1, 1000.0, 100);
        assert_eq!(
            resample(buffer, 0).unwrap_err().kind(),
            ErrorKind::InvalidConfig
        );
    }

    #[test]
    fn output_length_matches_ratio() {
        let buffer = generate_sine(440.0, 44_100, 2, 8000.0, 44_100);
        let out = resample(buffer, 48_000).unwrap();
        assert_eq!(out.frames(), 48_000);
        assert_eq!(out.channels(), 2);
        assert_eq!(out.sample_rate(), 48_000);

        let short = generate_sine(440.0, 22_050, 1, 8000.0, 1001);
        // ceil(1001 * 48000 / 22050) = 2180
        assert_eq!(resample(short, 48_000).unwrap().frames(), 2180);
    }

    #[test]
    fn level_is_preserved() {
        let buffer = generate_sine(440.0, 44_100, 1, 8000.0, 44_100);
        let rms_in = LoudnessNormalizer::rms(&buffer);
        let out = resample(buffer, 48_000).unwrap();
        let rms_out = LoudnessNormalizer::rms(&out);
        assert!((rms_in - rms_out).abs() / rms_in < 0.02, "{rms_in} vs {rms_out}");
    }

    #[test]
    fn empty_buffer_changes_rate_only() {
        let buffer = SampleBuffer::silent(0, AudioFormat::pcm16(44_100, 2)).unwrap();
        let out = resample(buffer, 48_000).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.sample_rate(), 48_000);
    }
}
