/// Audio decoder implementation using Symphonia
use booster_core::{
    AudioDecoder, AudioFormat, BoosterError, Result, SampleBuffer, SampleRate, SampleWidth,
};
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// Extensions the decoder accepts
const SUPPORTED_EXTENSIONS: &[&str] = &["mp3", "wav", "wave"];

/// Audio decoder using Symphonia
///
/// Supports: MP3, WAV
///
/// Integer PCM keeps its native width (24-bit is widened into 32-bit by
/// shifting left 8 bits, unsigned formats are re-centered around zero).
/// Floating point output, which is what MP3 decodes to, becomes 16-bit.
/// Channels are kept as decoded; nothing is downmixed.
pub struct SymphoniaDecoder;

impl SymphoniaDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self
    }

    /// Append one decoded packet to `out`, returning the packet's width
    fn append_packet(decoded: AudioBufferRef, out: &mut Vec<i32>) -> SampleWidth {
        match decoded {
            AudioBufferRef::U8(buf) => {
                Self::interleave(&*buf, out, |s| i32::from(s) - 128);
                SampleWidth::One
            }
            AudioBufferRef::S8(buf) => {
                Self::interleave(&*buf, out, i32::from);
                SampleWidth::One
            }
            AudioBufferRef::U16(buf) => {
                Self::interleave(&*buf, out, |s| i32::from(s) - 32768);
                SampleWidth::Two
            }
            AudioBufferRef::S16(buf) => {
                Self::interleave(&*buf, out, i32::from);
                SampleWidth::Two
            }
            AudioBufferRef::U24(buf) => {
                Self::interleave(&*buf, out, |s| (s.inner() as i32 - 8_388_608) << 8);
                SampleWidth::Four
            }
            AudioBufferRef::S24(buf) => {
                Self::interleave(&*buf, out, |s| s.inner() << 8);
                SampleWidth::Four
            }
            AudioBufferRef::U32(buf) => {
                Self::interleave(&*buf, out, |s| (i64::from(s) - 2_147_483_648) as i32);
                SampleWidth::Four
            }
            AudioBufferRef::S32(buf) => {
                Self::interleave(&*buf, out, |s| s);
                SampleWidth::Four
            }
            AudioBufferRef::F32(buf) => {
                Self::interleave(&*buf, out, |s| float_to_pcm16(f64::from(s)));
                SampleWidth::Two
            }
            AudioBufferRef::F64(buf) => {
                Self::interleave(&*buf, out, float_to_pcm16);
                SampleWidth::Two
            }
        }
    }

    /// Interleave a planar Symphonia buffer into `out`
    fn interleave<T, F>(buf: &AudioBuffer<T>, out: &mut Vec<i32>, convert: F)
    where
        T: Sample + Copy,
        F: Fn(T) -> i32,
    {
        let channels = buf.spec().channels.count();
        out.reserve(buf.frames() * channels);
        for frame in 0..buf.frames() {
            for ch in 0..channels {
                out.push(convert(buf.chan(ch)[frame]));
            }
        }
    }
}

/// Scale a [-1.0, 1.0] float sample to 16-bit
fn float_to_pcm16(sample: f64) -> i32 {
    (sample * 32768.0).round().clamp(-32768.0, 32767.0) as i32
}

impl Default for SymphoniaDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&mut self, path: &Path) -> Result<SampleBuffer> {
        // Check if file exists
        if !path.exists() {
            return Err(BoosterError::decode(format!(
                "file not found: {}",
                path.display()
            )));
        }

        let file = std::fs::File::open(path)?;

        // Create media source
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        // Create a hint to help the format registry guess the format
        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        // Probe the media source
        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| BoosterError::decode(format!("failed to probe file: {}", e)))?;

        let mut format = probed.format;

        // Find the default track
        let track = format
            .default_track()
            .ok_or_else(|| BoosterError::decode("no audio tracks found"))?;

        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;
        let mut channels = track.codec_params.channels.map(|c| c.count());

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| BoosterError::decode(format!("failed to create decoder: {}", e)))?;

        // Decode all packets and collect into single buffer
        let mut samples = Vec::new();
        let mut width: Option<SampleWidth> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(symphonia::core::errors::Error::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => {
                    return Err(BoosterError::decode(format!("error reading packet: {}", e)));
                }
            };

            // Skip packets that are not for the default track
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                // Corrupt packet: skip it, the rest of the stream may be fine
                Err(symphonia::core::errors::Error::DecodeError(e)) => {
                    tracing::warn!("Skipping undecodable packet in {}: {}", path.display(), e);
                    continue;
                }
                Err(e) => return Err(BoosterError::decode(format!("decode error: {}", e))),
            };

            let spec = *decoded.spec();
            sample_rate.get_or_insert(spec.rate);
            channels.get_or_insert(spec.channels.count());

            let packet_width = Self::append_packet(decoded, &mut samples);
            if *width.get_or_insert(packet_width) != packet_width {
                return Err(BoosterError::decode("sample format changed mid-stream"));
            }
        }

        let sample_rate =
            sample_rate.ok_or_else(|| BoosterError::decode("stream has no sample rate"))?;
        let channels = channels
            .and_then(|c| u16::try_from(c).ok())
            .filter(|&c| c > 0)
            .ok_or_else(|| BoosterError::decode("stream has no channels"))?;
        let width = width.ok_or_else(|| BoosterError::decode("stream contains no audio"))?;

        tracing::debug!(
            path = %path.display(),
            sample_rate,
            channels,
            bits = width.bits(),
            samples = samples.len(),
            "Decoded file"
        );

        let format = AudioFormat::new(SampleRate::new(sample_rate), channels, width);
        SampleBuffer::new(samples, format).map_err(|e| BoosterError::decode(e.to_string()))
    }

    fn supports_format(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booster_core::ErrorKind;

    #[test]
    fn supported_extensions() {
        let decoder = SymphoniaDecoder::new();
        assert!(decoder.supports_format(Path::new("a.mp3")));
        assert!(decoder.supports_format(Path::new("a.WAV")));
        assert!(!decoder.supports_format(Path::new("a.flac")));
        assert!(!decoder.supports_format(Path::new("noext")));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = SymphoniaDecoder::new()
            .decode(Path::new("/definitely/not/here.wav"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn float_scaling() {
        assert_eq!(float_to_pcm16(0.0), 0);
        assert_eq!(float_to_pcm16(1.0), 32767);
        assert_eq!(float_to_pcm16(-1.0), -32768);
        assert_eq!(float_to_pcm16(0.5), 16384);
    }
}
