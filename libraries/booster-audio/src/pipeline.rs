//! End-to-end processing pipeline
//!
//! ```text
//! ingest -> gain -> stereo widening -> bass windows -> clip guard
//! ```
//!
//! Each stage consumes the previous stage's buffer. Any failure aborts the
//! run; no partial buffer is returned.

use crate::config::PipelineConfig;
use crate::effects::{BandEnergyAnalyzer, BassAttenuator, StereoWidener};
use crate::ingest::FormatIngestor;
use booster_core::{BoosterError, Result, SampleBuffer};
use booster_loudness::{ClipGuard, GainAdjustment, GainSolver, TargetRmsLevel};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation flag, checked between stages
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with `Cancelled` if cancellation was requested
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(BoosterError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Summary of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    /// Gain that was solved and applied
    pub gain: GainAdjustment,
    /// Windows analyzed
    pub windows: usize,
    /// Windows flagged as bass-heavy
    pub flagged_windows: usize,
    /// Samples repaired by the clip guard
    pub clipped_samples: usize,
    /// Duration of the pipeline input
    pub input_duration_secs: f64,
    /// Duration of the final buffer
    pub output_duration_secs: f64,
}

/// Final buffer plus its report
#[derive(Debug, Clone)]
pub struct ProcessedAudio {
    pub buffer: SampleBuffer,
    pub report: PipelineReport,
}

/// Configured chain of processing stages
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    gain: GainSolver,
    widener: StereoWidener,
    analyzer: BandEnergyAnalyzer,
    attenuator: BassAttenuator,
    clip_guard: ClipGuard,
}

impl Pipeline {
    /// Build the stages from `config`
    ///
    /// # Errors
    /// `InvalidConfig` if the configuration does not validate
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let gain = GainSolver::new()
            .with_ceiling_db(config.gain_ceiling_db)
            .with_polarity(config.gain_polarity);
        let widener = StereoWidener::new(config.widening_factor, config.rate_offset_hz)?;
        let analyzer = BandEnergyAnalyzer::new(config.window_samples, config.bass_threshold);
        let attenuator =
            BassAttenuator::new(config.low_pass_hz, config.high_pass_hz, config.bass_cut_db)
                .with_reassembly(config.reassembly);

        Ok(Self {
            config,
            gain,
            widener,
            analyzer,
            attenuator,
            clip_guard: ClipGuard::new(),
        })
    }

    /// Configuration the stages were built from
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage on an already-loaded buffer
    pub fn run(&self, buffer: SampleBuffer, target: TargetRmsLevel) -> Result<ProcessedAudio> {
        self.run_cancellable(buffer, target, &CancelToken::new())
    }

    /// Run every stage, checking `token` between stages
    ///
    /// # Errors
    /// - `SilentInput` if the buffer has zero RMS
    /// - `UnsupportedFormat` for more than two channels
    /// - `InvalidConfig` if the window length does not fit the channel count
    /// - `Cancelled` if `token` was cancelled
    pub fn run_cancellable(
        &self,
        buffer: SampleBuffer,
        target: TargetRmsLevel,
        token: &CancelToken,
    ) -> Result<ProcessedAudio> {
        let input_duration_secs = buffer.duration_secs();
        tracing::info!(
            target_rms = target.value(),
            frames = buffer.frames(),
            channels = buffer.channels(),
            "Starting pipeline"
        );

        token.checkpoint()?;
        let (buffer, gain) = self.gain.process(buffer, target)?;
        tracing::debug!(gain_db = gain.gain_db, clamped = gain.clamped, "Gain stage done");

        token.checkpoint()?;
        let buffer = self.widener.process(buffer)?;
        tracing::debug!(frames = buffer.frames(), "Widening stage done");

        token.checkpoint()?;
        let windows = self.analyzer.analyze(&buffer)?;
        let window_count = windows.len();
        let flagged_windows = windows.iter().filter(|w| w.bass_heavy).count();

        token.checkpoint()?;
        let buffer = self.attenuator.process(&buffer, &windows)?;
        drop(windows);
        tracing::debug!(frames = buffer.frames(), "Bass stage done");

        token.checkpoint()?;
        let clipping = self.clip_guard.process(buffer);
        let clipped_samples = clipping.clipped_count();
        let buffer = clipping.into_buffer();

        let report = PipelineReport {
            gain,
            windows: window_count,
            flagged_windows,
            clipped_samples,
            input_duration_secs,
            output_duration_secs: buffer.duration_secs(),
        };

        tracing::info!(
            gain_db = report.gain.gain_db,
            windows = report.windows,
            flagged = report.flagged_windows,
            clipped = report.clipped_samples,
            duration_secs = report.output_duration_secs,
            "Pipeline finished"
        );

        Ok(ProcessedAudio { buffer, report })
    }

    /// Ingest a file and run every stage on it
    ///
    /// # Errors
    /// Ingestion errors (`UnsupportedFormat`, `Decode`) plus everything
    /// [`Pipeline::run_cancellable`] can return
    pub fn process_file(
        &self,
        path: &Path,
        target: TargetRmsLevel,
        token: &CancelToken,
    ) -> Result<ProcessedAudio> {
        token.checkpoint()?;
        let buffer = FormatIngestor::new(self.config.ingest.clone()).load(path)?;
        self.run_cancellable(buffer, target, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::tests::generate_sine;
    use crate::effects::ReassemblyMode;
    use booster_core::{AudioFormat, ErrorKind};
    use booster_loudness::{GainPolarity, LoudnessNormalizer};

    fn target(level: u32) -> TargetRmsLevel {
        TargetRmsLevel::new(level).unwrap()
    }

    #[test]
    fn runs_every_stage() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        // RMS 4000
        let input = generate_sine(220.0, 48_000, 1, 4000.0 * std::f64::consts::SQRT_2, 48_000);

        let processed = pipeline.run(input, target(8000)).unwrap();
        let report = &processed.report;

        assert!((report.gain.gain_db - 6.02).abs() < 0.01);
        // Mono in, stereo out: 96000 samples in windows of 5000
        assert_eq!(processed.buffer.channels(), 2);
        assert_eq!(report.windows, 20);
        assert_eq!(report.flagged_windows, 20);
        assert!((report.input_duration_secs - 1.0).abs() < 1e-9);
        assert!((report.output_duration_secs - 1.0).abs() < 1e-9);

        let max = processed.buffer.sample_width().max_value().unsigned_abs();
        assert!(processed.buffer.samples().iter().all(|s| s.unsigned_abs() <= max));
    }

    #[test]
    fn silence_fails_the_run() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let input = SampleBuffer::silent(48_000, AudioFormat::pcm16(48_000, 1)).unwrap();
        let err = pipeline.run(input, target(2000)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SilentInput);
    }

    #[test]
    fn loud_boost_is_clipped_back_into_range() {
        // Unity pans and no rate offset: the overlay doubles the signal
        let config = PipelineConfig {
            gain_polarity: GainPolarity::TowardTarget,
            widening_factor: 0.0,
            rate_offset_hz: 0,
            bass_threshold: f64::INFINITY,
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(config).unwrap();
        let input = generate_sine(220.0, 48_000, 2, 12_000.0 * std::f64::consts::SQRT_2, 4800);

        let processed = pipeline.run(input, target(12_000)).unwrap();
        assert_eq!(processed.report.flagged_windows, 0);
        assert!(processed.report.clipped_samples > 0);
        assert!(LoudnessNormalizer::peak(&processed.buffer) <= 32767);
    }

    #[test]
    fn flagged_only_with_nothing_flagged_yields_empty_output() {
        let config = PipelineConfig {
            bass_threshold: f64::INFINITY,
            reassembly: ReassemblyMode::FlaggedOnly,
            ..PipelineConfig::default()
        };
        let pipeline = Pipeline::new(config).unwrap();
        let input = generate_sine(220.0, 48_000, 1, 4000.0, 4800);

        let processed = pipeline.run(input, target(2000)).unwrap();
        assert!(processed.buffer.is_empty());
        assert_eq!(processed.report.output_duration_secs, 0.0);
    }

    #[test]
    fn cancelled_token_stops_the_run() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_cancelled());

        let input = generate_sine(220.0, 48_000, 1, 4000.0, 4800);
        let err = pipeline
            .run_cancellable(input, target(2000), &token)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PipelineConfig {
            widening_factor: 2.0,
            ..PipelineConfig::default()
        };
        assert_eq!(
            Pipeline::new(config).unwrap_err().kind(),
            ErrorKind::InvalidConfig
        );
    }

    #[test]
    fn surround_input_is_unsupported() {
        let pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        let input = SampleBuffer::new(vec![1000; 600], AudioFormat::pcm16(48_000, 6)).unwrap();
        let err = pipeline.run(input, target(2000)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }
}
