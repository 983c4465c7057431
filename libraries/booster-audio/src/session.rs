//! Last-result holder for export
//!
//! A session owns the most recent successful run. Every new run replaces it
//! wholesale, and a failed run clears it so stale audio is never exported.

use crate::config::PipelineConfig;
use crate::encoder::WavEncoder;
use crate::job::JobEvent;
use crate::pipeline::{CancelToken, Pipeline, PipelineReport, ProcessedAudio};
use booster_core::{AudioEncoder, BoosterError, Result};
use booster_loudness::TargetRmsLevel;
use std::path::Path;

/// Processing session
pub struct BoosterSession<E: AudioEncoder = WavEncoder> {
    pipeline: Pipeline,
    encoder: E,
    last: Option<ProcessedAudio>,
}

impl BoosterSession<WavEncoder> {
    /// Session exporting WAV files
    ///
    /// # Errors
    /// `InvalidConfig` if the configuration does not validate
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_encoder(config, WavEncoder::new())
    }
}

impl<E: AudioEncoder> BoosterSession<E> {
    /// Session with a custom encoder
    pub fn with_encoder(config: PipelineConfig, encoder: E) -> Result<Self> {
        Ok(Self {
            pipeline: Pipeline::new(config)?,
            encoder,
            last: None,
        })
    }

    /// Pipeline used for synchronous runs
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Process a file on the calling thread and keep the result
    pub fn process_file(
        &mut self,
        path: &Path,
        target: TargetRmsLevel,
    ) -> Result<&PipelineReport> {
        self.last = None;
        let processed = self
            .pipeline
            .process_file(path, target, &CancelToken::new())?;
        Ok(&self.last.insert(processed).report)
    }

    /// Take the outcome of a background job
    pub fn accept(&mut self, event: JobEvent) -> Result<&PipelineReport> {
        self.last = None;
        let processed = event.into_result()?;
        Ok(&self.last.insert(processed).report)
    }

    /// Result of the last successful run
    pub fn last(&self) -> Option<&ProcessedAudio> {
        self.last.as_ref()
    }

    /// Write the last result to `path`
    ///
    /// # Errors
    /// `NothingProcessed` if no run has succeeded, otherwise encoder errors
    pub fn export(&self, path: &Path) -> Result<()> {
        let processed = self.last.as_ref().ok_or(BoosterError::NothingProcessed)?;
        self.encoder.export(&processed.buffer, path)?;
        tracing::info!(
            path = %path.display(),
            format = self.encoder.extension(),
            duration_secs = processed.report.output_duration_secs,
            "Exported result"
        );
        Ok(())
    }

    /// Forget the last result
    pub fn clear(&mut self) {
        self.last = None;
    }
}
