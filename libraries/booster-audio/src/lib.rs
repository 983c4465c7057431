//! Sound Booster Audio
//!
//! Decoding, effects and the end-to-end processing pipeline for Sound Booster.
//!
//! This crate provides:
//! - Audio decoding via Symphonia (MP3, WAV) into integer sample buffers
//! - WAV export via hound
//! - Format ingestion (48 kHz / 16-bit / peak-normalized for uncompressed input)
//! - Stereo widening and bass-window attenuation effects
//! - The `Pipeline` that chains every stage, a background `ProcessingJob`,
//!   and a `BoosterSession` that keeps the last result for export
//!
//! # Example: Processing a File
//!
//! ```rust,no_run
//! use booster_audio::{BoosterSession, PipelineConfig};
//! use booster_loudness::TargetRmsLevel;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = BoosterSession::new(PipelineConfig::default())?;
//! let report = session.process_file(Path::new("song.wav"), TargetRmsLevel::new(6000)?)?;
//! println!("Applied {:.2} dB", report.gain.gain_db);
//!
//! session.export(Path::new("song-boosted.wav"))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Using Effects
//!
//! ```rust
//! use booster_audio::effects::{BandEnergyAnalyzer, BassAttenuator, StereoWidener};
//! use booster_core::{AudioFormat, SampleBuffer};
//!
//! let buffer = SampleBuffer::new(vec![1000; 9600], AudioFormat::pcm16(48_000, 1)).unwrap();
//!
//! let widened = StereoWidener::default().process(buffer).unwrap();
//! let windows = BandEnergyAnalyzer::default().analyze(&widened).unwrap();
//! let attenuated = BassAttenuator::default().process(&widened, &windows).unwrap();
//! assert_eq!(attenuated.channels(), 2);
//! ```

mod config;
mod decoder;
pub mod effects;
mod encoder;
mod ingest;
mod job;
mod pipeline;
mod resampling;
mod session;

pub use config::{IngestSettings, PipelineConfig};
pub use decoder::SymphoniaDecoder;
pub use encoder::WavEncoder;
pub use ingest::{ContainerKind, FormatIngestor};
pub use job::{JobEvent, JobRequest, ProcessingJob};
pub use pipeline::{CancelToken, Pipeline, PipelineReport, ProcessedAudio};
pub use resampling::resample;
pub use session::BoosterSession;
