/// Pipeline configuration
use crate::effects::{
    ReassemblyMode, BASS_CUT_DB, BASS_THRESHOLD, DEFAULT_WIDENING_FACTOR, HIGH_PASS_HZ,
    LOW_PASS_HZ, RATE_OFFSET_HZ, WINDOW_SAMPLES,
};
use booster_core::{BoosterError, Result, SampleWidth};
use booster_loudness::{GainPolarity, TargetRmsLevel, MAX_GAIN_DB, NORMALIZE_HEADROOM_DB};
use serde::{Deserialize, Serialize};

/// Every tunable of the processing pipeline
///
/// `Default` reproduces the built-in constants; missing fields in a config
/// file fall back to them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub target_rms_level: TargetRmsLevel,

    #[serde(default = "default_gain_ceiling_db")]
    pub gain_ceiling_db: f64,

    #[serde(default)]
    pub gain_polarity: GainPolarity,

    #[serde(default = "default_widening_factor")]
    pub widening_factor: f64,

    #[serde(default = "default_rate_offset_hz")]
    pub rate_offset_hz: u32,

    #[serde(default = "default_window_samples")]
    pub window_samples: usize,

    #[serde(default = "default_bass_threshold")]
    pub bass_threshold: f64,

    #[serde(default = "default_low_pass_hz")]
    pub low_pass_hz: f64,

    #[serde(default = "default_high_pass_hz")]
    pub high_pass_hz: f64,

    #[serde(default = "default_bass_cut_db")]
    pub bass_cut_db: f64,

    #[serde(default)]
    pub reassembly: ReassemblyMode,

    #[serde(default)]
    pub ingest: IngestSettings,
}

/// Conversion applied to uncompressed input
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct IngestSettings {
    #[serde(default = "default_ingest_sample_rate")]
    pub sample_rate: u32,

    /// Bytes per sample
    #[serde(default = "default_ingest_sample_width")]
    pub sample_width: u16,

    #[serde(default = "default_headroom_db")]
    pub headroom_db: f64,
}

impl IngestSettings {
    /// Sample width as a typed value
    pub fn width(&self) -> Result<SampleWidth> {
        SampleWidth::from_bytes(self.sample_width)
            .map_err(|e| BoosterError::invalid_config(e.to_string()))
    }
}

impl PipelineConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.gain_ceiling_db.is_finite() {
            return Err(BoosterError::invalid_config("gain ceiling must be finite"));
        }

        if !(self.widening_factor.is_finite() && self.widening_factor.abs() <= 1.0) {
            return Err(BoosterError::invalid_config(format!(
                "widening factor must be within [-1, 1], got {}",
                self.widening_factor
            )));
        }

        if self.window_samples == 0 {
            return Err(BoosterError::invalid_config(
                "window length must be at least one sample",
            ));
        }

        if self.bass_threshold.is_nan() {
            return Err(BoosterError::invalid_config("bass threshold is NaN"));
        }

        for (name, hz) in [
            ("low-pass", self.low_pass_hz),
            ("high-pass", self.high_pass_hz),
        ] {
            if !(hz.is_finite() && hz > 0.0) {
                return Err(BoosterError::invalid_config(format!(
                    "{name} cutoff must be positive, got {hz} Hz"
                )));
            }
        }

        if !self.bass_cut_db.is_finite() {
            return Err(BoosterError::invalid_config("bass cut must be finite"));
        }

        if self.ingest.sample_rate == 0 {
            return Err(BoosterError::invalid_config("ingest sample rate of 0 Hz"));
        }
        self.ingest.width()?;

        if !(self.ingest.headroom_db.is_finite() && self.ingest.headroom_db >= 0.0) {
            return Err(BoosterError::invalid_config(format!(
                "normalize headroom must be non-negative, got {} dB",
                self.ingest.headroom_db
            )));
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_rms_level: TargetRmsLevel::default(),
            gain_ceiling_db: default_gain_ceiling_db(),
            gain_polarity: GainPolarity::default(),
            widening_factor: default_widening_factor(),
            rate_offset_hz: default_rate_offset_hz(),
            window_samples: default_window_samples(),
            bass_threshold: default_bass_threshold(),
            low_pass_hz: default_low_pass_hz(),
            high_pass_hz: default_high_pass_hz(),
            bass_cut_db: default_bass_cut_db(),
            reassembly: ReassemblyMode::default(),
            ingest: IngestSettings::default(),
        }
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            sample_rate: default_ingest_sample_rate(),
            sample_width: default_ingest_sample_width(),
            headroom_db: default_headroom_db(),
        }
    }
}

// Default values
fn default_gain_ceiling_db() -> f64 {
    MAX_GAIN_DB
}

fn default_widening_factor() -> f64 {
    DEFAULT_WIDENING_FACTOR
}

fn default_rate_offset_hz() -> u32 {
    RATE_OFFSET_HZ
}

fn default_window_samples() -> usize {
    WINDOW_SAMPLES
}

fn default_bass_threshold() -> f64 {
    BASS_THRESHOLD
}

fn default_low_pass_hz() -> f64 {
    LOW_PASS_HZ
}

fn default_high_pass_hz() -> f64 {
    HIGH_PASS_HZ
}

fn default_bass_cut_db() -> f64 {
    BASS_CUT_DB
}

fn default_ingest_sample_rate() -> u32 {
    48_000
}

fn default_ingest_sample_width() -> u16 {
    2
}

fn default_headroom_db() -> f64 {
    NORMALIZE_HEADROOM_DB
}
