//! Configuration layering tests

use booster::config::load_with_env;
use booster_audio::effects::ReassemblyMode;
use booster_audio::PipelineConfig;
use booster_core::ErrorKind;
use booster_loudness::GainPolarity;
use std::collections::HashMap;

fn no_env() -> Option<HashMap<String, String>> {
    Some(HashMap::new())
}

#[test]
fn missing_default_file_gives_defaults() {
    let config = load_with_env(None, no_env()).unwrap();
    assert_eq!(config, PipelineConfig::default());
}

#[test]
fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("booster.toml");
    std::fs::write(
        &path,
        r#"
target_rms_level = 6000
gain_polarity = "toward-target"
reassembly = "flagged-only"
bass_threshold = 1000000.0

[ingest]
sample_rate = 44100
"#,
    )
    .unwrap();

    let config = load_with_env(Some(&path), no_env()).unwrap();
    assert_eq!(config.target_rms_level.value(), 6000);
    assert_eq!(config.gain_polarity, GainPolarity::TowardTarget);
    assert_eq!(config.reassembly, ReassemblyMode::FlaggedOnly);
    assert_eq!(config.bass_threshold, 1_000_000.0);
    assert_eq!(config.ingest.sample_rate, 44_100);
    // Untouched values keep their defaults
    assert_eq!(config.window_samples, 5000);
    assert_eq!(config.ingest.sample_width, 2);
}

#[test]
fn environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("booster.toml");
    std::fs::write(&path, "target_rms_level = 6000\n").unwrap();

    let env = HashMap::from([
        ("BOOSTER_TARGET_RMS_LEVEL".to_string(), "9000".to_string()),
        ("BOOSTER_INGEST__SAMPLE_RATE".to_string(), "96000".to_string()),
    ]);
    let config = load_with_env(Some(&path), Some(env)).unwrap();
    assert_eq!(config.target_rms_level.value(), 9000);
    assert_eq!(config.ingest.sample_rate, 96_000);
}

#[test]
fn out_of_range_target_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("booster.toml");
    std::fs::write(&path, "target_rms_level = 500\n").unwrap();

    let err = load_with_env(Some(&path), no_env()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
}

#[test]
fn invalid_widening_factor_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("booster.toml");
    std::fs::write(&path, "widening_factor = 3.0\n").unwrap();

    let err = load_with_env(Some(&path), no_env()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_with_env(Some(&dir.path().join("nope.toml")), no_env()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
}
