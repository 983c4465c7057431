/// Configuration loading
///
/// Layers, lowest precedence first:
/// 1. built-in defaults (`PipelineConfig::default()`)
/// 2. `booster.toml` in the working directory, or the file given with `--config`
/// 3. `BOOSTER_*` environment variables (`__` separates nested keys, e.g.
///    `BOOSTER_INGEST__SAMPLE_RATE`)
///
/// Command-line flags are applied on top by the binary.
use booster_audio::PipelineConfig;
use booster_core::{BoosterError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Config file picked up when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "booster.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "BOOSTER";

/// Load configuration from file and the process environment
pub fn load(path: Option<&Path>) -> Result<PipelineConfig> {
    load_with_env(path, None)
}

/// Load configuration, reading environment overrides from `env` instead of
/// the process environment when given
pub fn load_with_env(
    path: Option<&Path>,
    env: Option<HashMap<String, String>>,
) -> Result<PipelineConfig> {
    let mut settings = config::Config::builder();

    match path {
        // An explicit file must exist
        Some(path) => {
            if !path.exists() {
                return Err(BoosterError::invalid_config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            settings = settings.add_source(config::File::from(path.to_path_buf()));
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                settings = settings.add_source(config::File::from(default_path));
            }
        }
    }

    // Override with environment variables (prefixed with BOOSTER_)
    settings = settings.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env),
    );

    let config: PipelineConfig = settings
        .build()
        .map_err(|e| BoosterError::invalid_config(e.to_string()))?
        .try_deserialize()
        .map_err(|e| BoosterError::invalid_config(e.to_string()))?;

    config.validate()?;
    Ok(config)
}
