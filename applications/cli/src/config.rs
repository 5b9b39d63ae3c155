/// Driver configuration
use crate::error::{AppError, Result};
use crate::schedule::MarkerSchedule;
use beepbox_core::SampleRate;
use beepbox_mixer::{MixConfig, MixMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "beepbox.toml";

/// Prefix for environment overrides, e.g. `BEEPBOX__MIX__MODE=global_level`
pub const ENV_PREFIX: &str = "BEEPBOX";

/// Longest marker-only track that generate mode will write (24 hours)
pub const MAX_GENERATE_SECS: f64 = 86_400.0;

/// Mixing strategy of a run without `-x` or a `mix.mode` setting
pub const DRIVER_MIX_MODE: MixMode = MixMode::DefaultLevel;

/// A plain run never rescales the host program
pub const DRIVER_NORMALIZE: bool = false;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BeepBoxConfig {
    #[serde(default = "default_mix")]
    pub mix: MixConfig,

    #[serde(default)]
    pub schedule: MarkerSchedule,

    #[serde(default)]
    pub generate: GenerateSettings,
}

/// Output format of generate mode (no host file)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GenerateSettings {
    #[serde(default = "default_duration_secs")]
    pub duration_secs: f64,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
}

impl Default for BeepBoxConfig {
    fn default() -> Self {
        Self {
            mix: default_mix(),
            schedule: MarkerSchedule::default(),
            generate: GenerateSettings::default(),
        }
    }
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            duration_secs: default_duration_secs(),
            sample_rate: default_sample_rate(),
        }
    }
}

impl BeepBoxConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `beepbox.toml` in the working
    /// directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // A partial [mix] section keeps the driver defaults, not the library ones
        let mut settings = config::Config::builder()
            .set_default("mix.mode", DRIVER_MIX_MODE.as_str())?
            .set_default("mix.normalize", DRIVER_NORMALIZE)?;

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if config_path.exists() {
                    settings = settings.add_source(config::File::from(config_path));
                }
            }
        }

        // Override with environment variables (BEEPBOX__SECTION__KEY)
        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate the parts that do not depend on the marker clip
    pub fn validate(&self) -> Result<()> {
        self.mix.validate()?;

        if !self.schedule.start_secs.is_finite() || self.schedule.start_secs < 0.0 {
            return Err(AppError::Config(format!(
                "schedule.start_secs must be non-negative, got {}",
                self.schedule.start_secs
            )));
        }
        if !self.schedule.interval_secs.is_finite() || self.schedule.interval_secs <= 0.0 {
            return Err(AppError::Config(format!(
                "schedule.interval_secs must be positive, got {}",
                self.schedule.interval_secs
            )));
        }
        if self.generate.sample_rate == 0 {
            return Err(AppError::Config(
                "generate.sample_rate must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Checks that only apply when writing a marker-only track
    pub fn validate_generate(&self) -> Result<()> {
        let duration = self.generate.duration_secs;
        if !duration.is_finite() || duration > MAX_GENERATE_SECS {
            return Err(AppError::Config(format!(
                "duration {} s is too long, the maximum allowed duration is {} s (24 hours)",
                duration, MAX_GENERATE_SECS
            )));
        }

        let min_duration = self.schedule.start_secs + 0.1;
        if duration < min_duration {
            return Err(AppError::Config(format!(
                "duration {} s is too short, the minimum allowed duration is {} s (start time + 0.1 s)",
                duration, min_duration
            )));
        }

        Ok(())
    }
}

// Default values
fn default_mix() -> MixConfig {
    MixConfig::default()
        .with_mode(DRIVER_MIX_MODE)
        .with_normalize(DRIVER_NORMALIZE)
}

fn default_duration_secs() -> f64 {
    60.0
}

fn default_sample_rate() -> u32 {
    SampleRate::default().as_hz()
}
