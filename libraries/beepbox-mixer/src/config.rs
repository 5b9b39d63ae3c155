//! Mixing configuration
//!
//! `MixConfig` is caller-supplied and read-only for the duration of a mix.

use crate::error::{MixError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strategy used to derive the marker gain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixMode {
    /// Fixed marker and host gains
    #[serde(alias = "default")]
    DefaultLevel,
    /// One marker gain for the whole buffer, derived from the loudness percentile
    #[serde(alias = "global")]
    GlobalLevel,
    /// Per-sample marker gain following the host's energy curve
    #[default]
    #[serde(alias = "dynamic")]
    DynamicLevel,
}

impl MixMode {
    /// Convert to string for settings persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefaultLevel => "default_level",
            Self::GlobalLevel => "global_level",
            Self::DynamicLevel => "dynamic_level",
        }
    }

    /// Numeric code used on the command line (0, 1, 2)
    pub fn code(&self) -> i32 {
        match self {
            Self::DefaultLevel => 0,
            Self::GlobalLevel => 1,
            Self::DynamicLevel => 2,
        }
    }
}

impl TryFrom<i32> for MixMode {
    type Error = MixError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::DefaultLevel),
            1 => Ok(Self::GlobalLevel),
            2 => Ok(Self::DynamicLevel),
            other => Err(MixError::invalid_config(format!(
                "unsupported mix mode {} (expected 0, 1 or 2)",
                other
            ))),
        }
    }
}

impl FromStr for MixMode {
    type Err = MixError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "0" | "default" | "default_level" => Ok(Self::DefaultLevel),
            "1" | "global" | "global_level" => Ok(Self::GlobalLevel),
            "2" | "dynamic" | "dynamic_level" => Ok(Self::DynamicLevel),
            other => Err(MixError::invalid_config(format!(
                "unsupported mix mode '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for MixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mixing configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixConfig {
    /// Target marker level in dB when the host is loud and stable (default: -3.0)
    pub default_beep_level_db: f32,

    /// Floor below which the marker gain never drops, in dB (default: -20.0)
    pub min_beep_level_db: f32,

    /// Fixed host gain in dB (default: 0.0)
    pub default_program_level_db: f32,

    /// Moving-average window for the energy and stability curves (default: 0.35 s)
    pub smooth_time_secs: f32,

    /// Mixing strategy (default: dynamic level)
    pub mode: MixMode,

    /// Peak-normalize the mixed buffer (default: true)
    pub normalize: bool,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            default_beep_level_db: -3.0,
            min_beep_level_db: -20.0,
            default_program_level_db: 0.0,
            smooth_time_secs: 0.35,
            mode: MixMode::DynamicLevel,
            normalize: true,
        }
    }
}

impl MixConfig {
    /// Set the target marker level in dB
    #[must_use]
    pub fn with_beep_level_db(mut self, db: f32) -> Self {
        self.default_beep_level_db = db;
        self
    }

    /// Set the marker level floor in dB
    #[must_use]
    pub fn with_min_beep_level_db(mut self, db: f32) -> Self {
        self.min_beep_level_db = db;
        self
    }

    /// Set the host gain in dB
    #[must_use]
    pub fn with_program_level_db(mut self, db: f32) -> Self {
        self.default_program_level_db = db;
        self
    }

    /// Set the smoothing window in seconds
    #[must_use]
    pub fn with_smooth_time_secs(mut self, secs: f32) -> Self {
        self.smooth_time_secs = secs;
        self
    }

    /// Set the mixing strategy
    #[must_use]
    pub fn with_mode(mut self, mode: MixMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable or disable peak normalization
    #[must_use]
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// True when the marker floor lies above the target level
    ///
    /// Mixing still works: every level clamps to the floor.
    pub fn has_inverted_range(&self) -> bool {
        self.min_beep_level_db > self.default_beep_level_db
    }

    /// Validate configuration
    ///
    /// # Errors
    /// Returns `MixError::InvalidConfig` for non-finite levels or a smoothing
    /// time that is not strictly positive.
    pub fn validate(&self) -> Result<()> {
        let levels = [
            ("default_beep_level_db", self.default_beep_level_db),
            ("min_beep_level_db", self.min_beep_level_db),
            ("default_program_level_db", self.default_program_level_db),
        ];
        for (name, value) in levels {
            if !value.is_finite() {
                return Err(MixError::invalid_config(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }

        if !self.smooth_time_secs.is_finite() || self.smooth_time_secs <= 0.0 {
            return Err(MixError::invalid_config(format!(
                "smooth_time_secs must be positive, got {}",
                self.smooth_time_secs
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_levels() {
        let config = MixConfig::default();
        assert_eq!(config.default_beep_level_db, -3.0);
        assert_eq!(config.min_beep_level_db, -20.0);
        assert_eq!(config.default_program_level_db, 0.0);
        assert!((config.smooth_time_secs - 0.35).abs() < 1e-6);
        assert_eq!(config.mode, MixMode::DynamicLevel);
        assert!(config.normalize);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn mode_codes() {
        assert_eq!(MixMode::try_from(0).unwrap(), MixMode::DefaultLevel);
        assert_eq!(MixMode::try_from(1).unwrap(), MixMode::GlobalLevel);
        assert_eq!(MixMode::try_from(2).unwrap(), MixMode::DynamicLevel);
        assert!(matches!(
            MixMode::try_from(3),
            Err(MixError::InvalidConfig(_))
        ));
        assert!(MixMode::try_from(-1).is_err());

        for mode in [MixMode::DefaultLevel, MixMode::GlobalLevel, MixMode::DynamicLevel] {
            assert_eq!(MixMode::try_from(mode.code()).unwrap(), mode);
        }
    }

    #[test]
    fn mode_parsing() {
        assert_eq!("default".parse::<MixMode>().unwrap(), MixMode::DefaultLevel);
        assert_eq!("GLOBAL".parse::<MixMode>().unwrap(), MixMode::GlobalLevel);
        assert_eq!(
            "dynamic_level".parse::<MixMode>().unwrap(),
            MixMode::DynamicLevel
        );
        assert_eq!("2".parse::<MixMode>().unwrap(), MixMode::DynamicLevel);
        assert!("loudest".parse::<MixMode>().is_err());
    }

    #[test]
    fn rejects_non_finite_levels() {
        let config = MixConfig::default().with_beep_level_db(f32::NAN);
        assert!(matches!(
            config.validate(),
            Err(MixError::InvalidConfig(_))
        ));

        let config = MixConfig::default().with_program_level_db(f32::INFINITY);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_smoothing() {
        assert!(MixConfig::default()
            .with_smooth_time_secs(0.0)
            .validate()
            .is_err());
        assert!(MixConfig::default()
            .with_smooth_time_secs(-0.1)
            .validate()
            .is_err());
    }

    #[test]
    fn inverted_range_is_valid() {
        let config = MixConfig::default()
            .with_beep_level_db(-30.0)
            .with_min_beep_level_db(-10.0);
        assert!(config.has_inverted_range());
        assert!(config.validate().is_ok());
    }
}
