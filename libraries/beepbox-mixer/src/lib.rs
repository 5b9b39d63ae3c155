//! Loudness-adaptive marker mixing for BeepBox
//!
//! This crate blends an externally encoded marker signal into host program
//! audio at a level that follows the host's loudness:
//! - Short-term energy envelope of the host reference channel
//! - Logarithmic energy curve, stability curve and a loudness percentile
//! - Three mixing strategies (default, global level, dynamic level)
//! - Optional peak normalization of the mixed result
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌──────────────────┐
//! │ Host ch. 0   │ ──► │ EnergyAnalyzer │ ──► │ DynamicsEstimator│
//! └──────────────┘     └────────────────┘     └──────────────────┘
//!                                                      │
//!                                                      ▼
//! ┌──────────────┐     ┌────────────────┐     ┌──────────────────┐
//! │ Marker       │ ──► │  LevelMixer    │ ◄── │   Level curve    │
//! └──────────────┘     └────────────────┘     └──────────────────┘
//!                              │
//!                              ▼
//!                       Mixed ChannelBuffer
//! ```
//!
//! # Example
//!
//! ```rust
//! use beepbox_core::ChannelBuffer;
//! use beepbox_mixer::{LevelMixer, MixConfig, MixMode};
//!
//! let host = ChannelBuffer::silent(2, 44_100, 44_100);
//! let marker = vec![0.5_f32; 44_100];
//!
//! let config = MixConfig::default()
//!     .with_mode(MixMode::DefaultLevel)
//!     .with_normalize(false);
//! let mixed = LevelMixer::new(config).mix(&host, &marker)?;
//!
//! assert_eq!(mixed.num_samples(), host.num_samples());
//! # Ok::<(), beepbox_mixer::MixError>(())
//! ```

#![deny(unsafe_code)]

mod config;
mod dynamics;
mod energy;
mod error;
mod mixer;
mod progress;
mod smoothing;
mod window;

pub use config::{MixConfig, MixMode};
pub use dynamics::{
    energy_to_db, estimate_dynamics, loudness_percentile, stability_curve, DynamicsCurves,
};
pub use energy::{analyze_energy, frame_count, hop_size, EnergyEnvelope};
pub use error::{MixError, Result};
pub use mixer::{analysis_frame_time, db_to_linear, level_curve, LevelAnalysis, LevelMixer};
pub use smoothing::smooth;
pub use window::{hanning, Window};

/// Hop between analysis frames, in samples at the host rate (~11.6 ms at 44.1 kHz)
pub const ANALYSIS_HOP_SAMPLES: f64 = 512.0;

/// Upper bound for the single marker gain used in global level mode
pub const GLOBAL_LEVEL_CEILING: f32 = 0.95;
