//! Loudness statistics for mixed BeepBox output
//!
//! Measures a finished buffer once, after mixing:
//! - EBU R128 integrated loudness (LUFS)
//! - True peak (dBTP, 4x oversampled by `ebur128`)
//! - Sample peak (dBFS)
//!
//! # Example
//!
//! ```rust
//! use beepbox_core::ChannelBuffer;
//! use beepbox_loudness::LoudnessAnalyzer;
//!
//! let samples: Vec<f32> = (0..48_000)
//!     .map(|i| 0.5 * (2.0 * std::f32::consts::PI * 1_000.0 * i as f32 / 48_000.0).sin())
//!     .collect();
//! let buffer = ChannelBuffer::mono(samples, 48_000)?;
//!
//! let stats = LoudnessAnalyzer::measure(&buffer)?;
//! println!("{}", stats);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]

mod analyzer;
mod error;

pub use analyzer::{LoudnessAnalyzer, LoudnessStats};
pub use error::{LoudnessError, Result};

/// Lowest sample rate the meter accepts
pub const MIN_SAMPLE_RATE: u32 = 8_000;

/// Highest sample rate the meter accepts
pub const MAX_SAMPLE_RATE: u32 = 384_000;

/// Highest channel count the meter accepts
pub const MAX_CHANNELS: u32 = 8;
