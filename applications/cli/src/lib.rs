//! BeepBox driver
//!
//! Reads a host WAV file, schedules encoded audio marks along its timeline,
//! mixes them in at a loudness-adaptive level and writes 16-bit PCM output.
//! Without a host file it writes a marker-only track instead.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod payload;
pub mod progress;
pub mod schedule;
pub mod wav;

pub use app::{run, RunSummary};
pub use cli::Cli;
pub use config::BeepBoxConfig;
pub use error::{AppError, Result};
