/// Command-line interface
use crate::config::BeepBoxConfig;
use beepbox_mixer::MixMode;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "beepbox")]
#[command(about = "Mix encoded audio marks into a WAV file at a loudness-adaptive level", long_about = None)]
pub struct Cli {
    /// Key identifier (5 characters in 0-9, a-v) encoded in every mark
    #[arg(short, long)]
    pub key: String,

    /// Output WAV file (16-bit PCM)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Pre-rendered marker message (WAV, first channel used)
    #[arg(long, env = "BEEPBOX_CLIP")]
    pub clip: PathBuf,

    /// Input WAV file (44.1 or 48 kHz) to mix the marks into; omit to write marks only
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Configuration file path (defaults to ./beepbox.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Duration of a marker-only output in seconds
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Seconds between two marks
    #[arg(short, long)]
    pub interval: Option<f64>,

    /// Time of the first mark in seconds
    #[arg(short, long)]
    pub start: Option<f64>,

    /// Mixing mode (0/default, 1/global, 2/dynamic)
    #[arg(short = 'x', long = "mix-mode")]
    pub mix_mode: Option<MixMode>,

    /// Marker level in dB
    #[arg(short = 'v', long = "volume-beeps", allow_negative_numbers = true)]
    pub volume_beeps: Option<f32>,

    /// Host program level in dB
    #[arg(short = 'p', long = "volume-program", allow_negative_numbers = true)]
    pub volume_program: Option<f32>,

    /// Lowest marker level in dB for quiet passages
    #[arg(long = "min-beep-level", allow_negative_numbers = true)]
    pub min_beep_level: Option<f32>,

    /// Smoothing time of the level analysis in seconds
    #[arg(long = "smooth-time")]
    pub smooth_time: Option<f32>,

    /// Peak-normalize the mix (true/false)
    #[arg(long)]
    pub normalize: Option<bool>,

    /// Sample rate of a marker-only output
    #[arg(short = 'r', long = "sample-rate")]
    pub sample_rate: Option<u32>,

    /// Report integrated loudness and true peak of the output
    #[arg(short = 'l', long = "loudness-stats")]
    pub loudness_stats: bool,
}

impl Cli {
    /// Apply explicit flags on top of file and environment settings
    pub fn apply_overrides(&self, config: &mut BeepBoxConfig) {
        if let Some(mode) = self.mix_mode {
            config.mix.mode = mode;
        }
        if let Some(db) = self.volume_beeps {
            config.mix.default_beep_level_db = db;
        }
        if let Some(db) = self.volume_program {
            config.mix.default_program_level_db = db;
        }
        if let Some(db) = self.min_beep_level {
            config.mix.min_beep_level_db = db;
        }
        if let Some(secs) = self.smooth_time {
            config.mix.smooth_time_secs = secs;
        }
        if let Some(normalize) = self.normalize {
            config.mix.normalize = normalize;
        }
        if let Some(start) = self.start {
            config.schedule.start_secs = start;
        }
        if let Some(interval) = self.interval {
            config.schedule.interval_secs = interval;
        }
        if let Some(duration) = self.duration {
            config.generate.duration_secs = duration;
        }
        if let Some(rate) = self.sample_rate {
            config.generate.sample_rate = rate;
        }
    }
}
