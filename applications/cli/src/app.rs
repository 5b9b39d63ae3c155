//! Mix mode and generate mode

use crate::cli::Cli;
use crate::config::BeepBoxConfig;
use crate::error::{AppError, Result};
use crate::payload::validate_key;
use crate::schedule::{ClipEncoder, MarkerSchedule};
use crate::wav::{read_wav, write_wav_pcm16};
use beepbox_core::{ChannelBuffer, SampleRate};
use beepbox_loudness::{LoudnessAnalyzer, LoudnessError, LoudnessStats};
use beepbox_mixer::{db_to_linear, LevelMixer, MixConfig};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Host rates the driver accepts in mix mode
pub const SUPPORTED_HOST_RATES: [u32; 2] = [
    SampleRate::CD_QUALITY.as_hz(),
    SampleRate::DVD_QUALITY.as_hz(),
];

/// What a run wrote
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output: PathBuf,
    pub channels: usize,
    pub sample_rate: u32,
    pub num_samples: usize,
    pub loudness: Option<LoudnessStats>,
}

/// Load configuration, apply the command line and run the selected mode
pub fn run(cli: &Cli) -> Result<RunSummary> {
    let mut config = BeepBoxConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    validate_key(&cli.key)?;

    let encoder = ClipEncoder::from_wav(&cli.clip)?;
    config.schedule.validate(encoder.duration_secs())?;

    let output = match &cli.file {
        Some(host) => mix_file(host, &encoder, &cli.key, &config)?,
        None => generate_track(&encoder, &cli.key, &config)?,
    };

    write_wav_pcm16(&cli.output, &output)?;
    info!(
        path = %cli.output.display(),
        channels = output.num_channels(),
        sample_rate = output.sample_rate(),
        secs = output.duration_secs(),
        "Output written"
    );

    let loudness = if cli.loudness_stats {
        report_loudness(&output)?
    } else {
        None
    };

    Ok(RunSummary {
        output: cli.output.clone(),
        channels: output.num_channels(),
        sample_rate: output.sample_rate(),
        num_samples: output.num_samples(),
        loudness,
    })
}

fn check_clip_rate(encoder: &ClipEncoder, output_rate: u32) -> Result<()> {
    if encoder.sample_rate() != output_rate {
        return Err(AppError::SampleRateMismatch {
            clip: encoder.sample_rate(),
            output: output_rate,
        });
    }
    Ok(())
}

/// Mix mode: schedule marks along the host and blend them in
fn mix_file(
    host_path: &Path,
    encoder: &ClipEncoder,
    key: &str,
    config: &BeepBoxConfig,
) -> Result<ChannelBuffer> {
    let host = read_wav(host_path)?;
    if !SUPPORTED_HOST_RATES.contains(&host.sample_rate()) {
        return Err(AppError::UnsupportedSampleRate(host.sample_rate()));
    }
    check_clip_rate(encoder, host.sample_rate())?;

    info!(
        path = %host_path.display(),
        channels = host.num_channels(),
        sample_rate = host.sample_rate(),
        secs = host.duration_secs(),
        "Host loaded"
    );

    let marker = config
        .schedule
        .render(encoder, key, host.num_samples(), host.sample_rate())?;

    mix_marker(&host, &marker, config.mix.clone())
}

/// Blend a rendered marker track into the host, logging mixer progress
pub fn mix_marker(host: &ChannelBuffer, marker: &[f32], mix: MixConfig) -> Result<ChannelBuffer> {
    let mixer = LevelMixer::new(mix);
    info!(
        mix_mode = mixer.config().mode.code(),
        normalize = mixer.config().normalize,
        "Mixing marker track"
    );
    let mixed = mixer.mix_with_progress(host, marker, &mut |percent| {
        info!("Progress MIX = {}", percent);
    })?;
    Ok(mixed)
}

/// Generate mode: a mono marker-only track at the configured rate
fn generate_track(encoder: &ClipEncoder, key: &str, config: &BeepBoxConfig) -> Result<ChannelBuffer> {
    config.validate_generate()?;
    let sample_rate = config.generate.sample_rate;
    check_clip_rate(encoder, sample_rate)?;

    let num_samples = (config.generate.duration_secs * f64::from(sample_rate)).round() as usize;
    render_marker_only(&config.schedule, encoder, key, num_samples, sample_rate, &config.mix)
}

/// Render marks alone, scaled by the target marker level
pub fn render_marker_only(
    schedule: &MarkerSchedule,
    encoder: &ClipEncoder,
    key: &str,
    num_samples: usize,
    sample_rate: u32,
    mix: &MixConfig,
) -> Result<ChannelBuffer> {
    let gain = db_to_linear(mix.default_beep_level_db);
    let track: Vec<f32> = schedule
        .render(encoder, key, num_samples, sample_rate)?
        .into_iter()
        .map(|s| s * gain)
        .collect();
    Ok(ChannelBuffer::mono(track, sample_rate)?)
}

fn report_loudness(output: &ChannelBuffer) -> Result<Option<LoudnessStats>> {
    match LoudnessAnalyzer::measure(output) {
        Ok(stats) => {
            info!(
                integrated_lufs = stats.integrated_lufs,
                true_peak_dbtp = stats.true_peak_dbtp,
                "{}",
                stats
            );
            Ok(Some(stats))
        }
        Err(err @ (LoudnessError::SilentAudio | LoudnessError::NoSamples)) => {
            warn!("No loudness statistics: {}", err);
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}
