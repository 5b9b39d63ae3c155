/// Driver error types
use beepbox_core::CoreError;
use beepbox_loudness::LoudnessError;
use beepbox_mixer::MixError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Unsupported sample rate: {0} Hz (use 44100 or 48000)")]
    UnsupportedSampleRate(u32),

    #[error("Marker clip is {clip} Hz but the output is {output} Hz")]
    SampleRateMismatch { clip: u32, output: u32 },

    #[error("Unsupported WAV format: {0}")]
    UnsupportedFormat(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] CoreError),

    #[error("Mixing error: {0}")]
    Mix(#[from] MixError),

    #[error("Loudness error: {0}")]
    Loudness(#[from] LoudnessError),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
