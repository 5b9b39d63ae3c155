//! WAV file I/O via hound

use crate::error::{AppError, Result};
use crate::progress::StageProgress;
use beepbox_core::ChannelBuffer;
use std::path::Path;
use tracing::debug;

/// Frames written between two progress checks
const WRITE_BLOCK_FRAMES: usize = 4096;

/// Read a WAV file into a planar buffer of samples in [-1, 1]
pub fn read_wav(path: &Path) -> Result<ChannelBuffer> {
    let reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels);

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(AppError::UnsupportedFormat(format!(
                    "{} bits per sample",
                    spec.bits_per_sample
                )));
            }
            let max_val = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_val))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    debug!(
        path = %path.display(),
        channels,
        sample_rate = spec.sample_rate,
        bits = spec.bits_per_sample,
        frames = samples.len() / channels.max(1),
        "Read WAV file"
    );

    Ok(ChannelBuffer::from_interleaved(
        &samples,
        channels,
        spec.sample_rate,
    )?)
}

/// Convert one sample to 16-bit PCM, clipping to full scale
pub fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16
}

/// Write a buffer as 16-bit PCM WAV with the buffer's channel count and rate
pub fn write_wav_pcm16(path: &Path, buffer: &ChannelBuffer) -> Result<()> {
    let channels = u16::try_from(buffer.num_channels()).map_err(|_| {
        AppError::UnsupportedFormat(format!("{} channels", buffer.num_channels()))
    })?;
    let spec = hound::WavSpec {
        channels,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    let mut progress = StageProgress::start("SAVE");
    let interleaved = buffer.to_interleaved();
    let block = WRITE_BLOCK_FRAMES * usize::from(channels);
    for (index, chunk) in interleaved.chunks(block).enumerate() {
        for &sample in chunk {
            writer.write_sample(to_pcm16(sample))?;
        }
        progress.advance(index * block + chunk.len(), interleaved.len());
    }
    writer.finalize()?;
    progress.finish();

    debug!(
        path = %path.display(),
        channels,
        sample_rate = buffer.sample_rate(),
        frames = buffer.num_samples(),
        "Wrote WAV file"
    );
    Ok(())
}
