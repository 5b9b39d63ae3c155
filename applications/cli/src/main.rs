/// BeepBox - audio mark mixer
use anyhow::Context;
use beepbox::Cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beepbox=info,beepbox_mixer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting BeepBox");
    tracing::info!("Key: {}", cli.key);
    match &cli.file {
        Some(file) => tracing::info!("Mixing into {}", file.display()),
        None => tracing::info!("No input file, writing marks only"),
    }

    let summary = beepbox::run(&cli)
        .with_context(|| format!("failed to produce {}", cli.output.display()))?;

    if let Some(stats) = &summary.loudness {
        println!("{}", stats);
    }
    tracing::info!(
        "Done: {} ({} ch, {} Hz, {} samples)",
        summary.output.display(),
        summary.channels,
        summary.sample_rate,
        summary.num_samples
    );

    Ok(())
}
