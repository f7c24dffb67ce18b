use std::path::PathBuf;

use clap::Parser;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;

mod commands;
mod runtime;
mod selection;
mod surface;

#[derive(Parser, Debug)]
#[command(
    name = "readaloud",
    about = "Read selected text aloud with adjustable voice, speed, and volume"
)]
struct Cli {
    /// Voice to start with (see the `voices` command)
    #[arg(long)]
    voice: Option<String>,

    /// Initial playback rate, overriding the persisted setting
    #[arg(long)]
    rate: Option<f32>,

    /// Settings file location
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log filter (falls back to RUST_LOG, then "info")
    #[arg(long, default_value = "")]
    log_level: String,
}

fn init_logging(cli_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all("logs")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "readaloud.log");
    let (non_blocking_file, _guard) = tracing_appender::non_blocking(file_appender);
    let log_level = if cli_level.is_empty() {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    } else {
        cli_level.to_string()
    };
    // stdout belongs to the control surface; logs go to stderr and the file.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr.and(non_blocking_file))
        .with_env_filter(log_level)
        .init();
    std::mem::forget(_guard);
    Ok(())
}

fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("readaloud")
        .join("settings.toml")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level).map_err(|e| anyhow::anyhow!("failed to set up logging: {e}"))?;
    tracing::info!("starting readaloud");

    let opts = runtime::RuntimeOptions {
        settings_path: cli.settings.unwrap_or_else(default_settings_path),
        voice: cli.voice,
        rate: cli.rate,
    };
    runtime::run(opts).await
}
