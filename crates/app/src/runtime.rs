//! Runtime wiring for the readaloud binary

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use readaloud_core::{PlaybackController, PlaybackError, Settings, SpeechParams};
use readaloud_tts::{EngineConfig, SpeechEngine};
use readaloud_tts_espeak::EspeakEngine;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::commands::{self, Command};
use crate::selection;
use crate::surface::TermSurface;

pub struct RuntimeOptions {
    pub settings_path: PathBuf,
    pub voice: Option<String>,
    pub rate: Option<f32>,
}

pub async fn run(opts: RuntimeOptions) -> Result<()> {
    let settings = Settings::from_path(&opts.settings_path).map_err(|e| anyhow!(e))?;
    debug!(
        "settings loaded from {}: {:?}",
        opts.settings_path.display(),
        settings
    );

    let (event_tx, mut event_rx) = mpsc::channel(100);
    let mut engine = EspeakEngine::new(event_tx);
    engine
        .initialize(EngineConfig {
            default_voice: opts.voice.clone(),
            ..Default::default()
        })
        .await?;

    let params = SpeechParams {
        rate: opts.rate.unwrap_or(settings.speech_rate),
        volume: 1.0,
        voice_id: opts.voice,
    };
    let mut controller =
        PlaybackController::new(Box::new(engine), Box::new(TermSurface::new()), params);

    println!("readaloud ready. Select text anywhere, then type `read`. `help` lists commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => {
                controller.handle_event(event).await;
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match commands::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = dispatch(&mut controller, command, &opts.settings_path).await {
                            // Already surfaced as a notice; keep a trace for logs.
                            debug!("command failed: {e}");
                        }
                    }
                    Err(usage) => println!("{usage}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    let _ = controller.stop().await;
    info!("readaloud stopped");
    Ok(())
}

async fn dispatch(
    controller: &mut PlaybackController,
    command: Command,
    settings_path: &Path,
) -> Result<(), PlaybackError> {
    match command {
        Command::Read(inline) => {
            let text = match inline {
                Some(text) => text,
                None => match selection::current_selection() {
                    Ok(text) => text,
                    Err(e) => {
                        // An empty selection gets the standard notice path.
                        warn!("selection capture failed: {e}");
                        String::new()
                    }
                },
            };
            controller.start(&text).await
        }
        Command::Pause => controller.pause().await,
        Command::Resume => controller.resume().await,
        Command::Toggle => controller.toggle_pause().await,
        Command::Stop => controller.stop().await,
        Command::Rate(rate) => {
            controller.set_rate(rate).await?;
            // Settings bridge: the persisted rate follows the panel.
            let settings = Settings {
                speech_rate: controller.params().rate,
            };
            if let Err(e) = settings.store(settings_path) {
                warn!("failed to persist settings: {e}");
            }
            Ok(())
        }
        Command::Volume(volume) => controller.set_volume(volume).await,
        Command::Voice(id) => controller.set_voice(&id).await,
        Command::Voices => {
            controller.refresh_voices().await;
            if controller.voices().is_empty() {
                println!("no voices reported by the engine");
            }
            for voice in controller.voices() {
                println!("  {:<12} {}", voice.id, voice.label());
            }
            Ok(())
        }
        Command::Help => {
            println!("{}", commands::HELP);
            Ok(())
        }
        Command::Quit => Ok(()),
    }
}
