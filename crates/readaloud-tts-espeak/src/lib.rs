//! eSpeak NG speech engine implementation for readaloud
//!
//! Drives the `espeak-ng` (or `espeak`) command-line synthesizer as a child
//! process per utterance. The process plays audio itself; pause and resume
//! are delivered as SIGSTOP/SIGCONT, cancellation as SIGTERM. The CLI
//! reports no playback progress, so word-boundary events are paced from the
//! configured speaking rate by a background task.

use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use readaloud_tts::{
    next_utterance_id, BoundaryKind, EngineConfig, EngineEvent, EngineEventSender, SpeechEngine,
    SpeechError, SpeechErrorKind, SpeechResult, UtteranceSpec, VoiceInfo,
};
use regex::Regex;
use tokio::process::{Child, Command};
use tracing::{debug, warn};


/// espeak's default speaking rate, mapped to a rate multiplier of 1.0
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Speaking rates espeak accepts for its `-s` flag
const WPM_MIN: u32 = 80;
const WPM_MAX: u32 = 450;

/// How often the boundary pacer re-checks a paused utterance
const PAUSE_POLL: Duration = Duration::from_millis(50);

pub struct EspeakEngine {
    config: EngineConfig,
    command: Option<String>,
    voices: Vec<VoiceInfo>,
    event_tx: EngineEventSender,
    active: Option<ActiveUtterance>,
    active_id: Arc<AtomicU64>,
    paused: Arc<AtomicBool>,
    initialized: bool,
}

struct ActiveUtterance {
    id: u64,
    pid: i32,
}

impl EspeakEngine {
    pub fn new(event_tx: EngineEventSender) -> Self {
        Self {
            config: EngineConfig::default(),
            command: None,
            voices: Vec::new(),
            event_tx,
            active: None,
            active_id: Arc::new(AtomicU64::new(0)),
            paused: Arc::new(AtomicBool::new(false)),
            initialized: false,
        }
    }

    /// Get the espeak command name (espeak-ng or espeak)
    async fn find_espeak_command() -> Option<String> {
        for cmd in ["espeak-ng", "espeak"] {
            if Command::new(cmd)
                .arg("--version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .output()
                .await
                .is_ok()
            {
                return Some(cmd.to_string());
            }
        }
        None
    }

    /// Parse espeak `--voices` output
    ///
    /// Format: Pty Language Age/Gender VoiceName File, e.g.
    /// ` 5  en-US          --/M      English_(America)  gmw/en-US`
    fn parse_voice_list(output: &str) -> Vec<VoiceInfo> {
        let voice_regex =
            Regex::new(r"^\s*\d+\s+([\w-]+)\s+[\w/+-]+\s+([\w()+-]+)").expect("static regex");

        let mut voices = Vec::new();
        for line in output.lines().skip(1) {
            if let Some(captures) = voice_regex.captures(line) {
                let language = captures.get(1).map_or("unknown", |m| m.as_str()).to_string();
                let raw_name = captures.get(2).map_or("unknown", |m| m.as_str());
                voices.push(VoiceInfo {
                    // The language code is what `-v` accepts.
                    id: language.clone(),
                    name: raw_name.replace('_', " "),
                    language,
                });
            }
        }
        voices
    }

    /// Map the 0.5-2.0 rate multiplier onto espeak's words-per-minute scale
    fn words_per_minute(rate: f32) -> u32 {
        ((BASE_WORDS_PER_MINUTE * rate) as u32).clamp(WPM_MIN, WPM_MAX)
    }

    /// Map 0.0-1.0 volume onto espeak's 0-200 amplitude scale (100 nominal)
    fn amplitude(volume: f32) -> u32 {
        (volume.clamp(0.0, 1.0) * 100.0).round() as u32
    }

    /// Byte offsets of each whitespace-delimited word start
    fn word_starts(text: &str) -> Vec<usize> {
        let mut starts = Vec::new();
        let mut in_word = false;
        for (i, ch) in text.char_indices() {
            if ch.is_whitespace() {
                in_word = false;
            } else if !in_word {
                starts.push(i);
                in_word = true;
            }
        }
        starts
    }

    /// Build playback arguments for one utterance
    fn build_playback_args(&self, spec: &UtteranceSpec) -> Vec<String> {
        let mut args = Vec::new();

        let voice = spec.voice_id.as_ref().or(self.config.default_voice.as_ref());
        if let Some(voice_id) = voice {
            args.push("-v".to_string());
            args.push(voice_id.clone());
        }

        args.push("-s".to_string());
        args.push(Self::words_per_minute(spec.rate).to_string());

        args.push("-a".to_string());
        args.push(Self::amplitude(spec.volume).to_string());

        args.push(spec.text.clone());
        args
    }

    fn signal_pid(pid: i32, sig: Signal) -> SpeechResult<()> {
        match signal::kill(Pid::from_raw(pid), sig) {
            Ok(()) => Ok(()),
            // Process already gone; pause/cancel of a finished utterance is a no-op.
            Err(Errno::ESRCH) => Ok(()),
            Err(e) => Err(SpeechError::Io(std::io::Error::from_raw_os_error(e as i32))),
        }
    }

    /// Wait for the playback process and report how it ended
    async fn watch_exit(
        mut child: Child,
        utterance_id: u64,
        active_id: Arc<AtomicU64>,
        event_tx: EngineEventSender,
    ) {
        let status = child.wait().await;
        // Release the active slot only if this utterance still owns it.
        let _ = active_id.compare_exchange(utterance_id, 0, Ordering::SeqCst, Ordering::SeqCst);

        let event = match status {
            Ok(status) if status.success() => EngineEvent::Ended { utterance_id },
            Ok(status) if status.signal().is_some() => EngineEvent::Error {
                utterance_id,
                kind: SpeechErrorKind::Interrupted,
                message: format!("playback terminated by signal {:?}", status.signal()),
            },
            Ok(status) => EngineEvent::Error {
                utterance_id,
                kind: SpeechErrorKind::Unknown,
                message: format!("espeak exited with {status}"),
            },
            Err(e) => EngineEvent::Error {
                utterance_id,
                kind: SpeechErrorKind::Unknown,
                message: format!("failed to reap espeak process: {e}"),
            },
        };
        let _ = event_tx.send(event).await;
    }

    /// Emit estimated word boundaries, timed from the speaking rate
    async fn pace_boundaries(
        text: String,
        rate: f32,
        utterance_id: u64,
        active_id: Arc<AtomicU64>,
        paused: Arc<AtomicBool>,
        event_tx: EngineEventSender,
    ) {
        let wpm = Self::words_per_minute(rate);
        let per_word = Duration::from_secs_f32(60.0 / wpm as f32);

        for char_index in Self::word_starts(&text) {
            loop {
                if active_id.load(Ordering::SeqCst) != utterance_id {
                    return;
                }
                if !paused.load(Ordering::SeqCst) {
                    break;
                }
                tokio::time::sleep(PAUSE_POLL).await;
            }
            let sent = event_tx
                .send(EngineEvent::Boundary {
                    utterance_id,
                    char_index,
                    kind: BoundaryKind::Word,
                })
                .await;
            if sent.is_err() {
                return;
            }
            tokio::time::sleep(per_word).await;
        }
    }
}

#[async_trait]
impl SpeechEngine for EspeakEngine {
    fn name(&self) -> &str {
        "eSpeak NG"
    }

    async fn is_available(&self) -> bool {
        Self::find_espeak_command().await.is_some()
    }

    async fn initialize(&mut self, config: EngineConfig) -> SpeechResult<()> {
        let Some(cmd) = Self::find_espeak_command().await else {
            return Err(SpeechError::EngineNotAvailable(
                "eSpeak not found. Please install espeak or espeak-ng.".to_string(),
            ));
        };

        self.config = config;

        match Command::new(&cmd).arg("--voices").output().await {
            Ok(output) => {
                let listing = String::from_utf8_lossy(&output.stdout);
                self.voices = Self::parse_voice_list(&listing);
                debug!("loaded {} espeak voices", self.voices.len());
            }
            Err(e) => {
                warn!("failed to list espeak voices: {}", e);
                return Err(SpeechError::EngineNotAvailable(format!(
                    "failed to list voices: {e}"
                )));
            }
        }

        self.command = Some(cmd);
        self.initialized = true;
        // The voice list is populated after construction; prompt a re-query.
        let _ = self.event_tx.send(EngineEvent::VoicesChanged).await;
        Ok(())
    }

    async fn submit(&mut self, spec: UtteranceSpec) -> SpeechResult<u64> {
        if !self.initialized {
            return Err(SpeechError::NotInitialized);
        }
        if spec.text.trim().is_empty() {
            return Err(SpeechError::InvalidInput("empty text".to_string()));
        }
        let cmd = self.command.clone().ok_or(SpeechError::NotInitialized)?;

        // Single-utterance contract: replace whatever is playing.
        self.cancel().await?;

        let utterance_id = next_utterance_id();
        let args = self.build_playback_args(&spec);
        debug!(utterance_id, "starting espeak playback: {} {:?}", cmd, args);

        let child = Command::new(&cmd)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let pid = child
            .id()
            .ok_or_else(|| SpeechError::SynthesisFailed("espeak exited at spawn".to_string()))?
            as i32;

        self.active_id.store(utterance_id, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
        self.active = Some(ActiveUtterance {
            id: utterance_id,
            pid,
        });

        tokio::spawn(Self::watch_exit(
            child,
            utterance_id,
            self.active_id.clone(),
            self.event_tx.clone(),
        ));
        tokio::spawn(Self::pace_boundaries(
            spec.text,
            spec.rate,
            utterance_id,
            self.active_id.clone(),
            self.paused.clone(),
            self.event_tx.clone(),
        ));

        Ok(utterance_id)
    }

    async fn cancel(&mut self) -> SpeechResult<()> {
        let Some(active) = self.active.take() else {
            return Ok(());
        };
        let was_live = self.active_id.swap(0, Ordering::SeqCst) == active.id;
        let was_paused = self.paused.swap(false, Ordering::SeqCst);
        if !was_live {
            // Already finished naturally; nothing left to signal.
            return Ok(());
        }
        // A stopped process cannot act on SIGTERM; wake it first.
        if was_paused {
            Self::signal_pid(active.pid, Signal::SIGCONT)?;
        }
        Self::signal_pid(active.pid, Signal::SIGTERM)?;
        debug!(utterance_id = active.id, "canceled espeak playback");
        Ok(())
    }

    async fn pause(&mut self) -> SpeechResult<()> {
        let Some(active) = &self.active else {
            return Ok(());
        };
        // A finished utterance's pid may already belong to someone else.
        if self.active_id.load(Ordering::SeqCst) != active.id
            || self.paused.load(Ordering::SeqCst)
        {
            return Ok(());
        }
        Self::signal_pid(active.pid, Signal::SIGSTOP)?;
        self.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&mut self) -> SpeechResult<()> {
        let Some(active) = &self.active else {
            return Ok(());
        };
        if self.active_id.load(Ordering::SeqCst) != active.id
            || !self.paused.load(Ordering::SeqCst)
        {
            return Ok(());
        }
        Self::signal_pid(active.pid, Signal::SIGCONT)?;
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn list_voices(&self) -> SpeechResult<Vec<VoiceInfo>> {
        if !self.initialized {
            return Err(SpeechError::NotInitialized);
        }
        Ok(self.voices.clone())
    }

    async fn shutdown(&mut self) -> SpeechResult<()> {
        self.cancel().await?;
        self.voices.clear();
        self.command = None;
        self.initialized = false;
        debug!("espeak engine shutdown");
        Ok(())
    }
}
