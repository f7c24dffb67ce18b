//! Playback controller
//!
//! Owns the single active [`PlaybackSession`], drives the speech engine,
//! reacts to boundary/error/end events, and exposes start,
//! restart-with-new-parameters, pause/resume, and stop. Parameter changes
//! mid-speech cancel the current utterance and resume from the last word
//! checkpoint without losing the user's place in the text.

use readaloud_tts::{EngineEvent, SpeechEngine, SpeechErrorKind, UtteranceSpec, VoiceInfo};
use tracing::{debug, warn};

use crate::error::PlaybackError;
use crate::position;
use crate::session::{PlaybackSession, PlaybackState};
use crate::surface::{
    ControlSurface, NoticeLevel, PanelModel, VoiceOption, RATE_RANGE, VOLUME_RANGE,
};

/// Current synthesis parameters
///
/// These live on the controller, not the session: they survive across
/// sessions and nothing ever re-derives them from rendered UI.
#[derive(Debug, Clone)]
pub struct SpeechParams {
    /// Playback rate multiplier (0.5-2.0)
    pub rate: f32,
    /// Volume (0.0-1.0)
    pub volume: f32,
    /// Selected voice, engine default when None
    pub voice_id: Option<String>,
}

impl Default for SpeechParams {
    fn default() -> Self {
        Self {
            rate: 1.0,
            volume: 1.0,
            voice_id: None,
        }
    }
}

pub struct PlaybackController {
    engine: Box<dyn SpeechEngine>,
    surface: Box<dyn ControlSurface>,
    session: Option<PlaybackSession>,
    params: SpeechParams,
    voices: Vec<VoiceInfo>,
    /// Set immediately before a self-caused cancel (restart or stop) so the
    /// engine's resulting error callback is suppressed instead of reported.
    self_interrupt: bool,
}

impl PlaybackController {
    pub fn new(
        engine: Box<dyn SpeechEngine>,
        surface: Box<dyn ControlSurface>,
        params: SpeechParams,
    ) -> Self {
        Self {
            engine,
            surface,
            session: None,
            params,
            voices: Vec::new(),
            self_interrupt: false,
        }
    }

    /// Current playback state; Idle when no session is held
    pub fn state(&self) -> PlaybackState {
        self.session
            .as_ref()
            .map(|s| s.state())
            .unwrap_or(PlaybackState::Idle)
    }

    pub fn params(&self) -> &SpeechParams {
        &self.params
    }

    pub fn voices(&self) -> &[VoiceInfo] {
        &self.voices
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// Begin reading `text` from the start
    ///
    /// Empty text and a missing engine fail fast with a user-visible notice
    /// and leave the controller Idle. Any prior session's utterance is
    /// cancelled first; that cancel never surfaces as an error.
    pub async fn start(&mut self, text: &str) -> Result<(), PlaybackError> {
        if text.trim().is_empty() {
            self.surface
                .notify(NoticeLevel::Error, "Please select some text to read");
            return Err(PlaybackError::EmptySelection);
        }
        if !self.engine.is_available().await {
            self.surface.notify(
                NoticeLevel::Error,
                "Text-to-speech is not available on your system",
            );
            return Err(PlaybackError::EngineUnavailable);
        }

        if self.session.take().is_some() {
            self.self_interrupt = true;
        }
        self.engine.cancel().await?;

        let spec = self.spec_for(text.to_string());
        let utterance_id = match self.engine.submit(spec).await {
            Ok(id) => id,
            Err(e) => {
                self.surface.notify(
                    NoticeLevel::Error,
                    &format!("Failed to start text-to-speech: {e}"),
                );
                return Err(e.into());
            }
        };

        let mut session = PlaybackSession::new(text);
        session.begin(utterance_id)?;
        self.session = Some(session);

        let model = self.panel_model();
        self.surface.show_panel(&model);
        Ok(())
    }

    /// Cancel the current utterance and speak again from `word_index`
    ///
    /// Used by parameter changes; the session stays live and never visits
    /// Idle.
    async fn restart_from(&mut self, word_index: usize) -> Result<(), PlaybackError> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        let new_start = position::char_offset_for_word_index(session.text(), word_index);
        let remainder = session.text()[new_start..].to_string();

        // The engine will fire a cancel-type callback for this; keep it quiet.
        self.self_interrupt = true;
        self.engine.cancel().await?;

        let spec = self.spec_for(remainder);
        let utterance_id = match self.engine.submit(spec).await {
            Ok(id) => id,
            Err(e) => {
                self.session = None;
                self.surface.hide_panel();
                self.surface.notify(
                    NoticeLevel::Error,
                    &format!("Failed to restart text-to-speech: {e}"),
                );
                return Err(e.into());
            }
        };

        if let Some(session) = self.session.as_mut() {
            session.restart(new_start, utterance_id)?;
        }
        let model = self.panel_model();
        self.surface.update_panel(&model);
        Ok(())
    }

    /// Restart the live session from its current word checkpoint
    async fn restart_at_checkpoint(&mut self) -> Result<(), PlaybackError> {
        let checkpoint = match self.session.as_ref() {
            Some(session) => session.word_checkpoint(),
            None => return Ok(()),
        };
        self.restart_from(checkpoint).await
    }

    /// Change the voice; restarts playback from the checkpoint if speaking
    pub async fn set_voice(&mut self, voice_id: &str) -> Result<(), PlaybackError> {
        if !self.voices.iter().any(|v| v.id == voice_id) {
            self.surface
                .notify(NoticeLevel::Error, &format!("Unknown voice: {voice_id}"));
            return Err(PlaybackError::UnknownVoice(voice_id.to_string()));
        }
        self.params.voice_id = Some(voice_id.to_string());
        self.restart_at_checkpoint().await
    }

    /// Change the playback rate; restarts from the checkpoint if speaking
    pub async fn set_rate(&mut self, rate: f32) -> Result<(), PlaybackError> {
        if !rate.is_finite() {
            warn!(rate, "ignoring non-finite rate");
            return Ok(());
        }
        let clamped = rate.clamp(*RATE_RANGE.start(), *RATE_RANGE.end());
        if clamped != rate {
            warn!(rate, clamped, "rate outside supported range");
        }
        self.params.rate = clamped;
        self.restart_at_checkpoint().await
    }

    /// Change the volume; restarts from the checkpoint if speaking
    pub async fn set_volume(&mut self, volume: f32) -> Result<(), PlaybackError> {
        if !volume.is_finite() {
            warn!(volume, "ignoring non-finite volume");
            return Ok(());
        }
        let clamped = volume.clamp(*VOLUME_RANGE.start(), *VOLUME_RANGE.end());
        if clamped != volume {
            warn!(volume, clamped, "volume outside supported range");
        }
        self.params.volume = clamped;
        self.restart_at_checkpoint().await
    }

    /// Pause playback; a no-op unless currently Speaking
    pub async fn pause(&mut self) -> Result<(), PlaybackError> {
        if self.state() != PlaybackState::Speaking {
            return Ok(());
        }
        self.engine.pause().await?;
        if let Some(session) = self.session.as_mut() {
            session.transition(PlaybackState::Paused)?;
        }
        let model = self.panel_model();
        self.surface.update_panel(&model);
        Ok(())
    }

    /// Resume playback; a no-op unless currently Paused
    pub async fn resume(&mut self) -> Result<(), PlaybackError> {
        if self.state() != PlaybackState::Paused {
            return Ok(());
        }
        self.engine.resume().await?;
        if let Some(session) = self.session.as_mut() {
            session.transition(PlaybackState::Speaking)?;
        }
        let model = self.panel_model();
        self.surface.update_panel(&model);
        Ok(())
    }

    /// The panel's pause/resume toggle
    pub async fn toggle_pause(&mut self) -> Result<(), PlaybackError> {
        match self.state() {
            PlaybackState::Speaking => self.pause().await,
            PlaybackState::Paused => self.resume().await,
            _ => Ok(()),
        }
    }

    /// Stop reading and tear down the control surface
    pub async fn stop(&mut self) -> Result<(), PlaybackError> {
        if self.session.is_none() {
            return Ok(());
        }
        // The engine fires a cancel-type callback for this; keep it quiet.
        self.self_interrupt = true;
        self.engine.cancel().await?;
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.transition(PlaybackState::Idle) {
                warn!("stop: {e}");
            }
        }
        self.surface.hide_panel();
        Ok(())
    }

    /// Dispatch one engine event
    pub async fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Boundary {
                utterance_id,
                char_index,
                ..
            } => self.handle_boundary(utterance_id, char_index),
            EngineEvent::Ended { utterance_id } => self.handle_end(utterance_id),
            EngineEvent::Error {
                utterance_id,
                kind,
                message,
            } => self.handle_error(utterance_id, kind, &message),
            EngineEvent::VoicesChanged => self.refresh_voices().await,
        }
    }

    /// Re-query the engine's voice list and refresh the panel
    pub async fn refresh_voices(&mut self) {
        match self.engine.list_voices().await {
            Ok(voices) => {
                debug!("voice list refreshed: {} voices", voices.len());
                self.voices = voices;
                if self.session.is_some() {
                    let model = self.panel_model();
                    self.surface.update_panel(&model);
                }
            }
            Err(e) => warn!("failed to refresh voices: {e}"),
        }
    }

    fn handle_boundary(&mut self, utterance_id: u64, char_index: usize) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.utterance_id() != utterance_id {
            debug!(utterance_id, "ignoring boundary from a superseded utterance");
            return;
        }
        // Engine indices are relative to the submitted slice.
        let offset = session.start_offset() + char_index;
        session.record_boundary(offset);
    }

    fn handle_end(&mut self, utterance_id: u64) {
        let current = self.session.as_ref().map(|s| s.utterance_id());
        if current != Some(utterance_id) {
            debug!(utterance_id, "ignoring end of a superseded utterance");
            return;
        }
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.transition(PlaybackState::Ended) {
                warn!("end: {e}");
            }
            // A later manual restart of the same text starts over, not
            // mid-way.
            session.rewind_cursor();
            let _ = session.transition(PlaybackState::Idle);
        }
        self.surface.hide_panel();
    }

    fn handle_error(&mut self, utterance_id: u64, kind: SpeechErrorKind, message: &str) {
        // A self-caused interruption (restart/stop) is never reported,
        // whatever kind the engine attached to it. The flag takes
        // precedence and is consumed here.
        if self.self_interrupt {
            self.self_interrupt = false;
            debug!(utterance_id, ?kind, "suppressing self-caused interruption");
            return;
        }
        let current = self.session.as_ref().map(|s| s.utterance_id());
        if current != Some(utterance_id) {
            debug!(utterance_id, "ignoring error from a superseded utterance");
            return;
        }
        if !kind.is_reportable() {
            debug!(utterance_id, "engine canceled playback: {message}");
            return;
        }

        warn!(utterance_id, ?kind, "speech error: {message}");
        if let Some(user_message) = kind.user_message() {
            self.surface.notify(
                NoticeLevel::Error,
                &format!("An error occurred with text-to-speech: {user_message}"),
            );
        }
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.transition(PlaybackState::Errored) {
                warn!("error: {e}");
            }
            let _ = session.transition(PlaybackState::Idle);
        }
        self.surface.hide_panel();
    }

    fn spec_for(&self, text: String) -> UtteranceSpec {
        UtteranceSpec {
            text,
            rate: self.params.rate,
            volume: self.params.volume,
            voice_id: self.params.voice_id.clone(),
        }
    }

    fn panel_model(&self) -> PanelModel {
        PanelModel {
            voices: self
                .voices
                .iter()
                .map(|v| VoiceOption {
                    id: v.id.clone(),
                    label: v.label(),
                })
                .collect(),
            selected_voice: self.params.voice_id.clone(),
            rate: self.params.rate,
            volume: self.params.volume,
            paused: self.state() == PlaybackState::Paused,
        }
    }
}
