//! Controller scenario tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use readaloud_tts::{
        next_utterance_id, BoundaryKind, EngineConfig, EngineEvent, SpeechEngine, SpeechErrorKind,
        SpeechResult, UtteranceSpec, VoiceInfo,
    };

    use crate::controller::{PlaybackController, SpeechParams};
    use crate::error::PlaybackError;
    use crate::session::PlaybackState;
    use crate::surface::{ControlSurface, NoticeLevel, PanelModel};

    #[derive(Debug, Clone, PartialEq)]
    enum EngineCall {
        Submit {
            text: String,
            rate: f32,
            volume: f32,
            voice_id: Option<String>,
        },
        Cancel,
        Pause,
        Resume,
    }

    #[derive(Default)]
    struct EngineLog {
        calls: Vec<EngineCall>,
        submitted_ids: Vec<u64>,
    }

    impl EngineLog {
        fn cancels(&self) -> usize {
            self.calls.iter().filter(|c| **c == EngineCall::Cancel).count()
        }

        fn pauses(&self) -> usize {
            self.calls.iter().filter(|c| **c == EngineCall::Pause).count()
        }

        fn submitted_texts(&self) -> Vec<String> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    EngineCall::Submit { text, .. } => Some(text.clone()),
                    _ => None,
                })
                .collect()
        }

        fn last_submit(&self) -> Option<EngineCall> {
            self.calls
                .iter()
                .rev()
                .find(|c| matches!(c, EngineCall::Submit { .. }))
                .cloned()
        }

        fn last_id(&self) -> u64 {
            *self.submitted_ids.last().expect("no utterance submitted")
        }
    }

    struct RecordingEngine {
        log: Arc<Mutex<EngineLog>>,
        available: bool,
        voices: Vec<VoiceInfo>,
    }

    fn voice(id: &str) -> VoiceInfo {
        VoiceInfo {
            id: id.to_string(),
            name: id.to_uppercase(),
            language: format!("{id}-XX"),
        }
    }

    #[async_trait]
    impl SpeechEngine for RecordingEngine {
        fn name(&self) -> &str {
            "recording"
        }

        async fn is_available(&self) -> bool {
            self.available
        }

        async fn initialize(&mut self, _config: EngineConfig) -> SpeechResult<()> {
            Ok(())
        }

        async fn submit(&mut self, spec: UtteranceSpec) -> SpeechResult<u64> {
            let id = next_utterance_id();
            let mut log = self.log.lock();
            log.calls.push(EngineCall::Submit {
                text: spec.text,
                rate: spec.rate,
                volume: spec.volume,
                voice_id: spec.voice_id,
            });
            log.submitted_ids.push(id);
            Ok(id)
        }

        async fn cancel(&mut self) -> SpeechResult<()> {
            self.log.lock().calls.push(EngineCall::Cancel);
            Ok(())
        }

        async fn pause(&mut self) -> SpeechResult<()> {
            self.log.lock().calls.push(EngineCall::Pause);
            Ok(())
        }

        async fn resume(&mut self) -> SpeechResult<()> {
            self.log.lock().calls.push(EngineCall::Resume);
            Ok(())
        }

        async fn list_voices(&self) -> SpeechResult<Vec<VoiceInfo>> {
            Ok(self.voices.clone())
        }

        async fn shutdown(&mut self) -> SpeechResult<()> {
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum SurfaceCall {
        Show(PanelModel),
        Update(PanelModel),
        Hide,
        Notice(NoticeLevel, String),
    }

    struct RecordingSurface {
        calls: Arc<Mutex<Vec<SurfaceCall>>>,
    }

    impl ControlSurface for RecordingSurface {
        fn show_panel(&mut self, model: &PanelModel) {
            self.calls.lock().push(SurfaceCall::Show(model.clone()));
        }

        fn update_panel(&mut self, model: &PanelModel) {
            self.calls.lock().push(SurfaceCall::Update(model.clone()));
        }

        fn hide_panel(&mut self) {
            self.calls.lock().push(SurfaceCall::Hide);
        }

        fn notify(&mut self, level: NoticeLevel, message: &str) {
            self.calls
                .lock()
                .push(SurfaceCall::Notice(level, message.to_string()));
        }
    }

    fn notices(calls: &Arc<Mutex<Vec<SurfaceCall>>>) -> Vec<String> {
        calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                SurfaceCall::Notice(_, message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn controller() -> (
        PlaybackController,
        Arc<Mutex<EngineLog>>,
        Arc<Mutex<Vec<SurfaceCall>>>,
    ) {
        controller_with_availability(true)
    }

    fn controller_with_availability(
        available: bool,
    ) -> (
        PlaybackController,
        Arc<Mutex<EngineLog>>,
        Arc<Mutex<Vec<SurfaceCall>>>,
    ) {
        let log = Arc::new(Mutex::new(EngineLog::default()));
        let engine = RecordingEngine {
            log: log.clone(),
            available,
            voices: vec![voice("en"), voice("fr")],
        };
        let surface_calls = Arc::new(Mutex::new(Vec::new()));
        let surface = RecordingSurface {
            calls: surface_calls.clone(),
        };
        let controller = PlaybackController::new(
            Box::new(engine),
            Box::new(surface),
            SpeechParams::default(),
        );
        (controller, log, surface_calls)
    }

    const TEXT: &str = "The quick brown fox";

    #[tokio::test]
    async fn start_speaks_the_full_text_and_shows_the_panel() {
        let (mut controller, log, surface) = controller();
        controller.start(TEXT).await.unwrap();

        assert_eq!(controller.state(), PlaybackState::Speaking);
        assert_eq!(log.lock().submitted_texts(), vec![TEXT.to_string()]);
        assert!(matches!(
            surface.lock().last(),
            Some(SurfaceCall::Show(_))
        ));
    }

    #[tokio::test]
    async fn start_with_empty_selection_reports_and_stays_idle() {
        let (mut controller, log, surface) = controller();
        let result = controller.start("   \n\t ").await;

        assert!(matches!(result, Err(PlaybackError::EmptySelection)));
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(log.lock().calls.is_empty(), "no engine submission occurs");
        assert_eq!(notices(&surface), vec!["Please select some text to read"]);
    }

    #[tokio::test]
    async fn start_without_engine_support_reports_and_stays_idle() {
        let (mut controller, log, surface) = controller_with_availability(false);
        let result = controller.start(TEXT).await;

        assert!(matches!(result, Err(PlaybackError::EngineUnavailable)));
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(log.lock().calls.is_empty());
        assert_eq!(
            notices(&surface),
            vec!["Text-to-speech is not available on your system"]
        );
    }

    #[tokio::test]
    async fn boundary_events_advance_the_cursor() {
        let (mut controller, log, _surface) = controller();
        controller.start(TEXT).await.unwrap();
        let id = log.lock().last_id();

        controller
            .handle_event(EngineEvent::Boundary {
                utterance_id: id,
                char_index: 10,
                kind: BoundaryKind::Word,
            })
            .await;

        let session = controller.session().unwrap();
        assert_eq!(session.cursor_offset(), 10);
        assert_eq!(session.word_checkpoint(), 1);
    }

    #[tokio::test]
    async fn boundary_events_from_superseded_utterances_are_ignored() {
        let (mut controller, log, _surface) = controller();
        controller.start(TEXT).await.unwrap();
        let id = log.lock().last_id();

        controller
            .handle_event(EngineEvent::Boundary {
                utterance_id: id + 1000,
                char_index: 10,
                kind: BoundaryKind::Word,
            })
            .await;

        assert_eq!(controller.session().unwrap().cursor_offset(), 0);
    }

    #[tokio::test]
    async fn rate_change_mid_speech_restarts_from_the_last_word() {
        let (mut controller, log, _surface) = controller();
        controller.start(TEXT).await.unwrap();
        let id = log.lock().last_id();

        // Boundary at the start of "brown": "The quick " has been spoken.
        controller
            .handle_event(EngineEvent::Boundary {
                utterance_id: id,
                char_index: 10,
                kind: BoundaryKind::Word,
            })
            .await;
        controller.set_rate(1.5).await.unwrap();

        assert_eq!(controller.state(), PlaybackState::Speaking);
        let session = controller.session().unwrap();
        assert_eq!(session.start_offset(), 4);
        match log.lock().last_submit() {
            Some(EngineCall::Submit { text, rate, .. }) => {
                assert_eq!(text, "quick brown fox");
                assert_eq!(rate, 1.5);
            }
            other => panic!("expected a restart submission, got {other:?}"),
        };
    }

    #[tokio::test]
    async fn restart_cancel_fallout_is_suppressed() {
        let (mut controller, log, surface) = controller();
        controller.start(TEXT).await.unwrap();
        let first_id = log.lock().last_id();

        controller.set_rate(1.5).await.unwrap();
        // The engine reports the killed first utterance as interrupted.
        controller
            .handle_event(EngineEvent::Error {
                utterance_id: first_id,
                kind: SpeechErrorKind::Interrupted,
                message: "playback terminated".to_string(),
            })
            .await;

        assert_eq!(controller.state(), PlaybackState::Speaking);
        assert!(notices(&surface).is_empty());
    }

    #[tokio::test]
    async fn start_offsets_are_monotonic_across_restarts() {
        let (mut controller, log, _surface) = controller();
        let text = "one two three four";
        controller.start(text).await.unwrap();

        let id = log.lock().last_id();
        controller
            .handle_event(EngineEvent::Boundary {
                utterance_id: id,
                char_index: 8,
                kind: BoundaryKind::Word,
            })
            .await;
        controller.set_rate(1.2).await.unwrap();
        let first_restart = controller.session().unwrap().start_offset();

        let id = log.lock().last_id();
        controller
            .handle_event(EngineEvent::Boundary {
                utterance_id: id,
                char_index: 9,
                kind: BoundaryKind::Word,
            })
            .await;
        controller.set_volume(0.5).await.unwrap();
        let second_restart = controller.session().unwrap().start_offset();

        assert_eq!(first_restart, 4);
        assert_eq!(second_restart, 8);
        assert!(second_restart >= first_restart);
    }

    #[tokio::test]
    async fn voice_change_validates_and_restarts() {
        let (mut controller, log, surface) = controller();
        controller.refresh_voices().await;
        controller.start("a b c").await.unwrap();
        let id = log.lock().last_id();

        controller
            .handle_event(EngineEvent::Boundary {
                utterance_id: id,
                char_index: 4,
                kind: BoundaryKind::Word,
            })
            .await;
        controller.set_voice("fr").await.unwrap();

        match log.lock().last_submit() {
            Some(EngineCall::Submit { text, voice_id, .. }) => {
                assert_eq!(text, "b c");
                assert_eq!(voice_id.as_deref(), Some("fr"));
            }
            other => panic!("expected a restart submission, got {other:?}"),
        }

        let result = controller.set_voice("martian").await;
        assert!(matches!(result, Err(PlaybackError::UnknownVoice(_))));
        assert!(notices(&surface)
            .iter()
            .any(|n| n.contains("Unknown voice")));
    }

    #[tokio::test]
    async fn rate_and_volume_are_clamped() {
        let (mut controller, _log, _surface) = controller();
        controller.set_rate(5.0).await.unwrap();
        assert_eq!(controller.params().rate, 2.0);
        controller.set_rate(0.1).await.unwrap();
        assert_eq!(controller.params().rate, 0.5);
        controller.set_volume(-1.0).await.unwrap();
        assert_eq!(controller.params().volume, 0.0);
    }

    #[tokio::test]
    async fn stop_cancels_once_and_suppresses_the_error_callback() {
        let (mut controller, log, surface) = controller();
        controller.start(TEXT).await.unwrap();
        let id = log.lock().last_id();
        log.lock().calls.clear();

        controller.stop().await.unwrap();

        assert_eq!(log.lock().cancels(), 1, "engine cancel invoked once");
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert_eq!(surface.lock().last(), Some(&SurfaceCall::Hide));

        // The engine still fires a cancel-type error callback for the kill.
        controller
            .handle_event(EngineEvent::Error {
                utterance_id: id,
                kind: SpeechErrorKind::Interrupted,
                message: "playback terminated".to_string(),
            })
            .await;
        assert!(notices(&surface).is_empty());
    }

    #[tokio::test]
    async fn stop_with_no_session_is_a_noop() {
        let (mut controller, log, surface) = controller();
        controller.stop().await.unwrap();
        assert!(log.lock().calls.is_empty());
        assert!(surface.lock().is_empty());
    }

    #[tokio::test]
    async fn natural_end_resets_and_hides_the_panel() {
        let (mut controller, log, surface) = controller();
        controller.start(TEXT).await.unwrap();
        let id = log.lock().last_id();

        controller
            .handle_event(EngineEvent::Boundary {
                utterance_id: id,
                char_index: 10,
                kind: BoundaryKind::Word,
            })
            .await;
        controller.handle_event(EngineEvent::Ended { utterance_id: id }).await;

        assert_eq!(controller.state(), PlaybackState::Idle);
        assert_eq!(surface.lock().last(), Some(&SurfaceCall::Hide));
        assert!(notices(&surface).is_empty());
    }

    #[tokio::test]
    async fn pause_twice_is_a_noop_the_second_time() {
        let (mut controller, log, _surface) = controller();
        controller.start(TEXT).await.unwrap();

        controller.pause().await.unwrap();
        assert_eq!(controller.state(), PlaybackState::Paused);
        controller.pause().await.unwrap();
        assert_eq!(controller.state(), PlaybackState::Paused);
        assert_eq!(log.lock().pauses(), 1);
    }

    #[tokio::test]
    async fn pause_and_resume_with_no_session_are_noops() {
        let (mut controller, log, _surface) = controller();
        controller.pause().await.unwrap();
        controller.resume().await.unwrap();
        assert_eq!(controller.state(), PlaybackState::Idle);
        assert!(log.lock().calls.is_empty());
    }

    #[tokio::test]
    async fn toggle_flips_between_speaking_and_paused() {
        let (mut controller, _log, _surface) = controller();
        controller.start(TEXT).await.unwrap();

        controller.toggle_pause().await.unwrap();
        assert_eq!(controller.state(), PlaybackState::Paused);
        controller.toggle_pause().await.unwrap();
        assert_eq!(controller.state(), PlaybackState::Speaking);
    }

    #[tokio::test]
    async fn parameter_change_while_paused_resumes_speaking() {
        let (mut controller, log, _surface) = controller();
        controller.start(TEXT).await.unwrap();
        controller.pause().await.unwrap();

        controller.set_rate(0.8).await.unwrap();

        assert_eq!(controller.state(), PlaybackState::Speaking);
        match log.lock().last_submit() {
            Some(EngineCall::Submit { rate, .. }) => assert_eq!(rate, 0.8),
            other => panic!("expected a restart submission, got {other:?}"),
        };
    }

    #[tokio::test]
    async fn reportable_errors_notify_and_reset_to_idle() {
        let (mut controller, log, surface) = controller();
        controller.start(TEXT).await.unwrap();
        let id = log.lock().last_id();

        controller
            .handle_event(EngineEvent::Error {
                utterance_id: id,
                kind: SpeechErrorKind::Network,
                message: "voice fetch failed".to_string(),
            })
            .await;

        assert_eq!(controller.state(), PlaybackState::Idle);
        let notices = notices(&surface);
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("Network error occurred"));
        assert_eq!(surface.lock().last(), Some(&SurfaceCall::Hide));
    }

    #[tokio::test]
    async fn canceled_errors_are_suppressed_without_any_flag() {
        let (mut controller, log, surface) = controller();
        controller.start(TEXT).await.unwrap();
        let id = log.lock().last_id();

        controller
            .handle_event(EngineEvent::Error {
                utterance_id: id,
                kind: SpeechErrorKind::Canceled,
                message: "canceled".to_string(),
            })
            .await;

        assert!(notices(&surface).is_empty());
    }

    #[tokio::test]
    async fn errors_from_superseded_utterances_are_ignored() {
        let (mut controller, log, surface) = controller();
        controller.start(TEXT).await.unwrap();
        let stale = log.lock().last_id() + 1000;

        controller
            .handle_event(EngineEvent::Error {
                utterance_id: stale,
                kind: SpeechErrorKind::AudioBusy,
                message: "busy".to_string(),
            })
            .await;

        assert_eq!(controller.state(), PlaybackState::Speaking);
        assert!(notices(&surface).is_empty());
    }

    #[tokio::test]
    async fn starting_over_replaces_the_session_quietly() {
        let (mut controller, log, surface) = controller();
        controller.start("first selection").await.unwrap();
        let first_id = log.lock().last_id();

        controller.start("second selection").await.unwrap();
        controller
            .handle_event(EngineEvent::Error {
                utterance_id: first_id,
                kind: SpeechErrorKind::Interrupted,
                message: "playback terminated".to_string(),
            })
            .await;

        assert_eq!(controller.state(), PlaybackState::Speaking);
        assert_eq!(
            log.lock().submitted_texts(),
            vec!["first selection".to_string(), "second selection".to_string()]
        );
        assert!(notices(&surface).is_empty());
    }

    #[tokio::test]
    async fn voices_changed_requeries_the_engine() {
        let (mut controller, _log, _surface) = controller();
        assert!(controller.voices().is_empty());
        controller.handle_event(EngineEvent::VoicesChanged).await;
        assert_eq!(controller.voices().len(), 2);
    }

    #[tokio::test]
    async fn panel_model_labels_voices_with_language() {
        let (mut controller, _log, surface) = controller();
        controller.refresh_voices().await;
        controller.start(TEXT).await.unwrap();

        let calls = surface.lock();
        let model = match calls.last() {
            Some(SurfaceCall::Show(model)) => model.clone(),
            other => panic!("expected the panel, got {other:?}"),
        };
        assert_eq!(model.voices[0].label, "EN (en-XX)");
        assert_eq!(model.rate, 1.0);
        assert!(!model.paused);
    }
}
