//! Speech engine abstraction and playback events

use crate::error::{SpeechErrorKind, SpeechResult};
use crate::types::{EngineConfig, UtteranceSpec, VoiceInfo};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Boundary granularity reported by an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    Word,
    Sentence,
}

/// Events emitted by a speech engine on its event channel
///
/// Character indices are relative to the text of the utterance they belong
/// to, not to any larger document the caller sliced it from.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Playback reached a character offset within the utterance text
    Boundary {
        utterance_id: u64,
        char_index: usize,
        kind: BoundaryKind,
    },
    /// The utterance played to its natural end
    Ended { utterance_id: u64 },
    /// The utterance failed or was cut short
    Error {
        utterance_id: u64,
        kind: SpeechErrorKind,
        message: String,
    },
    /// The set of available voices changed; callers should re-query
    VoicesChanged,
}

/// Channel half handed to an engine at construction for event delivery
pub type EngineEventSender = mpsc::Sender<EngineEvent>;

/// Core speech engine interface
///
/// Implementations provide specific synthesis backends. An engine plays at
/// most one utterance at a time: submitting a new one replaces any current
/// playback. Progress and completion are reported asynchronously through
/// the event channel the engine was constructed with.
#[async_trait]
pub trait SpeechEngine: Send {
    /// Engine name/identifier
    fn name(&self) -> &str;

    /// Check if the engine is usable on this system
    async fn is_available(&self) -> bool;

    /// Initialize the engine with configuration and load its voice list
    async fn initialize(&mut self, config: EngineConfig) -> SpeechResult<()>;

    /// Begin playback of an utterance, replacing any current one
    ///
    /// Returns the utterance ID that subsequent events will carry.
    async fn submit(&mut self, spec: UtteranceSpec) -> SpeechResult<u64>;

    /// Cancel current playback; idempotent, a no-op when nothing is playing
    async fn cancel(&mut self) -> SpeechResult<()>;

    /// Pause current playback; no-op when nothing is playing
    async fn pause(&mut self) -> SpeechResult<()>;

    /// Resume paused playback; no-op when nothing is paused
    async fn resume(&mut self) -> SpeechResult<()>;

    /// Get available voices
    ///
    /// Voice lists may be populated asynchronously; `EngineEvent::VoicesChanged`
    /// signals that this should be called again.
    async fn list_voices(&self) -> SpeechResult<Vec<VoiceInfo>>;

    /// Shutdown the engine and release resources
    async fn shutdown(&mut self) -> SpeechResult<()>;
}
