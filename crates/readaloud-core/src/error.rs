//! Error types for playback control

use crate::session::PlaybackState;
use readaloud_tts::SpeechError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaybackError {
    /// start() was handed empty or whitespace-only text
    #[error("nothing selected to read")]
    EmptySelection,

    /// No synthesis support on this platform
    #[error("speech engine unavailable")]
    EngineUnavailable,

    /// A voice id that is not in the engine's voice list
    #[error("unknown voice: {0}")]
    UnknownVoice(String),

    #[error("invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: PlaybackState,
        to: PlaybackState,
    },

    #[error(transparent)]
    Engine(#[from] SpeechError),
}
