//! Core playback control for readaloud
//!
//! This crate holds the speech-playback controller and its collaborating
//! pieces: word-granularity position tracking, the active session and its
//! state machine, the presentation-surface contract, and persisted
//! settings. The speech engine itself lives behind the [`SpeechEngine`]
//! trait from `readaloud-tts`.
//!
//! [`SpeechEngine`]: readaloud_tts::SpeechEngine

pub mod controller;
pub mod error;
pub mod position;
pub mod session;
pub mod settings;
pub mod surface;

mod tests;

pub use controller::{PlaybackController, SpeechParams};
pub use error::PlaybackError;
pub use session::{PlaybackSession, PlaybackState};
pub use settings::Settings;
pub use surface::{
    ControlSurface, NoticeLevel, PanelModel, VoiceOption, NOTICE_TTL, RATE_RANGE, RATE_STEP,
    VOLUME_RANGE, VOLUME_STEP,
};
