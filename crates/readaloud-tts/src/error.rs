//! Error types for speech synthesis

use thiserror::Error;

/// Speech engine error types
#[derive(Error, Debug)]
pub enum SpeechError {
    /// Engine is not available or not installed
    #[error("speech engine not available: {0}")]
    EngineNotAvailable(String),

    /// Voice not found or not supported
    #[error("voice not found: {0}")]
    VoiceNotFound(String),

    /// Invalid text input
    #[error("invalid text input: {0}")]
    InvalidInput(String),

    /// Engine used before initialization
    #[error("engine not initialized")]
    NotInitialized,

    /// Synthesis failed
    #[error("synthesis failed: {0}")]
    SynthesisFailed(String),

    /// IO error (process spawning, signals)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for speech engine operations
pub type SpeechResult<T> = Result<T, SpeechError>;

/// Classification of engine-reported playback failures
///
/// Mirrors the failure vocabulary of platform speech services. `Canceled`
/// is policy-suppressed: it is never surfaced to the user regardless of how
/// the cancellation came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechErrorKind {
    /// Playback was canceled before completing; never user-visible
    Canceled,
    /// Playback was cut short by another request or the platform
    Interrupted,
    /// The audio device is held by another client
    AudioBusy,
    /// A remote voice could not be reached
    Network,
    /// No synthesis support on this platform
    SynthesisUnavailable,
    /// Anything the engine could not classify
    Unknown,
}

impl SpeechErrorKind {
    /// Whether this kind should produce a user-visible notice
    pub fn is_reportable(self) -> bool {
        !matches!(self, SpeechErrorKind::Canceled)
    }

    /// Kind-specific message shown to the user, None for suppressed kinds
    pub fn user_message(self) -> Option<&'static str> {
        match self {
            SpeechErrorKind::Canceled => None,
            SpeechErrorKind::Interrupted => Some("Speech was interrupted."),
            SpeechErrorKind::AudioBusy => Some("Audio system is busy. Please try again."),
            SpeechErrorKind::Network => {
                Some("Network error occurred. Please check your connection.")
            }
            SpeechErrorKind::SynthesisUnavailable => {
                Some("Text-to-speech is not available on your system.")
            }
            SpeechErrorKind::Unknown => Some("Unknown error occurred."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canceled_is_never_reportable() {
        assert!(!SpeechErrorKind::Canceled.is_reportable());
        assert!(SpeechErrorKind::Canceled.user_message().is_none());
    }

    #[test]
    fn reportable_kinds_carry_messages() {
        for kind in [
            SpeechErrorKind::Interrupted,
            SpeechErrorKind::AudioBusy,
            SpeechErrorKind::Network,
            SpeechErrorKind::SynthesisUnavailable,
            SpeechErrorKind::Unknown,
        ] {
            assert!(kind.is_reportable());
            assert!(kind.user_message().is_some());
        }
    }
}
