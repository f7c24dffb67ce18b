//! Speech engine abstraction layer for readaloud
//!
//! This crate provides the foundational types and traits for driving a
//! speech-synthesis engine: utterance submission, playback events (word
//! boundaries, completion, failures), voice enumeration, and error
//! classification.

use std::sync::atomic::{AtomicU64, Ordering};

pub mod engine;
pub mod error;
pub mod types;

pub use engine::{BoundaryKind, EngineEvent, EngineEventSender, SpeechEngine};
pub use error::{SpeechError, SpeechErrorKind, SpeechResult};
pub use types::{EngineConfig, UtteranceSpec, VoiceInfo};

/// Generates unique utterance IDs
static UTTERANCE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique utterance ID
///
/// IDs are never reused within a process, so a callback carrying an ID that
/// no longer matches the live utterance can be dropped as stale.
pub fn next_utterance_id() -> u64 {
    UTTERANCE_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}
