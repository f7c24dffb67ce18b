//! The active reading session and its state machine

use crate::error::PlaybackError;
use crate::position;

/// Playback state of the active session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Speaking,
    Paused,
    Ended,
    Errored,
}

/// The single active reading session
///
/// Holds the immutable source text, the offset where the current utterance
/// began, and the cursor tracking the most recently reported boundary.
/// `cursor_offset >= start_offset` always; the cursor only moves forward
/// within one utterance's lifetime.
#[derive(Debug)]
pub struct PlaybackSession {
    source_text: String,
    start_offset: usize,
    cursor_offset: usize,
    utterance_id: u64,
    state: PlaybackState,
}

impl PlaybackSession {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            source_text: text.into(),
            start_offset: 0,
            cursor_offset: 0,
            utterance_id: 0,
            state: PlaybackState::Idle,
        }
    }

    pub fn text(&self) -> &str {
        &self.source_text
    }

    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    pub fn cursor_offset(&self) -> usize {
        self.cursor_offset
    }

    pub fn utterance_id(&self) -> u64 {
        self.utterance_id
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Word-index checkpoint for the current cursor position
    pub fn word_checkpoint(&self) -> usize {
        position::word_index_at(&self.source_text, self.cursor_offset)
    }

    /// Enter Speaking for the first utterance of this session
    pub fn begin(&mut self, utterance_id: u64) -> Result<(), PlaybackError> {
        self.transition(PlaybackState::Speaking)?;
        self.utterance_id = utterance_id;
        self.start_offset = 0;
        self.cursor_offset = 0;
        Ok(())
    }

    /// Re-enter Speaking with a new utterance starting at `new_start`
    ///
    /// Used for parameter-change restarts; the session never visits Idle.
    pub fn restart(&mut self, new_start: usize, utterance_id: u64) -> Result<(), PlaybackError> {
        self.transition(PlaybackState::Speaking)?;
        self.utterance_id = utterance_id;
        self.start_offset = new_start;
        self.cursor_offset = new_start;
        Ok(())
    }

    /// Record a boundary at `offset` (absolute, relative to the text start)
    ///
    /// The cursor never moves backward and never falls below the utterance
    /// start, regardless of what the engine reports.
    pub fn record_boundary(&mut self, offset: usize) {
        let clamped = offset.max(self.start_offset).min(self.source_text.len());
        if clamped > self.cursor_offset {
            self.cursor_offset = clamped;
        }
    }

    /// Reset the cursor to the utterance start, for natural end of speech
    pub fn rewind_cursor(&mut self) {
        self.cursor_offset = self.start_offset;
    }

    pub fn transition(&mut self, next: PlaybackState) -> Result<(), PlaybackError> {
        use PlaybackState::*;

        // Validate state transitions. Speaking -> Speaking is a
        // parameter-change restart; it deliberately skips Idle.
        let valid = matches!(
            (self.state, next),
            (Idle, Speaking)
                | (Speaking, Speaking)
                | (Speaking, Paused)
                | (Paused, Speaking)
                | (Speaking, Ended)
                | (Speaking, Errored)
                | (Paused, Errored)
                | (Speaking, Idle)
                | (Paused, Idle)
                | (Ended, Idle)
                | (Errored, Idle)
        );

        if !valid {
            return Err(PlaybackError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::debug!("playback state: {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }
}
