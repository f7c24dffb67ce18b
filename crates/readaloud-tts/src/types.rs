//! Core types for speech synthesis

use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Voice used when an utterance does not name one
    pub default_voice: Option<String>,
    /// Engine-specific options
    pub engine_options: std::collections::HashMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_voice: None,
            engine_options: std::collections::HashMap::new(),
        }
    }
}

/// One request to synthesize and play a span of text
#[derive(Debug, Clone)]
pub struct UtteranceSpec {
    /// Text to speak
    pub text: String,
    /// Playback rate multiplier (1.0 is normal speed)
    pub rate: f32,
    /// Volume (0.0-1.0)
    pub volume: f32,
    /// Voice to use, engine default when None
    pub voice_id: Option<String>,
}

/// Voice information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    /// Unique voice identifier
    pub id: String,
    /// Human-readable voice name
    pub name: String,
    /// Language code (e.g., "en-US", "fr-FR")
    pub language: String,
}

impl VoiceInfo {
    /// Display label for voice pickers
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.language)
    }
}
