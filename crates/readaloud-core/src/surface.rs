//! Presentation surface contract
//!
//! The controller drives a floating control panel and transient
//! notifications through this trait; how they are rendered is up to the
//! host (terminal, GUI, ...). The controller pushes a fresh `PanelModel`
//! whenever its state changes, so surfaces never re-derive parameter values
//! from their own widgets.

use std::ops::RangeInclusive;
use std::time::Duration;

/// Playback rate bounds and slider step
pub const RATE_RANGE: RangeInclusive<f32> = 0.5..=2.0;
pub const RATE_STEP: f32 = 0.1;

/// Volume bounds and slider step
pub const VOLUME_RANGE: RangeInclusive<f32> = 0.0..=1.0;
pub const VOLUME_STEP: f32 = 0.1;

/// How long a transient notice stays visible on surfaces that can retract
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// A voice entry for the panel's voice picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceOption {
    pub id: String,
    /// Display label, "{name} ({lang})"
    pub label: String,
}

/// Everything a surface needs to render the control panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelModel {
    pub voices: Vec<VoiceOption>,
    pub selected_voice: Option<String>,
    pub rate: f32,
    pub volume: f32,
    pub paused: bool,
}

/// Severity of a transient notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Outbound presentation interface
pub trait ControlSurface: Send {
    /// Render the control panel (or reveal it if already built)
    fn show_panel(&mut self, model: &PanelModel);

    /// Refresh an already-visible panel
    fn update_panel(&mut self, model: &PanelModel);

    /// Hide/destroy the control panel
    fn hide_panel(&mut self);

    /// Show a transient notice; auto-dismissed after [`NOTICE_TTL`] on
    /// surfaces that can retract output
    fn notify(&mut self, level: NoticeLevel, message: &str);
}
