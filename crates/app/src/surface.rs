//! Line-based terminal rendering of the control surface

use readaloud_core::{ControlSurface, NoticeLevel, PanelModel};

pub struct TermSurface;

impl TermSurface {
    pub fn new() -> Self {
        Self
    }

    fn render(model: &PanelModel) -> String {
        let voice = match model.selected_voice.as_deref() {
            Some(id) => model
                .voices
                .iter()
                .find(|v| v.id == id)
                .map(|v| v.label.clone())
                .unwrap_or_else(|| id.to_string()),
            None => "engine default".to_string(),
        };
        let status = if model.paused { "paused" } else { "speaking" };
        format!(
            "[{status}] voice: {voice} | speed: {:.1}x | volume: {:.0}%",
            model.rate,
            model.volume * 100.0
        )
    }
}

impl Default for TermSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlSurface for TermSurface {
    fn show_panel(&mut self, model: &PanelModel) {
        println!("{}", Self::render(model));
    }

    fn update_panel(&mut self, model: &PanelModel) {
        println!("{}", Self::render(model));
    }

    fn hide_panel(&mut self) {
        println!("[stopped]");
    }

    fn notify(&mut self, level: NoticeLevel, message: &str) {
        // A line-based terminal cannot retract output, so notices are not
        // auto-dismissed after NOTICE_TTL here.
        match level {
            NoticeLevel::Error => eprintln!("error: {message}"),
            NoticeLevel::Info => println!("{message}"),
        }
    }
}
