//! Selection capture at trigger time

use anyhow::{Context, Result};

/// Read the user's current selection
///
/// Captured when the trigger fires, not earlier, since the selection can
/// change between intent and trigger. On Linux the primary selection (text
/// highlighted anywhere) is preferred; the regular clipboard is the
/// fallback.
pub fn current_selection() -> Result<String> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard unavailable")?;

    #[cfg(target_os = "linux")]
    {
        use arboard::{GetExtLinux, LinuxClipboardKind};
        if let Ok(text) = clipboard
            .get()
            .clipboard(LinuxClipboardKind::Primary)
            .text()
        {
            if !text.trim().is_empty() {
                return Ok(text);
            }
        }
    }

    clipboard.get_text().context("nothing selected or copied")
}
