// render.rs

use crate::history::HistoryEntry;

/// Everything the controller is allowed to do to the screen.
pub trait Render {
    fn set_display_text(&mut self, text: &str);
    fn set_error(&mut self, active: bool);
    fn set_history_items(&mut self, items: &[HistoryEntry]);
    fn set_scientific_visible(&mut self, visible: bool);
    /// The user asked to see the history list.
    fn show_history(&mut self);
    /// Called by the event loop once a batch of updates is complete.
    fn flush(&mut self) {}
}
