use std::sync::Arc;

use chatpane_core::{ChatBackend, ChatController, ChatView};
use ratatui::layout::Rect;

use crate::view::TerminalView;

pub struct App {
    pub should_quit: bool,
    pub controller: ChatController<TerminalView>,

    // Clear confirmation popup
    pub confirm_clear: bool,

    /// One-off message shown in the footer instead of key hints
    pub status: Option<String>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Chat pane area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    pub server_url: String,
    pub user_label: String,
}

impl App {
    pub fn new(backend: Arc<dyn ChatBackend>, server_url: String, user_label: String) -> Self {
        Self {
            should_quit: false,
            controller: ChatController::new(backend, TerminalView::new()),
            confirm_clear: false,
            status: None,
            animation_frame: 0,
            chat_area: None,
            server_url,
            user_label,
        }
    }

    pub fn view(&self) -> &TerminalView {
        self.controller.view()
    }

    /// Apply an edit to the input box and refresh the send control
    pub fn edit_input<F>(&mut self, edit: F)
    where
        F: FnOnce(&mut TerminalView),
    {
        edit(self.controller.view_mut());
        self.status = None;
        self.controller.update_send_availability();
    }

    /// Show the clear confirmation popup; it takes focus from the input
    pub fn open_clear_prompt(&mut self) {
        self.confirm_clear = true;
        self.controller.view_mut().input_focused = false;
    }

    pub fn close_clear_prompt(&mut self) {
        self.confirm_clear = false;
        self.controller.view_mut().focus_input();
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.controller.is_processing() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }
}
