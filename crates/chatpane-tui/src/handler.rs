use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::debug;

use crate::app::App;
use crate::tui::{AppEvent, EventSender};

const PAGE_SCROLL: u16 = 10;
const WHEEL_SCROLL: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent, tx: &EventSender) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key, tx),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
        AppEvent::ChatFinished { pending, result } => {
            app.controller.finish_submit(pending, result);
        }
        AppEvent::ClearFinished { pending, result } => {
            if !app.controller.finish_clear(pending, result) {
                app.status = Some("Could not clear conversation history".to_string());
            }
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent, tx: &EventSender) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.confirm_clear {
        handle_confirm_clear(app, key, tx);
        return;
    }

    match key.code {
        KeyCode::Esc => app.should_quit = true,

        KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.open_clear_prompt();
        }

        // Alt+Enter keeps typing on a new line
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            app.edit_input(|view| view.insert_newline());
        }
        KeyCode::Enter => submit(app, tx),

        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.edit_input(|view| view.insert_char(c));
        }
        KeyCode::Backspace => app.edit_input(|view| view.backspace()),
        KeyCode::Delete => app.edit_input(|view| view.delete()),
        KeyCode::Left => app.edit_input(|view| view.move_left()),
        KeyCode::Right => app.edit_input(|view| view.move_right()),
        KeyCode::Home => app.edit_input(|view| view.move_home()),
        KeyCode::End => app.edit_input(|view| view.move_end()),

        KeyCode::PageUp => app.controller.view_mut().scroll_up(PAGE_SCROLL),
        KeyCode::PageDown => app.controller.view_mut().scroll_down(PAGE_SCROLL),

        _ => {}
    }
}

fn handle_confirm_clear(app: &mut App, key: KeyEvent, tx: &EventSender) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.close_clear_prompt();
            start_clear(app, true, tx);
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.close_clear_prompt();
            start_clear(app, false, tx);
        }
        _ => {}
    }
}

/// Start a chat request on a background task; the reply comes back as
/// `AppEvent::ChatFinished`
fn submit(app: &mut App, tx: &EventSender) {
    let Some(pending) = app.controller.begin_submit() else {
        return;
    };
    app.status = None;
    app.animation_frame = 0;

    let backend = app.controller.backend();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = backend.send_chat(pending.message()).await;
        if tx.send(AppEvent::ChatFinished { pending, result }).is_err() {
            debug!("event loop closed before chat reply arrived");
        }
    });
}

fn start_clear(app: &mut App, confirmed: bool, tx: &EventSender) {
    let Some(pending) = app.controller.begin_clear(confirmed) else {
        return;
    };

    let backend = app.controller.backend();
    let tx = tx.clone();
    tokio::spawn(async move {
        let result = backend.clear().await;
        if tx.send(AppEvent::ClearFinished { pending, result }).is_err() {
            debug!("event loop closed before clear completed");
        }
    });
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let over_chat = app
        .chat_area
        .map(|area| point_in_rect(mouse.column, mouse.row, area))
        .unwrap_or(false);
    if !over_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollUp => app.controller.view_mut().scroll_up(WHEEL_SCROLL),
        MouseEventKind::ScrollDown => app.controller.view_mut().scroll_down(WHEEL_SCROLL),
        _ => {}
    }
}
