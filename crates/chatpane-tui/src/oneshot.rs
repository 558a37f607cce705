//! Non-interactive `send` and `clear` commands
//!
//! These drive the same controller as the terminal UI, with a view that
//! prints each transcript node as it is appended.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use chatpane_core::{ChatBackend, ChatController, ChatMessage, ChatRole, ChatView, Entry, NodeId, Transcript};

pub struct PrintView<W: Write> {
    out: W,
    input: String,
    user_label: String,
    transcript: Transcript,
    write_error: Option<io::Error>,
}

impl<W: Write> PrintView<W> {
    pub fn new(out: W, input: String, user_label: String) -> Self {
        let mut transcript = Transcript::new();
        transcript.remove_welcome();
        Self {
            out,
            input,
            user_label,
            transcript,
            write_error: None,
        }
    }

    fn print(&mut self, text: &str) {
        if self.write_error.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.out, "{}", text) {
            self.write_error = Some(err);
        }
    }

    /// Hand back the writer, or the first write error encountered
    pub fn finish(self) -> io::Result<W> {
        match self.write_error {
            Some(err) => Err(err),
            None => Ok(self.out),
        }
    }
}

impl<W: Write> ChatView for PrintView<W> {
    fn input(&self) -> &str {
        &self.input
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn append_message(&mut self, message: &ChatMessage) -> NodeId {
        let label = match message.role {
            ChatRole::User => self.user_label.clone(),
            ChatRole::Assistant => "AI".to_string(),
        };
        self.print(&format!("{}: {}", label, message.content));
        self.transcript.push(Entry::Message(message.clone()))
    }

    fn append_loading(&mut self) -> NodeId {
        self.transcript.push(Entry::Loading)
    }

    fn append_error(&mut self, message: &str) -> NodeId {
        self.print(&Entry::error_text(message));
        self.transcript.push(Entry::Error(message.to_string()))
    }

    fn remove_node(&mut self, id: NodeId) {
        self.transcript.remove(id);
    }

    fn remove_welcome(&mut self) {
        self.transcript.remove_welcome();
    }

    fn reset_to_welcome(&mut self) {
        self.transcript.reset();
        self.print("Conversation cleared.");
    }

    fn set_send_enabled(&mut self, _enabled: bool) {}
}

pub async fn run_send(backend: Arc<dyn ChatBackend>, message: &str, user_label: &str) -> Result<()> {
    let view = PrintView::new(io::stdout(), message.to_string(), user_label.to_string());
    let mut controller = ChatController::new(backend, view);

    if !controller.can_send() {
        anyhow::bail!("message is empty");
    }
    controller.submit_message().await;
    controller.into_view().finish()?;
    Ok(())
}

fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
        Err(_) => false,
    }
}

pub async fn run_clear(backend: Arc<dyn ChatBackend>, assume_yes: bool) -> Result<()> {
    let view = PrintView::new(io::stdout(), String::new(), String::new());
    let mut controller = ChatController::new(backend, view);

    let cleared = controller
        .clear_history(|prompt| assume_yes || confirm_on_stdin(prompt))
        .await;
    let mut out = controller.into_view().finish()?;
    if !cleared {
        writeln!(out, "History not cleared.")?;
    }
    Ok(())
}
