use std::fmt::Display;
use std::io::Write as _;

use little_chat_core::history::HistoryView;
use little_chat_core::transcript::TranscriptEvent;
use little_chat_core::{Message, Speaker};
use owo_colors::OwoColorize;

const BAR_CHAR: &str = "▎";

/// Prints transcript events as they arrive.
///
/// User messages are not echoed since the user just typed them. Streamed
/// replies are printed piece by piece on a single line.
#[derive(Debug, Default)]
pub struct Renderer {
    mid_line: bool,
}

/// Returns `false` for events that [`Renderer::render`] does not print.
pub fn is_visible(event: &TranscriptEvent) -> bool {
    !matches!(
        event,
        TranscriptEvent::Appended { message, .. } if message.speaker == Speaker::User
    )
}

impl Renderer {
    pub fn render(&mut self, event: &TranscriptEvent) {
        if !is_visible(event) {
            return;
        }
        match event {
            TranscriptEvent::Appended { message, .. } => {
                self.end_line();
                print!("{}", reply_prefix());
                print!("{}", message.text.bright_white());
                self.mid_line = true;
            }
            TranscriptEvent::Updated { delta, .. } => {
                print!("{}", delta.bright_white());
                self.mid_line = true;
            }
            TranscriptEvent::Finalized { message, .. } => {
                if !self.mid_line {
                    print!("{}{}", reply_prefix(), message.text.bright_white());
                }
                println!();
                self.mid_line = false;
            }
            TranscriptEvent::Replaced { messages } => {
                self.end_line();
                println!();
                for message in messages {
                    print_message(message);
                }
                println!();
            }
        }
        std::io::stdout().flush().ok();
    }

    /// Terminates a reply that ended without being finalized.
    pub fn end_line(&mut self) {
        if self.mid_line {
            println!();
            self.mid_line = false;
        }
    }
}

fn reply_prefix() -> String {
    format!("{}🤖 ", BAR_CHAR.bright_cyan())
}

fn print_message(message: &Message) {
    match message.speaker {
        Speaker::User => {
            println!("{}{}", BAR_CHAR.bright_green(), message.text)
        }
        Speaker::System => {
            println!("{}{}", reply_prefix(), message.text.bright_white())
        }
    }
}

pub fn history(history: &HistoryView) {
    if let Some(err) = history.last_error() {
        warning(format_args!("history may be outdated: {err}"));
    }
    if !history.is_loaded() || history.conversations().is_empty() {
        println!("{}", "(no conversations yet)".dimmed());
        return;
    }
    for (idx, summary) in history.summaries().enumerate() {
        println!("{:>3}. {summary}", (idx + 1).bright_cyan());
    }
}

pub fn help() {
    println!("Type a message to chat. Commands:");
    println!("  /history   list previous conversations");
    println!("  /open N    show conversation N from the list");
    println!("  /help      show this help");
    println!("  /quit      exit");
}

pub fn warning(message: impl Display) {
    println!("{}⚠️  {}", BAR_CHAR.bright_yellow(), message.yellow());
}

pub fn error(message: impl Display) {
    println!("{}❌ {}", BAR_CHAR.bright_red(), message.red());
}
