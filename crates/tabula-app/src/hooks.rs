//! Terminal implementation of the editor hooks

use async_trait::async_trait;
use std::io::Write;
use tabula_table_editor::{
    AlertLevel, ConfirmRequest, Confirmed, EditorHooks, Notification, TableEditorEvent,
};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Prompts on stdin for confirmations and prints alerts to stdout
pub struct ConsoleHooks {
    /// Skip the y/N prompt; the cooldown is still waited out
    assume_yes: bool,
}

impl ConsoleHooks {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    async fn ask(&self, request: &ConfirmRequest) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{}: {} [y/N] ", request.action.title(), request.action.message());
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut line = String::new();
        match BufReader::new(tokio::io::stdin()).read_line(&mut line).await {
            Ok(_) => is_yes(&line),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read confirmation");
                false
            }
        }
    }
}

#[async_trait]
impl EditorHooks for ConsoleHooks {
    async fn on_before_destructive(&self, request: &ConfirmRequest) -> Option<Confirmed> {
        let gate = request.open_gate();
        if !self.ask(request).await {
            return None;
        }

        let remaining = gate.remaining_at(std::time::Instant::now());
        if !remaining.is_zero() {
            println!("Confirming in {}s...", remaining.as_secs_f32().ceil());
            tokio::time::sleep(remaining).await;
        }

        match gate.confirm() {
            Ok(token) => Some(token),
            Err(e) => {
                tracing::warn!(error = %e, "confirmation rejected");
                None
            }
        }
    }

    fn on_after_mutation(&self, event: &TableEditorEvent, notification: Option<&Notification>) {
        tracing::debug!(?event, "table event");
        if let Some(notification) = notification {
            println!("{}", format_notification(notification));
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn format_notification(notification: &Notification) -> String {
    let marker = match notification.level {
        AlertLevel::Info => "i",
        AlertLevel::Success => "✓",
        AlertLevel::Warning => "!",
        AlertLevel::Error => "✗",
    };
    if notification.message.is_empty() {
        format!("{} {}", marker, notification.title)
    } else {
        format!("{} {}: {}", marker, notification.title, notification.message)
    }
}
