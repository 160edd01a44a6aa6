//! Terminal rendering of notices, errors and confirmation prompts.

use std::io::{self, BufRead, IsTerminal, Write};

use async_trait::async_trait;
use client_core::{Confirmation, ErrorDialog, Notice, Notifier, RichText, Severity, TextSpan};
use tracing::warn;

pub struct TerminalNotifier {
    assume_yes: bool,
    styled: bool,
}

impl TerminalNotifier {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            styled: io::stderr().is_terminal(),
        }
    }

    fn render(&self, text: &RichText) -> String {
        text.spans
            .iter()
            .map(|span| match span {
                TextSpan::Plain(text) => text.clone(),
                TextSpan::Strong(text) if self.styled => format!("\x1b[1m{text}\x1b[0m"),
                TextSpan::Strong(text) => text.clone(),
            })
            .collect()
    }
}

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Success => "[ok]",
        Severity::Info => "[info]",
        Severity::Warning => "[warn]",
        Severity::Error => "[error]",
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl Notifier for TerminalNotifier {
    // The timeout has no meaning for a line-based terminal.
    fn notify(&self, notice: Notice) {
        eprintln!("{} {}: {}", marker(notice.severity), notice.title, notice.text);
    }

    fn show_error(&self, dialog: ErrorDialog) {
        eprintln!("{} {}: {}", marker(dialog.severity), dialog.title, dialog.message);
    }

    async fn confirm(&self, confirmation: Confirmation) -> bool {
        if self.assume_yes {
            return true;
        }

        let prompt = format!(
            "{} {}\n{} [{}/N] ",
            marker(confirmation.severity),
            confirmation.title,
            self.render(&confirmation.body),
            confirmation.confirm_label,
        );

        let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
            let mut stderr = io::stderr();
            stderr.write_all(prompt.as_bytes())?;
            stderr.flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            Ok(line)
        })
        .await;

        match answer {
            Ok(Ok(line)) => is_yes(&line),
            Ok(Err(err)) => {
                warn!(error = %err, "could not read confirmation");
                false
            }
            Err(err) => {
                warn!(error = %err, "confirmation prompt task failed");
                false
            }
        }
    }
}
