//! User-facing notification surface. The UI toolkit implements [`Notifier`];
//! the client only describes what should be shown.

use std::time::Duration;

use async_trait::async_trait;

const CONFIRM_COLOR: &str = "#3085d6";
const CANCEL_COLOR: &str = "#d33";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// Transient notification that dismisses itself after `timeout`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub text: String,
    pub severity: Severity,
    pub timeout: Duration,
}

impl Notice {
    pub fn success(text: impl Into<String>, timeout: Duration) -> Self {
        Self {
            title: "Success".to_string(),
            text: text.into(),
            severity: Severity::Success,
            timeout,
        }
    }
}

/// Blocking error dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDialog {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl ErrorDialog {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSpan {
    Plain(String),
    Strong(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText {
    pub spans: Vec<TextSpan>,
}

impl RichText {
    pub fn plain(mut self, text: impl Into<String>) -> Self {
        self.spans.push(TextSpan::Plain(text.into()));
        self
    }

    pub fn strong(mut self, text: impl Into<String>) -> Self {
        self.spans.push(TextSpan::Strong(text.into()));
        self
    }

    pub fn plain_text(&self) -> String {
        self.spans
            .iter()
            .map(|span| match span {
                TextSpan::Plain(text) | TextSpan::Strong(text) => text.as_str(),
            })
            .collect()
    }

    /// HTML rendering with all span text escaped.
    pub fn to_html(&self) -> String {
        self.spans
            .iter()
            .map(|span| match span {
                TextSpan::Plain(text) => escape_html(text),
                TextSpan::Strong(text) => format!("<strong>{}</strong>", escape_html(text)),
            })
            .collect()
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Yes/no prompt guarding a destructive action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub title: String,
    pub body: RichText,
    pub severity: Severity,
    pub confirm_label: String,
    pub confirm_color: String,
    pub cancel_color: String,
}

impl Confirmation {
    fn destructive(title: &str, body: RichText, confirm_label: &str) -> Self {
        Self {
            title: title.to_string(),
            body,
            severity: Severity::Warning,
            confirm_label: confirm_label.to_string(),
            confirm_color: CONFIRM_COLOR.to_string(),
            cancel_color: CANCEL_COLOR.to_string(),
        }
    }

    pub fn delete_description(name: &str) -> Self {
        Self::destructive(
            "Delete device description",
            RichText::default()
                .plain("Are you sure you want to delete the device description \"")
                .strong(name)
                .plain("\"?"),
            "Delete",
        )
    }

    pub fn clear_repository() -> Self {
        Self::destructive(
            "Clear repository",
            RichText::default()
                .plain("Are you sure you want to delete ")
                .strong("all")
                .plain(" device descriptions from the repository?"),
            "Delete all",
        )
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
    fn show_error(&self, dialog: ErrorDialog);
    /// Resolves to `true` only when the user explicitly confirmed.
    async fn confirm(&self, confirmation: Confirmation) -> bool;
}
