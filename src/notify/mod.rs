//! Fire-and-forget user notifications (toasts, status lines, logs).

use std::fmt;
use std::sync::Mutex;

use colored::Colorize;

/// Receives user-facing messages. Callers never depend on a result.
pub trait NotificationSink: Send + Sync {
    fn show_warning(&self, text: &str);
    fn show_error(&self, text: &str);
    fn show_success(&self, text: &str) {
        tracing::info!(target: "budget_pulse::notify", "{text}");
    }
}

/// Forwards notifications to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn show_warning(&self, text: &str) {
        tracing::warn!(target: "budget_pulse::notify", "{text}");
    }

    fn show_error(&self, text: &str) {
        tracing::error!(target: "budget_pulse::notify", "{text}");
    }
}

/// Prints coloured notification lines to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn show_warning(&self, text: &str) {
        println!("{}", format!("⚠ WARNING: {text}").yellow().bold());
    }

    fn show_error(&self, text: &str) {
        println!("{}", format!("✖ ERROR: {text}").red().bold());
    }

    fn show_success(&self, text: &str) {
        println!("{}", format!("✔ OK: {text}").green());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Warning,
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

/// Buffers notifications for a front end that polls instead of pushing.
#[derive(Debug, Default)]
pub struct MemorySink {
    queue: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every buffered notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, level: NotificationLevel, text: &str) {
        self.lock().push(Notification {
            level,
            text: text.to_string(),
        });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl NotificationSink for MemorySink {
    fn show_warning(&self, text: &str) {
        self.push(NotificationLevel::Warning, text);
    }

    fn show_error(&self, text: &str) {
        self.push(NotificationLevel::Error, text);
    }

    fn show_success(&self, text: &str) {
        self.push(NotificationLevel::Success, text);
    }
}
