//! Output formatting: JSON bodies, log lines and colored notices.

use std::io::{self, IsTerminal};

use owo_colors::OwoColorize;

use printdesk_core::{LogEntry, Notification, Notifier, ServerStatus, format_datetime};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Decides once whether to emit ANSI colors.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    color: bool,
}

impl Painter {
    pub fn new(mode: ColorMode) -> Self {
        let color = match mode {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
        };
        Self { color }
    }

    fn level(self, level: &str) -> String {
        let padded = format!("{level:<5}");
        if !self.color {
            return padded;
        }
        match level {
            "ERROR" | "FATAL" => padded.red().bold().to_string(),
            "WARN" | "WARNING" => padded.yellow().to_string(),
            "DEBUG" | "TRACE" => padded.dimmed().to_string(),
            _ => padded.green().to_string(),
        }
    }

    pub fn status(self, status: ServerStatus) -> String {
        let label = status.label();
        match (self.color, status) {
            (false, _) => label.to_owned(),
            (true, ServerStatus::Connected) => label.green().bold().to_string(),
            (true, ServerStatus::Stopped) => label.red().bold().to_string(),
        }
    }

    pub fn notice(self, text: &str) -> String {
        if self.color {
            text.yellow().to_string()
        } else {
            text.to_owned()
        }
    }
}

// ── Renderers ────────────────────────────────────────────────────────

pub fn render_json<T: serde::Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(data),
        OutputFormat::JsonCompact => serde_json::to_string(data),
    }
}

/// `30/11/2025 5:50 PM ERROR [printer] Paper jam (10.0.0.7 usb)`
pub fn render_log(painter: Painter, entry: &LogEntry) -> String {
    let mut line = format!(
        "{} {} [{}] {}",
        format_datetime(&entry.created_at),
        painter.level(&entry.level),
        entry.service,
        entry.message
    );
    if let Some(details) = &entry.details {
        let parts: Vec<&str> = [details.ip.as_deref(), details.connection.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !parts.is_empty() {
            line.push_str(&format!(" ({})", parts.join(" ")));
        }
    }
    line
}

// ── Notifications ────────────────────────────────────────────────────

/// Shows capped API failure notifications on stderr.
pub struct StderrNotifier {
    painter: Painter,
}

impl StderrNotifier {
    pub fn new(painter: Painter) -> Self {
        Self { painter }
    }
}

impl Notifier for StderrNotifier {
    fn notify(&self, notification: &Notification) {
        eprintln!(
            "{}",
            self.painter
                .notice(&format!("{}: {}", notification.title, notification.description))
        );
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use printdesk_core::LogDetails;

    use super::*;

    fn plain() -> Painter {
        Painter::new(ColorMode::Never)
    }

    fn entry(details: Option<LogDetails>) -> LogEntry {
        LogEntry {
            created_at: Utc.with_ymd_and_hms(2025, 11, 30, 21, 50, 0).single().unwrap_or_default(),
            level: "ERROR".into(),
            service: "printer".into(),
            message: "Paper jam".into(),
            details,
        }
    }

    #[test]
    fn log_line_without_details() {
        assert_eq!(
            render_log(plain(), &entry(None)),
            "30/11/2025 5:50 PM ERROR [printer] Paper jam"
        );
    }

    #[test]
    fn log_line_with_details() {
        let details = LogDetails {
            ip: Some("10.0.0.7".into()),
            connection: None,
        };
        assert_eq!(
            render_log(plain(), &entry(Some(details))),
            "30/11/2025 5:50 PM ERROR [printer] Paper jam (10.0.0.7)"
        );
    }

    #[test]
    fn status_labels_are_kept() {
        assert_eq!(plain().status(ServerStatus::Connected), "Conectado");
        assert_eq!(plain().status(ServerStatus::Stopped), "Detenido");
    }

    #[test]
    fn compact_json_is_one_line() {
        let value = serde_json::json!({ "id": 1, "name": "Front desk" });
        let rendered = render_json(OutputFormat::JsonCompact, &value).unwrap_or_default();
        assert!(!rendered.contains('\n'));
    }
}
