//! Terminal rendering of widget snapshots.

use std::io::{self, Write};

use filedrop_uploader::{DisplayText, Phase, UploadConfiguration, WidgetSnapshot};

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Writes a line whenever the visible part of the widget changes.
pub struct Renderer<W> {
    out: W,
    format: OutputFormat,
    display: DisplayText,
    last_phase: Option<Phase>,
    last_progress: Option<u8>,
    last_notification: Option<u64>,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W, format: OutputFormat, display: DisplayText) -> Self {
        Self {
            out,
            format,
            display,
            last_phase: None,
            last_progress: None,
            last_notification: None,
        }
    }

    /// The idle widget: upload prompt and accepted formats.
    pub fn prompt(&mut self, config: &UploadConfiguration) -> io::Result<()> {
        if self.format == OutputFormat::Text {
            writeln!(
                self.out,
                "{} ({})",
                self.display.upload_message,
                config.accept_hint()
            )?;
        }
        Ok(())
    }

    /// Renders `snapshot` if anything visible changed since the last call.
    pub fn show(&mut self, snapshot: &WidgetSnapshot) -> io::Result<()> {
        let notification = snapshot.notification.as_ref().map(|n| n.id);
        if self.last_phase == Some(snapshot.phase)
            && self.last_progress == Some(snapshot.progress_percent)
            && self.last_notification == notification
        {
            return Ok(());
        }

        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.out, snapshot)?;
                writeln!(self.out)?;
            }
            OutputFormat::Text => self.write_text(snapshot, notification)?,
        }

        self.last_phase = Some(snapshot.phase);
        self.last_progress = Some(snapshot.progress_percent);
        self.last_notification = notification;
        self.out.flush()
    }

    fn write_text(&mut self, snapshot: &WidgetSnapshot, notification: Option<u64>) -> io::Result<()> {
        if let Some(file) = &snapshot.current_file {
            let status = match snapshot.phase {
                Phase::Error => self.display.error_message.clone(),
                Phase::Complete => "done".to_string(),
                _ => format!("{}%", snapshot.progress_percent),
            };
            writeln!(
                self.out,
                "{} ({}) {} {status}",
                file.name,
                file.size_label(),
                progress_bar(snapshot.progress_percent)
            )?;
        }

        if notification != self.last_notification {
            if let Some(n) = &snapshot.notification {
                writeln!(self.out, "[{}] {}", n.severity, n.message)?;
            }
        }
        Ok(())
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}
