use async_trait::async_trait;
use colored::*;
use domain::transcript_status::TranscriptStatus;
use domain::transcripts;
use events::{ClientEvent, EventHandler};
use log::*;

/// Presentation side of the client events: downloads are "opened" by printing
/// where to fetch them.
pub struct ConsoleHandler;

#[async_trait]
impl EventHandler for ConsoleHandler {
    async fn handle(&self, event: &ClientEvent) {
        match event {
            ClientEvent::OpenDownload { transcript_id, uri } => {
                println!(
                    "{} Transcript {transcript_id} is available at {}",
                    "↓".blue(),
                    uri.underline()
                );
            }
            ClientEvent::RefreshRequested { reason } => {
                debug!("Refresh requested: {reason:?}");
            }
        }
    }
}

pub fn status_label(status: TranscriptStatus) -> ColoredString {
    let label = format!("{:<10}", status.to_string());
    match status {
        TranscriptStatus::Completed => label.green(),
        TranscriptStatus::Failed => label.red(),
        TranscriptStatus::Processing => label.yellow(),
        TranscriptStatus::Pending => label.dimmed(),
    }
}

/// One row of the transcript list.
pub fn record_line(record: &transcripts::Model) -> String {
    let created = record
        .created_at
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());
    let read_only = if record.is_editable() {
        ""
    } else {
        " (read-only)"
    };

    format!(
        "{:>6}  {}  {:<5}  {:<16}  {}{}",
        record.id.to_string(),
        status_label(record.status),
        record.language.code(),
        created,
        record.youtube_url,
        read_only
    )
}

pub fn success(message: &str) {
    println!("{} {message}", "✓".green());
}

pub fn failure(message: &str) {
    eprintln!("{} {}", "✗".red(), message.red());
}

pub fn progress(message: &str) {
    println!("{} {message}", "→".blue());
}
