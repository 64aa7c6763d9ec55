//! Output formatting for the CLI.

use clap::ValueEnum;
use record_store::Record;
use serde::Serialize;
use std::fmt;

/// Output format.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Timestamp layout used in text output.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// A record as the CLI shows it.
#[derive(Debug, Serialize)]
pub struct RecordView {
    pub author: String,
    pub submitted_at: String,
    pub message: String,
}

impl From<&Record> for RecordView {
    fn from(record: &Record) -> Self {
        Self {
            author: record.author().to_string(),
            submitted_at: record.submitted_at().format(TIMESTAMP_FORMAT).to_string(),
            message: record.message().to_string(),
        }
    }
}

impl fmt::Display for RecordView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<42} {:<23} {}", self.author, self.submitted_at, self.message)
    }
}

/// Print a full listing.
pub fn print_records(records: &[Record], format: &OutputFormat) {
    match format {
        OutputFormat::Text => {
            if records.is_empty() {
                println!("No records yet");
                return;
            }
            println!("{:<42} {:<23} {}", "Author", "Submitted", "Message");
            println!("{}", "-".repeat(100));
            for record in records {
                println!("{}", RecordView::from(record));
            }
        }
        OutputFormat::Json => {
            let views: Vec<RecordView> = records.iter().map(RecordView::from).collect();
            match serde_json::to_string_pretty(&views) {
                Ok(json) => println!("{json}"),
                Err(e) => print_error(&e.to_string(), format),
            }
        }
    }
}

/// Print one streamed record. JSON output is one object per line.
pub fn print_record(record: &Record, format: &OutputFormat) {
    let view = RecordView::from(record);
    match format {
        OutputFormat::Text => println!("{view}"),
        OutputFormat::Json => match serde_json::to_string(&view) {
            Ok(json) => println!("{json}"),
            Err(_) => println!("{view}"),
        },
    }
}

/// Print a success message.
pub fn print_success(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => println!("{message}"),
        OutputFormat::Json => println!("{}", status_json("success", message)),
    }
}

/// Print a notice the user should act on. Goes to stderr so listings stay
/// machine-readable.
pub fn print_notice(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("{message}"),
        OutputFormat::Json => eprintln!("{}", status_json("notice", message)),
    }
}

/// Print an error message.
pub fn print_error(message: &str, format: &OutputFormat) {
    match format {
        OutputFormat::Text => eprintln!("Error: {message}"),
        OutputFormat::Json => eprintln!("{}", status_json("error", message)),
    }
}

/// Print a labelled value.
pub fn print_row(label: &str, value: &str) {
    println!("  {:<16} {}", format!("{label}:"), value);
}

fn status_json(status: &str, message: &str) -> String {
    serde_json::json!({ "status": status, "message": message }).to_string()
}
