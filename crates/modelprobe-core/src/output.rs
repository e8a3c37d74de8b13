//! Report output in JSON or JSONL.
//!
//! JSON writes the whole [`ProbeReport`] as one document. JSONL writes one
//! outcome per line, which appends cleanly across repeated runs.

use crate::report::ProbeReport;
use crate::types::ProbeOutcome;
use serde::Serialize;
use std::io::{self, Write};

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Single JSON document
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl OutputFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }
}

/// Serializes probe reports to a writer.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: OutputFormat,
    pretty: bool,
}

impl<W: Write> ReportWriter<W> {
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: OutputFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, item: &T, pretty: bool) -> io::Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }

    /// Write a single outcome as one line.
    pub fn write_outcome(&mut self, outcome: &ProbeOutcome) -> io::Result<()> {
        self.write_json(outcome, false)
    }

    /// Write a full report in the configured format.
    pub fn write_report(&mut self, report: &ProbeReport) -> io::Result<()> {
        match self.format {
            OutputFormat::Json => self.write_json(report, self.pretty)?,
            OutputFormat::JsonLines => {
                for outcome in &report.outcomes {
                    self.write_outcome(outcome)?;
                }
            }
        }
        self.writer.flush()
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
