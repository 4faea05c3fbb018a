pub mod build;
pub mod dedupe;
pub mod import;
pub mod status;

use crate::reel::warn;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }
}

/// An expected source that cannot be used degrades the run, it does not end
/// it: one structured warning plus a report line, and the pipeline moves on.
pub fn note_source_unavailable(
    report: &mut CommandReport,
    stage: &str,
    subject: &str,
    err: &anyhow::Error,
) {
    warn::emit(
        "SOURCE_UNAVAILABLE",
        stage,
        subject,
        "continuing-without-source",
        &format!("{err:#}"),
    );
    report.detail(format!("{subject}: unavailable, continuing without it"));
}
