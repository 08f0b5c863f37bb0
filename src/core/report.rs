// imgpipe/src/core/report.rs
use super::{ErrorRecord, Stage};
use std::io::{self, Write};

/// Formats failures for the diagnostic stream under one component name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reporter {
    component: &'static str,
    usage: Option<String>,
}

impl Reporter {
    pub fn new(component: &'static str) -> Self {
        Self {
            component,
            usage: None,
        }
    }

    /// Usage text printed after usage errors.
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = Some(usage.into());
        self
    }

    pub fn component(&self) -> &'static str {
        self.component
    }

    pub fn render(&self, record: &ErrorRecord) -> String {
        format!(
            "Error in {}::{}: {}",
            self.component, record.operation, record.source
        )
    }

    pub fn report_to<W: Write>(&self, mut writer: W, record: &ErrorRecord) -> io::Result<()> {
        log::debug!(
            "{} failed during {} stage",
            self.component,
            record.stage
        );
        writeln!(writer, "{}", self.render(record))?;
        if let (Stage::Usage, Some(usage)) = (record.stage, &self.usage) {
            writeln!(writer, "{}", usage.trim_end())?;
        }
        Ok(())
    }

    pub fn report(&self, record: &ErrorRecord) {
        // nothing sensible left to do if stderr is gone
        let _ = self.report_to(io::stderr().lock(), record);
    }

    /// Informational message on stderr, prefixed with the component name.
    pub fn note(&self, message: &str) {
        eprintln!("{}: {}", self.component, message);
    }
}
