// ABOUTME: Operator-visible narration of protocol steps.
// ABOUTME: LogSink is the external append-only sink; ExecutionLog swallows its failures.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// Severity of a narration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One line of narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogLine {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }
}

/// Final status of a log unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitStatus {
    Success,
    Failure,
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("log sink unavailable: {0}")]
    Unavailable(String),
}

/// Append-only destination for narration, grouped into named units.
pub trait LogSink: Send + Sync {
    /// Append a line to `unit`.
    fn append(&self, unit: &str, line: &LogLine) -> Result<(), SinkError>;

    /// Mark `unit` as finished.
    fn close_unit(&self, _unit: &str, _status: UnitStatus) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Writes narration as tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn append(&self, unit: &str, line: &LogLine) -> Result<(), SinkError> {
        match line.level {
            LogLevel::Info => tracing::info!(unit, "{}", line.message),
            LogLevel::Warn => tracing::warn!(unit, "{}", line.message),
            LogLevel::Error => tracing::error!(unit, "{}", line.message),
        }
        Ok(())
    }

    fn close_unit(&self, unit: &str, status: UnitStatus) -> Result<(), SinkError> {
        tracing::debug!(unit, ?status, "log unit closed");
        Ok(())
    }
}

/// An entry recorded by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEntry {
    Line { unit: String, line: LogLine },
    Closed { unit: String, status: UnitStatus },
}

/// Keeps narration in memory, in append order.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<SinkEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<SinkEntry> {
        self.entries.lock().clone()
    }

    /// Every message, across all units.
    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter_map(|e| match e {
                SinkEntry::Line { line, .. } => Some(line.message.clone()),
                SinkEntry::Closed { .. } => None,
            })
            .collect()
    }

    /// Messages appended to a single unit.
    pub fn messages_for(&self, unit: &str) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter_map(|e| match e {
                SinkEntry::Line { unit: u, line } if u == unit => Some(line.message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Status a unit was closed with, if it was closed.
    pub fn unit_status(&self, unit: &str) -> Option<UnitStatus> {
        self.entries.lock().iter().rev().find_map(|e| match e {
            SinkEntry::Closed { unit: u, status } if u == unit => Some(*status),
            _ => None,
        })
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|m| m.contains(needle))
    }
}

impl LogSink for MemorySink {
    fn append(&self, unit: &str, line: &LogLine) -> Result<(), SinkError> {
        self.entries.lock().push(SinkEntry::Line {
            unit: unit.to_string(),
            line: line.clone(),
        });
        Ok(())
    }

    fn close_unit(&self, unit: &str, status: UnitStatus) -> Result<(), SinkError> {
        self.entries.lock().push(SinkEntry::Closed {
            unit: unit.to_string(),
            status,
        });
        Ok(())
    }
}

/// Narration handle for one log unit.
///
/// Sink failures are reported through tracing and otherwise ignored; narration
/// never changes the outcome of a protocol.
#[derive(Clone)]
pub struct ExecutionLog {
    sink: Arc<dyn LogSink>,
    unit: String,
}

impl std::fmt::Debug for ExecutionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionLog")
            .field("unit", &self.unit)
            .finish()
    }
}

impl ExecutionLog {
    pub fn new(sink: Arc<dyn LogSink>, unit: impl Into<String>) -> Self {
        Self {
            sink,
            unit: unit.into(),
        }
    }

    pub fn unit_name(&self) -> &str {
        &self.unit
    }

    /// A handle for another unit on the same sink.
    pub fn unit(&self, unit: impl Into<String>) -> ExecutionLog {
        ExecutionLog::new(Arc::clone(&self.sink), unit)
    }

    pub fn info(&self, message: impl Into<String>) {
        self.append(LogLevel::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.append(LogLevel::Warn, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.append(LogLevel::Error, message.into());
    }

    pub fn close(&self, status: UnitStatus) {
        if let Err(e) = self.sink.close_unit(&self.unit, status) {
            tracing::warn!(unit = %self.unit, error = %e, "failed to close log unit");
        }
    }

    fn append(&self, level: LogLevel, message: String) {
        let line = LogLine::new(level, message);
        if let Err(e) = self.sink.append(&self.unit, &line) {
            tracing::warn!(unit = %self.unit, error = %e, "dropped narration line");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSink;

    impl LogSink for BrokenSink {
        fn append(&self, _unit: &str, _line: &LogLine) -> Result<(), SinkError> {
            Err(SinkError::Unavailable("connection reset".into()))
        }

        fn close_unit(&self, _unit: &str, _status: UnitStatus) -> Result<(), SinkError> {
            Err(SinkError::Unavailable("connection reset".into()))
        }
    }

    #[test]
    fn memory_sink_groups_lines_by_unit() {
        let sink = Arc::new(MemorySink::new());
        let log = ExecutionLog::new(sink.clone(), "Upscale Elastigroup");
        log.info("first");
        log.unit("Swap Routes").warn("second");
        log.close(UnitStatus::Success);

        assert_eq!(sink.messages(), vec!["first", "second"]);
        assert_eq!(sink.messages_for("Swap Routes"), vec!["second"]);
        assert_eq!(
            sink.unit_status("Upscale Elastigroup"),
            Some(UnitStatus::Success)
        );
        assert_eq!(sink.unit_status("Swap Routes"), None);
    }

    #[test]
    fn tracing_sink_accepts_every_level() {
        let log = ExecutionLog::new(Arc::new(TracingSink), "Swap Routes");
        log.info("info");
        log.warn("warn");
        log.error("error");
        log.close(UnitStatus::Success);
    }

    #[test]
    fn broken_sink_is_not_fatal() {
        let log = ExecutionLog::new(Arc::new(BrokenSink), "Deploy");
        log.info("still fine");
        log.error("still fine");
        log.close(UnitStatus::Failure);
    }
}
