// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes, for messages and task narration.

use serde::Serialize;
use std::time::Instant;

use crate::log_sink::{LogLevel, LogLine, LogSink, SinkError, UnitStatus};
use crate::task::TaskExecutionResult;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration_secs(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                println!("{message}");
            }
            OutputMode::Json => self.json_event("success", message, false),
        }
    }

    /// Print a warning (suppressed in quiet mode).
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => self.json_event("warning", message, true),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("Error: {message}");
            }
            OutputMode::Json => self.json_event("error", message, true),
        }
    }

    /// Print a task's result envelope.
    pub fn result(&self, result: &TaskExecutionResult) {
        match self.mode {
            OutputMode::Normal => {
                if result.is_success() {
                    self.success("Task succeeded");
                } else {
                    eprintln!(
                        "Task failed: {}",
                        result.error_message().unwrap_or("unknown error")
                    );
                }
                if let Some(response) = result.response()
                    && let Ok(json) = serde_json::to_string_pretty(response)
                {
                    println!("{json}");
                }
            }
            OutputMode::Quiet => match result.error_message() {
                None => println!("SUCCESS"),
                Some(message) => println!("FAILURE: {message}"),
            },
            OutputMode::Json => {
                let event = ResultEvent {
                    event: "result",
                    result,
                    duration_secs: self.duration_secs(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }

    fn json_event(&self, event: &str, message: &str, to_stderr: bool) {
        let event = JsonEvent {
            event,
            message,
            duration_secs: self.duration_secs(),
        };
        if let Ok(json) = serde_json::to_string(&event) {
            if to_stderr {
                eprintln!("{json}");
            } else {
                println!("{json}");
            }
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct ResultEvent<'a> {
    event: &'a str,
    result: &'a TaskExecutionResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

/// Streams task narration to the terminal in the CLI's output mode.
#[derive(Debug, Clone, Copy)]
pub struct OutputSink {
    mode: OutputMode,
}

impl OutputSink {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

#[derive(Serialize)]
struct LogEvent<'a> {
    event: &'a str,
    unit: &'a str,
    #[serde(flatten)]
    line: &'a LogLine,
}

impl LogSink for OutputSink {
    fn append(&self, unit: &str, line: &LogLine) -> Result<(), SinkError> {
        match self.mode {
            OutputMode::Normal => {
                let marker = match line.level {
                    LogLevel::Info => "→",
                    LogLevel::Warn => "!",
                    LogLevel::Error => "✗",
                };
                println!("  {marker} [{unit}] {}", line.message);
            }
            OutputMode::Quiet => {}
            OutputMode::Json => {
                let event = LogEvent {
                    event: "log",
                    unit,
                    line,
                };
                let json = serde_json::to_string(&event)
                    .map_err(|e| SinkError::Unavailable(e.to_string()))?;
                println!("{json}");
            }
        }
        Ok(())
    }

    fn close_unit(&self, unit: &str, status: UnitStatus) -> Result<(), SinkError> {
        if self.mode == OutputMode::Normal && status == UnitStatus::Failure {
            println!("  ✗ [{unit}] failed");
        }
        Ok(())
    }
}
