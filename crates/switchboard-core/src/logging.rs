//! Structured logging.
//!
//! Log entries carry a level, a message, and bounded structured fields,
//! and render either as JSON (production) or a compact single line
//! (development). Output goes through a pluggable [`LogSink`] so tests can
//! capture entries instead of scraping stderr.
//!
//! # Usage
//!
//! ```
//! use switchboard_core::logging::{LogConfig, LogLevel, Logger};
//!
//! let logger = Logger::new(LogConfig::new().level(LogLevel::Info));
//! logger.info("request dispatched", &[("path", "/users/42"), ("status", "200")]);
//! ```

use std::fmt;
use std::io::Write;
use std::sync::Mutex;

/// Maximum structured fields kept per entry; extras are dropped.
const MAX_FIELDS: usize = 16;

/// Log severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Most verbose, for detailed debugging.
    Trace = 0,
    /// Debug information, not shown in production.
    Debug = 1,
    /// General information about normal operation.
    Info = 2,
    /// Something unexpected but recoverable.
    Warn = 3,
    /// An error that affected request processing.
    Error = 4,
}

impl LogLevel {
    /// The level as a lowercase string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// A single-character representation for compact output.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Trace => 'T',
            Self::Debug => 'D',
            Self::Info => 'I',
            Self::Warn => 'W',
            Self::Error => 'E',
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structured log entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// The log level.
    pub level: LogLevel,
    /// The log message.
    pub message: String,
    /// Module/target path (optional).
    pub target: Option<String>,
    /// Structured key-value fields.
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            target: None,
            fields: Vec::new(),
        }
    }

    /// Set the target module path.
    #[must_use]
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Add a structured field. Fields beyond the cap are silently dropped.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        if self.fields.len() < MAX_FIELDS {
            self.fields.push((key.into(), value.to_string()));
        }
        self
    }

    /// Render as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        let mut json = format!(
            r#"{{"level":"{}","message":"{}""#,
            self.level,
            escape_json(&self.message)
        );

        if let Some(ref target) = self.target {
            json.push_str(&format!(r#","target":"{}""#, escape_json(target)));
        }

        if !self.fields.is_empty() {
            json.push_str(r#","fields":{"#);
            for (i, (k, v)) in self.fields.iter().enumerate() {
                if i > 0 {
                    json.push(',');
                }
                json.push_str(&format!(r#""{}":"{}""#, escape_json(k), escape_json(v)));
            }
            json.push('}');
        }

        json.push('}');
        json
    }

    /// Render as a compact single line.
    #[must_use]
    pub fn to_compact(&self) -> String {
        let mut output = format!("[{}] {}", self.level.as_char(), self.message);

        if !self.fields.is_empty() {
            output.push_str(" {");
            for (i, (k, v)) in self.fields.iter().enumerate() {
                if i > 0 {
                    output.push_str(", ");
                }
                output.push_str(&format!("{k}={v}"));
            }
            output.push('}');
        }

        output
    }
}

/// Escape a string for embedding in JSON output.
fn escape_json(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                escaped.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum level to emit.
    pub min_level: LogLevel,
    /// JSON output when true, compact lines when false.
    pub json_output: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            json_output: false,
        }
    }
}

impl LogConfig {
    /// Create the default configuration (compact output at `Info`).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum level to emit.
    #[must_use]
    pub fn level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Enable or disable JSON output.
    #[must_use]
    pub fn json_output(mut self, json: bool) -> Self {
        self.json_output = json;
        self
    }
}

/// Destination for rendered log lines.
pub trait LogSink: Send + Sync {
    /// Write one rendered line.
    fn write_line(&self, line: &str);
}

/// The default sink: one line per entry to stderr.
#[derive(Debug, Default)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn write_line(&self, line: &str) {
        // A failed write to stderr has nowhere better to be reported.
        let _ = writeln!(std::io::stderr(), "{line}");
    }
}

/// A sink that stores rendered lines, for assertions in tests.
#[derive(Debug, Default)]
pub struct CaptureSink {
    lines: Mutex<Vec<String>>,
}

impl CaptureSink {
    /// Create an empty capture sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the captured lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl LogSink for CaptureSink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// The logger: filters by level, renders per config, writes to the sink.
pub struct Logger {
    config: LogConfig,
    sink: Box<dyn LogSink>,
}

impl Logger {
    /// Create a logger writing to stderr.
    #[must_use]
    pub fn new(config: LogConfig) -> Self {
        Self::with_sink(config, Box::new(StderrSink))
    }

    /// Create a logger with an explicit sink.
    #[must_use]
    pub fn with_sink(config: LogConfig, sink: Box<dyn LogSink>) -> Self {
        Self { config, sink }
    }

    /// True if entries at `level` would be emitted.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.config.min_level
    }

    /// Emit a prepared entry.
    pub fn log(&self, entry: &LogEntry) {
        if !self.enabled(entry.level) {
            return;
        }
        let line = if self.config.json_output {
            entry.to_json()
        } else {
            entry.to_compact()
        };
        self.sink.write_line(&line);
    }

    /// Emit a message with fields at `Debug`.
    pub fn debug(&self, message: &str, fields: &[(&str, &str)]) {
        self.emit(LogLevel::Debug, message, fields);
    }

    /// Emit a message with fields at `Info`.
    pub fn info(&self, message: &str, fields: &[(&str, &str)]) {
        self.emit(LogLevel::Info, message, fields);
    }

    /// Emit a message with fields at `Warn`.
    pub fn warn(&self, message: &str, fields: &[(&str, &str)]) {
        self.emit(LogLevel::Warn, message, fields);
    }

    /// Emit a message with fields at `Error`.
    pub fn error(&self, message: &str, fields: &[(&str, &str)]) {
        self.emit(LogLevel::Error, message, fields);
    }

    fn emit(&self, level: LogLevel, message: &str, fields: &[(&str, &str)]) {
        if !self.enabled(level) {
            return;
        }
        let mut entry = LogEntry::new(level, message);
        for (key, value) in fields {
            entry = entry.field(*key, value);
        }
        self.log(&entry);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct SharedSink(Arc<CaptureSink>);

    impl LogSink for SharedSink {
        fn write_line(&self, line: &str) {
            self.0.write_line(line);
        }
    }

    fn capturing(config: LogConfig) -> (Logger, Arc<CaptureSink>) {
        let sink = Arc::new(CaptureSink::new());
        let logger = Logger::with_sink(config, Box::new(SharedSink(Arc::clone(&sink))));
        (logger, sink)
    }

    #[test]
    fn entries_below_the_minimum_level_are_dropped() {
        let (logger, sink) = capturing(LogConfig::new().level(LogLevel::Warn));
        logger.info("quiet", &[]);
        logger.warn("loud", &[]);

        assert_eq!(sink.lines(), vec!["[W] loud"]);
    }

    #[test]
    fn compact_output_includes_fields() {
        let (logger, sink) = capturing(LogConfig::new());
        logger.info("dispatched", &[("path", "/users/42"), ("status", "200")]);

        assert_eq!(
            sink.lines(),
            vec!["[I] dispatched {path=/users/42, status=200}"]
        );
    }

    #[test]
    fn json_output_escapes_message_content() {
        let (logger, sink) = capturing(LogConfig::new().json_output(true));
        logger.info("a \"quoted\" path", &[]);

        assert_eq!(
            sink.lines(),
            vec![r#"{"level":"info","message":"a \"quoted\" path"}"#]
        );
    }

    #[test]
    fn json_output_renders_fields_object() {
        let entry = LogEntry::new(LogLevel::Error, "failed")
            .target("switchboard_core::dispatch")
            .field("status", 500);
        assert_eq!(
            entry.to_json(),
            r#"{"level":"error","message":"failed","target":"switchboard_core::dispatch","fields":{"status":"500"}}"#
        );
    }

    #[test]
    fn fields_beyond_the_cap_are_dropped() {
        let mut entry = LogEntry::new(LogLevel::Info, "full");
        for i in 0..20 {
            entry = entry.field(format!("k{i}"), i);
        }
        assert_eq!(entry.fields.len(), 16);
    }

    #[test]
    fn control_characters_are_escaped() {
        assert_eq!(escape_json("a\nb"), "a\\nb");
        assert_eq!(escape_json("tab\there"), "tab\\there");
        assert_eq!(escape_json("\u{1}"), "\\u0001");
    }

    #[test]
    fn levels_order_by_severity() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Warn < LogLevel::Error);
    }
}
