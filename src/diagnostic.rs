//! Diagnostic sinks.
//!
//! The assembler never stops on bad input; it reports through a
//! [`DiagnosticSink`] and keeps going so that one pass surfaces every problem
//! in a resource. Callers decide success by looking at the error count.
//!
//! Sinks take `&self` and must be `Sync`, so one sink can be shared by
//! resources assembled on several threads.

use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{error, warn};

use crate::model::{SourceLocation, UNKNOWN_FILE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One recorded problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: String,
    pub line: usize,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}: {}",
            self.location, self.line, self.severity, self.message
        )
    }
}

/// Receiver for warnings and errors. Both calls are fire-and-forget.
pub trait DiagnosticSink: Send + Sync {
    fn warning(&self, location: &str, line: usize, message: &str);
    fn error(&self, location: &str, line: usize, message: &str);

    /// Errors recorded so far.
    fn error_count(&self) -> usize;

    /// Convenience for callers holding an optional [`SourceLocation`].
    fn report(&self, severity: Severity, at: Option<&SourceLocation>, message: &str) {
        let (file, line) = match at {
            Some(loc) => (loc.file.as_str(), loc.line),
            None => (UNKNOWN_FILE, 0),
        };
        match severity {
            Severity::Warning => self.warning(file, line, message),
            Severity::Error => self.error(file, line, message),
        }
    }
}

/// Forwards to the `log` facade and keeps running totals.
#[derive(Debug, Default)]
pub struct LogSink {
    errors: AtomicUsize,
    warnings: AtomicUsize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }
}

impl DiagnosticSink for LogSink {
    fn warning(&self, location: &str, line: usize, message: &str) {
        self.warnings.fetch_add(1, Ordering::Relaxed);
        warn!("{location}:{line}: {message}");
    }

    fn error(&self, location: &str, line: usize, message: &str) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        error!("{location}:{line}: {message}");
    }

    fn error_count(&self) -> usize {
        LogSink::error_count(self)
    }
}

/// Keeps every diagnostic in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, severity: Severity, location: &str, line: usize, message: &str) {
        let diagnostic = Diagnostic {
            severity,
            location: location.to_string(),
            line,
            message: message.to_string(),
        };
        // a poisoned lock still holds valid entries
        match self.entries.lock() {
            Ok(mut entries) => entries.push(diagnostic),
            Err(poisoned) => poisoned.into_inner().push(diagnostic),
        }
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.with_severity(Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics().is_empty()
    }

    fn with_severity(&self, severity: Severity) -> Vec<Diagnostic> {
        self.diagnostics()
            .into_iter()
            .filter(|d| d.severity == severity)
            .collect()
    }
}

impl DiagnosticSink for CollectingSink {
    fn warning(&self, location: &str, line: usize, message: &str) {
        self.push(Severity::Warning, location, line, message);
    }

    fn error(&self, location: &str, line: usize, message: &str) {
        self.push(Severity::Error, location, line, message);
    }

    fn error_count(&self) -> usize {
        CollectingSink::error_count(self)
    }
}
