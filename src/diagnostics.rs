//! # Diagnostics Module
//!
//! Non-fatal problems found while resolving records or rendering route stubs.
//! Generation continues past every diagnostic; callers decide whether an
//! error-level diagnostic should fail the run.
//!
//! ```rust
//! use schemagen::diagnostics::{has_errors, Diagnostic, Severity};
//!
//! let found = vec![Diagnostic::new(
//!     "record:Account",
//!     Severity::Warning,
//!     "enum_value",
//!     "`x` is not a numeric literal",
//! )];
//! assert!(!has_errors(&found));
//! ```

use std::fmt;

/// Severity level for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Part of the output is missing or wrong
    Error,
    /// Output was produced with a fallback
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// A problem found during generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Where it occurred (e.g. "record:Account", "route:GET /accounts/{id}")
    pub location: String,
    pub severity: Severity,
    /// Short machine-readable category (e.g. "route_render", "empty_name")
    pub kind: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(
        location: impl Into<String>,
        severity: Severity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            location: location.into(),
            severity,
            kind: kind.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.severity, self.kind, self.location, self.message
        )
    }
}

/// True when at least one diagnostic is error-level.
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(|d| d.severity == Severity::Error)
}

/// Print diagnostics grouped by severity.
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        println!("✅ No diagnostics");
        return;
    }

    let count = |severity: Severity| diagnostics.iter().filter(|d| d.severity == severity).count();
    println!(
        "\n📋 Generation diagnostics: {} error(s), {} warning(s), {} info(s)\n",
        count(Severity::Error),
        count(Severity::Warning),
        count(Severity::Info)
    );

    for (severity, heading) in [
        (Severity::Error, "❌ Errors:"),
        (Severity::Warning, "⚠️  Warnings:"),
        (Severity::Info, "ℹ️  Info:"),
    ] {
        let group: Vec<_> = diagnostics.iter().filter(|d| d.severity == severity).collect();
        if group.is_empty() {
            continue;
        }
        println!("{heading}");
        for diagnostic in group {
            println!("   [{}] {}", diagnostic.kind, diagnostic.location);
            println!("      {}", diagnostic.message);
            if let Some(suggestion) = &diagnostic.suggestion {
                println!("      💡 Suggestion: {suggestion}");
            }
        }
        println!();
    }
}
