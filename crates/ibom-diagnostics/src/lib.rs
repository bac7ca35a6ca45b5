//! Diagnostics collected while building a document.
//!
//! Nothing in the pipeline aborts on a recoverable defect (an unsupported
//! shape, an unparseable value, a glyph missing from the font). Each stage
//! records a [`Diagnostic`] instead, and the caller surfaces the whole set
//! once at the end of the build with [`Diagnostics::emit`].

use std::{collections::HashSet, fmt::Display, ops::Deref};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Pipeline stage that produced the message (`geometry`, `bom`, `font`, ...)
    pub source: &'static str,
    pub body: String,
}

impl Diagnostic {
    pub fn info(source: &'static str, body: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            source,
            body: body.into(),
        }
    }

    pub fn warning(source: &'static str, body: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            source,
            body: body.into(),
        }
    }

    pub fn error(source: &'static str, body: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            source,
            body: body.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.source, self.body)
    }
}

/// Ordered, de-duplicated collection of diagnostics.
///
/// Pushing a diagnostic identical to one already recorded is a no-op, so a
/// defect shared by many components is reported once.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
    seen: HashSet<Diagnostic>,
}

impl Deref for Diagnostics {
    type Target = Vec<Diagnostic>;
    fn deref(&self) -> &Self::Target {
        &self.diagnostics
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        let mut out = Diagnostics::default();
        out.extend(diagnostics);
        out
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic unless an identical one is already present.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if self.seen.insert(diagnostic.clone()) {
            self.diagnostics.push(diagnostic);
        }
    }

    pub fn info(&mut self, source: &'static str, body: impl Into<String>) {
        self.push(Diagnostic::info(source, body));
    }

    pub fn warn(&mut self, source: &'static str, body: impl Into<String>) {
        self.push(Diagnostic::warning(source, body));
    }

    pub fn error(&mut self, source: &'static str, body: impl Into<String>) {
        self.push(Diagnostic::error(source, body));
    }

    pub fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, diagnostics: I) {
        for diagnostic in diagnostics {
            self.push(diagnostic);
        }
    }

    pub fn errors(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| matches!(diag.severity, Severity::Error))
            .cloned()
            .collect()
    }

    pub fn warnings(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| matches!(diag.severity, Severity::Warning))
            .cloned()
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|diag| diag.is_error())
    }

    /// Forward every recorded diagnostic to the `log` facade.
    pub fn emit(&self) {
        for diag in &self.diagnostics {
            match diag.severity {
                Severity::Info => log::info!("{}: {}", diag.source, diag.body),
                Severity::Warning => log::warn!("{}: {}", diag.source, diag.body),
                Severity::Error => log::error!("{}: {}", diag.source, diag.body),
            }
        }
    }
}

/// A stage output paired with the diagnostics produced while computing it.
#[derive(Debug)]
pub struct WithDiagnostics<T> {
    pub diagnostics: Diagnostics,
    pub output: Option<T>,
}

impl<T> Default for WithDiagnostics<T> {
    fn default() -> Self {
        Self {
            diagnostics: Diagnostics::default(),
            output: None,
        }
    }
}

impl<T> WithDiagnostics<T> {
    pub fn success(output: T) -> Self {
        Self {
            diagnostics: Diagnostics::default(),
            output: Some(output),
        }
    }

    pub fn new(output: Option<T>, diagnostics: Diagnostics) -> Self {
        Self {
            diagnostics,
            output,
        }
    }

    pub fn push(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    /// `true` if there is an output and no error-level diagnostic.
    pub fn is_success(&self) -> bool {
        self.output.is_some() && !self.diagnostics.has_errors()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WithDiagnostics<U> {
        WithDiagnostics {
            diagnostics: self.diagnostics,
            output: self.output.map(f),
        }
    }

    pub fn output_result(self) -> Result<T, Diagnostics> {
        self.into()
    }

    pub fn unpack(self) -> (Option<T>, Diagnostics) {
        (self.output, self.diagnostics)
    }
}

impl<T> From<WithDiagnostics<T>> for Result<T, Diagnostics> {
    fn from(eval: WithDiagnostics<T>) -> Self {
        match eval.output {
            Some(output) if !eval.diagnostics.has_errors() => Ok(output),
            _ => Err(eval.diagnostics),
        }
    }
}
