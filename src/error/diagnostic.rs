use colored::Color;

use crate::common::{Position, sources::SourceMap};

/// Severity of a diagnostic.
///
/// Any error aborts the translation of the current problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A problem found in a problem file, pointing at the offending text.
#[derive(Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub pos: Position,
}

impl Diagnostic {
    pub(crate) fn error(pos: &Position, message: impl Into<String>) -> Diagnostic {
        Self {
            severity: Severity::Error,
            message: message.into(),
            pos: pos.clone(),
            labels: vec![],
            notes: vec![],
        }
    }

    pub(crate) fn warning(pos: &Position, message: impl Into<String>) -> Diagnostic {
        Self {
            severity: Severity::Warning,
            ..Self::error(pos, message)
        }
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub(crate) fn with_note(mut self, note: impl Into<String>) -> Diagnostic {
        self.notes.push(note.into());
        self
    }
}

/// Label attached to a span of a diagnostic.
#[derive(Debug)]
pub struct Label {
    pub pos: Position,
    pub msg: String,
    pub color: Color,
}

impl Label {
    pub fn new(pos: &Position) -> Self {
        Label {
            pos: pos.clone(),
            msg: "<no message for this error>".into(),
            color: Color::Red,
        }
    }

    pub fn with_msg(mut self, msg: impl Into<String>) -> Self {
        self.msg = msg.into();
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Implementors of this trait can be used as diagnostic sinks.
pub trait DiagnosticRenderer: std::fmt::Debug {
    /// Show the diagnostic.
    fn show(&self, diag: Diagnostic, sources: &SourceMap) -> std::io::Result<()>;
}
