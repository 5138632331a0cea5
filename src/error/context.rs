use std::sync::Arc;

use crate::{
    common::sources::SourceMap,
    error::{
        InternalError,
        diagnostic::{Diagnostic, DiagnosticRenderer},
    },
};

/// Diagnostics and sources collected while translating one problem.
#[derive(Debug)]
pub struct Context {
    renderer: Box<dyn DiagnosticRenderer>,
    diagnostics: Vec<Diagnostic>,
    sources: SourceMap,
}

impl Context {
    /// Create a new context.
    pub(crate) fn init(renderer: Box<dyn DiagnosticRenderer>) -> Self {
        Self {
            renderer,
            diagnostics: vec![],
            sources: SourceMap::new(),
        }
    }

    /// Print all diagnostics using the provided renderer and destroy the context.
    pub(crate) fn finish(self) -> Result<(), InternalError> {
        for diag in self.diagnostics {
            self.renderer
                .show(diag, &self.sources)
                .map_err(|_| InternalError::AnyMsg("failed to show diagnostic".into()))?
        }
        Ok(())
    }

    /// Add a diagnostic to this context.
    pub(crate) fn report(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    /// Whether any reported diagnostic is an error.
    #[cfg(test)]
    pub(crate) fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == super::diagnostic::Severity::Error)
    }

    /// Add source.
    pub(crate) fn add_source(&mut self, filename: Arc<str>, source: String) {
        self.sources.add(filename, source);
    }

    #[cfg(test)]
    pub(crate) fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
#[derive(Debug)]
struct Discard;

#[cfg(test)]
impl DiagnosticRenderer for Discard {
    fn show(&self, _diag: Diagnostic, _sources: &SourceMap) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl Context {
    /// A context that swallows everything it is asked to render.
    pub(crate) fn silent() -> Self {
        Self::init(Box::new(Discard))
    }
}
