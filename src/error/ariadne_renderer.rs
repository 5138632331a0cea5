use crate::{
    common::{Position, sources::SourceMap},
    error::diagnostic::{Diagnostic, DiagnosticRenderer, Label, Severity},
};

/// Renders diagnostics to stderr with the Ariadne backend.
#[derive(Debug, Default)]
pub struct AriadneRenderer;

impl AriadneRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticRenderer for AriadneRenderer {
    fn show(&self, diag: Diagnostic, sources: &SourceMap) -> std::io::Result<()> {
        let filename = diag.pos.filename.clone();
        let source = sources.get(&filename).ok_or(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("error renderer can't get source for {}", &*filename),
        ))?;
        let report = ariadne::Report::from(diag);
        report.eprint((filename, source.clone()))
    }
}

impl<'a> From<Diagnostic> for ariadne::Report<'a, Position> {
    fn from(diag: Diagnostic) -> Self {
        let kind = match diag.severity {
            Severity::Error => ariadne::ReportKind::Error,
            Severity::Warning => ariadne::ReportKind::Warning,
        };
        let mut builder = ariadne::Report::build(kind, diag.pos).with_message(diag.message);
        for label in diag.labels {
            builder = builder.with_label(label.into());
        }
        for note in diag.notes {
            builder = builder.with_note(note);
        }
        builder.finish()
    }
}

impl From<Label> for ariadne::Label<Position> {
    fn from(value: Label) -> Self {
        ariadne::Label::new(value.pos)
            .with_color(ariadne_color(value.color))
            .with_message(value.msg)
    }
}

fn ariadne_color(color: colored::Color) -> ariadne::Color {
    use colored::Color as C;
    match color {
        C::Black => ariadne::Color::Black,
        C::Red => ariadne::Color::Red,
        C::Green => ariadne::Color::Green,
        C::Yellow => ariadne::Color::Yellow,
        C::Blue => ariadne::Color::Blue,
        C::Magenta => ariadne::Color::Magenta,
        C::Cyan => ariadne::Color::Cyan,
        C::White => ariadne::Color::White,
        C::BrightBlack => ariadne::Color::BrightBlack,
        C::BrightRed => ariadne::Color::BrightRed,
        C::BrightGreen => ariadne::Color::BrightGreen,
        C::BrightYellow => ariadne::Color::BrightYellow,
        C::BrightBlue => ariadne::Color::BrightBlue,
        C::BrightMagenta => ariadne::Color::BrightMagenta,
        C::BrightCyan => ariadne::Color::BrightCyan,
        C::BrightWhite => ariadne::Color::BrightWhite,
        C::TrueColor { r, g, b } => ariadne::Color::Rgb(r, g, b),
    }
}
