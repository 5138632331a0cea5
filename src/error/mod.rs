use colored::{Color, Colorize};

use crate::{
    common::Position,
    error::diagnostic::{Diagnostic, Label},
};

pub mod ariadne_renderer;
pub mod context;
pub mod diagnostic;

/// Failures that stop the tool itself rather than a single problem.
#[derive(Debug, thiserror::Error)]
pub enum InternalError {
    /// Diagnostics were reported for the current problem.
    #[error("translation aborted due to previous errors")]
    Aborted,
    #[error("{0}")]
    AnyMsg(String),
    #[error("internal invariant violated: {0}")]
    Invariant(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug)]
pub enum ParsingError {
    InvalidToken {
        pos: Position,
    },
    UnrecognizedEof {
        pos: Position,
        expected: Vec<String>,
    },
    UnrecognizedToken {
        pos: Position,
        token: String,
        expected: Vec<String>,
    },
    ExtraToken {
        pos: Position,
        token: String,
    },
    /// Raised from grammar actions, e.g. a bad escape in a string literal.
    User {
        pos: Position,
        msg: String,
    },
}

impl From<ParsingError> for Diagnostic {
    fn from(value: ParsingError) -> Self {
        match value {
            ParsingError::InvalidToken { pos } => Diagnostic::error(&pos, "invalid token")
                .with_label(Label::new(&pos).with_msg("this text is not understood")),
            ParsingError::UnrecognizedEof { pos, expected } => {
                Diagnostic::error(&pos, "unexpected end of file")
                    .with_label(Label::new(&pos).with_msg("the problem ends here"))
                    .with_note(format!("Expected one of:\n{}", expected.join("\n")))
            }
            ParsingError::UnrecognizedToken {
                pos,
                token,
                expected,
            } => Diagnostic::error(&pos, "unexpected token")
                .with_label(
                    Label::new(&pos).with_msg(format!("unexpected {}", token.bright_red())),
                )
                .with_note(format!("Expected one of:\n{}", expected.join("\n"))),
            ParsingError::ExtraToken { pos, token } => Diagnostic::error(&pos, "extra token")
                .with_label(
                    Label::new(&pos).with_msg(format!("unexpected {}", token.bright_red())),
                ),
            ParsingError::User { pos, msg } => {
                Diagnostic::error(&pos, "malformed literal").with_label(Label::new(&pos).with_msg(msg))
            }
        }
    }
}

/// Reasons a single problem cannot be translated.
///
/// The first group is reported to the user; [`TranslationError::is_internal`] marks
/// the ones that can only come from a bug in the generator.
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationError {
    UnsupportedType {
        pos: Position,
        construct: String,
    },
    UnsupportedLiteral {
        pos: Position,
        reason: String,
    },
    SequenceTooLong {
        pos: Position,
        len: usize,
        capacity: usize,
    },
    MalformedAssertion {
        pos: Position,
        reason: String,
    },
    NamingCollision {
        name: String,
    },
    NameTooLong {
        name: String,
    },
}

impl TranslationError {
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            TranslationError::NamingCollision { .. } | TranslationError::NameTooLong { .. }
        )
    }
}

impl From<TranslationError> for InternalError {
    fn from(value: TranslationError) -> Self {
        match value {
            TranslationError::NamingCollision { name } => {
                InternalError::Invariant(format!("generated name `{}` is not unique", name))
            }
            TranslationError::NameTooLong { name } => InternalError::Invariant(format!(
                "generated name `{}` does not fit a COBOL word",
                name
            )),
            _ => InternalError::Aborted,
        }
    }
}

impl From<TranslationError> for Diagnostic {
    fn from(value: TranslationError) -> Self {
        match value {
            TranslationError::UnsupportedType { pos, construct } => {
                Diagnostic::error(&pos, "unsupported type").with_label(
                    Label::new(&pos)
                        .with_msg(format!("{} has no fixed-size representation", construct)),
                )
            }
            TranslationError::UnsupportedLiteral { pos, reason } => {
                Diagnostic::error(&pos, "unsupported literal")
                    .with_label(Label::new(&pos).with_msg(reason))
            }
            TranslationError::SequenceTooLong { pos, len, capacity } => {
                Diagnostic::error(&pos, "sequence literal too long")
                    .with_label(
                        Label::new(&pos).with_msg(format!("this literal has {} elements", len)),
                    )
                    .with_note(format!(
                        "tables hold at most {} elements; raise --capacity to translate it",
                        capacity
                    ))
            }
            TranslationError::MalformedAssertion { pos, reason } => {
                Diagnostic::error(&pos, "malformed assertion").with_label(
                    Label::new(&pos)
                        .with_msg(reason)
                        .with_color(Color::Yellow),
                )
            }
            TranslationError::NamingCollision { name } | TranslationError::NameTooLong { name } => {
                Diagnostic::error(&Position::nowhere(), format!("internal error at {}", name))
            }
        }
    }
}
