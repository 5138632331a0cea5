use crate::{
    common::{Ident, Position},
    error::diagnostic::{Diagnostic, Label},
    types::Signature,
};

pub(crate) fn no_assertions(pos: &Position, name: &str) -> Diagnostic {
    Diagnostic::warning(pos, "no assertions").with_label(
        Label::new(pos)
            .with_msg(format!("`{}` has no check function, the harness will be empty", name))
            .with_color(colored::Color::Yellow),
    )
}

pub(crate) fn unknown_callee(callee: &Ident, sig: &Signature) -> Diagnostic {
    Diagnostic::error(&callee.pos, "unknown callee")
        .with_label(Label::new(&callee.pos).with_msg(format!("`{}` is not the candidate", callee)))
        .with_note(format!(
            "assertions may only call the check parameter or `{}`",
            sig.name
        ))
}

pub(crate) fn arity_mismatch(pos: &Position, exp: usize, got: usize) -> Diagnostic {
    Diagnostic::error(pos, "wrong number of arguments").with_label(
        Label::new(pos).with_msg(format!("expected {} arguments, but got {}", exp, got)),
    )
}
