//! The seam between a lowered problem and a fixed-format target language.

use std::fmt::Display;

use crate::{
    common::Position,
    error::TranslationError,
    types::{Literal, Problem, Signature, Type},
};

/// Role a generated storage item plays in the assembled program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    Param,
    Return,
    Expected,
}

impl Usage {
    pub fn prefix(self) -> &'static str {
        match self {
            Usage::Param => "arg",
            Usage::Return => "ret",
            Usage::Expected => "exp",
        }
    }
}

/// Part of the program an item is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The candidate's own signature.
    Signature,
    /// The assertion with the given 1-based index.
    Case(usize),
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Signature => write!(f, "sig"),
            Scope::Case(k) => write!(f, "t{}", k),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Role {
    pub usage: Usage,
    pub scope: Scope,
}

impl Role {
    pub fn new(usage: Usage, scope: Scope) -> Self {
        Self { usage, scope }
    }
}

/// Both halves of a translated problem.
///
/// The candidate's body goes between `prompt` and `tests`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub prompt: String,
    pub tests: String,
}

impl Translation {
    /// The compilable program with an empty candidate body.
    pub fn program(&self) -> String {
        format!("{}{}", self.prompt, self.tests)
    }
}

/// A target language together with its storage and calling policies.
///
/// All per-problem state lives in [`Backend::Session`], so one backend value
/// can translate any number of problems without leaking names between them.
pub trait Backend {
    type Session;
    type Item;
    type Operand;

    /// File extension of emitted sources.
    fn extension(&self) -> &'static str;

    fn new_session(&self) -> Self::Session;

    /// Allocate fresh storage able to hold values of `tp`.
    fn map_type(
        &self,
        session: &mut Self::Session,
        tp: &Type,
        role: Role,
        pos: &Position,
    ) -> Result<Self::Item, TranslationError>;

    /// Render `lit`, which must be a value of `tp`.
    fn render_literal(
        &self,
        session: &mut Self::Session,
        lit: &Literal,
        tp: &Type,
        role: Role,
        pos: &Position,
    ) -> Result<Self::Operand, TranslationError>;

    fn assemble_prompt(
        &self,
        session: &mut Self::Session,
        sig: &Signature,
    ) -> Result<String, TranslationError>;

    fn assemble_harness(
        &self,
        session: &mut Self::Session,
        problem: &Problem,
    ) -> Result<String, TranslationError>;

    /// Translate one problem in a fresh session.
    fn translate(&self, problem: &Problem) -> Result<Translation, TranslationError> {
        let mut session = self.new_session();
        let prompt = self.assemble_prompt(&mut session, &problem.sig)?;
        let tests = self.assemble_harness(&mut session, problem)?;
        Ok(Translation { prompt, tests })
    }
}
