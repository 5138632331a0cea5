//! COBOL backend.
//!
//! Every value lives in declared, fixed-size storage. Sequences become a
//! length field plus an `occurs ... depending on` table, tuples share that shape,
//! and every table index is 1-based.

pub mod ast;
mod emit;
pub mod env;
mod harness;
mod literal;
mod prompt;
mod storage;

use crate::{
    backend::{Backend, Role},
    common::Position,
    error::TranslationError,
    types::{Literal, Problem, Signature, Type},
};
use ast::{DataItem, Operand, Passing};
use env::Session;

/// Name of the program running the assertions.
pub const HARNESS_PROGRAM: &str = "test-prog";

/// How arguments reach the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CallConvention {
    /// Every argument by reference.
    Reference,
    /// Scalars by content, tables by reference.
    Content,
}

/// How the harness reports assertion outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Dialect {
    /// `pass` or `fail` on stdout, one line per assertion.
    Display,
    /// Number of failed assertions in `return-code`.
    ReturnCode,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of elements of any table.
    pub capacity: usize,
    pub string_width: usize,
    pub int_digits: u8,
    pub float_int_digits: u8,
    pub float_frac_digits: u8,
    pub convention: CallConvention,
    pub dialect: Dialect,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            string_width: 256,
            int_digits: 18,
            float_int_digits: 9,
            float_frac_digits: 9,
            convention: CallConvention::Reference,
            dialect: Dialect::Display,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Cobol {
    config: Config,
}

impl Cobol {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// How `item` is passed to the candidate.
    fn passing(&self, item: &DataItem) -> Passing {
        match self.config.convention {
            _ if item.is_sequence() => Passing::Reference,
            CallConvention::Reference => Passing::Reference,
            CallConvention::Content => Passing::Content,
        }
    }
}

impl Backend for Cobol {
    type Session = Session;
    type Item = DataItem;
    type Operand = Operand;

    fn extension(&self) -> &'static str {
        "cbl"
    }

    fn new_session(&self) -> Session {
        Session::new()
    }

    fn map_type(
        &self,
        session: &mut Session,
        tp: &Type,
        role: Role,
        pos: &Position,
    ) -> Result<DataItem, TranslationError> {
        self.alloc(session, tp, role, pos)
    }

    fn render_literal(
        &self,
        session: &mut Session,
        lit: &Literal,
        tp: &Type,
        role: Role,
        pos: &Position,
    ) -> Result<Operand, TranslationError> {
        self.render(session, lit, tp, role, pos)
    }

    fn assemble_prompt(
        &self,
        session: &mut Session,
        sig: &Signature,
    ) -> Result<String, TranslationError> {
        self.prompt(session, sig)
    }

    fn assemble_harness(
        &self,
        session: &mut Session,
        problem: &Problem,
    ) -> Result<String, TranslationError> {
        self.harness(session, problem)
    }
}

/// COBOL reserved words; a candidate may not take one as its program-id.
const RESERVED: &[&str] = &[
    "accept", "access", "add", "address", "advancing", "after", "all", "allocate", "alphabet",
    "alphabetic", "alphanumeric", "also", "alter", "alternate", "and", "any", "are", "area",
    "areas", "ascending", "assign", "at", "author", "before", "binary", "blank", "block", "bottom",
    "by", "call", "cancel", "cd", "cf", "ch", "character", "characters", "class", "close", "code",
    "collating", "column", "comma", "common", "communication", "compute", "configuration",
    "contains", "content", "continue", "control", "copy", "corr", "corresponding", "count",
    "currency", "data", "date", "day", "delete", "delimited", "delimiter", "depending",
    "descending", "destination", "detail", "disable", "display", "divide", "division", "down",
    "duplicates", "dynamic", "else", "enable", "end", "entry", "environment", "equal", "error",
    "evaluate", "every", "exception", "exit", "extend", "external", "false", "fd", "file", "filler",
    "final", "first", "footing", "for", "free", "from", "function", "generate", "giving", "global",
    "go", "goback", "greater", "group", "heading", "high-values", "identification", "if", "in",
    "index", "indicate", "initial", "initialize", "initiate", "input", "inspect", "installation",
    "into", "invalid", "is", "just", "justified", "key", "label", "last", "leading", "left",
    "length", "less", "limit", "limits", "linage", "line", "lines", "linkage", "lock", "low-values",
    "memory", "merge", "message", "mode", "move", "multiple", "multiply", "native", "negative",
    "next", "no", "not", "null", "number", "numeric", "object", "occurs", "of", "off", "omitted",
    "on", "open", "optional", "or", "order", "organization", "other", "output", "overflow",
    "padding", "page", "perform", "pointer", "position", "positive", "present", "printing",
    "procedure", "program", "purge", "queue", "quote", "quotes", "random", "read", "receive",
    "record", "records", "redefines", "reel", "reference", "relative", "release", "remainder",
    "removal", "renames", "replace", "replacing", "report", "reserve", "reset", "return",
    "returning", "rewind", "rewrite", "right", "round", "rounded", "run", "same", "screen",
    "search", "section", "security", "segment", "select", "send", "sentence", "separate",
    "sequence", "sequential", "set", "sign", "size", "sort", "source", "space", "spaces",
    "standard", "start", "status", "stop", "string", "sum", "suppress", "symbolic", "sync", "table",
    "tallying", "tape", "terminal", "terminate", "test", "text", "than", "then", "through", "thru",
    "time", "times", "to", "top", "trailing", "true", "type", "unit", "unstring", "until", "up",
    "upon", "usage", "use", "using", "value", "values", "varying", "when", "with", "words", "write",
    "zero", "zeroes", "zeros",
];

/// The program-id used for the candidate `name`.
///
/// Underscores become hyphens and the result is a valid COBOL word that
/// never clashes with the harness program.
pub fn program_name(name: &str) -> String {
    let word: String = name
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let mut word = word.trim_matches('-').to_string();
    word.truncate(env::MAX_WORD - 3);
    let word = word.trim_end_matches('-').to_string();
    if word.is_empty() {
        return "candidate".into();
    }
    if RESERVED.contains(&word.as_str())
        || word == HARNESS_PROGRAM
        || word.chars().all(|c| c.is_ascii_digit() || c == '-')
    {
        return format!("{}-fn", word);
    }
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_names_are_cobol_words() {
        assert_eq!(program_name("max_pair"), "max-pair");
        assert_eq!(program_name("__private_helper_"), "private-helper");
        assert_eq!(program_name("sort"), "sort-fn");
        for word in ["common", "length", "sign", "value", "first", "last", "next", "file", "order"] {
            assert_eq!(program_name(word), format!("{}-fn", word));
        }
        assert_eq!(program_name("high_values"), "high-values-fn");
        assert_eq!(program_name("test_prog"), "test-prog-fn");
        assert_eq!(program_name("_"), "candidate");
        assert!(program_name(&"x".repeat(64)).len() <= env::MAX_WORD);
    }
}
