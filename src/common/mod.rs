//! Syntax utilities shared by every pass.
use std::fmt::Display;

pub mod sources;

mod position;

pub use position::{Position, PositionGenerator};

/// A name together with where it was written.
#[derive(Debug, Clone)]
pub struct Ident {
    pub data: String,
    pub pos: Position,
}

impl Ident {
    pub fn name_str(&self) -> &str {
        &self.data
    }
}

impl Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.data)
    }
}
