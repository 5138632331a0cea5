//! This ast is the direct result of parsing a problem file.
//!
//! Nothing here is checked yet: unknown type names, dictionaries and
//! mismatched literals are all representable and get rejected later.

// ==== Imports ================================================================

use crate::common::{Ident, Position};

// ==== Problem ================================================================

/// A problem file: the function to be completed and the tests it must pass.
///
/// ```py
/// def max_pair(a: int, b: int) -> int:
///     """Return the larger of a and b."""
///
/// def check(candidate):
///     assert candidate(3, 5) == 5
/// ```
#[derive(Debug)]
pub struct Problem {
    pub func: FuncDecl,
    pub check: Option<CheckDecl>,
    pub pos: Position,
}

/// Signature and docstring of the function under test.
#[derive(Debug)]
pub struct FuncDecl {
    pub name: Ident,
    pub params: Vec<Param>,
    pub ret_type: Option<TypeNode>,
    pub doc: Option<String>,
    pub pos: Position,
}

#[derive(Debug)]
pub struct Param {
    pub name: Ident,
    pub tp: Option<TypeNode>,
    pub pos: Position,
}

/// The `check(candidate)` function holding the assertions.
#[derive(Debug)]
pub struct CheckDecl {
    pub name: Ident,
    pub param: Ident,
    pub asserts: Vec<AssertStmt>,
    pub pos: Position,
}

/// `assert call == expected`.
///
/// `assert call` and `assert not call` arrive here with `expected`
/// already set to `True` and `False`.
#[derive(Debug)]
pub struct AssertStmt {
    pub call: CallExpr,
    pub expected: ExprNode,
    pub pos: Position,
}

#[derive(Debug)]
pub struct CallExpr {
    pub callee: Ident,
    pub args: Vec<ExprNode>,
    pub pos: Position,
}

// ==== Types ==================================================================

#[derive(Debug)]
pub struct TypeNode {
    pub data: TypeData,
    pub pos: Position,
}

#[derive(Debug)]
pub enum TypeData {
    /// `int`, `str`, `Any`, ...
    Name(String),
    /// `List[int]`, `Dict[str, int]`, ...
    Subscript(String, Vec<TypeNode>),
    /// `A | B`
    Union(Vec<TypeNode>),
    /// `None` used as a type.
    NoneType,
    /// `...` inside `Tuple[int, ...]`.
    Ellipsis,
}

// ==== Expressions ============================================================

#[derive(Debug, Clone)]
pub struct ExprNode {
    pub data: ExprData,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub enum ExprData {
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    None,
    List(Vec<ExprNode>),
    Tuple(Vec<ExprNode>),
    Dict(Vec<(ExprNode, ExprNode)>),
}
