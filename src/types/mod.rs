//! Abstract annotations and literal values, independent of any target language.
//!
//! [`translate`] lowers the parsed problem into a [`Problem`]. Unsupported
//! annotations are kept as explicit variants here; rejecting them is the job of
//! the storage mapper of the backend.

mod error;

use std::fmt::Display;

use crate::{
    common::Position,
    error::{InternalError, context::Context, diagnostic::Diagnostic},
    parser::ast as in_a,
};

/// An abstract type annotation.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Bool,
    Int,
    Float,
    Str,
    Sequence(Box<Type>),
    Tuple(Vec<Type>),
    /// Written as `Any` or left out.
    Any,
    Dict(Box<Type>, Box<Type>),
    Optional(Box<Type>),
    Union(Vec<Type>),
    /// `None` used as a type.
    NoneType,
    /// Any name that is not a known type.
    Named(String),
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Str => write!(f, "str"),
            Type::Sequence(elem) => write!(f, "List[{}]", elem),
            Type::Tuple(elems) => write!(f, "Tuple[{}]", join(elems)),
            Type::Any => write!(f, "Any"),
            Type::Dict(k, v) => write!(f, "Dict[{}, {}]", k, v),
            Type::Optional(tp) => write!(f, "Optional[{}]", tp),
            Type::Union(members) => write!(f, "Union[{}]", join(members)),
            Type::NoneType => write!(f, "None"),
            Type::Named(name) => write!(f, "{}", name),
        }
    }
}

fn join(types: &[Type]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A literal value appearing in an assertion.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i128),
    Float(f64),
    Str(String),
    None,
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    /// Short description used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Str(_) => "str",
            Literal::None => "None",
            Literal::List(_) => "list",
            Literal::Tuple(_) => "tuple",
            Literal::Dict(_) => "dict",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub tp: Type,
    pub pos: Position,
}

/// The function to be completed.
#[derive(Debug, Clone)]
pub struct Signature {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: Type,
    pub ret_pos: Position,
    pub description: String,
    pub pos: Position,
}

/// A literal together with where it was written.
#[derive(Debug, Clone)]
pub struct Operand {
    pub value: Literal,
    pub pos: Position,
}

/// One `candidate(args) == expected` check.
#[derive(Debug, Clone)]
pub struct Assertion {
    pub args: Vec<Operand>,
    pub expected: Operand,
    pub pos: Position,
}

#[derive(Debug, Clone)]
pub struct Problem {
    pub sig: Signature,
    pub assertions: Vec<Assertion>,
}

/// Lower a parsed problem.
///
/// Assertions calling something other than the candidate, or with the wrong
/// number of arguments, are reported and abort the problem.
pub fn translate(ctx: &mut Context, prog: in_a::Problem) -> Result<Problem, InternalError> {
    let sig = tr_signature(prog.func);

    let mut assertions = vec![];
    let mut failed = false;
    match prog.check {
        Some(check) => {
            let callees = [check.param.name_str(), sig.name.as_str()];
            for stmt in check.asserts {
                match tr_assert(&sig, &callees, stmt) {
                    Ok(assertion) => assertions.push(assertion),
                    Err(diag) => {
                        ctx.report(diag);
                        failed = true;
                    }
                }
            }
        }
        None => ctx.report(error::no_assertions(&sig.pos, &sig.name)),
    }

    if failed {
        return Err(InternalError::Aborted);
    }
    log::debug!(
        "lowered `{}` with {} parameters and {} assertions",
        sig.name,
        sig.params.len(),
        assertions.len()
    );
    Ok(Problem { sig, assertions })
}

fn tr_signature(func: in_a::FuncDecl) -> Signature {
    let params = func
        .params
        .into_iter()
        .map(|p| Param {
            name: p.name.data,
            tp: p.tp.map(tr_type).unwrap_or(Type::Any),
            pos: p.pos,
        })
        .collect();
    let (ret, ret_pos) = match func.ret_type {
        Some(node) => {
            let pos = node.pos.clone();
            (tr_type(node), pos)
        }
        None => (Type::Any, func.name.pos.clone()),
    };
    Signature {
        name: func.name.data,
        params,
        ret,
        ret_pos,
        description: func.doc.unwrap_or_default(),
        pos: func.pos,
    }
}

/// Map a written annotation to an abstract type.
pub fn tr_type(node: in_a::TypeNode) -> Type {
    match node.data {
        in_a::TypeData::Name(name) => match name.as_str() {
            "bool" => Type::Bool,
            "int" => Type::Int,
            "float" => Type::Float,
            "str" => Type::Str,
            "Any" => Type::Any,
            "list" | "List" => Type::Sequence(Box::new(Type::Any)),
            "tuple" | "Tuple" => Type::Tuple(vec![]),
            "dict" | "Dict" => Type::Dict(Box::new(Type::Any), Box::new(Type::Any)),
            _ => Type::Named(name),
        },
        in_a::TypeData::Subscript(name, args) => {
            let mut args: Vec<Type> = args.into_iter().map(tr_type).collect();
            match (name.as_str(), args.len()) {
                ("list" | "List", 1) => Type::Sequence(Box::new(args.remove(0))),
                ("tuple" | "Tuple", _) => {
                    // `Tuple[int, ...]` has the same shape as `Tuple[int]`.
                    if args.len() == 2 && args[1] == Type::Named("...".into()) {
                        args.truncate(1);
                    }
                    Type::Tuple(args)
                }
                ("dict" | "Dict", 2) => {
                    let v = args.remove(1);
                    let k = args.remove(0);
                    Type::Dict(Box::new(k), Box::new(v))
                }
                ("Optional", 1) => Type::Optional(Box::new(args.remove(0))),
                ("Union", _) => Type::Union(args),
                _ => Type::Named(format!("{}[{}]", name, join(&args))),
            }
        }
        in_a::TypeData::Union(members) => {
            let members: Vec<Type> = members.into_iter().map(tr_type).collect();
            match members.as_slice() {
                [tp, Type::NoneType] | [Type::NoneType, tp] => Type::Optional(Box::new(tp.clone())),
                _ => Type::Union(members),
            }
        }
        in_a::TypeData::NoneType => Type::NoneType,
        in_a::TypeData::Ellipsis => Type::Named("...".into()),
    }
}

fn tr_assert(
    sig: &Signature,
    callees: &[&str],
    stmt: in_a::AssertStmt,
) -> Result<Assertion, Diagnostic> {
    let call = stmt.call;
    if !callees.contains(&call.callee.name_str()) {
        return Err(error::unknown_callee(&call.callee, sig));
    }
    if call.args.len() != sig.params.len() {
        return Err(error::arity_mismatch(&call.pos, sig.params.len(), call.args.len()));
    }
    let args = call.args.into_iter().map(tr_operand).collect();
    Ok(Assertion {
        args,
        expected: tr_operand(stmt.expected),
        pos: stmt.pos,
    })
}

fn tr_operand(expr: in_a::ExprNode) -> Operand {
    Operand {
        value: tr_literal(expr.data),
        pos: expr.pos,
    }
}

fn tr_literal(data: in_a::ExprData) -> Literal {
    match data {
        in_a::ExprData::Bool(b) => Literal::Bool(b),
        in_a::ExprData::Int(n) => Literal::Int(n),
        in_a::ExprData::Float(x) => Literal::Float(x),
        in_a::ExprData::Str(s) => Literal::Str(s),
        in_a::ExprData::None => Literal::None,
        in_a::ExprData::List(items) => {
            Literal::List(items.into_iter().map(|e| tr_literal(e.data)).collect())
        }
        in_a::ExprData::Tuple(items) => {
            Literal::Tuple(items.into_iter().map(|e| tr_literal(e.data)).collect())
        }
        in_a::ExprData::Dict(entries) => Literal::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (tr_literal(k.data), tr_literal(v.data)))
                .collect(),
        ),
    }
}
