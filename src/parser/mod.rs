use std::{fs::read_to_string, path::Path, sync::Arc};

use crate::{
    common::{Position, PositionGenerator},
    error::{InternalError, ParsingError, context::Context},
};

pub mod ast;

lalrpop_util::lalrpop_mod!(pub parser, "/parser/parser.rs");

/// Read and parse a single problem file.
///
/// Returns `None` when the file has syntax errors; those are reported to `ctx`.
pub fn parse_file(ctx: &mut Context, path: &Path) -> Result<Option<ast::Problem>, InternalError> {
    let source = read_to_string(path).map_err(|e| {
        InternalError::AnyMsg(format!("should be able to open file {}: {}", path.display(), e))
    })?;
    let filename: Arc<str> = path
        .to_str()
        .ok_or(InternalError::AnyMsg(
            "can't parse filename into str".into(),
        ))?
        .into();
    Ok(parse_source(ctx, filename, source))
}

/// Parse problem text registered under `filename`.
pub fn parse_source(ctx: &mut Context, filename: Arc<str>, source: String) -> Option<ast::Problem> {
    let pg = Position::generator(filename.clone());
    let res = parser::FileParser::new()
        .parse(&pg, &source)
        .map_err(|err| parsing_error(&pg, err));
    ctx.add_source(filename, source);

    match res {
        Ok(problem) => Some(problem),
        Err(err) => {
            ctx.report(err.into());
            None
        }
    }
}

fn parsing_error<T: ToString>(
    pg: &PositionGenerator,
    err: lalrpop_util::ParseError<usize, T, ParsingError>,
) -> ParsingError {
    match err {
        lalrpop_util::ParseError::InvalidToken { location } => {
            let pos = pg.make(location, location);
            ParsingError::InvalidToken { pos }
        }
        lalrpop_util::ParseError::UnrecognizedEof { location, expected } => {
            let pos = pg.make(location, location);
            ParsingError::UnrecognizedEof { pos, expected }
        }
        lalrpop_util::ParseError::UnrecognizedToken { token, expected } => {
            let pos = pg.make(token.0, token.2);
            let token = token.1.to_string();
            ParsingError::UnrecognizedToken {
                pos,
                token,
                expected,
            }
        }
        lalrpop_util::ParseError::ExtraToken { token } => {
            let pos = pg.make(token.0, token.2);
            let token = token.1.to_string();
            ParsingError::ExtraToken { pos, token }
        }
        lalrpop_util::ParseError::User { error } => error,
    }
}

/// Decode a quoted Python string literal, quotes included.
pub fn unescape_string(s: &str) -> Result<String, String> {
    let raw = &s[1..s.len() - 1];

    let mut result = String::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => result.push('"'),
            Some('\'') => result.push('\''),
            Some('\\') => result.push('\\'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('0') => result.push('\0'),
            Some('x') => {
                let code: String = chars.by_ref().take(2).collect();
                let ch = u8::from_str_radix(&code, 16)
                    .map_err(|_| format!("bad hex escape: \\x{}", code))?;
                result.push(char::from(ch));
            }
            Some('u') => {
                let code: String = chars.by_ref().take(4).collect();
                let ch = u32::from_str_radix(&code, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or(format!("invalid unicode escape: \\u{}", code))?;
                result.push(ch);
            }
            Some(other) => return Err(format!("unknown escape: \\{}", other)),
            None => return Err("incomplete escape".into()),
        }
    }

    Ok(result)
}

/// Strip the triple quotes around a docstring, keeping the text verbatim.
pub fn strip_docstring(s: &str) -> String {
    s[3..s.len() - 3].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ast::{ExprData, TypeData};

    fn parse(src: &str) -> Option<ast::Problem> {
        let mut ctx = Context::silent();
        parse_source(&mut ctx, Arc::from("test.py"), src.to_string())
    }

    const MAX_PAIR: &str = r#"
from typing import List

def max_pair(a: int, b: int) -> int:
    """ Return the larger of a and b.
    >>> max_pair(1, 2)
    2
    """

def check(candidate):
    assert candidate(3, 5) == 5  # the usual case
    assert candidate(-1, -7) == -1
"#;

    #[test]
    fn parses_signature_and_asserts() {
        let problem = parse(MAX_PAIR).unwrap();
        assert_eq!(problem.func.name.name_str(), "max_pair");
        assert_eq!(problem.func.params.len(), 2);
        assert!(problem.func.doc.as_deref().unwrap().contains(">>> max_pair(1, 2)"));
        let check = problem.check.unwrap();
        assert_eq!(check.param.name_str(), "candidate");
        assert_eq!(check.asserts.len(), 2);
        assert!(matches!(check.asserts[1].expected.data, ExprData::Int(-1)));
    }

    #[test]
    fn bare_and_negated_asserts_expect_booleans() {
        let src = r#"
def is_even(n: int) -> bool:
    'Tell whether n is even.'

def check(candidate):
    assert candidate(2)
    assert not candidate(3)
"#;
        let check = parse(src).unwrap().check.unwrap();
        assert!(matches!(check.asserts[0].expected.data, ExprData::Bool(true)));
        assert!(matches!(check.asserts[1].expected.data, ExprData::Bool(false)));
    }

    #[test]
    fn parses_container_literals_and_types() {
        let src = r#"
def pairs(xs: List[int], t: Tuple[int, ...], o: Optional[str] | None) -> Dict[str, int]:
    pass

def check(candidate):
    assert candidate([1, 2,], (3,), "a\nb") == {"x": 1}
    assert candidate([], (), 'it''s') == (1.5, -2.0e3)
"#;
        let problem = parse(src).unwrap();
        let params = &problem.func.params;
        assert!(matches!(&params[0].tp.as_ref().unwrap().data, TypeData::Subscript(n, a) if n == "List" && a.len() == 1));
        assert!(matches!(&params[2].tp.as_ref().unwrap().data, TypeData::Union(m) if m.len() == 2));
        let asserts = problem.check.unwrap().asserts;
        match &asserts[0].call.args[..] {
            [list, tuple, s] => {
                assert!(matches!(&list.data, ExprData::List(v) if v.len() == 2));
                assert!(matches!(&tuple.data, ExprData::Tuple(v) if v.len() == 1));
                assert!(matches!(&s.data, ExprData::Str(s) if s == "a\nb"));
            }
            other => panic!("unexpected args {:?}", other),
        }
        assert!(matches!(&asserts[0].expected.data, ExprData::Dict(e) if e.len() == 1));
        assert!(matches!(&asserts[1].call.args[2].data, ExprData::Str(s) if s == "its"));
        assert!(matches!(&asserts[1].expected.data, ExprData::Tuple(v) if v.len() == 2));
    }

    #[test]
    fn reports_syntax_errors() {
        let mut ctx = Context::silent();
        let res = parse_source(
            &mut ctx,
            Arc::from("bad.py"),
            "def f(a: int) -> int:\n    pass\n\ndef check(c):\n    assert c(1) < 2\n".into(),
        );
        assert!(res.is_none());
        assert!(ctx.has_errors());
    }

    #[test]
    fn unescapes_python_strings() {
        assert_eq!(unescape_string(r#""a\tb\\c\"""#).unwrap(), "a\tb\\c\"");
        assert_eq!(unescape_string(r"'\x41é'").unwrap(), "Aé");
        assert!(unescape_string(r#""\q""#).is_err());
    }
}
