use crate::{
    backend::{Backend, Role},
    cobol::{
        Cobol,
        ast::{Operand, Stmt},
        env::Session,
    },
    common::Position,
    error::TranslationError,
    types::{Literal, Type},
};

impl Cobol {
    /// Render `lit` as a value of `tp`.
    ///
    /// Scalars come back inline. Sequences and tuples get a fresh item in the
    /// session's storage, populated by statements queued for initialisation.
    pub(super) fn render(
        &self,
        session: &mut Session,
        lit: &Literal,
        tp: &Type,
        role: Role,
        pos: &Position,
    ) -> Result<Operand, TranslationError> {
        let (items, elem_tp) = match (tp, lit) {
            (Type::Sequence(elem), Literal::List(items)) => (items, elem.as_ref()),
            (Type::Tuple(elems), Literal::Tuple(items)) => match elems.first() {
                Some(elem) => (items, elem),
                None => {
                    // let the mapper name the problem
                    self.map_type(session, tp, role, pos)?;
                    return Err(mismatch(pos, tp, lit));
                }
            },
            (Type::Sequence(_) | Type::Tuple(_), _) => return Err(mismatch(pos, tp, lit)),
            _ => return self.render_scalar(lit, tp, pos).map(Operand::Inline),
        };

        if items.len() > self.config.capacity {
            return Err(TranslationError::SequenceTooLong {
                pos: pos.clone(),
                len: items.len(),
                capacity: self.config.capacity,
            });
        }
        let item = self.map_type(session, tp, role, pos)?;
        let values = items
            .iter()
            .map(|elem| self.render_scalar(elem, elem_tp, pos))
            .collect::<Result<Vec<_>, _>>()?;

        if !values.is_empty() {
            session.push_init(Stmt::Comment(format!("initialisation for {}", item.name)));
            session.push_init(Stmt::Move {
                from: values.len().to_string(),
                to: item.len_name(),
            });
            for (i, value) in values.into_iter().enumerate() {
                session.push_init(Stmt::Move {
                    from: value,
                    to: item.elem_at(i + 1),
                });
            }
        }
        session.declare(item.clone());
        Ok(Operand::Item(item))
    }

    /// Literal text of a scalar value.
    pub(super) fn render_scalar(
        &self,
        lit: &Literal,
        tp: &Type,
        pos: &Position,
    ) -> Result<String, TranslationError> {
        // reject unsupported annotations before looking at the value
        self.scalar_pic(tp, pos)?;
        let config = &self.config;
        match (tp, lit) {
            (Type::Bool, Literal::Bool(b)) => Ok(if *b { "1" } else { "0" }.into()),
            (Type::Int, Literal::Int(n)) => {
                let text = n.to_string();
                if n.unsigned_abs().to_string().len() > config.int_digits as usize {
                    return Err(bad_literal(
                        pos,
                        format!("{} does not fit in {} digits", text, config.int_digits),
                    ));
                }
                Ok(text)
            }
            (Type::Float, Literal::Int(n)) => self.fixed_point(&n.to_string(), pos),
            (Type::Float, Literal::Float(x)) => {
                if !x.is_finite() {
                    return Err(bad_literal(pos, format!("{} has no fixed-point form", x)));
                }
                self.fixed_point(&x.to_string(), pos)
            }
            (Type::Str, Literal::Str(s)) => self.string(s, pos),
            (Type::Str, Literal::None) => Ok("low-value".into()),
            (_, Literal::None) => Err(bad_literal(
                pos,
                format!("`None` cannot stand for a value of type {}", tp),
            )),
            _ => Err(mismatch(pos, tp, lit)),
        }
    }

    /// Check decimal `text` against the configured fixed-point picture.
    fn fixed_point(&self, text: &str, pos: &Position) -> Result<String, TranslationError> {
        let config = &self.config;
        let digits = text.trim_start_matches('-');
        let (int, frac) = digits.split_once('.').unwrap_or((digits, ""));
        if int.trim_start_matches('0').len() > config.float_int_digits as usize {
            return Err(bad_literal(
                pos,
                format!(
                    "{} has more than {} integral digits",
                    text, config.float_int_digits
                ),
            ));
        }
        if frac.len() > config.float_frac_digits as usize {
            return Err(bad_literal(
                pos,
                format!(
                    "{} has more than {} fraction digits",
                    text, config.float_frac_digits
                ),
            ));
        }
        Ok(text.to_string())
    }

    fn string(&self, s: &str, pos: &Position) -> Result<String, TranslationError> {
        let mut stored = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '\n' => stored.push_str("\\n"),
                '\r' => stored.push_str("\\r"),
                '\t' => stored.push_str("\\t"),
                c if c.is_control() => {
                    return Err(bad_literal(
                        pos,
                        format!("the control character {:?} cannot be written in a literal", c),
                    ));
                }
                c => stored.push(c),
            }
        }
        if stored.len() > self.config.string_width {
            return Err(bad_literal(
                pos,
                format!(
                    "string of {} bytes does not fit in {}",
                    stored.len(),
                    self.config.string_width
                ),
            ));
        }
        if stored.is_empty() {
            return Ok("space".into());
        }
        Ok(format!("\"{}\"", stored.replace('"', "\"\"")))
    }
}

fn bad_literal(pos: &Position, reason: String) -> TranslationError {
    TranslationError::UnsupportedLiteral {
        pos: pos.clone(),
        reason,
    }
}

fn mismatch(pos: &Position, tp: &Type, lit: &Literal) -> TranslationError {
    bad_literal(
        pos,
        format!("expected a value of type {}, found a {} literal", tp, lit.kind()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{Scope, Usage},
        cobol::{Config, ast::Shape},
    };

    fn role() -> Role {
        Role::new(Usage::Expected, Scope::Case(1))
    }

    fn scalar(cobol: &Cobol, lit: Literal, tp: Type) -> Result<String, TranslationError> {
        cobol.render_scalar(&lit, &tp, &Position::nowhere())
    }

    #[test]
    fn renders_scalars() {
        let cobol = Cobol::default();
        assert_eq!(scalar(&cobol, Literal::Bool(true), Type::Bool).unwrap(), "1");
        assert_eq!(scalar(&cobol, Literal::Int(-42), Type::Int).unwrap(), "-42");
        assert_eq!(scalar(&cobol, Literal::Float(2.5), Type::Float).unwrap(), "2.5");
        assert_eq!(scalar(&cobol, Literal::Int(3), Type::Float).unwrap(), "3");
        assert_eq!(
            scalar(&cobol, Literal::Str("say \"hi\"\n".into()), Type::Str).unwrap(),
            "\"say \"\"hi\"\"\\n\""
        );
        assert_eq!(scalar(&cobol, Literal::Str(String::new()), Type::Str).unwrap(), "space");
        assert_eq!(scalar(&cobol, Literal::None, Type::Str).unwrap(), "low-value");
    }

    #[test]
    fn rejects_out_of_range_and_mismatched_scalars() {
        let cobol = Cobol::new(Config {
            string_width: 3,
            ..Config::default()
        });
        let rejected = [
            (Literal::Int(10_i128.pow(18)), Type::Int),
            (Literal::Float(f64::NAN), Type::Float),
            (Literal::Float(0.1234567891), Type::Float),
            (Literal::Float(1e12), Type::Float),
            (Literal::Str("four".into()), Type::Str),
            (Literal::Str("\u{7}".into()), Type::Str),
            (Literal::None, Type::Int),
            (Literal::Str("1".into()), Type::Int),
            (Literal::Float(1.0), Type::Int),
        ];
        for (lit, tp) in rejected {
            assert!(
                matches!(
                    scalar(&cobol, lit.clone(), tp),
                    Err(TranslationError::UnsupportedLiteral { .. })
                ),
                "{:?} was accepted",
                lit
            );
        }
    }

    #[test]
    fn sequences_are_initialised_from_one() {
        let cobol = Cobol::default();
        let mut session = Session::new();
        let tp = Type::Sequence(Box::new(Type::Int));
        let lit = Literal::List(vec![Literal::Int(4), Literal::Int(5)]);
        let Operand::Item(item) = cobol
            .render_literal(&mut session, &lit, &tp, role(), &Position::nowhere())
            .unwrap()
        else {
            panic!("sequences render to items");
        };
        assert_eq!(item.name, "exp-t1-list-0");
        assert_eq!(
            session.init(),
            &[
                Stmt::Comment("initialisation for exp-t1-list-0".into()),
                Stmt::Move {
                    from: "2".into(),
                    to: "exp-t1-list-0-len".into()
                },
                Stmt::Move {
                    from: "4".into(),
                    to: "exp-t1-list-0-el(1)".into()
                },
                Stmt::Move {
                    from: "5".into(),
                    to: "exp-t1-list-0-el(2)".into()
                },
            ]
        );
        assert_eq!(session.storage(), &[item]);
    }

    #[test]
    fn empty_sequences_emit_no_initialisation() {
        let cobol = Cobol::default();
        let mut session = Session::new();
        let tp = Type::Tuple(vec![Type::Str]);
        let op = cobol
            .render_literal(&mut session, &Literal::Tuple(vec![]), &tp, role(), &Position::nowhere())
            .unwrap();
        assert!(matches!(op, Operand::Item(ref item) if matches!(item.shape, Shape::Table { .. })));
        assert!(session.init().is_empty());
        assert_eq!(session.storage().len(), 1);
    }

    #[test]
    fn over_capacity_literals_are_not_truncated() {
        let cobol = Cobol::new(Config {
            capacity: 2,
            ..Config::default()
        });
        let mut session = Session::new();
        let lit = Literal::List(vec![Literal::Bool(true); 3]);
        let err = cobol
            .render_literal(
                &mut session,
                &lit,
                &Type::Sequence(Box::new(Type::Bool)),
                role(),
                &Position::nowhere(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            TranslationError::SequenceTooLong {
                len: 3,
                capacity: 2,
                ..
            }
        ));
        assert!(session.storage().is_empty());
    }

    #[test]
    fn container_literals_must_match_the_annotation() {
        let cobol = Cobol::default();
        let mut session = Session::new();
        let err = cobol
            .render_literal(
                &mut session,
                &Literal::Tuple(vec![Literal::Int(1)]),
                &Type::Sequence(Box::new(Type::Int)),
                role(),
                &Position::nowhere(),
            )
            .unwrap_err();
        assert!(matches!(err, TranslationError::UnsupportedLiteral { .. }));
        let err = cobol
            .render_literal(
                &mut session,
                &Literal::Dict(vec![]),
                &Type::Dict(Box::new(Type::Str), Box::new(Type::Int)),
                role(),
                &Position::nowhere(),
            )
            .unwrap_err();
        assert!(matches!(err, TranslationError::UnsupportedType { .. }));
    }
}
