//! Mapping abstract types onto declared storage.

use crate::{
    backend::Role,
    cobol::{
        Cobol,
        ast::{DataItem, Pic, Shape},
        env::Session,
    },
    common::Position,
    error::TranslationError,
    types::Type,
};

impl Cobol {
    /// Allocate a fresh, uniquely named item able to hold values of `tp`.
    pub(super) fn alloc(
        &self,
        session: &mut Session,
        tp: &Type,
        role: Role,
        pos: &Position,
    ) -> Result<DataItem, TranslationError> {
        let (tag, shape) = self.shape_of(tp, pos)?;
        let name = session.fresh_name(role, tag)?;
        let item = DataItem { name, shape };
        log::debug!("allocated `{}` for {}", item.name, tp);
        Ok(item)
    }

    /// Storage shape of `tp` together with the tag used in generated names.
    fn shape_of(&self, tp: &Type, pos: &Position) -> Result<(&'static str, Shape), TranslationError> {
        match tp {
            Type::Bool | Type::Int | Type::Float | Type::Str => {
                Ok((scalar_tag(tp), Shape::Scalar(self.scalar_pic(tp, pos)?)))
            }
            Type::Sequence(elem) => {
                let elem = match elem.as_ref() {
                    Type::Sequence(_) => return Err(unsupported(pos, "a nested sequence")),
                    Type::Tuple(_) => return Err(unsupported(pos, "a sequence of tuples")),
                    elem => self.scalar_pic(elem, pos)?,
                };
                Ok(("list", self.table(elem)))
            }
            Type::Tuple(elems) => {
                let Some(first) = elems.first() else {
                    return Err(unsupported(pos, "a tuple without element types"));
                };
                if elems.iter().any(|t| t != first) {
                    return Err(unsupported(
                        pos,
                        format!("the mixed-type tuple `{}`", tp),
                    ));
                }
                let elem = match first {
                    Type::Sequence(_) | Type::Tuple(_) => {
                        return Err(unsupported(pos, "a tuple of containers"));
                    }
                    elem => self.scalar_pic(elem, pos)?,
                };
                Ok(("tuple", self.table(elem)))
            }
            other => Err(unsupported(pos, describe(other))),
        }
    }

    /// Picture clause of a scalar type.
    pub(super) fn scalar_pic(&self, tp: &Type, pos: &Position) -> Result<Pic, TranslationError> {
        let config = &self.config;
        match tp {
            Type::Bool => Ok(Pic::Flag),
            Type::Int => Ok(Pic::Signed {
                digits: config.int_digits,
            }),
            Type::Float => Ok(Pic::Fixed {
                int: config.float_int_digits,
                frac: config.float_frac_digits,
            }),
            Type::Str => Ok(Pic::Alnum {
                width: config.string_width,
            }),
            other => Err(unsupported(pos, describe(other))),
        }
    }

    /// Picture of length fields and loop counters, wide enough for `capacity + 1`.
    pub(super) fn index_pic(&self) -> Pic {
        let digits = (self.config.capacity + 1).to_string().len().max(4);
        Pic::Index {
            digits: u8::try_from(digits).unwrap_or(u8::MAX),
        }
    }

    fn table(&self, elem: Pic) -> Shape {
        Shape::Table {
            index: self.index_pic(),
            elem,
            capacity: self.config.capacity,
        }
    }
}

fn scalar_tag(tp: &Type) -> &'static str {
    match tp {
        Type::Bool => "bool",
        Type::Int => "int",
        Type::Float => "float",
        _ => "str",
    }
}

fn unsupported(pos: &Position, construct: impl Into<String>) -> TranslationError {
    TranslationError::UnsupportedType {
        pos: pos.clone(),
        construct: construct.into(),
    }
}

/// Human readable name of an unsupported construct.
fn describe(tp: &Type) -> String {
    match tp {
        Type::Any => "`Any` or a missing annotation".into(),
        Type::Dict(..) => format!("the dictionary `{}`", tp),
        Type::Optional(..) => format!("the optional `{}`", tp),
        Type::Union(..) => format!("the union `{}`", tp),
        Type::NoneType => "`None`".into(),
        Type::Named(name) => format!("the unknown type `{}`", name),
        Type::Sequence(_) | Type::Tuple(_) => format!("the container `{}`", tp),
        scalar => format!("`{}`", scalar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{Backend, Scope, Usage},
        cobol::Config,
    };

    fn alloc(cobol: &Cobol, tp: Type) -> Result<DataItem, TranslationError> {
        let mut session = Session::new();
        cobol.map_type(
            &mut session,
            &tp,
            Role::new(Usage::Param, Scope::Signature),
            &Position::nowhere(),
        )
    }

    #[test]
    fn scalars_use_the_configured_widths() {
        let cobol = Cobol::new(Config {
            string_width: 40,
            ..Config::default()
        });
        let item = alloc(&cobol, Type::Str).unwrap();
        assert_eq!(item.name, "arg-sig-str-0");
        assert_eq!(item.shape, Shape::Scalar(Pic::Alnum { width: 40 }));
        assert_eq!(
            alloc(&cobol, Type::Float).unwrap().shape,
            Shape::Scalar(Pic::Fixed { int: 9, frac: 9 })
        );
    }

    #[test]
    fn sequences_and_homogeneous_tuples_become_tables() {
        let cobol = Cobol::default();
        let list = alloc(&cobol, Type::Sequence(Box::new(Type::Int))).unwrap();
        assert!(list.is_sequence());
        assert!(list.name.contains("-list-"));
        let tuple = alloc(&cobol, Type::Tuple(vec![Type::Str, Type::Str])).unwrap();
        assert!(matches!(
            tuple.shape,
            Shape::Table {
                elem: Pic::Alnum { width: 256 },
                capacity: 1000,
                ..
            }
        ));
    }

    #[test]
    fn length_fields_grow_with_capacity() {
        let small = Cobol::default();
        assert_eq!(small.index_pic(), Pic::Index { digits: 4 });
        let large = Cobol::new(Config {
            capacity: 99_999,
            ..Config::default()
        });
        assert_eq!(large.index_pic(), Pic::Index { digits: 6 });
    }

    #[test]
    fn rejects_unsupported_annotations() {
        let cobol = Cobol::default();
        let rejected = [
            Type::Any,
            Type::Dict(Box::new(Type::Str), Box::new(Type::Int)),
            Type::Optional(Box::new(Type::Int)),
            Type::Union(vec![Type::Int, Type::Str]),
            Type::NoneType,
            Type::Named("Foo".into()),
            Type::Sequence(Box::new(Type::Sequence(Box::new(Type::Int)))),
            Type::Sequence(Box::new(Type::Any)),
            Type::Tuple(vec![]),
            Type::Tuple(vec![Type::Int, Type::Str]),
        ];
        for tp in rejected {
            let err = alloc(&cobol, tp.clone()).unwrap_err();
            assert!(
                matches!(err, TranslationError::UnsupportedType { .. }),
                "{} was accepted",
                tp
            );
        }
    }
}
