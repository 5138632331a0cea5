use crate::{
    backend::{Backend, Role, Scope, Usage},
    cobol::{
        Cobol, Dialect, HARNESS_PROGRAM,
        ast::{Cond, DataItem, Operand, Passing, Pic, Section, Stmt},
        emit::Writer,
        env::Session,
        program_name,
    },
    error::TranslationError,
    types::{Assertion, Problem, Signature},
};

/// Set by an equality routine when both tables matched.
const EQ_FLAG: &str = "eq-flag";
const EQ_IDX: &str = "eq-idx";
const FAIL_COUNT: &str = "fail-count";

impl Cobol {
    /// Close the candidate and append the program calling it once per assertion.
    pub(super) fn harness(
        &self,
        session: &mut Session,
        problem: &Problem,
    ) -> Result<String, TranslationError> {
        let candidate = program_name(&problem.sig.name);
        let mut body = vec![];
        for (k, assertion) in problem.assertions.iter().enumerate() {
            body.extend(self.case(session, &candidate, &problem.sig, assertion, k + 1)?);
        }
        if self.config.dialect == Dialect::ReturnCode {
            body.push(Stmt::Move {
                from: FAIL_COUNT.into(),
                to: "return-code".into(),
            });
        }
        log::debug!(
            "harness for `{}`: {} items, {} routines",
            candidate,
            session.storage().len(),
            session.routines().len()
        );

        let mut w = Writer::new();
        w.blank();
        w.sentence(&[Stmt::Goback], 0);
        w.line(format!("end program {}.", candidate));
        w.blank();
        w.line("identification division.");
        w.line(format!("program-id. {}.", HARNESS_PROGRAM));
        w.line("data division.");
        w.line("working-storage section.");
        if !session.routines().is_empty() {
            w.line(format!("01 {} {} value 0.", EQ_FLAG, Pic::Flag));
            w.line(format!("01 {} {} value 0.", EQ_IDX, self.index_pic()));
        }
        if self.config.dialect == Dialect::ReturnCode {
            w.line(format!("01 {} pic 9(4) value 0.", FAIL_COUNT));
        }
        for item in session.storage() {
            w.item(item, Section::WorkingStorage);
        }
        w.line("procedure division.");
        w.stmts(session.init(), 0);
        w.stmts(&body, 0);
        w.sentence(&[Stmt::Goback], 0);
        for routine in session.routines() {
            w.line(format!("{}.", routine.name));
            w.sentence(&routine.body, 0);
        }
        w.line(format!("end program {}.", HARNESS_PROGRAM));
        Ok(w.finish())
    }

    /// Statements running the `k`-th assertion.
    fn case(
        &self,
        session: &mut Session,
        candidate: &str,
        sig: &Signature,
        assertion: &Assertion,
        k: usize,
    ) -> Result<Vec<Stmt>, TranslationError> {
        if assertion.args.len() != sig.params.len() {
            return Err(TranslationError::MalformedAssertion {
                pos: assertion.pos.clone(),
                reason: format!(
                    "{} arguments given, {} expected",
                    assertion.args.len(),
                    sig.params.len()
                ),
            });
        }

        let mut args = vec![];
        for (param, arg) in sig.params.iter().zip(&assertion.args) {
            let role = Role::new(Usage::Param, Scope::Case(k));
            let item = match self.render_literal(session, &arg.value, &param.tp, role, &arg.pos)? {
                Operand::Item(item) => item,
                Operand::Inline(text) => {
                    let item = self.map_type(session, &param.tp, role, &arg.pos)?;
                    session.push_init(Stmt::Move {
                        from: text,
                        to: item.name.clone(),
                    });
                    session.declare(item.clone());
                    item
                }
            };
            args.push((self.passing(&item), item.name));
        }

        let ret = self.map_type(
            session,
            &sig.ret,
            Role::new(Usage::Return, Scope::Case(k)),
            &sig.ret_pos,
        )?;
        session.declare(ret.clone());
        args.push((Passing::Reference, ret.name.clone()));

        let mut stmts = vec![
            Stmt::Comment(format!("test case {}", k)),
            Stmt::Call {
                program: candidate.to_string(),
                args,
            },
        ];
        let expected = self.render_literal(
            session,
            &assertion.expected.value,
            &sig.ret,
            Role::new(Usage::Expected, Scope::Case(k)),
            &assertion.expected.pos,
        )?;
        let cond = match expected {
            Operand::Inline(text) => Cond::Equal(ret.name, text),
            Operand::Item(exp) => {
                let routine = session.routine_for(&ret, &exp, equality_body);
                stmts.push(Stmt::Perform(routine));
                Cond::Equal(EQ_FLAG.into(), "1".into())
            }
        };
        stmts.push(self.outcome(cond));
        Ok(stmts)
    }

    fn outcome(&self, cond: Cond) -> Stmt {
        match self.config.dialect {
            Dialect::Display => Stmt::If {
                cond,
                then: vec![Stmt::Display("pass".into())],
                otherwise: vec![Stmt::Display("fail".into())],
            },
            Dialect::ReturnCode => Stmt::If {
                cond,
                then: vec![Stmt::Continue],
                otherwise: vec![Stmt::Add {
                    amount: 1,
                    to: FAIL_COUNT.into(),
                }],
            },
        }
    }
}

/// Compare lengths, then elements from 1, leaving the paragraph on the first difference.
fn equality_body(left: &DataItem, right: &DataItem) -> Vec<Stmt> {
    vec![
        Stmt::Move {
            from: "0".into(),
            to: EQ_FLAG.into(),
        },
        Stmt::If {
            cond: Cond::NotEqual(left.len_name(), right.len_name()),
            then: vec![Stmt::ExitParagraph],
            otherwise: vec![],
        },
        Stmt::Loop {
            counter: EQ_IDX.into(),
            until: Cond::Greater(EQ_IDX.into(), left.len_name()),
            body: vec![Stmt::If {
                cond: Cond::NotEqual(left.elem_at(EQ_IDX), right.elem_at(EQ_IDX)),
                then: vec![Stmt::ExitParagraph],
                otherwise: vec![],
            }],
        },
        Stmt::Move {
            from: "1".into(),
            to: EQ_FLAG.into(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::{
        cobol::{CallConvention, Config},
        common::Position,
        types::{self, Literal, Param, Type},
    };

    fn operand(value: Literal) -> types::Operand {
        types::Operand {
            value,
            pos: Position::nowhere(),
        }
    }

    fn problem(params: Vec<Type>, ret: Type, cases: Vec<(Vec<Literal>, Literal)>) -> Problem {
        let sig = Signature {
            name: "max_pair".into(),
            params: params
                .into_iter()
                .enumerate()
                .map(|(i, tp)| Param {
                    name: format!("p{}", i),
                    tp,
                    pos: Position::nowhere(),
                })
                .collect(),
            ret,
            ret_pos: Position::nowhere(),
            description: String::new(),
            pos: Position::nowhere(),
        };
        let assertions = cases
            .into_iter()
            .map(|(args, expected)| Assertion {
                args: args.into_iter().map(operand).collect(),
                expected: operand(expected),
                pos: Position::nowhere(),
            })
            .collect();
        Problem { sig, assertions }
    }

    fn list(items: &[i128]) -> Literal {
        Literal::List(items.iter().copied().map(Literal::Int).collect())
    }

    fn ints() -> Type {
        Type::Sequence(Box::new(Type::Int))
    }

    #[test]
    fn scalar_assertion_has_exactly_one_pass_branch() {
        let p = problem(
            vec![Type::Int, Type::Int],
            Type::Int,
            vec![(vec![Literal::Int(3), Literal::Int(5)], Literal::Int(5))],
        );
        let tests = Cobol::default().translate(&p).unwrap().tests;
        assert_eq!(tests.matches("display \"pass\"").count(), 1);
        assert!(tests.starts_with("\n           goback.\n       end program max-pair.\n\n"));
        assert!(tests.contains("           move 3 to arg-t1-int-3\n"));
        assert!(tests.contains(
            "           call \"max-pair\" using
               by reference arg-t1-int-3
               by reference arg-t1-int-4
               by reference ret-t1-int-5
           end-call
           if ret-t1-int-5 = 5
"
        ));
        assert!(!tests.contains(EQ_FLAG));
        assert!(tests.ends_with("           goback.\n       end program test-prog.\n"));
    }

    #[test]
    fn output_is_deterministic() {
        let p = problem(
            vec![ints(), Type::Str],
            ints(),
            vec![
                (vec![list(&[1, 2]), Literal::Str("a".into())], list(&[2])),
                (vec![list(&[]), Literal::Str("b".into())], list(&[])),
            ],
        );
        let cobol = Cobol::default();
        assert_eq!(cobol.translate(&p).unwrap(), cobol.translate(&p).unwrap());
    }

    #[test]
    fn every_generated_name_is_distinct() {
        let p = problem(
            vec![ints(), Type::Int],
            ints(),
            vec![
                (vec![list(&[1]), Literal::Int(1)], list(&[1])),
                (vec![list(&[2]), Literal::Int(2)], list(&[2])),
            ],
        );
        let cobol = Cobol::default();
        let mut session = Session::new();
        cobol.prompt(&mut session, &p.sig).unwrap();
        cobol.harness(&mut session, &p).unwrap();
        let declared: BTreeSet<&str> = session.storage().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(declared.len(), session.storage().len());
        assert_eq!(session.names().count(), 3 + 2 * 4);
        assert!(declared.iter().all(|name| !name.contains("-sig-")));
    }

    #[test]
    fn sequence_lengths_are_compared_before_elements() {
        let p = problem(vec![], ints(), vec![(vec![], list(&[7, 8]))]);
        let cobol = Cobol::default();
        let mut session = Session::new();
        cobol.prompt(&mut session, &p.sig).unwrap();
        let tests = cobol.harness(&mut session, &p).unwrap();
        let routine = &session.routines()[0];
        assert_eq!(routine.left, "ret-t1-list-1");
        assert_eq!(routine.right, "exp-t1-list-2");
        assert!(matches!(
            &routine.body[1],
            Stmt::If { cond: Cond::NotEqual(l, r), then, .. }
                if l == "ret-t1-list-1-len" && r == "exp-t1-list-2-len" && then == &[Stmt::ExitParagraph]
        ));
        assert!(matches!(routine.body[2], Stmt::Loop { .. }));
        assert!(tests.contains(
            "           perform eq-routine-1
           if eq-flag = 1
"
        ));
        assert!(tests.contains(
            "       eq-routine-1.
           move 0 to eq-flag
           if ret-t1-list-1-len not = exp-t1-list-2-len
               exit paragraph
           end-if
           perform varying eq-idx from 1 by 1 until eq-idx > ret-t1-list-1-len
               if ret-t1-list-1-el(eq-idx) not = exp-t1-list-2-el(eq-idx)
                   exit paragraph
               end-if
           end-perform
           move 1 to eq-flag.
"
        ));
        assert!(tests.contains("       01 eq-flag pic 9 value 0.\n"));
    }

    #[test]
    fn empty_expected_sequence_emits_no_initialisation() {
        let p = problem(vec![], ints(), vec![(vec![], list(&[]))]);
        let tests = Cobol::default().translate(&p).unwrap().tests;
        assert!(!tests.contains("initialisation for"));
        assert!(tests.contains("05 exp-t1-list-2-len pic 9(4) comp-5 value 0."));
        assert!(tests.contains("perform eq-routine-1"));
    }

    #[test]
    fn return_code_dialect_counts_failures() {
        let cobol = Cobol::new(Config {
            dialect: Dialect::ReturnCode,
            convention: CallConvention::Content,
            ..Config::default()
        });
        let p = problem(
            vec![Type::Bool, ints()],
            Type::Bool,
            vec![(vec![Literal::Bool(true), list(&[1])], Literal::Bool(false))],
        );
        let tests = cobol.translate(&p).unwrap().tests;
        assert!(!tests.contains("display"));
        assert!(tests.contains("       01 fail-count pic 9(4) value 0.\n"));
        assert!(tests.contains("               add 1 to fail-count\n"));
        assert!(tests.contains("           move fail-count to return-code\n           goback.\n"));
        assert!(tests.contains("               by content arg-t1-bool-3\n"));
        assert!(tests.contains("               by reference arg-t1-list-4\n"));
        assert!(tests.contains("               by reference ret-t1-bool-5\n"));
    }

    #[test]
    fn bad_expected_literal_fails_the_problem() {
        let p = problem(vec![], Type::Int, vec![(vec![], Literal::Str("x".into()))]);
        let err = Cobol::default().translate(&p).unwrap_err();
        assert!(matches!(err, TranslationError::UnsupportedLiteral { .. }));
    }
}
