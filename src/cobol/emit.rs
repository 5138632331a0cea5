//! Line-oriented text emission.
//!
//! Output is free format with the fixed-format margins kept anyway: seven
//! columns of sequence area, division headers and level numbers at area A,
//! statements at area B.

use crate::cobol::ast::{DataItem, Section, Shape, Stmt};

const AREA_A: &str = "       ";
const AREA_B: usize = 11;
const STEP: usize = 4;

#[derive(Debug, Default)]
pub struct Writer {
    lines: Vec<String>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A line starting at area A.
    pub fn line(&mut self, text: impl AsRef<str>) {
        self.lines.push(format!("{}{}", AREA_A, text.as_ref()));
    }

    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// One `*>` comment line per line of `text`.
    pub fn comment(&mut self, text: &str) {
        for line in text.lines() {
            self.line(format!("*> {}", line).trim_end());
        }
    }

    /// A line at area B, `level` steps deep.
    pub fn at(&mut self, level: usize, text: impl AsRef<str>) {
        let indent = AREA_B + STEP * level;
        self.lines
            .push(format!("{:indent$}{}", "", text.as_ref(), indent = indent));
    }

    /// Declaration of `item`; tables start with a zero length outside the linkage section.
    pub fn item(&mut self, item: &DataItem, section: Section) {
        match &item.shape {
            Shape::Scalar(pic) => self.line(format!("01 {} {}.", item.name, pic)),
            Shape::Table {
                index,
                elem,
                capacity,
            } => {
                let value = match section {
                    Section::WorkingStorage => " value 0",
                    Section::Linkage => "",
                };
                self.line(format!("01 {}.", item.name));
                self.at(0, format!("05 {} {}{}.", item.len_name(), index, value));
                self.at(0, format!("05 {} {}", item.elem_name(), elem));
                self.at(
                    1,
                    format!(
                        "occurs 0 to {} times depending on {}.",
                        capacity,
                        item.len_name()
                    ),
                );
            }
        }
    }

    pub fn stmts(&mut self, stmts: &[Stmt], level: usize) {
        for stmt in stmts {
            self.stmt(stmt, level);
        }
    }

    /// Statements closed by a period, as required at the end of a paragraph.
    pub fn sentence(&mut self, stmts: &[Stmt], level: usize) {
        self.stmts(stmts, level);
        if let Some(last) = self.lines.last_mut() {
            last.push('.');
        }
    }

    fn stmt(&mut self, stmt: &Stmt, level: usize) {
        match stmt {
            Stmt::Comment(text) => self.at(level, format!("*> {}", text)),
            Stmt::Move { from, to } => self.at(level, format!("move {} to {}", from, to)),
            Stmt::Call { program, args } => {
                self.at(level, format!("call \"{}\" using", program));
                for (passing, arg) in args {
                    self.at(level + 1, format!("{} {}", passing, arg));
                }
                self.at(level, "end-call");
            }
            Stmt::Perform(paragraph) => self.at(level, format!("perform {}", paragraph)),
            Stmt::Loop {
                counter,
                until,
                body,
            } => {
                self.at(
                    level,
                    format!("perform varying {} from 1 by 1 until {}", counter, until),
                );
                self.stmts(body, level + 1);
                self.at(level, "end-perform");
            }
            Stmt::If {
                cond,
                then,
                otherwise,
            } => {
                self.at(level, format!("if {}", cond));
                self.stmts(then, level + 1);
                if !otherwise.is_empty() {
                    self.at(level, "else");
                    self.stmts(otherwise, level + 1);
                }
                self.at(level, "end-if");
            }
            Stmt::Display(text) => self.at(level, format!("display \"{}\"", text)),
            Stmt::Add { amount, to } => self.at(level, format!("add {} to {}", amount, to)),
            Stmt::Continue => self.at(level, "continue"),
            Stmt::ExitParagraph => self.at(level, "exit paragraph"),
            Stmt::Goback => self.at(level, "goback"),
        }
    }

    pub fn finish(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cobol::ast::{Cond, Passing, Pic};

    #[test]
    fn tables_in_linkage_have_no_value_clause() {
        let item = DataItem {
            name: "arg-sig-list-0".into(),
            shape: Shape::Table {
                index: Pic::Index { digits: 4 },
                elem: Pic::Signed { digits: 18 },
                capacity: 10,
            },
        };
        let mut w = Writer::new();
        w.item(&item, Section::Linkage);
        w.item(&item, Section::WorkingStorage);
        let text = w.finish();
        assert_eq!(
            text,
            "       01 arg-sig-list-0.
           05 arg-sig-list-0-len pic 9(4) comp-5.
           05 arg-sig-list-0-el pic s9(18)
               occurs 0 to 10 times depending on arg-sig-list-0-len.
       01 arg-sig-list-0.
           05 arg-sig-list-0-len pic 9(4) comp-5 value 0.
           05 arg-sig-list-0-el pic s9(18)
               occurs 0 to 10 times depending on arg-sig-list-0-len.
"
        );
    }

    #[test]
    fn nested_statements_are_indented_and_closed() {
        let mut w = Writer::new();
        w.sentence(
            &[
                Stmt::Call {
                    program: "f".into(),
                    args: vec![(Passing::Content, "a".into()), (Passing::Reference, "r".into())],
                },
                Stmt::If {
                    cond: Cond::Equal("r".into(), "1".into()),
                    then: vec![Stmt::Display("pass".into())],
                    otherwise: vec![Stmt::Display("fail".into())],
                },
            ],
            0,
        );
        assert_eq!(
            w.finish(),
            r#"           call "f" using
               by content a
               by reference r
           end-call
           if r = 1
               display "pass"
           else
               display "fail"
           end-if.
"#
        );
    }
}
