use std::collections::BTreeSet;

use crate::{
    backend::Role,
    cobol::ast::{DataItem, Routine, Stmt},
    error::TranslationError,
};

/// Longest user-defined word COBOL accepts.
pub const MAX_WORD: usize = 30;

/// Longest suffix appended to a generated name (`-len`).
const SUFFIX_ROOM: usize = 4;

/// State of one problem's translation.
///
/// Created fresh for every problem; nothing in here survives it.
#[derive(Debug, Default)]
pub struct Session {
    counter: usize,
    names: BTreeSet<String>,
    storage: Vec<DataItem>,
    init: Vec<Stmt>,
    routines: Vec<Routine>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a name unique within this session.
    pub(crate) fn fresh_name(&mut self, role: Role, tag: &str) -> Result<String, TranslationError> {
        let name = format!(
            "{}-{}-{}-{}",
            role.usage.prefix(),
            role.scope,
            tag,
            self.counter
        );
        self.counter += 1;
        if name.len() + SUFFIX_ROOM > MAX_WORD {
            return Err(TranslationError::NameTooLong { name });
        }
        if !self.names.insert(name.clone()) {
            return Err(TranslationError::NamingCollision { name });
        }
        Ok(name)
    }

    /// Record an item for the harness' working storage.
    pub(crate) fn declare(&mut self, item: DataItem) {
        self.storage.push(item);
    }

    /// Queue a statement that must run before any assertion.
    pub(crate) fn push_init(&mut self, stmt: Stmt) {
        self.init.push(stmt);
    }

    /// Name of the routine comparing `left` with `right`, generating it on first use.
    pub(crate) fn routine_for(
        &mut self,
        left: &DataItem,
        right: &DataItem,
        build: impl FnOnce(&DataItem, &DataItem) -> Vec<Stmt>,
    ) -> String {
        if let Some(r) = self
            .routines
            .iter()
            .find(|r| r.left == left.name && r.right == right.name)
        {
            return r.name.clone();
        }
        let name = format!("eq-routine-{}", self.routines.len() + 1);
        self.routines.push(Routine {
            name: name.clone(),
            left: left.name.clone(),
            right: right.name.clone(),
            body: build(left, right),
        });
        name
    }

    pub(crate) fn storage(&self) -> &[DataItem] {
        &self.storage
    }

    pub(crate) fn init(&self) -> &[Stmt] {
        &self.init
    }

    pub(crate) fn routines(&self) -> &[Routine] {
        &self.routines
    }

    #[cfg(test)]
    pub(crate) fn names(&self) -> impl Iterator<Item = &String> {
        self.names.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{Scope, Usage},
        cobol::ast::{Pic, Shape},
    };

    #[test]
    fn names_embed_role_scope_tag_and_counter() {
        let mut s = Session::new();
        let a = s
            .fresh_name(Role::new(Usage::Param, Scope::Signature), "int")
            .unwrap();
        let b = s
            .fresh_name(Role::new(Usage::Expected, Scope::Case(3)), "list")
            .unwrap();
        assert_eq!(a, "arg-sig-int-0");
        assert_eq!(b, "exp-t3-list-1");
    }

    #[test]
    fn rejects_names_that_do_not_fit() {
        let mut s = Session::new();
        let err = s
            .fresh_name(Role::new(Usage::Expected, Scope::Case(usize::MAX)), "tuple")
            .unwrap_err();
        assert!(err.is_internal());
    }

    #[test]
    fn routines_are_registered_once_per_pairing() {
        let mut s = Session::new();
        let item = |name: &str| DataItem {
            name: name.into(),
            shape: Shape::Scalar(Pic::Flag),
        };
        let (l, r, other) = (item("ret-t1-list-0"), item("exp-t1-list-1"), item("exp-t2-list-2"));
        let first = s.routine_for(&l, &r, |_, _| vec![Stmt::Continue]);
        let again = s.routine_for(&l, &r, |_, _| unreachable!());
        let second = s.routine_for(&l, &other, |_, _| vec![]);
        assert_eq!(first, "eq-routine-1");
        assert_eq!(again, first);
        assert_eq!(second, "eq-routine-2");
        assert_eq!(s.routines().len(), 2);
    }
}
