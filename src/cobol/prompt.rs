use crate::{
    backend::{Backend, Role, Scope, Usage},
    cobol::{
        Cobol,
        ast::{DataItem, Section},
        emit::Writer,
        env::Session,
        program_name,
    },
    error::TranslationError,
    types::Signature,
};

impl Cobol {
    /// The candidate's program up to and including its procedure division header.
    pub(super) fn prompt(
        &self,
        session: &mut Session,
        sig: &Signature,
    ) -> Result<String, TranslationError> {
        let params = sig
            .params
            .iter()
            .map(|p| {
                self.map_type(session, &p.tp, Role::new(Usage::Param, Scope::Signature), &p.pos)
                    .map(|item| (p.name.as_str(), item))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let ret = self.map_type(
            session,
            &sig.ret,
            Role::new(Usage::Return, Scope::Signature),
            &sig.ret_pos,
        )?;

        let mut w = Writer::new();
        let doc = clean_doc(&sig.description);
        if !doc.is_empty() {
            w.comment(&doc);
        }
        for (name, item) in &params {
            w.comment(&format!("{} ({}) is received on entry.", item.name, name));
        }
        w.comment(&format!("Store the result in {} before returning.", ret.name));
        if ret.is_sequence() {
            w.comment(&format!("Set {} to the number of elements.", ret.len_name()));
        }
        w.comment("Return with 'goback.'");

        w.line("identification division.");
        w.line(format!("program-id. {}.", program_name(&sig.name)));
        w.line("data division.");
        w.line("working-storage section.");
        w.line("linkage section.");
        let items: Vec<&DataItem> = params.iter().map(|(_, item)| item).chain([&ret]).collect();
        for item in &items {
            w.item(item, Section::Linkage);
        }
        w.line("procedure division using by reference");
        let last = items.len() - 1;
        for (i, item) in items.iter().enumerate() {
            let end = if i == last { "." } else { "" };
            w.at(0, format!("{}{}", item.name, end));
        }
        Ok(w.finish())
    }
}

/// Strip a docstring's margin the way documentation tools do.
///
/// The first line loses its leading whitespace, the others their common
/// indentation; blank lines at either end are dropped.
fn clean_doc(doc: &str) -> String {
    let expanded = doc.replace('\t', "        ");
    let lines: Vec<&str> = expanded.lines().map(str::trim_end).collect();
    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    let mut cleaned: Vec<&str> = lines
        .iter()
        .copied()
        .enumerate()
        .map(|(i, l)| match i {
            0 => l.trim_start(),
            _ => l.get(margin..).unwrap_or_else(|| l.trim_start()),
        })
        .collect();
    while cleaned.first().is_some_and(|l| l.is_empty()) {
        cleaned.remove(0);
    }
    while cleaned.last().is_some_and(|l| l.is_empty()) {
        cleaned.pop();
    }
    cleaned.join("\n")
}
