use std::{collections::BTreeMap, sync::Arc};

use ariadne::Source;

/// Problem sources loaded during one translation, keyed by file name.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    map: BTreeMap<Arc<str>, Source>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source and hand back the stored copy.
    ///
    /// Registering the same file twice replaces the earlier text.
    pub fn add(&mut self, filename: Arc<str>, source: String) -> &Source {
        if self.map.contains_key(&filename) {
            log::debug!("source {} registered twice, keeping the latest", filename);
        }
        self.map.insert(filename.clone(), Source::from(source));
        &self.map[&filename]
    }

    pub fn get(&self, filename: &Arc<str>) -> Option<&Source> {
        self.map.get(filename)
    }
}
