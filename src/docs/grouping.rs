//! Assignment of entries to documents.
//!
//! The primary document (named by the configured version) lists every
//! entry. Each distinct module title additionally names a document that
//! lists only the entries declared by modules carrying that title. The
//! module → document table is computed once from the entry snapshot.

use std::collections::{BTreeSet, HashMap};

use crate::service::ServiceEntry;

#[derive(Debug, Clone)]
pub struct DocumentGroups {
    primary: String,
    /// Titled documents in name order, excluding the primary.
    titled: BTreeSet<String>,
    /// Module name → titled document name.
    module_documents: HashMap<String, String>,
}

impl DocumentGroups {
    pub fn compute(primary: &str, entries: &[ServiceEntry]) -> Self {
        let mut titled = BTreeSet::new();
        let mut module_documents = HashMap::new();

        for entry in entries {
            let Some(title) = entry.module.title.as_deref().map(str::trim) else { continue };
            if title.is_empty() {
                continue;
            }
            module_documents
                .entry(entry.module.name.clone())
                .or_insert_with(|| title.to_string());
            if title != primary {
                titled.insert(title.to_string());
            }
        }

        Self {
            primary: primary.to_string(),
            titled,
            module_documents,
        }
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Every document name, primary first.
    pub fn document_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.titled.iter().map(String::as_str))
    }

    /// Whether `entry` belongs in `document`.
    pub fn includes(&self, document: &str, entry: &ServiceEntry) -> bool {
        document == self.primary
            || self
                .module_documents
                .get(&entry.module.name)
                .is_some_and(|name| name == document)
    }

    /// The most specific document listing `entry`.
    pub fn document_for(&self, entry: &ServiceEntry) -> &str {
        self.module_documents
            .get(&entry.module.name)
            .map(String::as_str)
            .unwrap_or(&self.primary)
    }

    pub fn entries_for<'a>(&self, document: &str, entries: &'a [ServiceEntry]) -> Vec<&'a ServiceEntry> {
        entries.iter().filter(|e| self.includes(document, e)).collect()
    }
}
