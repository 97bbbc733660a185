//! Access to the platform's registered service entries.

use parking_lot::RwLock;

use crate::service::entry::ServiceEntry;

/// Supplies the current list of exposed service entries.
pub trait ServiceEntryProvider: Send + Sync + 'static {
    /// Returns a snapshot of every registered entry.
    fn entries(&self) -> Vec<ServiceEntry>;
}

/// An in-process entry registry.
///
/// Entries can be registered at any time; readers always observe a
/// consistent snapshot.
#[derive(Debug, Default)]
pub struct InMemoryEntryRegistry {
    entries: RwLock<Vec<ServiceEntry>>,
}

impl InMemoryEntryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with `entries`.
    pub fn with_entries(entries: impl IntoIterator<Item = ServiceEntry>) -> Self {
        Self {
            entries: RwLock::new(entries.into_iter().collect()),
        }
    }

    /// Register an entry, replacing any entry with the same id.
    pub fn register(&self, entry: ServiceEntry) {
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl ServiceEntryProvider for InMemoryEntryRegistry {
    fn entries(&self) -> Vec<ServiceEntry> {
        self.entries.read().clone()
    }
}
