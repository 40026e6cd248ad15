//! Decomposition: child writes deferred until every component has been seen
//!
//! A deferred write is dropped if another component later wrote the same
//! child into an existing merge target.

use indexmap::IndexMap;

use crate::domain::entities::{ConversionResult, SourceComponent, WriteInstruction};
use crate::domain::value_objects::ComponentKey;

#[derive(Debug)]
struct DecompositionEntry {
    origin: SourceComponent,
    found_existing_merge: bool,
    pending: Option<WriteInstruction>,
}

#[derive(Debug, Default)]
pub struct DecompositionState {
    entries: IndexMap<ComponentKey, DecompositionEntry>,
}

impl DecompositionState {
    /// The child was written into an existing merge target.
    pub fn mark_found(&mut self, key: ComponentKey, origin: &SourceComponent) {
        self.entries
            .entry(key)
            .and_modify(|e| {
                e.found_existing_merge = true;
                e.pending = None;
            })
            .or_insert_with(|| DecompositionEntry {
                origin: origin.clone(),
                found_existing_merge: true,
                pending: None,
            });
    }

    /// Defer a write. `None` records the component without writing anything.
    pub fn defer(
        &mut self,
        key: ComponentKey,
        origin: &SourceComponent,
        pending: Option<WriteInstruction>,
    ) {
        match self.entries.get_mut(&key) {
            Some(entry) if entry.found_existing_merge => {}
            Some(entry) => {
                entry.origin = origin.clone();
                entry.pending = pending;
            }
            None => {
                self.entries.insert(
                    key,
                    DecompositionEntry {
                        origin: origin.clone(),
                        found_existing_merge: false,
                        pending,
                    },
                );
            }
        }
    }

    pub fn is_found(&self, key: &ComponentKey) -> bool {
        self.entries
            .get(key)
            .is_some_and(|e| e.found_existing_merge)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Emit pending writes that were never found, attributed to the origin's
    /// parent when it has one.
    pub(super) fn finalize(self) -> Vec<ConversionResult> {
        self.entries
            .into_values()
            .filter(|e| !e.found_existing_merge)
            .filter_map(|e| {
                let write = e.pending?;
                let component = match e.origin.parent.clone() {
                    Some(parent) => SourceComponent::clone(&parent),
                    None => e.origin,
                };
                Some(ConversionResult::new(component, vec![write]))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::WriteSource;
    use crate::infrastructure::fs::VirtualTree;
    use crate::infrastructure::registry::default_registry;
    use std::sync::Arc;

    fn component(name: &str) -> SourceComponent {
        let registry = default_registry().unwrap();
        SourceComponent::new(
            name,
            registry.type_by_id("apexclass").unwrap(),
            Arc::new(VirtualTree::new()),
        )
    }

    fn write(path: &str) -> WriteInstruction {
        WriteInstruction::write(path, WriteSource::Bytes(b"x".to_vec()))
    }

    #[test]
    fn pending_writes_are_emitted() {
        let origin = component("A");
        let mut state = DecompositionState::default();
        state.defer(origin.key(), &origin, Some(write("a.xml")));
        let results = state.finalize();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].writes[0].output(), std::path::Path::new("a.xml"));
    }

    #[test]
    fn found_entries_suppress_pending_write_either_order() {
        let origin = component("A");
        let mut state = DecompositionState::default();
        state.defer(origin.key(), &origin, Some(write("a.xml")));
        state.mark_found(origin.key(), &origin);
        assert!(state.is_found(&origin.key()));

        let other = component("B");
        state.mark_found(other.key(), &other);
        state.defer(other.key(), &other, Some(write("b.xml")));

        assert!(state.finalize().is_empty());
    }

    #[test]
    fn recorded_without_write_emits_nothing() {
        let origin = component("A");
        let mut state = DecompositionState::default();
        state.defer(origin.key(), &origin, None);
        assert_eq!(state.len(), 1);
        assert!(state.finalize().is_empty());
    }
}
