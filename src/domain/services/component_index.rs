//! Component index - lookup of existing local components by key
//!
//! Used when converting into an existing project: every incoming component
//! is matched against what the project already holds.

use indexmap::IndexMap;

use crate::domain::entities::{Registry, SourceComponent};
use crate::domain::value_objects::ComponentKey;
use crate::error::MetaformResult;

#[derive(Debug, Default, Clone)]
pub struct ComponentIndex {
    entries: IndexMap<ComponentKey, Vec<SourceComponent>>,
}

impl ComponentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index components together with their decomposed children
    pub fn from_components(
        components: impl IntoIterator<Item = SourceComponent>,
        registry: &Registry,
    ) -> MetaformResult<Self> {
        let mut index = Self::new();
        for component in components {
            index.add_with_children(component, registry)?;
        }
        Ok(index)
    }

    pub fn add(&mut self, component: SourceComponent) {
        self.entries.entry(component.key()).or_default().push(component);
    }

    pub fn add_with_children(
        &mut self,
        component: SourceComponent,
        registry: &Registry,
    ) -> MetaformResult<()> {
        if component.ty.is_decomposed() {
            for child in component.children(registry)? {
                self.add(child);
            }
        }
        self.add(component);
        Ok(())
    }

    /// First registered component with a composed document, falling back to
    /// one that only has content (decomposed labels have no parent file).
    pub fn get(&self, key: &ComponentKey) -> Option<&SourceComponent> {
        let all = self.entries.get(key)?;
        all.iter()
            .find(|c| c.xml.is_some())
            .or_else(|| all.iter().find(|c| c.content.is_some()))
    }

    /// Existing component an incoming one should be merged into
    pub fn merge_target(&self, component: &SourceComponent) -> Option<&SourceComponent> {
        self.get(&component.key())
    }

    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceComponent> {
        self.entries.values().flatten()
    }
}
