use crate::definition::PropertyDefinition;
use std::sync::Arc;

/// Name of the group every node starts with. It cannot be removed.
pub const DEFAULT_GROUP: &str = "";

/// A named bucket organizing a node's definitions.
///
/// The definitions are shared with the owning node; a group never owns a
/// definition on its own. Values returned by [`crate::RegistryNode::group`] are
/// snapshots and do not track later changes.
#[derive(Debug, Clone)]
pub struct DefinitionGroup {
    name: String,
    definitions: Vec<Arc<PropertyDefinition>>,
}

impl DefinitionGroup {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), definitions: Vec::new() }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_GROUP
    }

    /// Definitions in the order they joined the group.
    #[must_use]
    pub fn definitions(&self) -> &[Arc<PropertyDefinition>] {
        &self.definitions
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.iter().any(|d| d.name() == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub(crate) fn push(&mut self, definition: Arc<PropertyDefinition>) {
        self.definitions.push(definition);
    }

    pub(crate) fn extend(&mut self, definitions: Vec<Arc<PropertyDefinition>>) {
        self.definitions.extend(definitions);
    }

    pub(crate) fn remove_named(&mut self, name: &str) {
        self.definitions.retain(|d| d.name() != name);
    }

    pub(crate) fn into_definitions(self) -> Vec<Arc<PropertyDefinition>> {
        self.definitions
    }
}
