//! The registry tree.
//!
//! A [`RegistryNode`] is a cheap, cloneable handle. Parents own their
//! children; children and definitions only hold weak back-references, so
//! dropping the last handle to a root releases the whole tree.
//!
//! Node state sits behind a `parking_lot::RwLock` so handles can be shared,
//! but multi-step sequences on one tree still need a single writer.

use crate::definition::{DefinitionFlags, PropertyDefinition};
use crate::error::RegistryError;
use crate::group::{DEFAULT_GROUP, DefinitionGroup};
use crate::names::{self, SEPARATOR};
use crate::ordered::OrderedMap;
use crate::types::PropertyType;
use bitflags::bitflags;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};
use tracing::{trace, warn};

bitflags! {
    /// Flags carried by a [`RegistryNode`]. Unknown bits are preserved.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
    pub struct NodeFlags: u32 {
        /// The subtree is managed by the application itself.
        const INTERNAL = 1 << 0;
    }
}

impl From<u32> for NodeFlags {
    fn from(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }
}

pub(crate) struct NodeInner {
    region: String,
    description: Option<String>,
    flags: NodeFlags,
    parent: OnceLock<Weak<NodeInner>>,
    state: RwLock<NodeState>,
}

struct NodeState {
    children: OrderedMap<RegistryNode>,
    definitions: OrderedMap<Arc<PropertyDefinition>>,
    groups: OrderedMap<DefinitionGroup>,
}

impl NodeState {
    fn initialized() -> Self {
        let mut groups = OrderedMap::default();
        groups.insert(DEFAULT_GROUP, DefinitionGroup::new(DEFAULT_GROUP));
        Self { children: OrderedMap::default(), definitions: OrderedMap::default(), groups }
    }
}

/// A node of the property-definition registry.
///
/// Nodes with an empty region are roots and can never be attached to a parent.
#[derive(Clone)]
pub struct RegistryNode {
    inner: Arc<NodeInner>,
}

/// Builder for [`RegistryNode`]. Obtain one via [`RegistryNode::builder`].
#[derive(Debug, Default)]
pub struct NodeBuilder<'p> {
    region: String,
    description: Option<String>,
    flags: NodeFlags,
    parent: Option<&'p RegistryNode>,
}

impl<'p> NodeBuilder<'p> {
    /// Sets the region. Leaving it empty builds a root.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: impl Into<NodeFlags>) -> Self {
        self.flags = flags.into();
        self
    }

    /// Attaches the node to `parent` as part of [`NodeBuilder::build`].
    #[must_use]
    pub const fn parent(mut self, parent: &'p RegistryNode) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Validates the region, then attaches to the parent if one was given.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] for a malformed region and
    /// any error of [`RegistryNode::attach`].
    pub fn build(self) -> Result<RegistryNode, RegistryError> {
        if !self.region.is_empty() && !names::is_valid_region(&self.region) {
            return Err(RegistryError::InvalidArgument {
                message: format!("'{}' is not a valid region name", self.region).into(),
                context: Some("regions must be identifiers".into()),
            });
        }

        let node = RegistryNode {
            inner: Arc::new(NodeInner {
                region: self.region,
                description: self.description,
                flags: self.flags,
                parent: OnceLock::new(),
                state: RwLock::new(NodeState::initialized()),
            }),
        };

        if let Some(parent) = self.parent {
            node.attach(parent)?;
        }
        Ok(node)
    }
}

impl RegistryNode {
    #[must_use]
    pub fn builder<'p>() -> NodeBuilder<'p> {
        NodeBuilder::default()
    }

    /// Creates a root node.
    #[must_use]
    pub fn root() -> Self {
        Self {
            inner: Arc::new(NodeInner {
                region: String::new(),
                description: None,
                flags: NodeFlags::empty(),
                parent: OnceLock::new(),
                state: RwLock::new(NodeState::initialized()),
            }),
        }
    }

    /// Creates a detached node; an empty region yields a root.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] for a malformed region.
    pub fn new(region: impl Into<String>) -> Result<Self, RegistryError> {
        Self::builder().region(region).build()
    }

    /// Creates a node and attaches it under `parent`.
    ///
    /// # Errors
    /// See [`NodeBuilder::build`].
    pub fn with_parent(region: impl Into<String>, parent: &Self) -> Result<Self, RegistryError> {
        Self::builder().region(region).parent(parent).build()
    }

    pub(crate) const fn from_inner(inner: Arc<NodeInner>) -> Self {
        Self { inner }
    }

    /// Links this node under `parent`.
    ///
    /// # Errors
    /// * [`RegistryError::InvalidArgument`] if `parent` is this node or one of its descendants.
    /// * [`RegistryError::InvalidState`] if this node already has a parent or is a root.
    /// * [`RegistryError::RegistrationConflict`] if `parent` already has a child with this region.
    pub fn attach(&self, parent: &Self) -> Result<(), RegistryError> {
        if self.ptr_eq(parent) {
            return Err(RegistryError::invalid_argument("a node cannot be its own parent"));
        }
        if self.inner.parent.get().is_some() {
            return Err(RegistryError::invalid_state(format!("{self} already has a parent")));
        }
        if self.is_root() {
            return Err(RegistryError::invalid_state("a root node cannot have a parent"));
        }
        if parent.ancestors().any(|ancestor| ancestor.ptr_eq(self)) {
            return Err(RegistryError::invalid_argument(format!(
                "{parent} is a descendant of {self}"
            )));
        }

        let mut state = parent.inner.state.write();
        if state.children.contains_key(&self.inner.region) {
            return Err(RegistryError::RegistrationConflict {
                message: format!("region '{}' is already taken", self.inner.region).into(),
                context: Some(parent.namespace().into()),
            });
        }
        if self.inner.parent.set(Arc::downgrade(&parent.inner)).is_err() {
            return Err(RegistryError::invalid_state(format!("{self} already has a parent")));
        }
        state.children.insert(self.inner.region.clone(), self.clone());
        drop(state);

        trace!(namespace = %self.namespace(), "Registry node attached");
        Ok(())
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.inner.region
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    #[must_use]
    pub fn flags(&self) -> NodeFlags {
        self.inner.flags
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.inner.region.is_empty()
    }

    /// The parent, if attached and still alive.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.inner.parent.get().and_then(Weak::upgrade).map(Self::from_inner)
    }

    /// Parents from the nearest up to the top of the tree.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> {
        std::iter::successors(self.parent(), Self::parent)
    }

    /// Full dotted path from the root: `""` for an unnamed root, `.region`
    /// for a named root, `<parent namespace>.region` otherwise.
    #[must_use]
    pub fn namespace(&self) -> String {
        match self.parent() {
            Some(parent) => format!("{}{SEPARATOR}{}", parent.namespace(), self.inner.region),
            None if self.inner.region.is_empty() => String::new(),
            None => format!("{SEPARATOR}{}", self.inner.region),
        }
    }

    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.inner.state.read().children.is_empty()
    }

    /// Children in attachment order.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.inner.state.read().children.values().cloned().collect()
    }

    #[must_use]
    pub fn child(&self, region: &str) -> Option<Self> {
        self.inner.state.read().children.get(region).cloned()
    }

    #[must_use]
    pub fn has_definitions(&self) -> bool {
        !self.inner.state.read().definitions.is_empty()
    }

    /// Looks up a definition; dotted names are simplified first.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<Arc<PropertyDefinition>> {
        let (simple, _) = names::simplify(name);
        self.inner.state.read().definitions.get(simple).cloned()
    }

    /// Definitions in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<Arc<PropertyDefinition>> {
        self.inner.state.read().definitions.values().cloned().collect()
    }

    /// Starts registering a definition. See [`DefinitionBuilder`].
    pub fn define(
        &self,
        name: impl Into<String>,
        property_type: Arc<dyn PropertyType>,
    ) -> DefinitionBuilder<'_> {
        DefinitionBuilder {
            node: self,
            name: name.into(),
            property_type,
            description: None,
            flags: DefinitionFlags::empty(),
            replace: true,
            group: None,
        }
    }

    /// Registers (or replaces) a definition in the default group.
    ///
    /// # Errors
    /// See [`DefinitionBuilder::register`].
    pub fn add_definition(
        &self,
        name: impl Into<String>,
        property_type: Arc<dyn PropertyType>,
    ) -> Result<Arc<PropertyDefinition>, RegistryError> {
        self.define(name, property_type).register()
    }

    /// Registers (or replaces) a definition flagged [`DefinitionFlags::INTERNAL`].
    ///
    /// # Errors
    /// See [`DefinitionBuilder::register`].
    pub fn add_internal_definition(
        &self,
        name: impl Into<String>,
        property_type: Arc<dyn PropertyType>,
    ) -> Result<Arc<PropertyDefinition>, RegistryError> {
        self.define(name, property_type).flags(DefinitionFlags::INTERNAL).register()
    }

    /// Removes a definition from the node and from every group.
    pub fn remove_definition(&self, name: &str) -> Option<Arc<PropertyDefinition>> {
        let simple = self.simplify_name(name);
        let mut state = self.inner.state.write();
        let removed = state.definitions.remove(simple);
        for group in state.groups.values_mut() {
            group.remove_named(simple);
        }
        removed
    }

    /// Creates an empty group.
    ///
    /// # Errors
    /// * [`RegistryError::RegistrationConflict`] if the group exists (the default group always does).
    /// * [`RegistryError::InvalidArgument`] if `name` is blank.
    pub fn add_group(&self, name: impl Into<String>) -> Result<(), RegistryError> {
        let name = name.into();
        let mut state = self.inner.state.write();
        if state.groups.contains_key(&name) {
            return Err(RegistryError::conflict(format!("group '{name}' already exists")));
        }
        if name.trim().is_empty() {
            return Err(RegistryError::invalid_argument(format!("'{name}' is not a group name")));
        }
        state.groups.insert(name.clone(), DefinitionGroup::new(name));
        Ok(())
    }

    /// Removes a group, moving its definitions into the default group.
    ///
    /// Returns `false` for blank or unknown names; the default group is never removed.
    pub fn remove_group(&self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        let mut state = self.inner.state.write();
        let Some(removed) = state.groups.remove(name) else {
            return false;
        };
        if let Some(default) = state.groups.get_mut(DEFAULT_GROUP) {
            default.extend(removed.into_definitions());
        }
        true
    }

    /// Snapshot of a group.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<DefinitionGroup> {
        self.inner.state.read().groups.get(name).cloned()
    }

    /// Snapshots of all groups, the default group first.
    #[must_use]
    pub fn groups(&self) -> Vec<DefinitionGroup> {
        self.inner.state.read().groups.values().cloned().collect()
    }

    /// Returns `true` if both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Strips any namespace prefix, warning when it does not match this node.
    fn simplify_name<'n>(&self, name: &'n str) -> &'n str {
        let (simple, prefix) = names::simplify(name);
        if let Some(prefix) = prefix {
            let namespace = self.namespace();
            if prefix != namespace {
                let expected = format!("{namespace}{SEPARATOR}{simple}");
                warn!(
                    property = name,
                    expected = %expected,
                    "Inconsistent fully-qualified name for property definition"
                );
            }
        }
        simple
    }
}

impl fmt::Debug for RegistryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("RegistryNode")
            .field("namespace", &self.namespace())
            .field("flags", &self.inner.flags)
            .field("children", &state.children.len())
            .field("definitions", &state.definitions.len())
            .field("groups", &state.groups.len())
            .finish()
    }
}

impl fmt::Display for RegistryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = if self.is_root() { "<root>" } else { self.region() };
        write!(f, "{region}:{}", self.inner.state.read().children.len())
    }
}

/// Pending registration of a [`PropertyDefinition`].
///
/// Defaults: no description, no flags, replacement allowed, default group.
#[must_use = "nothing is registered until `register` is called"]
pub struct DefinitionBuilder<'n> {
    node: &'n RegistryNode,
    name: String,
    property_type: Arc<dyn PropertyType>,
    description: Option<String>,
    flags: DefinitionFlags,
    replace: bool,
    group: Option<String>,
}

impl DefinitionBuilder<'_> {
    /// Sets the description. When omitted, a replaced definition's description is kept.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn flags(mut self, flags: impl Into<DefinitionFlags>) -> Self {
        self.flags = flags.into();
        self
    }

    /// Whether an existing definition with the same name may be replaced.
    pub const fn replace(mut self, allow: bool) -> Self {
        self.replace = allow;
        self
    }

    /// Registers into the named group instead of the default one.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Validates and stores the definition.
    ///
    /// A dotted name is reduced to its last segment; a prefix that differs from
    /// the node's namespace only produces a warning. A replaced definition stays
    /// listed in the group it was originally registered in.
    ///
    /// # Errors
    /// * [`RegistryError::RegistrationConflict`] if the name exists and replacement is disabled.
    /// * [`RegistryError::InvalidArgument`] if the simplified name is malformed or the group is unknown.
    pub fn register(self) -> Result<Arc<PropertyDefinition>, RegistryError> {
        let node = self.node;
        let name = node.simplify_name(&self.name);
        let group = self.group.as_deref().unwrap_or(DEFAULT_GROUP);

        let mut state = node.inner.state.write();
        let previous = state.definitions.get(name).cloned();
        if previous.is_some() && !self.replace {
            return Err(RegistryError::RegistrationConflict {
                message: format!("property '{name}' is already defined").into(),
                context: Some(node.namespace().into()),
            });
        }
        if !names::is_valid_property_name(name) {
            return Err(RegistryError::InvalidArgument {
                message: format!("'{name}' is not a valid property name").into(),
                context: Some("property names start with an uppercase letter".into()),
            });
        }
        if !state.groups.contains_key(group) {
            return Err(RegistryError::invalid_argument(format!("unknown group '{group}'")));
        }

        let definition = Arc::new(PropertyDefinition {
            owner: Arc::downgrade(&node.inner),
            name: name.to_owned(),
            description: self
                .description
                .or_else(|| previous.and_then(|p| p.description.clone())),
            property_type: self.property_type,
            flags: self.flags,
        });

        state.definitions.insert(name, Arc::clone(&definition));
        if let Some(target) = state.groups.get_mut(group) {
            target.push(Arc::clone(&definition));
        }
        drop(state);

        trace!(property = name, group, "Property definition registered");
        Ok(definition)
    }
}

impl fmt::Debug for DefinitionBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionBuilder")
            .field("name", &self.name)
            .field("type", &self.property_type)
            .field("flags", &self.flags)
            .field("replace", &self.replace)
            .field("group", &self.group)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StringType;

    fn text() -> Arc<dyn PropertyType> {
        StringType::unbounded().unwrap()
    }

    #[test]
    fn namespace_of_roots() {
        assert_eq!(RegistryNode::root().namespace(), "");
        assert_eq!(RegistryNode::new("app").unwrap().namespace(), ".app");
    }

    #[test]
    fn namespace_of_nested_nodes() {
        let root = RegistryNode::root();
        let net = RegistryNode::with_parent("net", &root).unwrap();
        let http = RegistryNode::with_parent("http", &net).unwrap();
        assert_eq!(http.namespace(), ".net.http");

        let named = RegistryNode::new("app").unwrap();
        let ui = RegistryNode::with_parent("ui", &named).unwrap();
        assert_eq!(ui.namespace(), ".app.ui");
    }

    #[test]
    fn builder_rejects_invalid_region() {
        let err = RegistryNode::new("9lives").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument { .. }));
    }

    #[test]
    fn attach_cycle_is_rejected() {
        let a = RegistryNode::new("a").unwrap();
        let b = RegistryNode::with_parent("b", &a).unwrap();
        let err = a.attach(&b).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument { .. }));
        assert!(a.parent().is_none());
    }

    #[test]
    fn failed_registration_leaves_no_partial_state() {
        let node = RegistryNode::root();
        let err = node.define("Lost", text()).group("missing").register().unwrap_err();
        assert!(matches!(err, RegistryError::InvalidArgument { .. }));
        assert!(!node.has_definitions());
        assert!(node.group(DEFAULT_GROUP).unwrap().is_empty());
    }

    #[test]
    fn display_uses_root_placeholder() {
        let root = RegistryNode::root();
        let child = RegistryNode::with_parent("child", &root).unwrap();
        assert_eq!(root.to_string(), "<root>:1");
        assert_eq!(child.to_string(), "child:0");
    }
}
