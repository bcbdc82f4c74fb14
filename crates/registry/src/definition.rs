use crate::node::{NodeInner, RegistryNode};
use crate::types::PropertyType;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};

bitflags! {
    /// Flags carried by a [`PropertyDefinition`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
    pub struct DefinitionFlags: u32 {
        /// Managed by the application itself rather than exposed to users.
        const INTERNAL = 1 << 0;
    }
}

impl From<u32> for DefinitionFlags {
    fn from(bits: u32) -> Self {
        Self::from_bits_retain(bits)
    }
}

/// A named, typed property owned by exactly one [`RegistryNode`].
///
/// Definitions are immutable. Registering a definition under an existing name
/// creates a new object; holders of the previous `Arc` keep seeing the old one.
pub struct PropertyDefinition {
    pub(crate) owner: Weak<NodeInner>,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) property_type: Arc<dyn PropertyType>,
    pub(crate) flags: DefinitionFlags,
}

impl PropertyDefinition {
    /// Simple (unqualified) name, e.g. `Timeout`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description, or an empty string when none was given.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn property_type(&self) -> &Arc<dyn PropertyType> {
        &self.property_type
    }

    #[must_use]
    pub const fn flags(&self) -> DefinitionFlags {
        self.flags
    }

    #[must_use]
    pub const fn is_internal(&self) -> bool {
        self.flags.contains(DefinitionFlags::INTERNAL)
    }

    /// The owning node, if it is still alive.
    #[must_use]
    pub fn owner(&self) -> Option<RegistryNode> {
        self.owner.upgrade().map(RegistryNode::from_inner)
    }

    /// Owner namespace joined with the simple name, e.g. `.net.http.Timeout`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        let namespace = self.owner().map(|node| node.namespace()).unwrap_or_default();
        format!("{namespace}.{}", self.name)
    }
}

impl fmt::Debug for PropertyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("type", &self.property_type)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for PropertyDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.property_type)
    }
}
