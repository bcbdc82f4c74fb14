//! # Registry
//!
//! A hierarchical registry of property definitions.
//!
//! ## Overview
//!
//! * [`RegistryNode`]s form a tree. Each node has a region (its local name) and
//!   derives its namespace from the chain of parents, e.g. `.net.http`.
//! * A node owns [`PropertyDefinition`]s, keyed by their simple name, and
//!   organizes them into [`DefinitionGroup`]s. The default group `""` always exists.
//! * Definitions carry a shared [`PropertyType`]; [`StringType`] descriptors are
//!   interned so equal values share one instance.
//! * [`PropertyStore`] is the seam towards a key-value backend.
//!
//! # Example
//!
//! ```rust
//! use strata_registry::{RegistryError, RegistryNode, StringType};
//!
//! # fn main() -> Result<(), RegistryError> {
//! let root = RegistryNode::root();
//! let http = RegistryNode::with_parent("http", &root)?;
//!
//! let text = StringType::intern(0, 64, "")?;
//! http.define("UserAgent", text).description("Sent with every request").register()?;
//!
//! let agent = http.definition(".http.UserAgent").expect("registered");
//! assert_eq!(agent.qualified_name(), ".http.UserAgent");
//! assert_eq!(agent.description(), "Sent with every request");
//! # Ok(())
//! # }
//! ```

mod definition;
mod error;
mod group;
pub mod names;
mod node;
mod ordered;
mod store;
mod types;

pub use definition::{DefinitionFlags, PropertyDefinition};
pub use error::{RegistryError, RegistryErrorExt};
pub use group::{DEFAULT_GROUP, DefinitionGroup};
pub use node::{DefinitionBuilder, NodeBuilder, NodeFlags, RegistryNode};
pub use store::{MemoryStore, PropertyStore};
pub use types::{PropertyType, StringType};
