//! Projection of definitions onto a key-value backend.
//!
//! Every definition maps to the key [`PropertyDefinition::qualified_name`].
//! The backend itself is opaque; [`MemoryStore`] is the bundled implementation.

use crate::definition::PropertyDefinition;
use crate::error::{RegistryError, RegistryErrorExt};
use fxhash::FxHashMap;
use parking_lot::RwLock;
use tracing::warn;

/// A key-value backend holding raw property values.
pub trait PropertyStore: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;

    fn save(&self, key: &str, value: &str);

    fn remove(&self, key: &str) -> Option<String>;
}

/// Thread-safe in-memory [`PropertyStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<FxHashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }
}

impl FromIterator<(String, String)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self { values: RwLock::new(iter.into_iter().collect()) }
    }
}

impl PropertyStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) {
        self.values.write().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) -> Option<String> {
        self.values.write().remove(key)
    }
}

impl PropertyDefinition {
    /// Reads the stored value, falling back to the type default.
    ///
    /// A stored value the type rejects is reported and replaced by the default.
    pub fn load_value(&self, store: &dyn PropertyStore) -> String {
        let key = self.qualified_name();
        match store.load(&key) {
            Some(value) => match self.property_type().validate(&value) {
                Ok(()) => value,
                Err(err) => {
                    warn!(key = %key, error = %err, "Stored value rejected, using default");
                    self.property_type().default_value().to_owned()
                },
            },
            None => self.property_type().default_value().to_owned(),
        }
    }

    /// Validates and writes a value.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] if the type rejects the value.
    pub fn save_value(&self, store: &dyn PropertyStore, value: &str) -> Result<(), RegistryError> {
        let key = self.qualified_name();
        self.property_type().validate(value).context(key.clone())?;
        store.save(&key, value);
        Ok(())
    }

    /// Removes the stored value so the default applies again.
    pub fn reset_value(&self, store: &dyn PropertyStore) -> Option<String> {
        store.remove(&self.qualified_name())
    }
}
