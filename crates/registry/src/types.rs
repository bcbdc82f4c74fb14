//! Value-type descriptors attached to property definitions.
//!
//! Descriptors are immutable and shared. [`StringType`] instances are interned:
//! equal-valued descriptors resolve to a single `Arc` for as long as any caller
//! holds it. The intern table keeps only weak references, so unused entries are
//! dropped and their slots reclaimed on the next purge.

use crate::error::RegistryError;
use fxhash::FxHashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, LazyLock, Weak};
use tracing::debug;

/// Slots reclaimed once the table reaches this size at the earliest.
const MIN_PURGE_THRESHOLD: usize = 64;

/// Behaviour shared by every property value type.
pub trait PropertyType: fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Short, lowercase name of the value kind (e.g. `"string"`).
    fn kind(&self) -> &'static str;

    /// Value used when nothing has been stored for a property.
    fn default_value(&self) -> &str;

    /// Checks a raw value against the type's constraints.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] if the value is rejected.
    fn validate(&self, value: &str) -> Result<(), RegistryError>;
}

/// Bounded string type with a default value.
///
/// Lengths are counted in Unicode scalar values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StringType {
    min: usize,
    max: usize,
    default: String,
}

struct Interner {
    entries: FxHashMap<StringType, Weak<StringType>>,
    purge_at: usize,
}

impl Interner {
    fn purge(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, weak| weak.strong_count() > 0);
        self.purge_at = MIN_PURGE_THRESHOLD.max(self.entries.len() * 2);
        before - self.entries.len()
    }
}

static INTERNER: LazyLock<Mutex<Interner>> = LazyLock::new(|| {
    Mutex::new(Interner { entries: FxHashMap::default(), purge_at: MIN_PURGE_THRESHOLD })
});

impl StringType {
    /// Returns the canonical descriptor for `(min, max, default)`.
    ///
    /// Lookup and insertion happen under a single lock, so concurrent callers
    /// interning equal values always receive the same instance.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidArgument`] if the length of `default`
    /// lies outside `[min, max]`.
    pub fn intern(
        min: usize,
        max: usize,
        default: impl Into<String>,
    ) -> Result<Arc<Self>, RegistryError> {
        let candidate = Self { min, max, default: default.into() };
        let len = candidate.default.chars().count();
        if len < min || len > max {
            return Err(RegistryError::InvalidArgument {
                message: format!("default value length {len} is outside [{min}, {max}]").into(),
                context: Some("interning string type".into()),
            });
        }

        let mut interner = INTERNER.lock();
        if let Some(live) = interner.entries.get(&candidate).and_then(Weak::upgrade) {
            return Ok(live);
        }

        if interner.entries.len() >= interner.purge_at {
            let removed = interner.purge();
            debug!(removed, remaining = interner.entries.len(), "Purged dead string types");
        }

        let canonical = Arc::new(candidate.clone());
        interner.entries.insert(candidate, Arc::downgrade(&canonical));
        Ok(canonical)
    }

    /// Unbounded string type defaulting to the empty string.
    ///
    /// # Errors
    /// Never fails in practice; the signature mirrors [`StringType::intern`].
    pub fn unbounded() -> Result<Arc<Self>, RegistryError> {
        Self::intern(0, usize::MAX, "")
    }

    /// Returns `true` while a live canonical instance exists for the value.
    #[must_use]
    pub fn is_interned(min: usize, max: usize, default: &str) -> bool {
        let probe = Self { min, max, default: default.to_owned() };
        INTERNER.lock().entries.get(&probe).is_some_and(|weak| weak.strong_count() > 0)
    }

    /// Drops table slots whose descriptors are no longer referenced.
    ///
    /// Returns the number of reclaimed slots.
    pub fn purge_interned() -> usize {
        let removed = INTERNER.lock().purge();
        debug!(removed, "Purged dead string types on request");
        removed
    }

    #[must_use]
    pub const fn min(&self) -> usize {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> usize {
        self.max
    }
}

impl PropertyType for StringType {
    fn kind(&self) -> &'static str {
        "string"
    }

    fn default_value(&self) -> &str {
        &self.default
    }

    fn validate(&self, value: &str) -> Result<(), RegistryError> {
        let len = value.chars().count();
        if (self.min..=self.max).contains(&len) {
            Ok(())
        } else {
            Err(RegistryError::InvalidArgument {
                message: format!("length {len} is outside [{}, {}]", self.min, self.max).into(),
                context: None,
            })
        }
    }
}

impl fmt::Display for StringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.max == usize::MAX {
            write!(f, "string[{}..]", self.min)
        } else {
            write!(f, "string[{}..={}]", self.min, self.max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_returns_same_instance_for_equal_values() {
        let a = StringType::intern(1, 5, "abc").unwrap();
        let b = StringType::intern(1, 5, "abc").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn intern_distinguishes_different_values() {
        let a = StringType::intern(1, 5, "abc").unwrap();
        let b = StringType::intern(0, 5, "abc").unwrap();
        let c = StringType::intern(1, 5, "abd").unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn intern_rejects_default_outside_bounds() {
        let too_long = StringType::intern(1, 2, "abc");
        assert!(matches!(too_long, Err(RegistryError::InvalidArgument { .. })));

        let too_short = StringType::intern(2, 4, "a");
        assert!(matches!(too_short, Err(RegistryError::InvalidArgument { .. })));

        let inverted = StringType::intern(3, 1, "ab");
        assert!(matches!(inverted, Err(RegistryError::InvalidArgument { .. })));
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let ty = StringType::intern(0, 3, "äöü").unwrap();
        assert!(ty.validate("ßßß").is_ok());
        assert!(ty.validate("ßßßß").is_err());
    }

    #[test]
    fn unreferenced_entries_are_reclaimed() {
        let ty = StringType::intern(0, 64, "types::reclaim-probe").unwrap();
        assert!(StringType::is_interned(0, 64, "types::reclaim-probe"));

        drop(ty);
        assert!(!StringType::is_interned(0, 64, "types::reclaim-probe"));

        StringType::purge_interned();
        let again = StringType::intern(0, 64, "types::reclaim-probe").unwrap();
        assert_eq!(again.default_value(), "types::reclaim-probe");
    }

    #[test]
    fn display_shows_bounds() {
        assert_eq!(StringType::intern(1, 5, "abc").unwrap().to_string(), "string[1..=5]");
        assert_eq!(StringType::unbounded().unwrap().to_string(), "string[0..]");
    }
}
