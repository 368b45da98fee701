//! # Registry Module
//!
//! Startup-time wiring container. Route groups and the server obtain shared
//! handles (configuration, store, instance id, route table) from here without
//! depending on each other's modules.
//!
//! Keys are typed: a [`RegistryKey<T>`] can only ever store and yield a `T`, so a
//! lookup either returns the value or `None`. There is no runtime cast that can
//! fail on a caller.
//!
//! ## Lifecycle
//!
//! All writes go through `&mut Registry` and happen during startup. Once the
//! registry is frozen into an `Arc<Registry>` and shared with request handlers it
//! can no longer be written, so a data race on a key is not expressible.
//!
//! ```rust
//! use pkgmeta::registry::{Registry, RegistryKey};
//!
//! const PORT: RegistryKey<u16> = RegistryKey::new("port");
//!
//! let mut registry = Registry::new();
//! registry.set(PORT, 8080);
//! registry.set(PORT, 9090);
//! assert_eq!(registry.get(PORT).as_deref(), Some(&9090));
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

/// Typed handle for one registry slot.
pub struct RegistryKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> RegistryKey<T> {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for RegistryKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RegistryKey<T> {}

impl<T> fmt::Debug for RegistryKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RegistryKey").field(&self.name).finish()
    }
}

/// Well-known registry slots used by the service.
pub mod keys {
    use std::sync::Arc;

    use super::RegistryKey;
    use crate::config::AppConfig;
    use crate::ids::InstanceId;
    use crate::route_manager::RouteTable;
    use crate::store::MetaStore;

    pub const CONFIG: RegistryKey<AppConfig> = RegistryKey::new("config");
    pub const INSTANCE_ID: RegistryKey<InstanceId> = RegistryKey::new("instance_id");
    pub const STORE: RegistryKey<Arc<dyn MetaStore>> = RegistryKey::new("store");
    pub const ROUTES: RegistryKey<RouteTable> = RegistryKey::new("route_manager");
}

/// Process-wide key/value container, populated once at startup.
#[derive(Default)]
pub struct Registry {
    entries: HashMap<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the value stored under `key`.
    pub fn set<T: Send + Sync + 'static>(&mut self, key: RegistryKey<T>, value: T) {
        let replaced = self.entries.insert(key.name, Arc::new(value)).is_some();
        debug!(key = key.name, replaced, "Registry entry set");
    }

    /// Fetch the value stored under `key`, or `None` when it was never set.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self, key: RegistryKey<T>) -> Option<Arc<T>> {
        let entry = self.entries.get(key.name)?;
        Arc::clone(entry).downcast::<T>().ok()
    }

    #[must_use]
    pub fn contains<T>(&self, key: RegistryKey<T>) -> bool {
        self.entries.contains_key(key.name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&&str> = self.entries.keys().collect();
        names.sort();
        f.debug_struct("Registry").field("keys", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREETING: RegistryKey<String> = RegistryKey::new("greeting");

    #[test]
    fn get_returns_none_when_absent() {
        let registry = Registry::new();
        assert!(registry.get(GREETING).is_none());
        assert!(!registry.contains(GREETING));
    }

    #[test]
    fn set_overwrites_previous_value() {
        let mut registry = Registry::new();
        registry.set(GREETING, "v1".to_string());
        registry.set(GREETING, "v2".to_string());
        assert_eq!(registry.get(GREETING).as_deref().map(String::as_str), Some("v2"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn mismatched_key_type_is_absent() {
        const AS_NUMBER: RegistryKey<u32> = RegistryKey::new("greeting");
        let mut registry = Registry::new();
        registry.set(GREETING, "hello".to_string());
        assert!(registry.get(AS_NUMBER).is_none());
    }
}
