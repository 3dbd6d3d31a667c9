//! Server adapter registry.
//!
//! A buildable names the server adapter that will serve its model by tag.
//! Adapters are registered on an explicit registry value handed to the
//! service at construction time; there is no ambient or global lookup, so
//! two registries can carry different adapter sets side by side.

use std::collections::HashMap;

/// A registered server adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAdapter {
    /// The tag buildables reference the adapter by.
    pub tag: String,
    /// Port the served model listens on inside the image.
    pub default_port: u16,
}

impl ServerAdapter {
    /// Creates an adapter descriptor.
    #[must_use]
    pub fn new(tag: impl Into<String>, default_port: u16) -> Self {
        Self {
            tag: tag.into(),
            default_port,
        }
    }
}

/// Tag-keyed collection of server adapters.
#[derive(Debug, Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, ServerAdapter>,
}

impl AdapterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter, replacing any previous one under the same tag.
    pub fn register(&mut self, adapter: ServerAdapter) {
        self.adapters.insert(adapter.tag.clone(), adapter);
    }

    /// Looks up an adapter by tag.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&ServerAdapter> {
        self.adapters.get(tag)
    }

    /// Registered tags, sorted.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_lookup() {
        let mut registry = AdapterRegistry::new();
        registry.register(ServerAdapter::new("rest", 9000));
        assert_eq!(registry.get("rest").map(|a| a.default_port), Some(9000));
        assert!(registry.get("grpc").is_none());
    }

    #[test]
    fn later_registration_wins() {
        let mut registry = AdapterRegistry::new();
        registry.register(ServerAdapter::new("rest", 9000));
        registry.register(ServerAdapter::new("rest", 8080));
        assert_eq!(registry.get("rest").map(|a| a.default_port), Some(8080));
        assert_eq!(registry.tags(), ["rest"]);
    }
}
