//! Name → behavior lookup, partitioned into components and properties.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use super::BehaviorRef;

static STANDARD: LazyLock<Registry> = LazyLock::new(|| {
    let mut registry = Registry::new();
    super::icalendar::register(&mut registry);
    super::vcard::register(&mut registry);
    tracing::debug!(
        components = registry.components.len(),
        properties = registry.properties.len(),
        "Built standard behavior registry"
    );
    registry
});

/// Fallback key inside each partition.
const DEFAULT_KEY: &str = "";

/// Immutable-after-build mapping from uppercased name to behaviors.
///
/// A name may be registered once per version, which keeps iCalendar and
/// vCard properties of the same name apart.
#[derive(Default)]
pub struct Registry {
    components: HashMap<String, Vec<BehaviorRef>>,
    properties: HashMap<String, Vec<BehaviorRef>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut components: Vec<&String> = self.components.keys().collect();
        let mut properties: Vec<&String> = self.properties.keys().collect();
        components.sort();
        properties.sort();
        f.debug_struct("Registry")
            .field("components", &components)
            .field("properties", &properties)
            .finish()
    }
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry with every built-in iCalendar and vCard behavior.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// Adds `behavior` under its name, and as its partition's fallback when
    /// `is_default` is set.
    pub fn register(&mut self, behavior: BehaviorRef, is_default: bool) {
        let partition = if behavior.is_component() {
            &mut self.components
        } else {
            &mut self.properties
        };
        let entry = partition
            .entry(behavior.name().to_ascii_uppercase())
            .or_default();
        if !entry.iter().any(|b| b.version() == behavior.version()) {
            entry.push(behavior);
        }
        if is_default {
            partition.insert(DEFAULT_KEY.to_string(), vec![behavior]);
        }
    }

    /// With a version, only an exact match or a version-less entry will do;
    /// without one, the first registration wins.
    fn pick(entries: Option<&Vec<BehaviorRef>>, version: Option<&str>) -> Option<BehaviorRef> {
        let entries = entries?;
        match version {
            Some(v) => entries
                .iter()
                .copied()
                .find(|b| b.version() == Some(v))
                .or_else(|| entries.iter().copied().find(|b| b.version().is_none())),
            None => entries.first().copied(),
        }
    }

    #[must_use]
    pub fn component(&self, name: &str, version: Option<&str>) -> Option<BehaviorRef> {
        Self::pick(self.components.get(&name.to_ascii_uppercase()), version)
    }

    #[must_use]
    pub fn property(&self, name: &str, version: Option<&str>) -> Option<BehaviorRef> {
        Self::pick(self.properties.get(&name.to_ascii_uppercase()), version)
    }

    /// Looks a name up in either partition, components first.
    #[must_use]
    pub fn lookup(&self, name: &str, version: Option<&str>) -> Option<BehaviorRef> {
        self.component(name, version)
            .or_else(|| self.property(name, version))
    }

    #[must_use]
    pub fn default_component(&self) -> Option<BehaviorRef> {
        Self::pick(self.components.get(DEFAULT_KEY), None)
    }

    #[must_use]
    pub fn default_property(&self) -> Option<BehaviorRef> {
        Self::pick(self.properties.get(DEFAULT_KEY), None)
    }

    /// Whether `name` is registered as a component behavior.
    #[must_use]
    pub fn is_component_name(&self, name: &str) -> bool {
        !name.is_empty() && self.components.contains_key(&name.to_ascii_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::behavior::Behavior;

    #[derive(Debug)]
    struct Probe(&'static str, Option<&'static str>, bool);

    impl Behavior for Probe {
        fn name(&self) -> &'static str {
            self.0
        }
        fn version(&self) -> Option<&'static str> {
            self.1
        }
        fn is_component(&self) -> bool {
            self.2
        }
    }

    static OLD: Probe = Probe("VTHING", Some("1.0"), true);
    static NEW: Probe = Probe("VTHING", Some("2.0"), true);
    static LINE: Probe = Probe("X-THING", None, false);

    #[test]
    fn partitions_are_separate() {
        let mut registry = Registry::new();
        registry.register(&OLD, false);
        registry.register(&LINE, true);

        assert!(registry.component("vthing", None).is_some());
        assert!(registry.property("VTHING", None).is_none());
        assert!(registry.property("X-THING", None).is_some());
        assert_eq!(registry.default_property().map(|b| b.name()), Some("X-THING"));
        assert!(registry.default_component().is_none());
    }

    #[test]
    fn version_selection() {
        let mut registry = Registry::new();
        registry.register(&OLD, false);
        registry.register(&NEW, false);
        registry.register(&NEW, false);

        assert_eq!(registry.component("VTHING", Some("2.0")).and_then(|b| b.version()), Some("2.0"));
        assert!(registry.component("VTHING", Some("9.9")).is_none());
        assert_eq!(registry.component("VTHING", None).and_then(|b| b.version()), Some("1.0"));
    }

    #[test]
    fn missing_name_is_not_an_error() {
        let registry = Registry::new();
        assert!(registry.lookup("VEVENT", None).is_none());
        assert!(!registry.is_component_name(""));
    }

    #[test]
    fn standard_registry_knows_both_formats() {
        let registry = Registry::standard();
        assert!(registry.is_component_name("VEVENT"));
        assert!(registry.is_component_name("VCARD"));
        assert!(registry.property("RRULE", None).is_some());
        assert!(registry.property("ADR", None).is_some());
        assert!(registry.default_property().is_some());
    }
}
