use std::collections::BTreeMap;

/// Which side of the scene a virtual attribute belongs to.
///
/// Attribute names that a system claims (e.g. `camera`) resolve to the
/// system's configuration; everything else is plain component data. The
/// mapping is fixed at scene-build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOwner {
    System,
    Component,
}

/// Static resolver for string-keyed scene attributes.
///
/// Routes are registered while the scene is built; lookups afterwards are
/// plain map reads with no capability probing.
#[derive(Debug, Default)]
pub struct AttributeRouter {
    routes: BTreeMap<String, AttributeOwner>,
    system_values: BTreeMap<String, String>,
    component_values: BTreeMap<String, String>,
}

impl AttributeRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim an attribute name for a system. Overrides a component route.
    pub fn register_system(&mut self, name: impl Into<String>) {
        self.routes.insert(name.into(), AttributeOwner::System);
    }

    /// Claim an attribute name for a component.
    pub fn register_component(&mut self, name: impl Into<String>) {
        let name = name.into();
        // Systems win: a name already claimed by a system stays a system
        // route.
        self.routes
            .entry(name)
            .or_insert(AttributeOwner::Component);
    }

    /// Resolve an attribute name. Unregistered names are component data.
    pub fn resolve(&self, name: &str) -> AttributeOwner {
        self.routes
            .get(name)
            .copied()
            .unwrap_or(AttributeOwner::Component)
    }

    /// Set an attribute value, routed by the static mapping.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.resolve(&name) {
            AttributeOwner::System => {
                tracing::trace!(%name, "system attribute updated");
                self.system_values.insert(name, value);
            }
            AttributeOwner::Component => {
                self.component_values.insert(name, value);
            }
        }
    }

    /// Read an attribute value, routed by the static mapping.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self.resolve(name) {
            AttributeOwner::System => self.system_values.get(name).map(String::as_str),
            AttributeOwner::Component => self.component_values.get(name).map(String::as_str),
        }
    }

    /// All component attributes, for config parsing.
    pub fn component_values(&self) -> &BTreeMap<String, String> {
        &self.component_values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_names_are_component_data() {
        let router = AttributeRouter::new();
        assert_eq!(router.resolve("position"), AttributeOwner::Component);
    }

    #[test]
    fn system_routes_win_over_component_routes() {
        let mut router = AttributeRouter::new();
        router.register_system("camera");
        router.register_component("camera");
        assert_eq!(router.resolve("camera"), AttributeOwner::System);
    }

    #[test]
    fn set_and_get_route_consistently() {
        let mut router = AttributeRouter::new();
        router.register_system("camera");
        router.set("camera", "active: true");
        router.set("position", "0 1 0");

        assert_eq!(router.get("camera"), Some("active: true"));
        assert_eq!(router.get("position"), Some("0 1 0"));
        assert!(router.component_values().contains_key("position"));
        assert!(!router.component_values().contains_key("camera"));
    }

    #[test]
    fn system_and_component_stores_are_disjoint() {
        let mut router = AttributeRouter::new();
        router.set("renderer", "maxCanvasWidth: 640");
        // Claiming the name afterwards re-routes reads to the (empty)
        // system store; the component value is not silently re-homed.
        router.register_system("renderer");
        assert_eq!(router.get("renderer"), None);
    }
}
