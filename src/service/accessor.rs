//! Read-only access to registered services
//!
//! The same query is exposed by the composition node ([`Server`]), the
//! per-invocation [`Toolkit`] and the per-unit-of-work [`Request`]; each
//! resolves "self" to a different realm.
//!
//! [`Server`]: crate::host::Server
//! [`Toolkit`]: crate::host::Toolkit
//! [`Request`]: crate::host::Request

use super::method::BoundService;
use super::state::{ScopeServices, ServiceMap, StateTree};
use realm_common::RealmId;

/// Query surface shared by every call site.
pub trait ServiceAccessor {
    /// With `all`, or when called on the root realm, every scope registered
    /// anywhere in the tree. Otherwise the calling realm's local view: its
    /// own registrations plus those mirrored up from its descendants.
    fn services(&self, all: bool) -> Services;
}

/// Snapshot of a service map.
///
/// Only lookups and iteration are exposed, so the registry's maps cannot be
/// replaced through it.
#[derive(Debug, Clone, Default)]
pub struct Services {
    map: ServiceMap,
}

impl Services {
    pub fn scope(&self, scope: &str) -> Option<&ScopeServices> {
        self.map.get(scope)
    }

    pub fn get(&self, scope: &str, name: &str) -> Option<&BoundService> {
        self.map.get(scope)?.get(name)
    }

    pub fn contains_scope(&self, scope: &str) -> bool {
        self.map.contains_key(scope)
    }

    /// Scope names in registration order.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScopeServices)> {
        self.map.iter().map(|(scope, services)| (scope.as_str(), services))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Resolve the view seen from `realm`.
pub fn resolve(states: &StateTree, realm: RealmId, all: bool) -> Services {
    let state = if all || realm == states.root() {
        Some(states.canonical())
    } else {
        states.get(realm)
    };

    Services {
        map: state
            .map(|state| state.services().clone())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realm_common::RealmTree;
    use serde_json::{Value, json};

    fn service(key: &str) -> BoundService {
        BoundService::from_fn(key.to_string(), |_| Box::pin(async { Ok(Value::Null) }))
    }

    #[test]
    fn test_resolve_views() {
        let mut realms = RealmTree::new("server");
        let one = realms.add_child(realms.root(), "pluginOne", json!({})).unwrap();
        let two = realms.add_child(realms.root(), "pluginTwo", json!({})).unwrap();
        let idle = realms.add_child(realms.root(), "idle", json!({})).unwrap();

        let mut states = StateTree::new(realms.root());
        states.propagate(&realms, one, "blue", "one", service("blue.one"));
        states.propagate(&realms, two, "red", "one", service("red.one"));

        let local = resolve(&states, one, false);
        assert_eq!(local.scopes().collect::<Vec<_>>(), vec!["blue"]);

        let all = resolve(&states, one, true);
        assert_eq!(all.scopes().collect::<Vec<_>>(), vec!["blue", "red"]);

        let root = resolve(&states, realms.root(), false);
        assert_eq!(root.len(), 2);

        assert!(resolve(&states, idle, false).is_empty());
    }

    #[test]
    fn test_lookup_helpers() {
        let realms = RealmTree::new("server");
        let mut states = StateTree::new(realms.root());
        states.propagate(&realms, realms.root(), "sqs", "init", service("sqs.init"));

        let services = resolve(&states, realms.root(), false);
        assert_eq!(services.get("sqs", "init").unwrap().key(), "sqs.init");
        assert!(services.get("sqs", "missing").is_none());
        assert!(services.contains_scope("sqs"));
        assert_eq!(services.scope("sqs").unwrap().len(), 1);
        assert_eq!(services.iter().count(), 1);
    }
}
