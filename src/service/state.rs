//! Per-realm service state
//!
//! The root realm's state is the canonical map of every scope registered
//! anywhere in the tree. Every other realm holds a partial mirror: its own
//! registrations plus whatever was mirrored up from its descendants.

use super::method::BoundService;
use indexmap::IndexMap;
use realm_common::{RealmId, RealmTree};
use std::collections::HashMap;
use tracing::debug;

/// Services of one scope, by name, in registration order.
pub type ScopeServices = IndexMap<String, BoundService>;

/// Scopes in registration order.
pub type ServiceMap = IndexMap<String, ScopeServices>;

#[derive(Debug, Default, Clone)]
pub struct ServiceState {
    initialized: bool,
    services: ServiceMap,
}

impl ServiceState {
    fn initialized() -> Self {
        Self {
            initialized: true,
            services: ServiceMap::new(),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn services(&self) -> &ServiceMap {
        &self.services
    }

    pub fn contains_scope(&self, scope: &str) -> bool {
        self.services.contains_key(scope)
    }

    /// Add `name` to `scope`, next to whatever that scope already holds.
    fn merge(&mut self, scope: &str, name: &str, method: BoundService) {
        self.services
            .entry(scope.to_string())
            .or_default()
            .insert(name.to_string(), method);
    }
}

/// Lazily materialized [`ServiceState`] for every realm that needs one.
#[derive(Debug)]
pub struct StateTree {
    root: RealmId,
    canonical: ServiceState,
    locals: HashMap<RealmId, ServiceState>,
}

impl StateTree {
    /// Create the tree with the root's canonical state already in place.
    pub fn new(root: RealmId) -> Self {
        Self {
            root,
            canonical: ServiceState::initialized(),
            locals: HashMap::new(),
        }
    }

    pub fn root(&self) -> RealmId {
        self.root
    }

    /// Idempotent: the first call for a realm installs an empty services
    /// map and marks the state initialized; later calls return it as is.
    pub fn get_or_create(&mut self, realm: RealmId) -> &mut ServiceState {
        if realm == self.root {
            return &mut self.canonical;
        }
        self.locals
            .entry(realm)
            .or_insert_with(ServiceState::initialized)
    }

    pub fn get(&self, realm: RealmId) -> Option<&ServiceState> {
        if realm == self.root {
            Some(&self.canonical)
        } else {
            self.locals.get(&realm)
        }
    }

    /// The root's state.
    pub fn canonical(&self) -> &ServiceState {
        &self.canonical
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.canonical.contains_scope(scope)
    }

    /// Number of realms that currently hold a state, root included.
    pub fn realm_count(&self) -> usize {
        self.locals.len() + 1
    }

    /// Record `scope.name` in the canonical map, then mirror it into the
    /// local state of the registering realm and of each of its ancestors
    /// below the root, creating those states on the way if needed.
    pub fn propagate(
        &mut self,
        realms: &RealmTree,
        realm: RealmId,
        scope: &str,
        name: &str,
        method: BoundService,
    ) {
        let root = self.root;
        self.canonical.merge(scope, name, method.clone());

        let mut mirrored = 0usize;
        for target in std::iter::once(realm).chain(realms.ancestors(realm)) {
            if target == root {
                continue;
            }
            self.get_or_create(target)
                .merge(scope, name, method.clone());
            mirrored += 1;
        }

        debug!(
            "Propagated {}.{} from {} to {} local state(s)",
            scope,
            name,
            realms.path(realm),
            mirrored
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn service(key: &str) -> BoundService {
        BoundService::from_fn(key.to_string(), |_| Box::pin(async { Ok(Value::Null) }))
    }

    fn tree() -> (RealmTree, RealmId, RealmId, RealmId) {
        let mut realms = RealmTree::new("server");
        let b = realms.add_child(realms.root(), "pluginB", json!({})).unwrap();
        let a = realms.add_child(b, "pluginA", json!({})).unwrap();
        let c = realms.add_child(realms.root(), "pluginC", json!({})).unwrap();
        (realms, a, b, c)
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let (realms, a, ..) = tree();
        let mut states = StateTree::new(realms.root());
        assert!(states.get(a).is_none());

        assert!(states.get_or_create(a).is_initialized());
        states.propagate(&realms, a, "first", "method", service("first.method"));
        let state = states.get_or_create(a);
        assert!(state.contains_scope("first"));
        assert_eq!(states.realm_count(), 3);
    }

    #[test]
    fn test_propagate_reaches_every_ancestor() {
        let (realms, a, b, c) = tree();
        let mut states = StateTree::new(realms.root());

        states.propagate(&realms, a, "first", "method", service("first.method"));

        assert!(states.has_scope("first"));
        assert!(states.get(a).unwrap().contains_scope("first"));
        assert!(states.get(b).unwrap().contains_scope("first"));
        assert!(states.get(c).is_none());
    }

    #[test]
    fn test_merge_keeps_existing_names() {
        let (realms, a, b, _) = tree();
        let mut states = StateTree::new(realms.root());

        states.propagate(&realms, b, "own", "x", service("own.x"));
        states.propagate(&realms, a, "first", "one", service("first.one"));
        states.propagate(&realms, a, "first", "two", service("first.two"));

        let local = states.get(b).unwrap().services();
        assert_eq!(local.keys().collect::<Vec<_>>(), vec!["own", "first"]);
        assert_eq!(
            local["first"].keys().collect::<Vec<_>>(),
            vec!["one", "two"]
        );
        assert_eq!(states.canonical().services()["first"].len(), 2);
    }

    #[test]
    fn test_root_registration_touches_only_canonical() {
        let (realms, ..) = tree();
        let mut states = StateTree::new(realms.root());

        states.propagate(&realms, realms.root(), "root", "x", service("root.x"));

        assert!(states.has_scope("root"));
        assert_eq!(states.realm_count(), 1);
    }
}
