//! Realm 组合树
//!
//! Arena of realm nodes. The host builds the tree while composing plugins;
//! the service registry only walks it.

use super::{Realm, RealmError, RealmId};
use serde_json::{Map, Value};

/// Arena-backed composition tree. Index 0 is always the root.
#[derive(Debug, Clone)]
pub struct RealmTree {
    nodes: Vec<Realm>,
}

impl RealmTree {
    /// Create a tree containing only the root realm.
    pub fn new(root_name: impl Into<String>) -> Self {
        let root = Realm::new(
            RealmId(0),
            root_name.into(),
            None,
            Value::Object(Map::new()),
        );
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> RealmId {
        RealmId(0)
    }

    pub fn is_root(&self, id: RealmId) -> bool {
        id == self.root()
    }

    pub fn contains(&self, id: RealmId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: RealmId) -> Option<&Realm> {
        self.nodes.get(id.0)
    }

    /// Fetch a realm or fail with [`RealmError::NotFound`].
    pub fn realm(&self, id: RealmId) -> Result<&Realm, RealmError> {
        self.get(id).ok_or(RealmError::NotFound(id))
    }

    pub fn parent(&self, id: RealmId) -> Option<RealmId> {
        self.get(id).and_then(|realm| realm.parent)
    }

    pub fn children(&self, id: RealmId) -> &[RealmId] {
        self.get(id)
            .map(|realm| realm.children.as_slice())
            .unwrap_or_default()
    }

    /// Plugin options of a realm; the root carries an empty object.
    pub fn options(&self, id: RealmId) -> Option<&Value> {
        self.get(id).map(|realm| &realm.options)
    }

    /// Attach a new child realm below `parent`.
    ///
    /// Sibling names must be unique, mirroring a host that refuses to
    /// register the same plugin twice at one level.
    pub fn add_child(
        &mut self,
        parent: RealmId,
        name: impl Into<String>,
        options: Value,
    ) -> Result<RealmId, RealmError> {
        let name = name.into();
        let siblings = &self.realm(parent)?.children;
        if siblings
            .iter()
            .any(|child| self.nodes[child.0].name == name)
        {
            return Err(RealmError::DuplicateChild { parent, name });
        }

        let id = RealmId(self.nodes.len());
        self.nodes.push(Realm::new(id, name, Some(parent), options));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Iterate over the ancestors of `id`, from its immediate parent up to
    /// and including the root. The realm itself is not yielded.
    pub fn ancestors(&self, id: RealmId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Visit every ancestor of `id` in child-to-root order, exactly once each.
    pub fn for_each_ancestor<F>(&self, id: RealmId, mut f: F)
    where
        F: FnMut(RealmId),
    {
        for ancestor in self.ancestors(id) {
            f(ancestor);
        }
    }

    /// Whether `ancestor` lies on the path from `id` to the root.
    pub fn is_ancestor(&self, ancestor: RealmId, id: RealmId) -> bool {
        self.ancestors(id).any(|candidate| candidate == ancestor)
    }

    /// Slash-separated names from the root down to `id`, used in log output.
    pub fn path(&self, id: RealmId) -> String {
        let mut names: Vec<&str> = self
            .ancestors(id)
            .filter_map(|ancestor| self.get(ancestor).map(Realm::name))
            .collect();
        names.reverse();
        if let Some(realm) = self.get(id) {
            names.push(realm.name());
        }
        names.join("/")
    }
}

/// Iterator returned by [`RealmTree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a RealmTree,
    next: Option<RealmId>,
}

impl Iterator for Ancestors<'_> {
    type Item = RealmId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
