//! Realm 核心数据结构
//!
//! 定义 Realm 节点的核心数据结构和基础方法

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identity of a realm inside a [`RealmTree`](super::RealmTree).
///
/// Ids are arena indices; they are never reused for the lifetime of a tree.
/// The default id is the root of every tree.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RealmId(pub(crate) usize);

impl RealmId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RealmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "realm#{}", self.0)
    }
}

/// Realm 是组合树中的一个节点，代表一个独立组合的子应用（插件）。
///
/// The parent link is an id rather than a reference: it is only used to walk
/// towards the root and never owns the parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Realm {
    pub id: RealmId,
    pub name: String,
    pub parent: Option<RealmId>,
    pub children: Vec<RealmId>,

    /// Options the plugin owning this realm was registered with.
    pub options: Value,
}

impl Realm {
    pub(crate) fn new(id: RealmId, name: String, parent: Option<RealmId>, options: Value) -> Self {
        Self {
            id,
            name,
            parent,
            children: Vec::new(),
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
