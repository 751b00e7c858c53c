//! Execution context handed to every service method

use crate::host::{Server, ServerHandle};
use realm_common::RealmId;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Custom context values supplied by a descriptor, keyed by name.
pub type ContextMap = HashMap<String, Arc<dyn Any + Send + Sync>>;

/// What a service method sees instead of an implicit receiver: the host
/// handle of the registering realm, that realm's plugin options and the
/// descriptor's custom context values.
#[derive(Clone)]
pub struct ServiceContext {
    server: ServerHandle,
    options: Value,
    values: Arc<ContextMap>,
}

impl ServiceContext {
    pub fn new(server: ServerHandle, options: Value, values: Arc<ContextMap>) -> Self {
        Self {
            server,
            options,
            values,
        }
    }

    /// Host handle bound to the registering realm. `None` once the server
    /// has been dropped; the context never keeps the host alive.
    pub fn server(&self) -> Option<Server> {
        self.server.upgrade()
    }

    pub fn realm(&self) -> RealmId {
        self.server.realm()
    }

    /// Options of the plugin that registered the service.
    pub fn options(&self) -> &Value {
        &self.options
    }

    /// Typed lookup of a custom context value.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref::<T>()
    }

    /// Typed lookup returning a shared handle, for values that must outlive
    /// the borrow of the context (e.g. moved into a spawned task).
    pub fn get_arc<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.values.get(key)?.clone().downcast::<T>().ok()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("ServiceContext")
            .field("realm", &self.realm())
            .field("options", &self.options)
            .field("values", &keys)
            .finish()
    }
}
