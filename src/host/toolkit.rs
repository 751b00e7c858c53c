//! Per-invocation call sites
//!
//! A [`Toolkit`] is what a handler of a plugin receives; a [`Request`] is a
//! unit of work routed to a realm. Both answer `services(all)` for the
//! realm they are bound to.

use super::server::Server;
use crate::service::{ServiceAccessor, Services};
use realm_common::RealmId;

#[derive(Debug, Clone)]
pub struct Toolkit {
    server: Server,
}

impl Toolkit {
    pub(crate) fn new(server: Server) -> Self {
        Self { server }
    }

    /// Realm of the plugin owning the handler.
    pub fn realm(&self) -> RealmId {
        self.server.realm()
    }

    pub fn server(&self) -> &Server {
        &self.server
    }
}

impl ServiceAccessor for Toolkit {
    fn services(&self, all: bool) -> Services {
        self.server.services(all)
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    path: String,
    server: Server,
}

impl Request {
    pub(crate) fn new(path: impl Into<String>, server: Server) -> Self {
        Self {
            path: path.into(),
            server,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Realm of the route serving the request.
    pub fn realm(&self) -> RealmId {
        self.server.realm()
    }

    pub fn server(&self) -> &Server {
        &self.server
    }
}

impl ServiceAccessor for Request {
    fn services(&self, all: bool) -> Services {
        self.server.services(all)
    }
}
