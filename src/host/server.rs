//! Reference host
//!
//! A `Server` is a handle on one realm of a shared plugin host: the root
//! server is created with [`Server::new`], plugin servers come out of
//! [`Server::register_plugin`]. Every handle shares the realm tree, the
//! state tree, the method table and the extension points.

use super::cache::MethodTable;
use super::ext::ExtRegistry;
use super::toolkit::{Request, Toolkit};
use crate::error::{Error, Result};
use crate::service::accessor::{ServiceAccessor, Services, resolve};
use crate::service::{BoundService, HookPoint, Registrar, ServiceInput, StateTree};
use parking_lot::{Mutex, RwLock};
use realm_common::{RealmId, RealmTree, RegistryConfig};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Weak};
use strum::Display;
use tracing::{info, warn};

/// Lifecycle phase of the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    /// Plugins and services are being registered.
    Composing,
    /// Pre-start hooks are running.
    Starting,
    Started,
    /// A pre-start hook failed; the host never started.
    Failed,
    Stopped,
}

struct ServerInner {
    config: RegistryConfig,
    realms: RwLock<RealmTree>,
    states: Mutex<StateTree>,
    methods: MethodTable,
    extensions: ExtRegistry,
    routes: RwLock<HashMap<String, RealmId>>,
    phase: Mutex<Phase>,
}

/// Host handle bound to one realm.
#[derive(Clone)]
pub struct Server {
    inner: Arc<ServerInner>,
    realm: RealmId,
}

/// Non-owning [`Server`] handle, as captured by service contexts.
#[derive(Clone)]
pub struct ServerHandle {
    inner: Weak<ServerInner>,
    realm: RealmId,
}

impl ServerHandle {
    /// A handle with no host behind it.
    pub fn detached(realm: RealmId) -> Self {
        Self {
            inner: Weak::new(),
            realm,
        }
    }

    pub fn realm(&self) -> RealmId {
        self.realm
    }

    pub fn upgrade(&self) -> Option<Server> {
        Some(Server {
            inner: self.inner.upgrade()?,
            realm: self.realm,
        })
    }
}

impl fmt::Debug for ServerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerHandle")
            .field("realm", &self.realm)
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl Server {
    /// Create the root server. The root realm is named after `config.name`.
    pub fn new(config: RegistryConfig) -> Self {
        let realms = RealmTree::new(config.name.clone());
        let root = realms.root();
        info!("Creating server {} ({})", config.name, config.registration.commit_mode);

        Self {
            inner: Arc::new(ServerInner {
                config,
                realms: RwLock::new(realms),
                states: Mutex::new(StateTree::new(root)),
                methods: MethodTable::new(),
                extensions: ExtRegistry::new(),
                routes: RwLock::new(HashMap::new()),
                phase: Mutex::new(Phase::Composing),
            }),
            realm: root,
        }
    }

    /// Load and validate a TOML configuration file, then create the root
    /// server from it.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = RegistryConfig::load(path)?;
        Ok(Self::new(config))
    }

    pub fn realm(&self) -> RealmId {
        self.realm
    }

    /// Handle on the root realm of the same host.
    pub fn root(&self) -> Server {
        self.with_realm(self.inner.realms.read().root())
    }

    pub fn is_root(&self) -> bool {
        self.inner.realms.read().is_root(self.realm)
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            inner: Arc::downgrade(&self.inner),
            realm: self.realm,
        }
    }

    /// Options the plugin owning this realm was registered with.
    pub fn plugin_options(&self) -> Value {
        self.inner
            .realms
            .read()
            .options(self.realm)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// `root/plugin/...` path of this realm.
    pub fn realm_path(&self) -> String {
        self.inner.realms.read().path(self.realm)
    }

    /// Register a plugin as a child realm of this one and run its
    /// composition closure with a server bound to the new realm.
    pub fn register_plugin<F>(&self, name: &str, options: Value, register: F) -> Result<Server>
    where
        F: FnOnce(&Server) -> Result<()>,
    {
        let child = {
            let mut realms = self.inner.realms.write();
            let child = realms.add_child(self.realm, name, options)?;
            info!("Registered plugin {}", realms.path(child));
            child
        };

        let server = self.with_realm(child);
        register(&server)?;
        Ok(server)
    }

    /// Register one descriptor or a list of descriptors on behalf of this
    /// server's realm.
    pub fn register_service_methods(&self, input: impl Into<ServiceInput>) -> Result<()> {
        let input = input.into();
        let registration = &self.inner.config.registration;

        let phase = self.phase();
        if phase != Phase::Composing && registration.warn_late_registration {
            warn!(
                "Registering services from {} while server is {}",
                self.realm_path(),
                phase
            );
        }

        let realms = self.inner.realms.read();
        let mut states = self.inner.states.lock();
        Registrar::new(
            &realms,
            &self.inner.methods,
            &self.inner.extensions,
            registration.commit_mode,
        )
        .register(&mut states, &self.handle(), &input)?;
        Ok(())
    }

    pub fn services(&self, all: bool) -> Services {
        resolve(&self.inner.states.lock(), self.realm, all)
    }

    /// Look up a method of the namespaced method table by `scope.name`.
    pub fn method(&self, key: &str) -> Option<BoundService> {
        self.inner.methods.get(key)
    }

    pub fn method_keys(&self) -> Vec<String> {
        self.inner.methods.keys()
    }

    /// Names of the hooks scheduled on `point`, in run order.
    pub fn hooks(&self, point: HookPoint) -> Vec<String> {
        self.inner.extensions.hook_names(point)
    }

    /// Declare a route served by this server's realm.
    pub fn route(&self, path: impl Into<String>) {
        let path = path.into();
        let mut routes = self.inner.routes.write();
        if let Some(previous) = routes.insert(path.clone(), self.realm)
            && previous != self.realm
        {
            warn!("Route {} moved from {} to {}", path, previous, self.realm);
        }
    }

    /// A unit of work against `path`, bound to the realm of the route.
    pub fn request(&self, path: &str) -> Option<Request> {
        let realm = *self.inner.routes.read().get(path)?;
        Some(Request::new(path, self.with_realm(realm)))
    }

    /// Handler toolkit of the plugin owning this realm.
    pub fn toolkit(&self) -> Toolkit {
        Toolkit::new(self.clone())
    }

    pub fn phase(&self) -> Phase {
        *self.inner.phase.lock()
    }

    /// Run pre-start hooks in registration order. The first failure
    /// aborts the start.
    pub async fn start(&self) -> Result<()> {
        self.transition(&[Phase::Composing], Phase::Starting)?;
        info!("Starting server {}", self.inner.config.name);

        match self.inner.extensions.run_pre_start().await {
            Ok(()) => {
                self.set_phase(Phase::Started);
                info!("Server {} started", self.inner.config.name);
                Ok(())
            }
            Err(e) => {
                self.set_phase(Phase::Failed);
                Err(e)
            }
        }
    }

    /// Run every post-stop hook, then report the first failure if any.
    pub async fn stop(&self) -> Result<()> {
        self.transition(&[Phase::Started, Phase::Failed], Phase::Stopped)?;
        info!("Stopping server {}", self.inner.config.name);

        let result = self.inner.extensions.run_post_stop().await;
        info!("Server {} stopped", self.inner.config.name);
        result
    }

    fn transition(&self, from: &[Phase], to: Phase) -> Result<()> {
        let mut phase = self.inner.phase.lock();
        if !from.contains(&phase) {
            return Err(Error::lifecycle(format!(
                "cannot move to {to} while server is {}",
                *phase
            )));
        }
        *phase = to;
        Ok(())
    }

    fn set_phase(&self, to: Phase) {
        *self.inner.phase.lock() = to;
    }

    fn with_realm(&self, realm: RealmId) -> Server {
        Server {
            inner: self.inner.clone(),
            realm,
        }
    }
}

impl ServiceAccessor for Server {
    fn services(&self, all: bool) -> Services {
        Server::services(self, all)
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("name", &self.inner.config.name)
            .field("realm", &self.realm)
            .field("phase", &self.phase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceDescriptor;
    use serde_json::json;

    fn server() -> Server {
        Server::new(RegistryConfig::default())
    }

    #[test]
    fn test_plugin_realms() {
        let server = server();
        let plugin = server
            .register_plugin("pluginOne", json!({ "key": "value" }), |_| Ok(()))
            .unwrap();

        assert!(server.is_root());
        assert!(!plugin.is_root());
        assert_eq!(plugin.plugin_options(), json!({ "key": "value" }));
        assert_eq!(plugin.realm_path(), "server/pluginOne");
        assert_eq!(plugin.root().realm(), server.realm());

        let err = server
            .register_plugin("pluginOne", json!({}), |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, Error::Realm(_)));
    }

    #[test]
    fn test_handle_upgrade() {
        let server = server();
        let handle = server.handle();
        assert_eq!(handle.upgrade().unwrap().realm(), server.realm());
        drop(server);
        assert!(handle.upgrade().is_none());
    }

    #[test]
    fn test_request_resolves_route_realm() {
        let server = server();
        let plugin = server
            .register_plugin("plugin", json!({}), |plugin| {
                plugin.route("/plugin");
                Ok(())
            })
            .unwrap();

        let request = server.request("/plugin").unwrap();
        assert_eq!(request.realm(), plugin.realm());
        assert!(server.request("/missing").is_none());
    }

    #[tokio::test]
    async fn test_phase_transitions() {
        let server = server();
        assert_eq!(server.phase(), Phase::Composing);

        let err = server.stop().await.unwrap_err();
        assert!(matches!(err, Error::Lifecycle { .. }));

        server.start().await.unwrap();
        assert_eq!(server.phase(), Phase::Started);
        assert!(server.start().await.is_err());

        server.stop().await.unwrap();
        assert_eq!(server.phase(), Phase::Stopped);
        assert_eq!(Phase::Stopped.to_string(), "stopped");
    }

    #[tokio::test]
    async fn test_late_registration_still_registers() {
        let server = server();
        server.start().await.unwrap();
        server
            .register_service_methods(
                ServiceDescriptor::new("late").method("one", |_, _| async { Ok(Value::Null) }),
            )
            .unwrap();
        assert!(server.services(true).contains_scope("late"));
    }
}
