//! 服务注册模块
//!
//! Scoped service registry: descriptors are validated, bound to the
//! registering realm, checked for global scope uniqueness and propagated to
//! every ancestor realm.
//!
//! ## 核心概念
//!
//! - `ServiceDescriptor`: a scope and the services registered under it
//! - `Registrar`: one registration pass against the host's collaborators
//! - `StateTree`: canonical map on the root, mirrored maps everywhere else
//! - `ServiceAccessor`: `services(all)` as seen from a server, toolkit or request
//! - `MethodFacility` / `ExtensionPoints`: what the registry needs from its host

pub mod accessor;
pub mod context;
pub mod descriptor;
pub mod facility;
pub mod lifecycle;
pub mod method;
pub mod registrar;
pub mod state;

pub use accessor::{ServiceAccessor, Services};
pub use context::{ContextMap, ServiceContext};
pub use descriptor::{
    CacheOptions, CachePolicy, ServiceDescriptor, ServiceEntry, ServiceInput, ValidDescriptor,
    ValidService, validate,
};
pub use facility::MethodFacility;
pub use lifecycle::{ExtensionPoints, HookPoint, LifecycleHook};
pub use method::{BoundService, ServiceFn, ServiceFuture, service_fn};
pub use registrar::{Registrar, method_key};
pub use state::{ScopeServices, ServiceMap, ServiceState, StateTree};
