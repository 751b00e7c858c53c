//! # realm-services
//!
//! 作用域服务注册中心：插件按 scope 注册服务方法，服务沿 realm 树向祖先传播，
//! `initialize` / `teardown` 自动挂接到宿主的启动前 / 停止后扩展点。

pub mod error;
pub mod host;
pub mod observability;
pub mod service;

// Re-export commonly used types
pub use error::{Error, Result};
pub use host::{Phase, Request, Server, ServerHandle, Toolkit};
pub use realm_common::{CommitMode, RealmId, RegistryConfig};
pub use service::{
    BoundService, CacheOptions, ServiceAccessor, ServiceContext, ServiceDescriptor, ServiceEntry,
    ServiceInput, Services, service_fn,
};
