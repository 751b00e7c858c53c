//! Service callables
//!
//! A service method receives its execution context explicitly as the first
//! argument and a JSON argument value as the second. Once bound to a context
//! it becomes a [`BoundService`], the value stored in the service maps.

use super::context::ServiceContext;
use futures::future::BoxFuture;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future returned by every service invocation.
pub type ServiceFuture = BoxFuture<'static, anyhow::Result<Value>>;

/// Unbound service method as supplied in a descriptor.
pub type ServiceFn = Arc<dyn Fn(ServiceContext, Value) -> ServiceFuture + Send + Sync>;

/// Wrap an async closure into a [`ServiceFn`].
///
/// ```ignore
/// let init = service_fn(|ctx, args| async move {
///     let client = ctx.get::<QueueClient>("client");
///     Ok(args)
/// });
/// ```
pub fn service_fn<F, Fut>(f: F) -> ServiceFn
where
    F: Fn(ServiceContext, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    Arc::new(move |ctx: ServiceContext, args: Value| -> ServiceFuture { Box::pin(f(ctx, args)) })
}

/// A service closed over its execution context, addressable as `scope.name`.
#[derive(Clone)]
pub struct BoundService {
    key: Arc<str>,
    call: Arc<dyn Fn(Value) -> ServiceFuture + Send + Sync>,
}

impl BoundService {
    /// Close `method` over `ctx`.
    pub fn bind(key: impl Into<Arc<str>>, method: ServiceFn, ctx: ServiceContext) -> Self {
        Self {
            key: key.into(),
            call: Arc::new(move |args| method(ctx.clone(), args)),
        }
    }

    /// Build a bound service straight from a context-free callable. Used by
    /// the method cache to wrap an already bound service.
    pub fn from_fn<F>(key: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(Value) -> ServiceFuture + Send + Sync + 'static,
    {
        Self {
            key: key.into(),
            call: Arc::new(f),
        }
    }

    /// `scope.name`
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn call(&self, args: Value) -> ServiceFuture {
        (self.call)(args)
    }

    /// Whether both values wrap the very same callable.
    pub fn same_callable(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.call, &other.call)
    }
}

impl fmt::Debug for BoundService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundService")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
