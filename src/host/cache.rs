//! 方法表与结果缓存
//!
//! Namespaced method table of the reference host. Methods registered with
//! a [`CachePolicy`] are wrapped in a `moka` cache keyed by the canonical
//! JSON form of their arguments: at most one computation runs per key,
//! values live for `expires_in`, and callers wait at most
//! `generate_timeout` for a fresh one.

use crate::error::{Error, Result};
use crate::service::{BoundService, CachePolicy, MethodFacility};
use indexmap::IndexMap;
use moka::future::Cache;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Default)]
pub struct MethodTable {
    methods: RwLock<IndexMap<String, BoundService>>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<BoundService> {
        self.methods.read().get(key).cloned()
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> Vec<String> {
        self.methods.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.methods.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.read().is_empty()
    }
}

impl MethodFacility for MethodTable {
    fn has_method(&self, key: &str) -> bool {
        self.methods.read().contains_key(key)
    }

    fn register_method(
        &self,
        key: &str,
        method: BoundService,
        policy: CachePolicy,
    ) -> Result<BoundService> {
        let mut methods = self.methods.write();
        if methods.contains_key(key) {
            return Err(Error::MethodExists {
                key: key.to_string(),
            });
        }

        let memoized = memoize(method, policy);
        methods.insert(key.to_string(), memoized.clone());
        Ok(memoized)
    }
}

/// Wrap `method` so identical calls share one result while it is fresh.
///
/// Only a computation is bounded by `generate_timeout`; fresh values are
/// returned without it. Failed computations are not cached.
pub fn memoize(method: BoundService, policy: CachePolicy) -> BoundService {
    let mut builder = Cache::<String, Value>::builder();
    if let Some(ttl) = policy.expires_in {
        builder = builder.time_to_live(ttl);
    }
    let cache = builder.build();
    let key: Arc<str> = Arc::from(method.key());

    BoundService::from_fn(key, move |args| {
        Box::pin(call_cached(
            cache.clone(),
            method.clone(),
            policy.generate_timeout,
            args,
        ))
    })
}

async fn call_cached(
    cache: Cache<String, Value>,
    method: BoundService,
    generate_timeout: Option<Duration>,
    args: Value,
) -> anyhow::Result<Value> {
    let signature = serde_json::to_string(&args)?;
    if let Some(value) = cache.get(&signature).await {
        return Ok(value);
    }
    let key = method.key().to_string();

    let init = async {
        debug!("Cache miss for {} with {}", key, signature);
        method.call(args).await
    };
    let lookup = cache.try_get_with(signature.clone(), init);

    let result = match generate_timeout {
        Some(limit) => tokio::time::timeout(limit, lookup)
            .await
            .map_err(|_| anyhow::anyhow!("Service method {key} timed out after {limit:?}"))?,
        None => lookup.await,
    };
    result.map_err(|e| anyhow::anyhow!("{e:#}"))
}
