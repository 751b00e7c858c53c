//! Service descriptors and their validation
//!
//! Descriptors are accepted in an unvalidated form: required fields are
//! `Option`s and cache settings are an open key/value map, so that
//! [`validate`] can name exactly which field is missing or not allowed.
//! A successful validation yields [`ValidDescriptor`]s, the only form the
//! registrar works with.

use super::context::{ContextMap, ServiceContext};
use super::method::{ServiceFn, service_fn};
use realm_common::ValidationError;
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Keys accepted inside a `cache` block.
pub const CACHE_EXPIRES_IN: &str = "expiresIn";
pub const CACHE_GENERATE_TIMEOUT: &str = "generateTimeout";

/// Largest accepted cache duration in milliseconds (1000 years, the
/// longest time-to-live the method cache supports).
pub const MAX_CACHE_MILLIS: u64 = 1000 * 365 * 24 * 60 * 60 * 1000;

/// Input of a registration call: one descriptor or an ordered list.
pub enum ServiceInput {
    One(ServiceDescriptor),
    Many(Vec<ServiceDescriptor>),
}

impl From<ServiceDescriptor> for ServiceInput {
    fn from(descriptor: ServiceDescriptor) -> Self {
        Self::One(descriptor)
    }
}

impl From<Vec<ServiceDescriptor>> for ServiceInput {
    fn from(descriptors: Vec<ServiceDescriptor>) -> Self {
        Self::Many(descriptors)
    }
}

impl<const N: usize> From<[ServiceDescriptor; N]> for ServiceInput {
    fn from(descriptors: [ServiceDescriptor; N]) -> Self {
        Self::Many(descriptors.into())
    }
}

/// A group of services registered under one scope.
#[derive(Clone, Default)]
pub struct ServiceDescriptor {
    pub scope: Option<String>,
    pub services: Option<Vec<ServiceEntry>>,
    pub context: Option<ContextMap>,
}

impl ServiceDescriptor {
    /// Start a descriptor for `scope` with an empty service list.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: Some(scope.into()),
            services: Some(Vec::new()),
            context: None,
        }
    }

    pub fn service(mut self, entry: ServiceEntry) -> Self {
        self.services.get_or_insert_with(Vec::new).push(entry);
        self
    }

    /// Shorthand for adding an uncached service from an async closure.
    pub fn method<F, Fut>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(ServiceContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.service(ServiceEntry::new(name, service_fn(f)))
    }

    /// Add a custom context value visible to every service of the scope.
    pub fn context_value<T: Any + Send + Sync>(mut self, key: impl Into<String>, value: T) -> Self {
        self.context
            .get_or_insert_with(ContextMap::new)
            .insert(key.into(), Arc::new(value));
        self
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("scope", &self.scope)
            .field("services", &self.services)
            .field(
                "context",
                &self.context.as_ref().map(|values| values.len()),
            )
            .finish()
    }
}

/// One service of a descriptor.
#[derive(Clone, Default)]
pub struct ServiceEntry {
    pub name: Option<String>,
    pub method: Option<ServiceFn>,
    pub cache: Option<CacheOptions>,
}

impl ServiceEntry {
    pub fn new(name: impl Into<String>, method: ServiceFn) -> Self {
        Self {
            name: Some(name.into()),
            method: Some(method),
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: CacheOptions) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl fmt::Debug for ServiceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceEntry")
            .field("name", &self.name)
            .field("method", &self.method.as_ref().map(|_| "<fn>"))
            .field("cache", &self.cache)
            .finish()
    }
}

/// Raw cache settings of a service, in milliseconds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheOptions(Map<String, Value>);

impl CacheOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expires_in(mut self, millis: u64) -> Self {
        self.0.insert(CACHE_EXPIRES_IN.to_string(), Value::from(millis));
        self
    }

    pub fn generate_timeout(mut self, millis: u64) -> Self {
        self.0
            .insert(CACHE_GENERATE_TIMEOUT.to_string(), Value::from(millis));
        self
    }

    /// Insert an arbitrary key. Anything besides `expiresIn` and
    /// `generateTimeout` fails validation.
    pub fn insert(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for CacheOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Validated cache settings handed to the host's method facility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CachePolicy {
    /// How long a generated value stays fresh. `None` keeps it until evicted.
    pub expires_in: Option<Duration>,
    /// How long a caller waits for a fresh computation. `None` waits forever.
    pub generate_timeout: Option<Duration>,
}

/// A descriptor that passed validation.
#[derive(Clone)]
pub struct ValidDescriptor {
    pub scope: String,
    pub services: Vec<ValidService>,
    pub context: Arc<ContextMap>,
}

#[derive(Clone)]
pub struct ValidService {
    pub name: String,
    pub method: ServiceFn,
    pub cache: Option<CachePolicy>,
}

impl fmt::Debug for ValidDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidDescriptor")
            .field("scope", &self.scope)
            .field(
                "services",
                &self.services.iter().map(|s| &s.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Shape-check a registration input.
///
/// Descriptors are checked in order and the first problem fails the whole
/// input. Nothing is registered here; the caller only proceeds on `Ok`.
pub fn validate(input: &ServiceInput) -> Result<Vec<ValidDescriptor>, ValidationError> {
    match input {
        ServiceInput::One(descriptor) => Ok(vec![validate_descriptor(descriptor, "descriptor")?]),
        ServiceInput::Many(descriptors) => descriptors
            .iter()
            .enumerate()
            .map(|(index, descriptor)| {
                validate_descriptor(descriptor, &format!("descriptors[{index}]"))
            })
            .collect(),
    }
}

fn validate_descriptor(
    descriptor: &ServiceDescriptor,
    path: &str,
) -> Result<ValidDescriptor, ValidationError> {
    let scope = match descriptor.scope.as_deref() {
        None => return Err(ValidationError::required("scope", path)),
        Some("") => return Err(ValidationError::empty("scope", path)),
        Some(scope) => scope.to_string(),
    };

    let entries = match descriptor.services.as_deref() {
        None => return Err(ValidationError::required("services", path)),
        Some([]) => return Err(ValidationError::empty("services", path)),
        Some(entries) => entries,
    };

    let mut names = HashSet::with_capacity(entries.len());
    let mut services = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let entry_path = format!("{path}.services[{index}]");
        let service = validate_entry(entry, &entry_path)?;
        if !names.insert(service.name.clone()) {
            return Err(ValidationError::duplicate("name", service.name, entry_path));
        }
        services.push(service);
    }

    Ok(ValidDescriptor {
        scope,
        services,
        context: Arc::new(descriptor.context.clone().unwrap_or_default()),
    })
}

fn validate_entry(entry: &ServiceEntry, path: &str) -> Result<ValidService, ValidationError> {
    let name = match entry.name.as_deref() {
        None => return Err(ValidationError::required("name", path)),
        Some("") => return Err(ValidationError::empty("name", path)),
        Some(name) => name.to_string(),
    };

    let method = entry
        .method
        .clone()
        .ok_or_else(|| ValidationError::required("method", path))?;

    let cache = entry
        .cache
        .as_ref()
        .map(|cache| validate_cache(cache, &format!("{path}.cache")))
        .transpose()?;

    Ok(ValidService {
        name,
        method,
        cache,
    })
}

fn validate_cache(cache: &CacheOptions, path: &str) -> Result<CachePolicy, ValidationError> {
    let mut policy = CachePolicy::default();
    for (key, value) in cache.as_map() {
        let slot = match key.as_str() {
            CACHE_EXPIRES_IN => &mut policy.expires_in,
            CACHE_GENERATE_TIMEOUT => &mut policy.generate_timeout,
            _ => return Err(ValidationError::not_allowed(key.as_str(), path)),
        };
        let millis = value
            .as_u64()
            .filter(|millis| *millis <= MAX_CACHE_MILLIS)
            .ok_or_else(|| {
                ValidationError::invalid_type(
                    key.as_str(),
                    "a non-negative integer of at most 1000 years in milliseconds",
                    path,
                )
            })?;
        *slot = Some(Duration::from_millis(millis));
    }
    Ok(policy)
}
