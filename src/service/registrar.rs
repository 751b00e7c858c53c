//! 服务注册器
//!
//! Turns validated descriptors into bound services, checks scope uniqueness
//! against the canonical map, records every service in the state tree and
//! schedules `initialize` / `teardown` on the host's extension points.

use super::context::ServiceContext;
use super::descriptor::{ServiceInput, ValidDescriptor, ValidService, validate};
use super::facility::MethodFacility;
use super::lifecycle::{ExtensionPoints, bind_hook};
use super::method::BoundService;
use super::state::StateTree;
use crate::error::{Error, Result};
use crate::host::ServerHandle;
use realm_common::{CommitMode, RealmTree};
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info};

/// Method-table key of a service.
pub fn method_key(scope: &str, name: &str) -> String {
    format!("{scope}.{name}")
}

/// A descriptor whose services are bound and ready to be committed.
struct BoundDescriptor {
    scope: String,
    services: Vec<(String, BoundService)>,
}

/// One registration pass over the host's collaborators.
pub struct Registrar<'a> {
    realms: &'a RealmTree,
    methods: &'a dyn MethodFacility,
    extensions: &'a dyn ExtensionPoints,
    mode: CommitMode,
}

impl<'a> Registrar<'a> {
    pub fn new(
        realms: &'a RealmTree,
        methods: &'a dyn MethodFacility,
        extensions: &'a dyn ExtensionPoints,
        mode: CommitMode,
    ) -> Self {
        Self {
            realms,
            methods,
            extensions,
            mode,
        }
    }

    /// Register `input` on behalf of the realm `origin` is bound to.
    ///
    /// Returns the registered scopes in call order.
    pub fn register(
        &self,
        states: &mut StateTree,
        origin: &ServerHandle,
        input: &ServiceInput,
    ) -> Result<Vec<String>> {
        let realm = origin.realm();
        self.realms.realm(realm)?;

        // The calling realm owns a state from its first call on, even if
        // the call itself is rejected.
        states.get_or_create(realm);

        let descriptors = validate(input)?;

        match self.mode {
            CommitMode::Atomic => self.register_atomic(states, origin, &descriptors),
            CommitMode::Sequential => self.register_sequential(states, origin, &descriptors),
        }
    }

    fn register_atomic(
        &self,
        states: &mut StateTree,
        origin: &ServerHandle,
        descriptors: &[ValidDescriptor],
    ) -> Result<Vec<String>> {
        let mut seen = HashSet::with_capacity(descriptors.len());
        let mut method_keys = HashSet::new();
        for descriptor in descriptors {
            check_scope_unique(states, &descriptor.scope)?;
            if !seen.insert(descriptor.scope.as_str()) {
                return Err(Error::scope_collision(&descriptor.scope));
            }
            self.check_methods_free(descriptor, &mut method_keys)?;
        }

        let bound = descriptors
            .iter()
            .map(|descriptor| self.bind_descriptor(origin, descriptor))
            .collect::<Result<Vec<_>>>()?;

        Ok(bound
            .into_iter()
            .map(|descriptor| self.commit(states, origin, descriptor))
            .collect())
    }

    fn register_sequential(
        &self,
        states: &mut StateTree,
        origin: &ServerHandle,
        descriptors: &[ValidDescriptor],
    ) -> Result<Vec<String>> {
        let mut scopes = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            check_scope_unique(states, &descriptor.scope)?;
            self.check_methods_free(descriptor, &mut HashSet::new())?;
            let bound = self.bind_descriptor(origin, descriptor)?;
            scopes.push(self.commit(states, origin, bound));
        }
        Ok(scopes)
    }

    /// Cached services of `descriptor` must not clash with the host's
    /// method table nor with keys already claimed by the same call.
    fn check_methods_free(
        &self,
        descriptor: &ValidDescriptor,
        claimed: &mut HashSet<String>,
    ) -> Result<()> {
        for service in descriptor.services.iter().filter(|s| s.cache.is_some()) {
            let key = method_key(&descriptor.scope, &service.name);
            if self.methods.has_method(&key) || !claimed.insert(key.clone()) {
                return Err(Error::MethodExists { key });
            }
        }
        Ok(())
    }

    fn bind_descriptor(
        &self,
        origin: &ServerHandle,
        descriptor: &ValidDescriptor,
    ) -> Result<BoundDescriptor> {
        let services = descriptor
            .services
            .iter()
            .map(|service| {
                self.bind_service(origin, descriptor, service)
                    .map(|bound| (service.name.clone(), bound))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BoundDescriptor {
            scope: descriptor.scope.clone(),
            services,
        })
    }

    /// Close a service over its context; cached services go through the
    /// host's method facility and its memoized wrapper is what gets stored.
    fn bind_service(
        &self,
        origin: &ServerHandle,
        descriptor: &ValidDescriptor,
        service: &ValidService,
    ) -> Result<BoundService> {
        let realm = origin.realm();
        let options = self
            .realms
            .options(realm)
            .cloned()
            .unwrap_or(Value::Null);
        let ctx = ServiceContext::new(origin.clone(), options, descriptor.context.clone());

        let key = method_key(&descriptor.scope, &service.name);
        let bound = BoundService::bind(key.as_str(), service.method.clone(), ctx);

        match service.cache {
            Some(policy) => {
                debug!("Registering cached method {} with {:?}", key, policy);
                self.methods.register_method(&key, bound, policy)
            }
            None => Ok(bound),
        }
    }

    fn commit(
        &self,
        states: &mut StateTree,
        origin: &ServerHandle,
        descriptor: BoundDescriptor,
    ) -> String {
        let realm = origin.realm();
        let mut hooks = 0usize;
        for (name, method) in &descriptor.services {
            states.propagate(self.realms, realm, &descriptor.scope, name, method.clone());
            if bind_hook(self.extensions, name, method).is_some() {
                hooks += 1;
            }
        }

        info!(
            "Registered service scope {} ({} service(s), {} hook(s)) from {}",
            descriptor.scope,
            descriptor.services.len(),
            hooks,
            self.realms.path(realm)
        );
        descriptor.scope
    }
}

/// Fails with [`Error::ScopeCollision`] if the canonical map holds `scope`.
pub fn check_scope_unique(states: &StateTree, scope: &str) -> Result<()> {
    if states.has_scope(scope) {
        return Err(Error::scope_collision(scope));
    }
    Ok(())
}
