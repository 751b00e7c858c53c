//! Method-registration facility of the host

use super::descriptor::CachePolicy;
use super::method::BoundService;
use crate::error::Result;

/// Namespaced, optionally memoized method table provided by the host.
///
/// The registry hands cached services to the host under `scope.name` and
/// uses whatever callable comes back. Single-flight execution, expiry and
/// generate timeouts are the host's contract, not the registry's.
pub trait MethodFacility: Send + Sync {
    fn has_method(&self, key: &str) -> bool;

    fn register_method(
        &self,
        key: &str,
        method: BoundService,
        policy: CachePolicy,
    ) -> Result<BoundService>;
}
