//! Lifecycle hook binding
//!
//! Services named `initialize` and `teardown` are additionally scheduled on
//! the host's pre-start and post-stop extension points. Every
//! `(scope, name)` pair becomes one independent hook.

use super::method::BoundService;
use serde_json::Value;
use strum::Display;

pub const INITIALIZE: &str = "initialize";
pub const TEARDOWN: &str = "teardown";

/// Host extension points the binder schedules hooks on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum HookPoint {
    #[strum(serialize = "onPreStart")]
    PreStart,
    #[strum(serialize = "onPostStop")]
    PostStop,
}

/// Extension-point facility of the host. Hooks registered on one point run
/// in registration order.
pub trait ExtensionPoints: Send + Sync {
    fn ext(&self, point: HookPoint, hook: LifecycleHook);
}

/// A bound service scheduled on an extension point.
#[derive(Debug, Clone)]
pub struct LifecycleHook {
    method: BoundService,
}

impl LifecycleHook {
    pub fn new(method: BoundService) -> Self {
        Self { method }
    }

    /// `scope.name` of the underlying service.
    pub fn name(&self) -> &str {
        self.method.key()
    }

    /// Invoke the service with no arguments, discarding its result value.
    pub async fn run(&self) -> anyhow::Result<()> {
        self.method.call(Value::Null).await.map(|_| ())
    }
}

/// Extension point a service name is reserved for, if any.
pub fn hook_point(name: &str) -> Option<HookPoint> {
    match name {
        INITIALIZE => Some(HookPoint::PreStart),
        TEARDOWN => Some(HookPoint::PostStop),
        _ => None,
    }
}

/// Schedule `method` if `name` is reserved. Returns the point used.
pub fn bind_hook(
    extensions: &dyn ExtensionPoints,
    name: &str,
    method: &BoundService,
) -> Option<HookPoint> {
    let point = hook_point(name)?;
    extensions.ext(point, LifecycleHook::new(method.clone()));
    Some(point)
}
