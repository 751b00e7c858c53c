//! 扩展点注册表
//!
//! Holds the hooks scheduled on the pre-start and post-stop extension
//! points and runs them when the server starts or stops.

use crate::error::{Error, Result};
use crate::service::{ExtensionPoints, HookPoint, LifecycleHook};
use parking_lot::Mutex;
use tracing::{error, info, warn};

#[derive(Debug, Default)]
pub struct ExtRegistry {
    pre_start: Mutex<Vec<LifecycleHook>>,
    post_stop: Mutex<Vec<LifecycleHook>>,
}

impl ExtRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the hooks on `point`, in run order.
    pub fn hook_names(&self, point: HookPoint) -> Vec<String> {
        self.hooks(point)
            .iter()
            .map(|hook| hook.name().to_string())
            .collect()
    }

    fn hooks(&self, point: HookPoint) -> Vec<LifecycleHook> {
        match point {
            HookPoint::PreStart => self.pre_start.lock().clone(),
            HookPoint::PostStop => self.post_stop.lock().clone(),
        }
    }

    /// Run pre-start hooks in order, stopping at the first failure.
    pub async fn run_pre_start(&self) -> Result<()> {
        for hook in self.hooks(HookPoint::PreStart) {
            info!("Running {} hook {}", HookPoint::PreStart, hook.name());
            if let Err(e) = hook.run().await {
                error!("{} hook {} failed: {:#}", HookPoint::PreStart, hook.name(), e);
                return Err(Error::hook(hook.name(), e));
            }
        }
        Ok(())
    }

    /// Run every post-stop hook in order. Failures do not stop the rest;
    /// the first one is returned.
    pub async fn run_post_stop(&self) -> Result<()> {
        let mut first_error = None;
        for hook in self.hooks(HookPoint::PostStop) {
            info!("Running {} hook {}", HookPoint::PostStop, hook.name());
            if let Err(e) = hook.run().await {
                warn!("{} hook {} failed: {:#}", HookPoint::PostStop, hook.name(), e);
                first_error.get_or_insert_with(|| Error::hook(hook.name(), e));
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl ExtensionPoints for ExtRegistry {
    fn ext(&self, point: HookPoint, hook: LifecycleHook) {
        match point {
            HookPoint::PreStart => self.pre_start.lock().push(hook),
            HookPoint::PostStop => self.post_stop.lock().push(hook),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::BoundService;
    use serde_json::Value;
    use std::sync::Arc;

    fn recording(key: &'static str, log: Arc<Mutex<Vec<&'static str>>>, fail: bool) -> LifecycleHook {
        LifecycleHook::new(BoundService::from_fn(key, move |_| {
            let log = log.clone();
            Box::pin(async move {
                log.lock().push(key);
                if fail {
                    anyhow::bail!("{key} failed");
                }
                Ok(Value::Null)
            })
        }))
    }

    #[tokio::test]
    async fn test_pre_start_aborts_on_first_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ExtRegistry::new();
        registry.ext(HookPoint::PreStart, recording("a.initialize", log.clone(), false));
        registry.ext(HookPoint::PreStart, recording("b.initialize", log.clone(), true));
        registry.ext(HookPoint::PreStart, recording("c.initialize", log.clone(), false));

        let err = registry.run_pre_start().await.unwrap_err();
        assert!(matches!(err, Error::Hook { ref hook, .. } if hook == "b.initialize"));
        assert_eq!(*log.lock(), vec!["a.initialize", "b.initialize"]);
    }

    #[tokio::test]
    async fn test_post_stop_runs_all() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = ExtRegistry::new();
        registry.ext(HookPoint::PostStop, recording("a.teardown", log.clone(), true));
        registry.ext(HookPoint::PostStop, recording("b.teardown", log.clone(), true));
        registry.ext(HookPoint::PostStop, recording("c.teardown", log.clone(), false));

        let err = registry.run_post_stop().await.unwrap_err();
        assert!(matches!(err, Error::Hook { ref hook, .. } if hook == "a.teardown"));
        assert_eq!(*log.lock(), vec!["a.teardown", "b.teardown", "c.teardown"]);
        assert_eq!(
            registry.hook_names(HookPoint::PostStop),
            vec!["a.teardown", "b.teardown", "c.teardown"]
        );
    }
}
