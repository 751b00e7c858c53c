//! 统一错误处理模型
//!
//! 服务注册中心的顶层错误类型，聚合 realm-common 与宿主协作方的错误

use realm_common::{ConfigError, RealmError, ValidationError};
use thiserror::Error;

/// 服务注册中心的统一错误枚举
#[derive(Debug, Error)]
pub enum Error {
    // ========== 注册相关错误 ==========
    /// Malformed service descriptor; nothing from the call was registered.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The scope is already present in the canonical service map.
    #[error("A service scope of {scope} already exists")]
    ScopeCollision { scope: String },

    /// The host's method table already holds a method under this key.
    #[error("Server method {key} already exists")]
    MethodExists { key: String },

    /// Realm tree lookups
    #[error("Realm error: {0}")]
    Realm(#[from] RealmError),

    // ========== 生命周期错误 ==========
    /// A lifecycle hook (`initialize` / `teardown`) failed.
    #[error("Lifecycle hook {hook} failed: {source:#}")]
    Hook {
        hook: String,
        #[source]
        source: anyhow::Error,
    },

    /// Start/stop called in the wrong phase.
    #[error("Lifecycle error: {message}")]
    Lifecycle { message: String },

    // ========== 基础设施错误 ==========
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 统一的 Result 类型
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// 创建生命周期错误
    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::Lifecycle {
            message: message.into(),
        }
    }

    pub fn scope_collision(scope: impl Into<String>) -> Self {
        Self::ScopeCollision {
            scope: scope.into(),
        }
    }

    pub fn hook(hook: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Hook {
            hook: hook.into(),
            source,
        }
    }

    /// Whether the error was raised while checking a registration call,
    /// before any service method ran.
    pub fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::ScopeCollision { .. } | Self::MethodExists { .. }
        )
    }
}
