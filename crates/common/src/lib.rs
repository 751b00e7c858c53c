//! Realm 基础设施库
//!
//! 为服务注册中心提供基础组件：组合树（Realm Tree）、配置以及错误类型

pub mod config;
pub mod error;
pub mod realm;

pub use config::{CommitMode, LogConfig, ObservabilityConfig, RegistrationConfig, RegistryConfig};
pub use error::{ConfigError, ValidationError};
pub use realm::{Realm, RealmError, RealmId, RealmTree};
