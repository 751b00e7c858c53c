//! 统一配置管理系统
//!
//! 服务注册中心的配置定义、默认值与加载逻辑。配置文件使用 TOML 格式。

pub mod registration;

pub use registration::{CommitMode, RegistrationConfig};

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 服务注册中心的主配置结构体
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Name of the root realm of the host.
    #[serde(default = "default_name")]
    pub name: String,

    /// 服务注册行为配置
    #[serde(default)]
    pub registration: RegistrationConfig,

    /// 可观测性配置（日志）
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// 可观测性配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// 过滤级别
    ///
    /// 支持 EnvFilter 语法（如 "info,realm_services=debug"）。默认值 "info"。
    #[serde(default = "default_filter_level")]
    pub filter_level: String,

    #[serde(default)]
    pub log: LogConfig,
}

/// 日志配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// 日志输出目标
    ///
    /// - "console": 仅输出到控制台（默认）
    /// - "file": 输出到文件
    #[serde(default = "default_log_output")]
    pub output: String,

    /// 日志轮转开关，当 output = "file" 时有效（按天轮转）
    #[serde(default)]
    pub rotate: bool,

    /// 日志文件目录，当 output = "file" 时有效
    #[serde(default = "default_log_path")]
    pub path: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            registration: RegistrationConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter_level: default_filter_level(),
            log: LogConfig::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            output: default_log_output(),
            rotate: false,
            path: default_log_path(),
        }
    }
}

fn default_name() -> String {
    "server".to_string()
}

fn default_log_output() -> String {
    "console".to_string()
}

fn default_log_path() -> String {
    "logs/".to_string()
}

fn default_filter_level() -> String {
    "info".to_string()
}

impl RegistryConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();

        if !path_ref.exists() {
            return Err(ConfigError::FileNotFound {
                path: path_ref.display().to_string(),
            });
        }

        if !path_ref.is_file() {
            return Err(ConfigError::NotAFile {
                path: path_ref.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path_ref)?;
        Self::from_toml(&content)
    }

    /// 从 TOML 字符串加载配置
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// 将配置序列化为 TOML 字符串
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("Root realm name cannot be empty".to_string());
        }

        if self.observability.filter_level.trim().is_empty() {
            errors.push("observability.filter_level cannot be empty".to_string());
        }

        match self.observability.log.output.as_str() {
            "console" => {}
            "file" => {
                if self.observability.log.path.trim().is_empty() {
                    errors.push(
                        "observability.log.path cannot be empty when output = \"file\""
                            .to_string(),
                    );
                }
            }
            other => errors.push(format!(
                "Invalid observability.log.output: {other}. Must be \"console\" or \"file\""
            )),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Load from a file and validate in one step.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::from_file(path)?;
        config
            .validate()
            .map_err(|errors| ConfigError::Invalid { errors })?;
        Ok(config)
    }
}
