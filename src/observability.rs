use crate::error::Result;
use realm_common::config::{LogConfig, ObservabilityConfig, RegistryConfig};
use std::fs;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

const LOG_FILE_NAME: &str = "realm-services.log";

/// Guard for observability resources (log writer)
#[derive(Default)]
pub struct ObservabilityGuard {
    log_guard: Option<WorkerGuard>,
}

impl ObservabilityGuard {
    /// Whether log lines go through a background file writer.
    pub fn is_file_backed(&self) -> bool {
        self.log_guard.is_some()
    }
}

/// Initialize logging based on configuration
///
/// A global subscriber can only be installed once per process; later calls
/// keep the first one and still return a guard for their own writer.
pub fn init_observability(config: &RegistryConfig) -> Result<ObservabilityGuard> {
    let mut guard = ObservabilityGuard::default();
    let observability_config = &config.observability;

    match observability_config.log.output.as_str() {
        "file" => {
            fs::create_dir_all(&observability_config.log.path)?;
            let (non_blocking, worker_guard) = build_file_writer(&observability_config.log)?;
            guard.log_guard = Some(worker_guard);

            init_subscriber_with_writer(non_blocking, false, observability_config);
        }
        _ => {
            init_subscriber_with_writer(std::io::stdout, true, observability_config);
        }
    }

    Ok(guard)
}

/// Create an EnvFilter from config, with RUST_LOG taking precedence
fn create_env_filter(config: &ObservabilityConfig) -> EnvFilter {
    let directive = std::env::var("RUST_LOG")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| config.filter_level.clone());

    EnvFilter::try_new(&directive).unwrap_or_else(|_| {
        println!(
            "Failed to parse filter directive: {}. Falling back to default: info",
            directive
        );
        EnvFilter::new("info")
    })
}

fn init_subscriber_with_writer<W>(writer: W, use_ansi: bool, config: &ObservabilityConfig)
where
    W: for<'a> fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(use_ansi)
        .with_writer(writer);

    // Global filter: events are filtered first, then passed to the fmt layer
    tracing_subscriber::registry()
        .with(create_env_filter(config))
        .with(fmt_layer)
        .try_init()
        .ok();
}

fn build_file_writer(log_config: &LogConfig) -> Result<(NonBlocking, WorkerGuard)> {
    if log_config.rotate {
        println!("日志写入模式: 文件（按天轮转）");
        println!("  - 路径: {}", log_config.path);
        let file_appender = tracing_appender::rolling::daily(&log_config.path, LOG_FILE_NAME);
        Ok(tracing_appender::non_blocking(file_appender))
    } else {
        let log_file_path = std::path::Path::new(&log_config.path).join(LOG_FILE_NAME);
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path)?;
        Ok(tracing_appender::non_blocking(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_file_writer_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_config = LogConfig {
            output: "file".to_string(),
            rotate: false,
            path: dir.path().to_string_lossy().into_owned(),
        };

        let (_writer, _guard) = build_file_writer(&log_config).unwrap();
        assert!(dir.path().join(LOG_FILE_NAME).exists());
    }

    #[test]
    fn test_file_writer_fails_on_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_config = LogConfig {
            output: "file".to_string(),
            rotate: false,
            path: dir.path().join("missing").to_string_lossy().into_owned(),
        };

        assert!(build_file_writer(&log_config).is_err());
    }
}
