//! Service registration settings

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How a multi-descriptor registration call behaves when one of its
/// descriptors collides with an existing scope.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CommitMode {
    /// Check every scope and bind every service before writing anything.
    /// A failing call leaves no trace.
    #[default]
    Atomic,

    /// Check and commit descriptor by descriptor. Descriptors preceding a
    /// collision stay registered.
    Sequential,
}

/// Registration behavior of the service registry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationConfig {
    #[serde(default)]
    pub commit_mode: CommitMode,

    /// Log a warning when services are registered after the host started.
    #[serde(default = "default_warn_late_registration")]
    pub warn_late_registration: bool,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            commit_mode: CommitMode::default(),
            warn_late_registration: default_warn_late_registration(),
        }
    }
}

fn default_warn_late_registration() -> bool {
    true
}
