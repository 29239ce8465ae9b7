//! why-sup Core Library
//!
//! Decides which application the user is most likely using right now, from a
//! snapshot of OS usage statistics. The OS itself is reached only through the
//! traits in [`services`], so the engine stays stateless and testable.

pub mod allowlist;
pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod permission;
pub mod selector;
pub mod services;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod testing;

pub use allowlist::Allowlist;
pub use channel::{ChannelResult, MethodCall, UsageStatsChannel, CHANNEL_NAME};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::{EngineError, MetadataLookupFailure, SnapshotQueryFailure};
pub use permission::PermissionGate;
pub use selector::ForegroundAppSelector;
pub use services::{
    AppOpsService, Clock, FixedClock, OpCheck, OpMode, PackageMetadataService, SettingsLauncher,
    SystemClock, UsageDevice, UsageInterval, UsageStatsService,
};
pub use snapshot::{Snapshot, UsageSnapshotQuerier};

use serde::{Deserialize, Serialize};

/// One OS-reported usage entry: a package and when it was last used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub package_name: String,
    /// Epoch milliseconds
    pub last_time_used: i64,
}

impl UsageRecord {
    pub fn new(package_name: impl Into<String>, last_time_used: i64) -> Self {
        Self {
            package_name: package_name.into(),
            last_time_used,
        }
    }
}

/// Whether a package ships as part of the base platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppClassification {
    pub is_system_app: bool,
}

/// Who is asking the OS for usage data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessIdentity {
    pub uid: u32,
    pub package_name: String,
}

/// The engine's answer. Both fields are set together or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedApp {
    pub app_name: Option<String>,
    pub package_name: Option<String>,
}

impl ResolvedApp {
    /// No qualifying application
    pub fn none() -> Self {
        Self::default()
    }

    pub fn found(app_name: impl Into<String>, package_name: impl Into<String>) -> Self {
        Self {
            app_name: Some(app_name.into()),
            package_name: Some(package_name.into()),
        }
    }

    pub fn is_none(&self) -> bool {
        self.package_name.is_none()
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "whysup", "whysup")
}

/// Get the data directory for why-sup
pub fn data_dir() -> std::path::PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            directories::BaseDirs::new()
                .map(|d| d.home_dir().join(".whysup"))
                .unwrap_or_else(|| std::path::PathBuf::from(".whysup"))
        })
}

/// Get the config file path
pub fn config_path() -> std::path::PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("config.json"))
        .unwrap_or_else(|| data_dir().join("config.json"))
}

/// Get the default device profile path
pub fn device_path() -> std::path::PathBuf {
    data_dir().join("device.json")
}
