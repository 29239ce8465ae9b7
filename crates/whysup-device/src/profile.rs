//! JSON-backed device profile

use crate::{DeviceError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};
use whysup_core::services::{
    AppOpsService, OpCheck, OpMode, PackageMetadataService, SettingsLauncher, UsageInterval,
    UsageStatsService,
};
use whysup_core::{MetadataLookupFailure, ProcessIdentity, SnapshotQueryFailure, UsageRecord};

type LookupResult<T> = std::result::Result<T, MetadataLookupFailure>;

/// One usage entry. Exactly one of the two timestamps must be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEntry {
    pub package_name: String,
    /// Absolute epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_time_used: Option<i64>,
    /// Relative to the end of each query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seconds_ago: Option<i64>,
}

impl UsageEntry {
    fn timestamp(&self, end_ms: i64) -> i64 {
        match (self.last_time_used, self.seconds_ago) {
            (Some(at), _) => at,
            (None, Some(ago)) => end_ms.saturating_sub(ago.saturating_mul(1000)),
            (None, None) => i64::MIN,
        }
    }

    fn to_record(&self, end_ms: i64) -> UsageRecord {
        UsageRecord::new(self.package_name.clone(), self.timestamp(end_ms))
    }
}

/// An installed package as the package manager sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageEntry {
    pub package_name: String,
    /// Display label. Without one, name resolution fails.
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub system: bool,
    /// Present but not visible to the caller
    #[serde(default)]
    pub hidden: bool,
}

fn default_identity() -> ProcessIdentity {
    ProcessIdentity {
        uid: 10_000,
        package_name: "com.example.why_sup".to_string(),
    }
}

fn default_api_level() -> u32 {
    34
}

fn default_mode() -> OpMode {
    OpMode::Default
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceProfile {
    #[serde(default = "default_identity")]
    pub identity: ProcessIdentity,
    #[serde(default = "default_api_level")]
    pub api_level: u32,
    #[serde(default = "default_mode")]
    pub usage_stats_mode: OpMode,
    #[serde(default)]
    pub usage_query_fails: bool,
    #[serde(default)]
    pub usage: Vec<UsageEntry>,
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
    #[serde(skip)]
    settings_launches: AtomicUsize,
}

impl DeviceProfile {
    /// Load a profile from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let profile = Self::from_json(&raw)?;
        info!(
            "Loaded device profile from {:?} ({} usage entries, {} packages)",
            path.as_ref(),
            profile.usage.len(),
            profile.packages.len()
        );
        Ok(profile)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let profile: Self = serde_json::from_str(raw)?;
        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> Result<()> {
        for entry in &self.usage {
            if entry.last_time_used.is_none() == entry.seconds_ago.is_none() {
                return Err(DeviceError::InvalidProfile(format!(
                    "usage entry for {} needs exactly one of last_time_used or seconds_ago",
                    entry.package_name
                )));
            }
        }
        Ok(())
    }

    /// How many times the settings screen was requested
    pub fn settings_launches(&self) -> usize {
        self.settings_launches.load(Ordering::Relaxed)
    }

    fn package(&self, package_name: &str) -> LookupResult<&PackageEntry> {
        self.packages
            .iter()
            .find(|p| p.package_name == package_name && !p.hidden)
            .ok_or_else(|| MetadataLookupFailure::not_found(package_name))
    }
}

impl AppOpsService for DeviceProfile {
    fn api_level(&self) -> u32 {
        self.api_level
    }

    fn identity(&self) -> ProcessIdentity {
        self.identity.clone()
    }

    fn check_op_no_throw(&self, check: OpCheck, op: &str, identity: &ProcessIdentity) -> OpMode {
        debug!("{:?} check of {} for uid {}", check, op, identity.uid);
        self.usage_stats_mode
    }
}

impl UsageStatsService for DeviceProfile {
    fn query_usage_stats(
        &self,
        interval: UsageInterval,
        begin_ms: i64,
        end_ms: i64,
    ) -> std::result::Result<Vec<UsageRecord>, SnapshotQueryFailure> {
        if self.usage_query_fails {
            let reason = "usage stats service unavailable".to_string();
            return Err(SnapshotQueryFailure(reason));
        }

        let records: Vec<UsageRecord> = self
            .usage
            .iter()
            .map(|entry| entry.to_record(end_ms))
            .filter(|record| (begin_ms..=end_ms).contains(&record.last_time_used))
            .collect();

        debug!(
            "{:?} usage query [{}, {}] matched {} of {} entries",
            interval,
            begin_ms,
            end_ms,
            records.len(),
            self.usage.len()
        );
        Ok(records)
    }
}

impl PackageMetadataService for DeviceProfile {
    fn resolve_is_system_app(&self, package_name: &str) -> LookupResult<bool> {
        self.package(package_name).map(|p| p.system)
    }

    fn resolve_display_name(&self, package_name: &str) -> LookupResult<String> {
        self.package(package_name)?
            .label
            .clone()
            .ok_or_else(|| MetadataLookupFailure::new(package_name, "no application label"))
    }
}

impl SettingsLauncher for DeviceProfile {
    fn launch_settings(&self, action: &str) {
        self.settings_launches.fetch_add(1, Ordering::Relaxed);
        info!("Launching settings activity {}", action);
    }
}
