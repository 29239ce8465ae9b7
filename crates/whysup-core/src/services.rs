//! OS service seams
//!
//! Each trait stands in for one system service the engine talks to. Real
//! devices, file-backed profiles, and test fakes all implement these.

use crate::{MetadataLookupFailure, ProcessIdentity, SnapshotQueryFailure, UsageRecord};
use serde::{Deserialize, Serialize};

/// App-op name guarding usage statistics
pub const OP_GET_USAGE_STATS: &str = "android:get_usage_stats";

/// First API level that ships `unsafeCheckOpNoThrow` (Android Q)
pub const API_LEVEL_Q: u32 = 29;

/// Settings action that opens the usage-access screen
pub const ACTION_USAGE_ACCESS_SETTINGS: &str = "android.settings.USAGE_ACCESS_SETTINGS";

/// Mode reported by the app-ops service for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpMode {
    Allowed,
    Ignored,
    Errored,
    Default,
    Foreground,
}

/// Non-throwing op-check variant to use for the running OS version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCheck {
    /// `unsafeCheckOpNoThrow`, API 29 and later
    Unsafe,
    /// `checkOpNoThrow`, before API 29
    Legacy,
}

impl OpCheck {
    pub fn for_api_level(api_level: u32) -> Self {
        if api_level >= API_LEVEL_Q {
            OpCheck::Unsafe
        } else {
            OpCheck::Legacy
        }
    }
}

/// Bucket granularity for usage queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageInterval {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Best,
}

pub trait AppOpsService {
    /// API level of the running OS
    fn api_level(&self) -> u32;

    /// Identity of the calling process
    fn identity(&self) -> ProcessIdentity;

    /// Mode of `op` for `identity`. Must not fail.
    fn check_op_no_throw(&self, check: OpCheck, op: &str, identity: &ProcessIdentity) -> OpMode;
}

pub trait UsageStatsService {
    /// Usage records for `[begin_ms, end_ms]`, in whatever order the OS keeps them
    fn query_usage_stats(
        &self,
        interval: UsageInterval,
        begin_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<UsageRecord>, SnapshotQueryFailure>;
}

pub trait PackageMetadataService {
    fn resolve_is_system_app(&self, package_name: &str) -> Result<bool, MetadataLookupFailure>;

    fn resolve_display_name(&self, package_name: &str) -> Result<String, MetadataLookupFailure>;
}

pub trait SettingsLauncher {
    /// Fire-and-forget: send the user to the settings screen for `action`
    fn launch_settings(&self, action: &str);
}

/// Everything the engine needs from one device
pub trait UsageDevice:
    AppOpsService + UsageStatsService + PackageMetadataService + SettingsLauncher
{
}

impl<T> UsageDevice for T where
    T: AppOpsService + UsageStatsService + PackageMetadataService + SettingsLauncher
{
}

/// Wall-clock source in epoch milliseconds
pub trait Clock {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}
