//! Usage-statistics permission gate
//!
//! Two steps: ask the app-ops service for the op mode, and if it does not
//! say "allowed", probe the usage service. Some vendors report a non-allowed
//! mode even though queries succeed, so a non-empty probe counts as access.

use crate::services::{
    AppOpsService, Clock, OpCheck, OpMode, UsageInterval, UsageStatsService, OP_GET_USAGE_STATS,
};
use tracing::{debug, warn};

/// Default probe window: trailing 24 hours
pub const DEFAULT_PROBE_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

pub struct PermissionGate<'a, D, C> {
    device: &'a D,
    clock: &'a C,
    probe_window_ms: i64,
}

impl<'a, D, C> PermissionGate<'a, D, C>
where
    D: AppOpsService + UsageStatsService,
    C: Clock,
{
    pub fn new(device: &'a D, clock: &'a C) -> Self {
        Self {
            device,
            clock,
            probe_window_ms: DEFAULT_PROBE_WINDOW_MS,
        }
    }

    pub fn with_probe_window(mut self, window_ms: i64) -> Self {
        self.probe_window_ms = window_ms;
        self
    }

    /// Whether usage data may be read. Never fails.
    pub fn check_permission(&self) -> bool {
        if self.mode_check() == OpMode::Allowed {
            return true;
        }
        self.probe()
    }

    /// Step one: op mode for the current process, via the variant the OS supports
    pub fn mode_check(&self) -> OpMode {
        let check = OpCheck::for_api_level(self.device.api_level());
        let identity = self.device.identity();
        let mode = self
            .device
            .check_op_no_throw(check, OP_GET_USAGE_STATS, &identity);
        debug!(
            "Usage stats op mode for {}: {:?} ({:?})",
            identity.package_name, mode, check
        );
        mode
    }

    /// Step two: treat any usage record in the probe window as proof of access
    pub fn probe(&self) -> bool {
        let end = self.clock.now_millis();
        let begin = end.saturating_sub(self.probe_window_ms);
        match self
            .device
            .query_usage_stats(UsageInterval::Daily, begin, end)
        {
            Ok(records) => {
                debug!("Permission probe returned {} records", records.len());
                !records.is_empty()
            }
            Err(e) => {
                warn!("Permission probe failed: {}", e);
                false
            }
        }
    }
}
