//! In-memory device used by unit tests

use crate::services::{
    AppOpsService, OpCheck, OpMode, PackageMetadataService, SettingsLauncher, UsageInterval,
    UsageStatsService,
};
use crate::{MetadataLookupFailure, ProcessIdentity, SnapshotQueryFailure, UsageRecord};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

pub(crate) const NOW: i64 = 1_700_000_000_000;

struct FakePackage {
    label: String,
    system: bool,
}

pub(crate) struct FakeDevice {
    pub api_level: u32,
    pub mode: OpMode,
    pub usage: Vec<UsageRecord>,
    pub usage_fails: bool,
    packages: HashMap<String, FakePackage>,
    unlabeled: HashSet<String>,
    pub queries: RefCell<Vec<(UsageInterval, i64, i64)>>,
    pub checks: RefCell<Vec<OpCheck>>,
    pub launches: RefCell<Vec<String>>,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self {
            api_level: 34,
            mode: OpMode::Allowed,
            usage: Vec::new(),
            usage_fails: false,
            packages: HashMap::new(),
            unlabeled: HashSet::new(),
            queries: RefCell::new(Vec::new()),
            checks: RefCell::new(Vec::new()),
            launches: RefCell::new(Vec::new()),
        }
    }

    pub fn mode(mut self, mode: OpMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn api_level(mut self, level: u32) -> Self {
        self.api_level = level;
        self
    }

    pub fn failing_queries(mut self) -> Self {
        self.usage_fails = true;
        self
    }

    pub fn app(mut self, package: &str, label: &str, system: bool) -> Self {
        self.packages.insert(
            package.to_string(),
            FakePackage {
                label: label.to_string(),
                system,
            },
        );
        self
    }

    /// Classification resolves but the display name lookup fails
    pub fn unlabeled(mut self, package: &str) -> Self {
        self.unlabeled.insert(package.to_string());
        self
    }

    pub fn used(mut self, package: &str, at: i64) -> Self {
        self.usage.push(UsageRecord::new(package, at));
        self
    }
}

impl AppOpsService for FakeDevice {
    fn api_level(&self) -> u32 {
        self.api_level
    }

    fn identity(&self) -> ProcessIdentity {
        ProcessIdentity {
            uid: 10_123,
            package_name: "com.example.why_sup".to_string(),
        }
    }

    fn check_op_no_throw(&self, check: OpCheck, _op: &str, _identity: &ProcessIdentity) -> OpMode {
        self.checks.borrow_mut().push(check);
        self.mode
    }
}

impl UsageStatsService for FakeDevice {
    fn query_usage_stats(
        &self,
        interval: UsageInterval,
        begin_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<UsageRecord>, SnapshotQueryFailure> {
        let call = (interval, begin_ms, end_ms);
        self.queries.borrow_mut().push(call);
        if self.usage_fails {
            return Err(SnapshotQueryFailure("service unavailable".to_string()));
        }
        Ok(self.usage.clone())
    }
}

impl PackageMetadataService for FakeDevice {
    fn resolve_is_system_app(&self, package_name: &str) -> Result<bool, MetadataLookupFailure> {
        self.packages
            .get(package_name)
            .map(|p| p.system)
            .ok_or_else(|| MetadataLookupFailure::not_found(package_name))
    }

    fn resolve_display_name(&self, package_name: &str) -> Result<String, MetadataLookupFailure> {
        if self.unlabeled.contains(package_name) {
            return Err(MetadataLookupFailure::new(package_name, "no label"));
        }
        self.packages
            .get(package_name)
            .map(|p| p.label.clone())
            .ok_or_else(|| MetadataLookupFailure::not_found(package_name))
    }
}

impl SettingsLauncher for FakeDevice {
    fn launch_settings(&self, action: &str) {
        self.launches.borrow_mut().push(action.to_string());
    }
}
