//! Foreground app selection
//!
//! A single pass over the snapshot in the order the OS returned it. A record
//! is eligible when it is allowlisted or not a system app; the eligible record
//! with the strictly greatest `last_time_used` wins, so among equal timestamps
//! the first one scanned is kept. Snapshot order is whatever the OS hands
//! back, and it is never re-sorted here.

use crate::services::PackageMetadataService;
use crate::{
    Allowlist, AppClassification, MetadataLookupFailure, ResolvedApp, Snapshot, UsageRecord,
};
use tracing::{debug, info, warn};

pub struct ForegroundAppSelector<'a, M> {
    metadata: &'a M,
    allowlist: &'a Allowlist,
}

impl<'a, M: PackageMetadataService> ForegroundAppSelector<'a, M> {
    pub fn new(metadata: &'a M, allowlist: &'a Allowlist) -> Self {
        Self {
            metadata,
            allowlist,
        }
    }

    /// Pick the current app from `snapshot` and resolve its display name
    pub fn select_current_app(&self, snapshot: Snapshot) -> ResolvedApp {
        match self.pick_winner(snapshot) {
            Some(winner) => self.resolve_winner(winner),
            None => {
                debug!("No app selected");
                ResolvedApp::none()
            }
        }
    }

    /// Most recent eligible record, or `None`. Lookup failures skip the record.
    pub fn pick_winner(&self, snapshot: Snapshot) -> Option<UsageRecord> {
        let mut best: Option<UsageRecord> = None;
        let mut best_time: i64 = 0;

        for record in snapshot {
            debug!("Checking package: {}", record.package_name);

            let classification = match self.classify(&record.package_name) {
                Ok(classification) => classification,
                Err(e) => {
                    warn!("Skipping package: {}", e);
                    continue;
                }
            };

            let included = self.is_included(&record.package_name, classification);
            if included && record.last_time_used > best_time {
                best_time = record.last_time_used;
                debug!("Selected app: {} at {}", record.package_name, best_time);
                best = Some(record);
            }
        }

        best
    }

    fn classify(&self, package_name: &str) -> Result<AppClassification, MetadataLookupFailure> {
        let is_system_app = self.metadata.resolve_is_system_app(package_name)?;
        Ok(AppClassification { is_system_app })
    }

    fn is_included(&self, package_name: &str, classification: AppClassification) -> bool {
        let allowlisted = self.allowlist.contains(package_name);
        if classification.is_system_app {
            debug!("System app: {}", package_name);
        }
        if allowlisted {
            debug!("Allowlisted app: {}", package_name);
        }
        allowlisted || !classification.is_system_app
    }

    fn resolve_winner(&self, winner: UsageRecord) -> ResolvedApp {
        match self.metadata.resolve_display_name(&winner.package_name) {
            Ok(app_name) => {
                info!("Returning app: {} ({})", app_name, winner.package_name);
                ResolvedApp::found(app_name, winner.package_name)
            }
            Err(e) => on_final_resolution_failure(&winner, &e),
        }
    }
}

/// The winner was found but its name could not be resolved.
///
/// The whole result is voided and the package identifier is dropped, unlike
/// the per-record failures in the scan which only skip that record. This is
/// the one place to change if callers should get the bare package instead.
fn on_final_resolution_failure(winner: &UsageRecord, e: &MetadataLookupFailure) -> ResolvedApp {
    warn!("No app name for {}: {}", winner.package_name, e);
    ResolvedApp::none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDevice;

    fn select(device: &FakeDevice, allowlist: &Allowlist) -> ResolvedApp {
        let snapshot = Snapshot::new(device.usage.clone());
        let selector = ForegroundAppSelector::new(device, allowlist);
        selector.select_current_app(snapshot)
    }

    #[test]
    fn test_system_app_excluded_allowlisted_kept() {
        let device = FakeDevice::new()
            .app("com.android.settings", "Settings", true)
            .app("com.whatsapp", "WhatsApp", true)
            .used("com.android.settings", 100)
            .used("com.whatsapp", 50);

        let result = select(&device, &Allowlist::default());
        assert_eq!(result, ResolvedApp::found("WhatsApp", "com.whatsapp"));
    }

    #[test]
    fn test_most_recent_non_system_wins() {
        let device = FakeDevice::new()
            .app("com.example.nonsystem", "First", false)
            .app("com.example.nonsystem2", "Second", false)
            .used("com.example.nonsystem", 10)
            .used("com.example.nonsystem2", 20);

        let result = select(&device, &Allowlist::default());
        let expected = ResolvedApp::found("Second", "com.example.nonsystem2");
        assert_eq!(result, expected);
    }

    #[test]
    fn test_winner_is_max_of_included_records() {
        let device = FakeDevice::new()
            .app("a", "A", false)
            .app("b", "B", true)
            .app("c", "C", false)
            .app("d", "D", false)
            .used("a", 40)
            .used("b", 90)
            .used("c", 70)
            .used("d", 55);

        let allowlist = Allowlist::empty();
        let selector = ForegroundAppSelector::new(&device, &allowlist);
        let winner = selector.pick_winner(Snapshot::new(device.usage.clone()));
        assert_eq!(winner, Some(UsageRecord::new("c", 70)));
    }

    #[test]
    fn test_system_app_never_selected_without_allowlist() {
        let device = FakeDevice::new()
            .app("com.android.systemui", "System UI", true)
            .used("com.android.systemui", i64::MAX);

        assert!(select(&device, &Allowlist::default()).is_none());
    }

    #[test]
    fn test_allowlisted_system_app_eligible() {
        let device = FakeDevice::new()
            .app("com.android.chrome", "Chrome", true)
            .app("com.example.reader", "Reader", false)
            .used("com.example.reader", 10)
            .used("com.android.chrome", 30);

        let result = select(&device, &Allowlist::default());
        assert_eq!(result, ResolvedApp::found("Chrome", "com.android.chrome"));
    }

    #[test]
    fn test_empty_snapshot() {
        let device = FakeDevice::new();
        let result = select(&device, &Allowlist::default());
        assert_eq!(result, ResolvedApp::none());
    }

    #[test]
    fn test_lookup_failure_skips_record() {
        // "gone" was uninstalled after its usage was recorded
        let device = FakeDevice::new()
            .app("com.example.kept", "Kept", false)
            .used("com.example.gone", 500)
            .used("com.example.kept", 100);

        let result = select(&device, &Allowlist::default());
        assert_eq!(result, ResolvedApp::found("Kept", "com.example.kept"));
    }

    #[test]
    fn test_final_resolution_failure_voids_result() {
        let device = FakeDevice::new()
            .app("com.example.winner", "Winner", false)
            .app("com.example.runnerup", "Runner-up", false)
            .unlabeled("com.example.winner")
            .used("com.example.winner", 200)
            .used("com.example.runnerup", 100);

        let result = select(&device, &Allowlist::default());
        assert_eq!(result, ResolvedApp::none());
        assert_eq!(result.app_name, None);
        assert_eq!(result.package_name, None);
    }

    #[test]
    fn test_first_of_equal_timestamps_wins() {
        let device = FakeDevice::new()
            .app("com.example.zeta", "Zeta", false)
            .app("com.example.alpha", "Alpha", false)
            .used("com.example.zeta", 300)
            .used("com.example.alpha", 300);

        let result = select(&device, &Allowlist::default());
        assert_eq!(result.package_name.as_deref(), Some("com.example.zeta"));
    }

    #[test]
    fn test_non_positive_timestamps_never_selected() {
        let device = FakeDevice::new()
            .app("com.example.app", "App", false)
            .used("com.example.app", 0);

        assert!(select(&device, &Allowlist::default()).is_none());
    }
}
