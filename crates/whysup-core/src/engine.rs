//! The engine: gate, snapshot, select

use crate::error::{EngineError, Result};
use crate::permission::PermissionGate;
use crate::services::{Clock, SystemClock, UsageDevice, ACTION_USAGE_ACCESS_SETTINGS};
use crate::{Allowlist, EngineConfig, ForegroundAppSelector, ResolvedApp, UsageSnapshotQuerier};
use tracing::{info, warn};

/// Stateless front door over one device. Every call re-reads the OS.
#[derive(Debug)]
pub struct Engine<D, C = SystemClock> {
    device: D,
    clock: C,
    config: EngineConfig,
    allowlist: Allowlist,
}

impl<D: UsageDevice> Engine<D> {
    pub fn new(device: D, config: EngineConfig) -> Self {
        Self::with_clock(device, SystemClock, config)
    }
}

impl<D: UsageDevice, C: Clock> Engine<D, C> {
    pub fn with_clock(device: D, clock: C, config: EngineConfig) -> Self {
        let allowlist = config.allowlist();
        Self {
            device,
            clock,
            config,
            allowlist,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn allowlist(&self) -> &Allowlist {
        &self.allowlist
    }

    pub fn permission_gate(&self) -> PermissionGate<'_, D, C> {
        PermissionGate::new(&self.device, &self.clock)
            .with_probe_window(self.config.probe_window_ms())
    }

    /// Whether usage data may be read
    pub fn check_permission(&self) -> bool {
        self.permission_gate().check_permission()
    }

    /// Current app, or `PermissionDenied` when the gate refuses
    pub fn get_current_app(&self) -> Result<ResolvedApp> {
        if !self.check_permission() {
            warn!("Usage stats permission not granted");
            return Err(EngineError::PermissionDenied);
        }
        Ok(self.select_current_app())
    }

    /// Snapshot and select without consulting the gate
    pub fn select_current_app(&self) -> ResolvedApp {
        let window = self.config.selection_window_ms();
        let querier = UsageSnapshotQuerier::new(&self.device, &self.clock);
        let snapshot = querier.query_snapshot(window);
        let selector = ForegroundAppSelector::new(&self.device, &self.allowlist);
        selector.select_current_app(snapshot)
    }

    /// Send the user to the usage-access settings screen
    pub fn open_app_settings(&self) {
        info!("Opening usage access settings");
        self.device.launch_settings(ACTION_USAGE_ACCESS_SETTINGS);
    }
}
