//! Device backends for why-sup
//!
//! The engine reaches the OS only through the service traits in
//! `whysup_core::services`. This crate provides [`DeviceProfile`], a JSON
//! description of a device that implements all of them, so the engine can be
//! driven from the CLI, the bridge, and tests without a phone attached.

pub mod profile;

pub use profile::{DeviceProfile, PackageEntry, UsageEntry};
pub use whysup_core::SystemClock;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid device profile: {0}")]
    InvalidProfile(String),
}

pub type Result<T> = std::result::Result<T, DeviceError>;
