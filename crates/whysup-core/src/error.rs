//! Error types shared across the engine

use thiserror::Error;

/// A package could not be resolved by the package-metadata service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to resolve package {package_name}: {reason}")]
pub struct MetadataLookupFailure {
    pub package_name: String,
    pub reason: String,
}

impl MetadataLookupFailure {
    pub fn new(package_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(package_name: impl Into<String>) -> Self {
        Self::new(package_name, "name not found")
    }
}

/// The usage-statistics service refused or failed a query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Usage stats query failed: {0}")]
pub struct SnapshotQueryFailure(pub String);

/// Errors surfaced by the engine's public entry points
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Usage Stats permission is required.")]
    PermissionDenied,
}

impl EngineError {
    /// Error code carried across the channel boundary
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::PermissionDenied => "PERMISSION_DENIED",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
