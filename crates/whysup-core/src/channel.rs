//! `usage_stats` method channel
//!
//! Maps request names arriving from the host shell onto engine calls and
//! wraps the answers in a transport-neutral envelope.

use crate::services::{Clock, UsageDevice};
use crate::{Engine, EngineError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const CHANNEL_NAME: &str = "com.example.why_sup/usage_stats";

pub const METHOD_CHECK_PERMISSION: &str = "checkUsageStatsPermission";
pub const METHOD_GET_CURRENT_APP: &str = "getCurrentApp";
pub const METHOD_OPEN_APP_SETTINGS: &str = "openAppSettings";

/// A request arriving over the channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Value::Null,
        }
    }
}

/// Outcome of one channel call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChannelResult {
    Success {
        result: Value,
    },
    Error {
        code: String,
        message: String,
        details: Value,
    },
    NotImplemented,
}

impl ChannelResult {
    pub fn success<T: Serialize>(value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(result) => ChannelResult::Success { result },
            Err(e) => ChannelResult::Error {
                code: "ENCODING_FAILED".to_string(),
                message: e.to_string(),
                details: Value::Null,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ChannelResult::Success { .. })
    }
}

impl From<EngineError> for ChannelResult {
    fn from(e: EngineError) -> Self {
        ChannelResult::Error {
            code: e.code().to_string(),
            message: e.to_string(),
            details: Value::Null,
        }
    }
}

pub struct UsageStatsChannel<'a, D, C> {
    engine: &'a Engine<D, C>,
}

impl<'a, D: UsageDevice, C: Clock> UsageStatsChannel<'a, D, C> {
    pub fn new(engine: &'a Engine<D, C>) -> Self {
        Self { engine }
    }

    pub fn handle(&self, call: &MethodCall) -> ChannelResult {
        debug!("Channel call: {}", call.method);
        match call.method.as_str() {
            METHOD_GET_CURRENT_APP => match self.engine.get_current_app() {
                Ok(app) => ChannelResult::success(app),
                Err(e) => e.into(),
            },
            METHOD_CHECK_PERMISSION => ChannelResult::success(self.engine.check_permission()),
            METHOD_OPEN_APP_SETTINGS => {
                self.engine.open_app_settings();
                ChannelResult::success(Value::Null)
            }
            _ => ChannelResult::NotImplemented,
        }
    }
}
