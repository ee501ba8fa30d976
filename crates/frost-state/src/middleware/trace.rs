use super::{Middleware, Next};
use crate::action::Action;
use crate::error::FrostResult;
use crate::Value;
use serde::Deserialize;
use std::time::Instant;

/// Verbosity for [`TraceActions`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    /// `TRACE`
    Trace,
    /// `DEBUG`
    #[default]
    Debug,
    /// `INFO`
    Info,
}

/// Settings for [`TraceActions`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Level of the per-action event.
    pub level: TraceLevel,
    /// Include the written paths in the event.
    pub include_paths: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            level: TraceLevel::Debug,
            include_paths: true,
        }
    }
}

/// Logs every action and its outcome through `tracing`.
///
/// Failures are always logged at `warn`.
#[derive(Clone, Debug, Default)]
pub struct TraceActions {
    config: TraceConfig,
}

macro_rules! emit {
    ($level:expr, $($field:tt)*) => {
        match $level {
            TraceLevel::Trace => tracing::trace!($($field)*),
            TraceLevel::Debug => tracing::debug!($($field)*),
            TraceLevel::Info => tracing::info!($($field)*),
        }
    };
}

impl TraceActions {
    /// Create with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from settings.
    pub fn with_config(config: TraceConfig) -> Self {
        Self { config }
    }

    /// Set the event level.
    #[must_use]
    pub fn with_level(mut self, level: TraceLevel) -> Self {
        self.config.level = level;
        self
    }

    /// The active settings.
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }
}

impl Middleware for TraceActions {
    fn handle(&self, _state: &Value, action: &Action, next: Next<'_>) -> FrostResult<Value> {
        let started = Instant::now();
        let result = next.run(action);
        let elapsed_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        match &result {
            Ok(_) if self.config.include_paths => {
                let paths: Vec<String> = action.entries().iter().map(|e| e.path.to_string()).collect();
                emit!(
                    self.config.level,
                    label = %action.label(),
                    entries = action.len(),
                    paths = ?paths,
                    elapsed_us,
                    "action committed"
                );
            }
            Ok(_) => {
                emit!(
                    self.config.level,
                    label = %action.label(),
                    entries = action.len(),
                    elapsed_us,
                    "action committed"
                );
            }
            Err(e) => {
                tracing::warn!(label = %action.label(), error = %e, "action failed");
            }
        }
        result
    }
}
