use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Default)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level of emitted events. Defaults to `debug` in debug builds and `info` otherwise.
    ///
    /// Overridden by `LOG_LEVEL`.
    #[serde(default)]
    pub level: LogLevel,

    /// `text` for human-readable lines, `json` for one JSON object per event.
    ///
    /// Overridden by `LOG_FORMAT`.
    #[serde(default)]
    pub format: LogFormat,

    /// Directives in `EnvFilter` syntax, e.g. `graft_executor=trace`. Replaces `level` when set.
    ///
    /// Overridden by `LOG_FILTER`.
    #[serde(default)]
    pub filter: Option<String>,
}

impl LoggingConfig {
    pub fn env_filter_str(&self) -> &str {
        match &self.filter {
            Some(filter) => filter,
            None => self.level.as_str(),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("'{value}' is not a valid {setting}, expected one of: {expected}")]
pub struct InvalidLogSetting {
    setting: &'static str,
    value: String,
    expected: String,
}

/// Parses `raw` case-insensitively against the `as_str` names of `variants`.
fn parse_setting<T: Copy>(
    setting: &'static str,
    raw: &str,
    variants: &[T],
    name: fn(&T) -> &'static str,
) -> Result<T, InvalidLogSetting> {
    variants
        .iter()
        .find(|variant| name(variant).eq_ignore_ascii_case(raw.trim()))
        .copied()
        .ok_or_else(|| InvalidLogSetting {
            setting,
            value: raw.to_string(),
            expected: variants.iter().map(name).collect::<Vec<_>>().join(", "),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            LogLevel::Debug
        } else {
            LogLevel::Info
        }
    }
}

impl FromStr for LogLevel {
    type Err = InvalidLogSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_setting("log level", s, &Self::ALL, LogLevel::as_str)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    const ALL: [LogFormat; 2] = [LogFormat::Text, LogFormat::Json];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Json => "json",
        }
    }
}

/// Text while developing, JSON for release builds shipped to log collectors.
impl Default for LogFormat {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            LogFormat::Text
        } else {
            LogFormat::Json
        }
    }
}

impl FromStr for LogFormat {
    type Err = InvalidLogSetting;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_setting("log format", s, &Self::ALL, LogFormat::as_str)
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
