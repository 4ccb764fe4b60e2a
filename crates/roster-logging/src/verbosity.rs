//! Severity threshold

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::Level;

/// Log severity threshold, ordered from quietest to noisiest
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    pub const ALL: [Verbosity; 5] = [
        Verbosity::Error,
        Verbosity::Warn,
        Verbosity::Info,
        Verbosity::Debug,
        Verbosity::Trace,
    ];

    /// Whether a message at `level` passes this threshold
    pub fn allows(self, level: Verbosity) -> bool {
        level <= self
    }

    /// `EnvFilter` directive for this threshold
    pub fn as_directive(self) -> &'static str {
        match self {
            Verbosity::Error => "error",
            Verbosity::Warn => "warn",
            Verbosity::Info => "info",
            Verbosity::Debug => "debug",
            Verbosity::Trace => "trace",
        }
    }

    pub fn to_level(self) -> Level {
        match self {
            Verbosity::Error => Level::ERROR,
            Verbosity::Warn => Level::WARN,
            Verbosity::Info => Level::INFO,
            Verbosity::Debug => Level::DEBUG,
            Verbosity::Trace => Level::TRACE,
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" | "0" => Ok(Verbosity::Error),
            "warn" | "warning" | "1" => Ok(Verbosity::Warn),
            "info" | "2" => Ok(Verbosity::Info),
            "debug" | "3" => Ok(Verbosity::Debug),
            "trace" | "4" => Ok(Verbosity::Trace),
            other => Err(format!("unknown log level {other:?}")),
        }
    }
}
