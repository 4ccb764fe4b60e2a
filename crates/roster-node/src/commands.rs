//! Slash-style command surface
//!
//! Each command maps onto a reconciler getter or setter. Parsing lives here
//! and execution in [`crate::Session::execute`], which returns printable lines.

use std::str::FromStr;

use roster_logging::Verbosity;
use roster_sync::FriendSource;

use crate::error::NodeError;

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print policy flags and friend counts
    Status,
    /// Show or set the log threshold
    Debug(Option<Verbosity>),
    /// Show or set the per-character deletion flag
    Delete(Option<bool>),
    /// Show or set the realm-group full-sync flag
    FullSync(Option<bool>),
    /// List the friends in a set
    Friends(FriendSource),
    Help,
}

pub const HELP_LINES: &[&str] = &[
    "status                        show sync policy and friend counts",
    "debug [error|warn|info|debug|trace]   show or set the log level",
    "delete [on|off]               remove stale friends on this character",
    "fullsync [on|off]             remove stale friends on every character of the realm-group",
    "friends [live|master|overlay] list friends",
    "help                          show this help",
];

fn parse_switch(arg: &str) -> Result<bool, NodeError> {
    match arg.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" | "enable" => Ok(true),
        "off" | "false" | "no" | "0" | "disable" => Ok(false),
        other => Err(NodeError::Command(format!("expected on or off, got {other:?}"))),
    }
}

impl FromStr for Command {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let name = words.next().unwrap_or("help").to_lowercase();
        let arg = words.next();
        if let Some(extra) = words.next() {
            return Err(NodeError::Command(format!("unexpected argument {extra:?}")));
        }

        match name.as_str() {
            "status" => Ok(Command::Status),
            "debug" => arg
                .map(|a| a.parse::<Verbosity>().map_err(NodeError::Command))
                .transpose()
                .map(Command::Debug),
            "delete" => arg.map(parse_switch).transpose().map(Command::Delete),
            "fullsync" => arg.map(parse_switch).transpose().map(Command::FullSync),
            "friends" => arg
                .unwrap_or("live")
                .parse::<FriendSource>()
                .map(Command::Friends)
                .map_err(NodeError::Command),
            "help" | "?" => Ok(Command::Help),
            other => Err(NodeError::Command(format!("unknown command {other:?}"))),
        }
    }
}
