//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (web UI,
//! restore button, serial console) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use core::fmt;
use core::str::FromStr;

use crate::network::RadioMode;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Restart the device once the current tick completes.
    Reboot,

    /// Stop the radio and forget the desired mode.
    DisableWifi,

    /// Request a radio mode; the next loop tick brings it up.
    SetMode(RadioMode),

    /// Persist the current record immediately.
    SaveConfig,

    /// Reload compiled defaults into the record and persist them.
    RestoreDefaults,
}

/// A console line that names no command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommand(pub String);

impl fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown command: {}", self.0)
    }
}

impl core::error::Error for UnknownCommand {}

/// Console syntax: `reboot`, `save`, `defaults`, `wifi off`,
/// `mode sta|ap|off`.  Case and surrounding whitespace are ignored.
impl FromStr for AppCommand {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim().to_ascii_lowercase();
        let mut words = line.split_whitespace();
        let cmd = match (words.next(), words.next(), words.next()) {
            (Some("reboot"), None, None) => Self::Reboot,
            (Some("save"), None, None) => Self::SaveConfig,
            (Some("defaults"), None, None) => Self::RestoreDefaults,
            (Some("wifi"), Some("off"), None) => Self::DisableWifi,
            (Some("mode"), Some(mode), None) => Self::SetMode(match mode {
                "sta" | "station" => RadioMode::Station,
                "ap" => RadioMode::AccessPoint,
                "off" => RadioMode::Off,
                _ => return Err(UnknownCommand(s.trim().to_owned())),
            }),
            _ => return Err(UnknownCommand(s.trim().to_owned())),
        };
        Ok(cmd)
    }
}
