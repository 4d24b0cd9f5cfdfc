// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound device commands.
//!
//! Each command maps onto one send primitive of the transceiver. Whether a
//! device can carry it depends on its packet family:
//!
//! | Command | Lighting1 | Lighting2 | RFY |
//! |---------|-----------|-----------|-----|
//! | [`On`](DeviceCommand::On) / [`Off`](DeviceCommand::Off) | yes | yes | no |
//! | [`Dim`](DeviceCommand::Dim) | no | yes | no |
//! | [`Open`](DeviceCommand::Open) / [`Close`](DeviceCommand::Close) / [`Stop`](DeviceCommand::Stop) | no | no | yes |
//!
//! # Examples
//!
//! ```
//! use rfxtrx_lib::command::DeviceCommand;
//!
//! assert_eq!(DeviceCommand::Dim(128).to_string(), "dim 128");
//! assert!(DeviceCommand::Dim(0).turns_off());
//! assert!(DeviceCommand::Open.is_cover_command());
//! ```

use std::fmt;

/// A command that can be transmitted to an RF device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceCommand {
    /// Switch on.
    On,
    /// Switch off.
    Off,
    /// Dim to a 0-255 brightness.
    Dim(u8),
    /// Open (raise) a cover.
    Open,
    /// Close (lower) a cover.
    Close,
    /// Stop a moving cover.
    Stop,
}

impl DeviceCommand {
    /// Returns `true` for commands that only make sense on covers.
    #[must_use]
    pub fn is_cover_command(self) -> bool {
        matches!(self, Self::Open | Self::Close | Self::Stop)
    }

    /// Returns `true` if the command leaves the device off.
    #[must_use]
    pub fn turns_off(self) -> bool {
        matches!(self, Self::Off | Self::Dim(0))
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("on"),
            Self::Off => f.write_str("off"),
            Self::Dim(brightness) => write!(f, "dim {brightness}"),
            Self::Open => f.write_str("open"),
            Self::Close => f.write_str("close"),
            Self::Stop => f.write_str("stop"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display() {
        assert_eq!(DeviceCommand::On.to_string(), "on");
        assert_eq!(DeviceCommand::Stop.to_string(), "stop");
        assert_eq!(DeviceCommand::Dim(10).to_string(), "dim 10");
    }

    #[test]
    fn classification() {
        assert!(DeviceCommand::Close.is_cover_command());
        assert!(!DeviceCommand::On.is_cover_command());
        assert!(DeviceCommand::Off.turns_off());
        assert!(!DeviceCommand::Dim(1).turns_off());
    }
}
