// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device capabilities.
//!
//! What a device can do follows from its kind: switches turn on and off,
//! lights also dim, covers move, and sensors only report. Outbound
//! commands are checked against these flags before anything is encoded.

use crate::command::DeviceCommand;
use crate::device::DeviceKind;

/// Capabilities of an RFXtrx device.
///
/// # Examples
///
/// ```
/// use rfxtrx_lib::Capabilities;
/// use rfxtrx_lib::command::DeviceCommand;
///
/// let light = Capabilities::light();
/// assert!(light.supports(DeviceCommand::Dim(128)));
///
/// let switch = Capabilities::switch();
/// assert!(!switch.supports(DeviceCommand::Dim(128)));
/// assert_eq!(switch.missing(DeviceCommand::Dim(128)), Some("dimming"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
// Independent feature flags
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Accepts on/off commands.
    pub on_off: bool,

    /// Accepts dim commands.
    pub dimmer: bool,

    /// Accepts open/close/stop commands.
    pub cover: bool,

    /// Reports sensor readings.
    pub readings: bool,
}

impl Capabilities {
    /// An on/off switch.
    #[must_use]
    pub const fn switch() -> Self {
        Self {
            on_off: true,
            dimmer: false,
            cover: false,
            readings: false,
        }
    }

    /// A dimmable light.
    #[must_use]
    pub const fn light() -> Self {
        Self {
            on_off: true,
            dimmer: true,
            cover: false,
            readings: false,
        }
    }

    /// A blind or awning.
    #[must_use]
    pub const fn cover() -> Self {
        Self {
            on_off: false,
            dimmer: false,
            cover: true,
            readings: false,
        }
    }

    /// A measuring sensor.
    #[must_use]
    pub const fn sensor() -> Self {
        Self {
            on_off: false,
            dimmer: false,
            cover: false,
            readings: true,
        }
    }

    /// A receive-only binary sensor.
    #[must_use]
    pub const fn binary_sensor() -> Self {
        Self {
            on_off: false,
            dimmer: false,
            cover: false,
            readings: false,
        }
    }

    /// Capabilities implied by a device kind.
    #[must_use]
    pub fn for_kind(kind: &DeviceKind) -> Self {
        match kind {
            DeviceKind::Switch => Self::switch(),
            DeviceKind::Light => Self::light(),
            DeviceKind::Cover => Self::cover(),
            DeviceKind::BinarySensor(_) => Self::binary_sensor(),
            DeviceKind::Sensor { .. } => Self::sensor(),
        }
    }

    /// Returns `true` if a device with these capabilities accepts `command`.
    #[must_use]
    pub const fn supports(&self, command: DeviceCommand) -> bool {
        self.missing(command).is_none()
    }

    /// Names the capability `command` needs and these lack, if any.
    #[must_use]
    pub const fn missing(&self, command: DeviceCommand) -> Option<&'static str> {
        match command {
            DeviceCommand::On | DeviceCommand::Off if !self.on_off => Some("on/off"),
            DeviceCommand::Dim(_) if !self.dimmer => Some("dimming"),
            DeviceCommand::Open | DeviceCommand::Close | DeviceCommand::Stop if !self.cover => {
                Some("cover")
            }
            _ => None,
        }
    }
}
