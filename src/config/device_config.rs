// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device configuration entries.

use std::time::Duration;

use serde::Deserialize;

use crate::device::BinarySensorOptions;
use crate::error::ConfigError;
use crate::types::DataType;

/// Configuration of a switch, light or cover.
///
/// # Examples
///
/// ```
/// use rfxtrx_lib::config::DeviceConfig;
///
/// let config = DeviceConfig::named("Garden Light").with_fire_event();
/// assert!(config.fire_event);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Display name; the packet id when empty.
    pub name: Option<String>,
    /// Raise button-pressed events for received commands.
    pub fire_event: bool,
    /// Deprecated: packet id overriding the map key.
    pub packetid: Option<String>,
}

impl DeviceConfig {
    /// Creates an entry with a display name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Enables button-pressed events.
    #[must_use]
    pub fn with_fire_event(mut self) -> Self {
        self.fire_event = true;
        self
    }
}

/// Configuration of a binary sensor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BinarySensorConfig {
    /// Display name; the packet id when empty.
    pub name: Option<String>,
    /// Class hint passed through to hosts.
    pub device_class: Option<String>,
    /// Raise button-pressed events for received commands.
    pub fire_event: bool,
    /// Seconds after which an "on" sensor turns itself off.
    pub off_delay: Option<u64>,
    /// PT2262 command bit count.
    pub data_bits: Option<u8>,
    /// PT2262 command meaning "on".
    pub command_on: Option<u8>,
    /// PT2262 command meaning "off".
    pub command_off: Option<u8>,
    /// Deprecated: packet id overriding the map key.
    pub packetid: Option<String>,
}

impl BinarySensorConfig {
    /// Creates an entry with a display name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Sets the class hint.
    #[must_use]
    pub fn with_device_class(mut self, device_class: impl Into<String>) -> Self {
        self.device_class = Some(device_class.into());
        self
    }

    /// Enables button-pressed events.
    #[must_use]
    pub fn with_fire_event(mut self) -> Self {
        self.fire_event = true;
        self
    }

    /// Sets the off delay in seconds.
    #[must_use]
    pub fn with_off_delay(mut self, seconds: u64) -> Self {
        self.off_delay = Some(seconds);
        self
    }

    /// Sets the PT2262 command bits and the on/off command values.
    #[must_use]
    pub fn with_pt2262(mut self, data_bits: u8, command_on: u8, command_off: u8) -> Self {
        self.data_bits = Some(data_bits);
        self.command_on = Some(command_on);
        self.command_off = Some(command_off);
        self
    }

    /// Checks `data_bits` for the entry stored under `packet_id`.
    pub(crate) fn validate(&self, packet_id: &str) -> Result<(), ConfigError> {
        match self.data_bits {
            Some(bits) if !(1..=8).contains(&bits) => Err(ConfigError::InvalidDataBits {
                packet_id: packet_id.to_string(),
                bits,
            }),
            _ => Ok(()),
        }
    }

    pub(crate) fn options(&self) -> BinarySensorOptions {
        BinarySensorOptions {
            device_class: self.device_class.clone(),
            off_delay: self.off_delay.map(Duration::from_secs),
            data_bits: self.data_bits,
            command_on: self.command_on,
            command_off: self.command_off,
        }
    }
}

/// Configuration of a measuring sensor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Display name; the packet id when empty.
    pub name: Option<String>,
    /// Raise button-pressed events for received commands.
    pub fire_event: bool,
    /// Readings to track, e.g. `Temperature`. Empty tracks everything.
    pub data_type: Vec<String>,
    /// Deprecated: packet id overriding the map key.
    pub packetid: Option<String>,
}

impl SensorConfig {
    /// Creates an entry with a display name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Adds a tracked reading.
    #[must_use]
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type.push(data_type.into());
        self
    }

    /// Parses the configured data types.
    pub(crate) fn data_types(&self) -> Result<Vec<DataType>, ConfigError> {
        self.data_type.iter().map(|s| s.parse()).collect()
    }
}
