// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gateway configuration.
//!
//! A [`GatewayConfig`] is either deserialized from JSON or assembled with
//! the builder methods. Devices are listed per platform in maps keyed by
//! packet hex:
//!
//! ```json
//! {
//!   "device": "/dev/ttyUSB0",
//!   "automatic_add": true,
//!   "lights": { "0b1100cd0213c7f210010f70": { "name": "Kitchen" } },
//!   "binary_sensors": {
//!     "0913000e0e6c3b015e70": { "name": "Door", "data_bits": 4, "command_on": 14, "command_off": 7 }
//!   }
//! }
//! ```
//!
//! Map keys of odd length are left-padded with `0`. The legacy `packetid`
//! field, when present, replaces the key.

mod device_config;

pub use device_config::{BinarySensorConfig, DeviceConfig, SensorConfig};

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::codec;
use crate::device::DeviceKind;
use crate::error::ConfigError;
use crate::lowlevel::receive_mode_bit;
use crate::registry::DeviceEntry;

/// Default number of transmissions per command.
pub const DEFAULT_SIGNAL_REPETITIONS: u32 = 1;

/// Configuration of an RFXtrx gateway.
///
/// # Examples
///
/// ```
/// use rfxtrx_lib::config::{DeviceConfig, GatewayConfig};
///
/// let config = GatewayConfig::new("/dev/ttyUSB0")
///     .with_automatic_add(true)
///     .with_signal_repetitions(3)
///     .with_light("0b1100cd0213c7f210010f70", DeviceConfig::named("Kitchen"));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.device_entries().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Path of the serial device.
    pub device: String,
    /// Log every raw frame at info level.
    pub debug: bool,
    /// Use an in-memory transport instead of the serial device.
    pub dummy: bool,
    /// Receive modes to enable on the transceiver.
    pub recv_modes: Option<Vec<String>>,
    /// Create devices for unknown ids on first sight.
    pub automatic_add: bool,
    /// Transmissions per outbound command.
    pub signal_repetitions: u32,
    /// Configured switches.
    pub switches: BTreeMap<String, DeviceConfig>,
    /// Configured dimmable lights.
    pub lights: BTreeMap<String, DeviceConfig>,
    /// Configured covers.
    pub covers: BTreeMap<String, DeviceConfig>,
    /// Configured binary sensors.
    pub binary_sensors: BTreeMap<String, BinarySensorConfig>,
    /// Configured measuring sensors.
    pub sensors: BTreeMap<String, SensorConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            debug: false,
            dummy: false,
            recv_modes: None,
            automatic_add: false,
            signal_repetitions: DEFAULT_SIGNAL_REPETITIONS,
            switches: BTreeMap::new(),
            lights: BTreeMap::new(),
            covers: BTreeMap::new(),
            binary_sensors: BTreeMap::new(),
            sensors: BTreeMap::new(),
        }
    }
}

impl GatewayConfig {
    /// Creates a configuration for the serial device at `device`.
    #[must_use]
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Self::default()
        }
    }

    /// Creates a configuration using the in-memory dummy transport.
    #[must_use]
    pub fn dummy() -> Self {
        Self {
            dummy: true,
            ..Self::default()
        }
    }

    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if the document does not parse.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Enables raw frame logging.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the receive modes to enable.
    #[must_use]
    pub fn with_recv_modes<I, S>(mut self, modes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recv_modes = Some(modes.into_iter().map(Into::into).collect());
        self
    }

    /// Enables or disables automatic device creation.
    #[must_use]
    pub fn with_automatic_add(mut self, automatic_add: bool) -> Self {
        self.automatic_add = automatic_add;
        self
    }

    /// Sets the number of transmissions per command.
    #[must_use]
    pub fn with_signal_repetitions(mut self, repetitions: u32) -> Self {
        self.signal_repetitions = repetitions;
        self
    }

    /// Adds a switch.
    #[must_use]
    pub fn with_switch(mut self, packet_id: impl Into<String>, config: DeviceConfig) -> Self {
        self.switches.insert(packet_id.into(), config);
        self
    }

    /// Adds a dimmable light.
    #[must_use]
    pub fn with_light(mut self, packet_id: impl Into<String>, config: DeviceConfig) -> Self {
        self.lights.insert(packet_id.into(), config);
        self
    }

    /// Adds a cover.
    #[must_use]
    pub fn with_cover(mut self, packet_id: impl Into<String>, config: DeviceConfig) -> Self {
        self.covers.insert(packet_id.into(), config);
        self
    }

    /// Adds a binary sensor.
    #[must_use]
    pub fn with_binary_sensor(
        mut self,
        packet_id: impl Into<String>,
        config: BinarySensorConfig,
    ) -> Self {
        self.binary_sensors.insert(packet_id.into(), config);
        self
    }

    /// Adds a measuring sensor.
    #[must_use]
    pub fn with_sensor(mut self, packet_id: impl Into<String>, config: SensorConfig) -> Self {
        self.sensors.insert(packet_id.into(), config);
        self
    }

    /// Checks the configuration for fatal errors.
    ///
    /// Device entries whose packet ids do not decode are not errors here;
    /// they are skipped with a log line at registration.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: a missing device path, zero
    /// repetitions, an unknown receive mode, `data_bits` outside 1-8, or an
    /// unknown sensor data type.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dummy && self.device.trim().is_empty() {
            return Err(ConfigError::MissingDevice);
        }
        if self.signal_repetitions == 0 {
            return Err(ConfigError::InvalidSignalRepetitions);
        }
        for mode in self.recv_modes.iter().flatten() {
            if receive_mode_bit(mode).is_none() {
                return Err(ConfigError::UnknownReceiveMode(mode.clone()));
            }
        }
        for (key, sensor) in &self.binary_sensors {
            sensor.validate(key)?;
        }
        for sensor in self.sensors.values() {
            sensor.data_types()?;
        }
        Ok(())
    }

    /// Flattens the platform maps into registry entries.
    ///
    /// Entries come out platform by platform (switches, lights, covers,
    /// binary sensors, sensors), each in key order.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownDataType` for an unparsable sensor data
    /// type.
    pub fn device_entries(&self) -> Result<Vec<DeviceEntry>, ConfigError> {
        let mut entries = Vec::new();

        let simple = [
            (&self.switches, DeviceKind::Switch),
            (&self.lights, DeviceKind::Light),
            (&self.covers, DeviceKind::Cover),
        ];
        for (devices, kind) in simple {
            for (key, config) in devices {
                let packet_id = resolve_packet_id(key, config.packetid.as_deref());
                entries.push(DeviceEntry {
                    name: display_name(config.name.as_deref(), &packet_id),
                    packet_id,
                    fire_event: config.fire_event,
                    kind: kind.clone(),
                });
            }
        }

        for (key, config) in &self.binary_sensors {
            let packet_id = resolve_packet_id(key, config.packetid.as_deref());
            entries.push(DeviceEntry {
                name: display_name(config.name.as_deref(), &packet_id),
                packet_id,
                fire_event: config.fire_event,
                kind: DeviceKind::BinarySensor(config.options()),
            });
        }

        for (key, config) in &self.sensors {
            let packet_id = resolve_packet_id(key, config.packetid.as_deref());
            entries.push(DeviceEntry {
                name: display_name(config.name.as_deref(), &packet_id),
                packet_id,
                fire_event: config.fire_event,
                kind: DeviceKind::Sensor {
                    data_types: config.data_types()?,
                },
            });
        }

        Ok(entries)
    }
}

fn resolve_packet_id(key: &str, legacy: Option<&str>) -> String {
    let packet_id = match legacy {
        Some(packetid) => {
            tracing::warn!(
                key,
                packetid,
                "Outdated device configuration, use the packet id as the key"
            );
            packetid
        }
        None => key,
    };
    codec::normalize_packet_id(packet_id.trim())
}

fn display_name(name: Option<&str>, packet_id: &str) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => packet_id.to_string(),
    }
}
