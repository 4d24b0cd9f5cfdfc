// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device kinds and their per-kind options.

use std::time::Duration;

use crate::codec::DecodedEvent;
use crate::lowlevel::PacketType;
use crate::types::DataType;

/// Options of a binary sensor.
///
/// `data_bits`, `command_on` and `command_off` only matter for PT2262
/// (Lighting4) sensors, where the low bits of the id carry the state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinarySensorOptions {
    /// Free-form class hint for hosts, e.g. `motion`.
    pub device_class: Option<String>,
    /// Turn the sensor off this long after it turned on.
    pub off_delay: Option<Duration>,
    /// Number of low bits carrying the command (1-8).
    pub data_bits: Option<u8>,
    /// Command value meaning "on".
    pub command_on: Option<u8>,
    /// Command value meaning "off".
    pub command_off: Option<u8>,
}

/// What a registered device is.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceKind {
    /// On/off switch.
    Switch,
    /// Dimmable light.
    Light,
    /// Blind or awning.
    Cover,
    /// Receive-only on/off sensor.
    BinarySensor(BinarySensorOptions),
    /// Measuring sensor exposing the listed readings.
    Sensor {
        /// Readings tracked for this sensor.
        data_types: Vec<DataType>,
    },
}

impl DeviceKind {
    /// Host domain name used for entity ids.
    #[must_use]
    pub fn domain(&self) -> &'static str {
        match self {
            Self::Switch => "switch",
            Self::Light => "light",
            Self::Cover => "cover",
            Self::BinarySensor(_) => "binary_sensor",
            Self::Sensor { .. } => "sensor",
        }
    }

    /// Picks a kind for an automatically added device.
    ///
    /// Lighting1 remotes become switches, Lighting2 dimmers become lights,
    /// PT2262 codes become binary sensors and RFY remotes become covers.
    /// Sensors track every reading present in the first packet. Interface
    /// responses have no device and yield `None`.
    #[must_use]
    pub fn infer(event: &DecodedEvent) -> Option<Self> {
        let kind = match event.packet_type() {
            PacketType::InterfaceStatus => return None,
            PacketType::Lighting1 => Self::Switch,
            PacketType::Lighting2 => Self::Light,
            PacketType::Lighting4 => Self::BinarySensor(BinarySensorOptions::default()),
            PacketType::Rfy => Self::Cover,
            PacketType::Temperature | PacketType::Humidity | PacketType::TemperatureHumidity => {
                Self::Sensor {
                    data_types: DataType::ALL
                        .into_iter()
                        .filter(|dt| event.value(dt.key()).is_some())
                        .collect(),
                }
            }
        };
        Some(kind)
    }

    /// Binary sensor options, for binary sensors.
    #[must_use]
    pub fn binary_sensor_options(&self) -> Option<&BinarySensorOptions> {
        match self {
            Self::BinarySensor(options) => Some(options),
            _ => None,
        }
    }

    /// Tracked readings, empty unless this is a sensor.
    #[must_use]
    pub fn data_types(&self) -> &[DataType] {
        match self {
            Self::Sensor { data_types } => data_types,
            _ => &[],
        }
    }
}
