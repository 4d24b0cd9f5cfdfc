// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RFXtrx wire format.
//!
//! Every frame exchanged with the transceiver starts with a length byte
//! counting the bytes that follow, then the packet type, the subtype and a
//! sequence number:
//!
//! ```text
//! [len] [type] [subtype] [seq] [payload ...]
//! ```
//!
//! This module parses the packet families the library dispatches on and
//! builds outbound control frames and interface commands.
//!
//! # Examples
//!
//! ```
//! use rfxtrx_lib::lowlevel::{Packet, PacketClass, PacketType};
//!
//! // A Lighting4 (PT2262) frame carrying code 0x0E6C3B
//! let frame = [0x09, 0x13, 0x00, 0x01, 0x0E, 0x6C, 0x3B, 0x01, 0x5E, 0x70];
//! let packet = Packet::parse(&frame).unwrap();
//!
//! assert_eq!(packet.packet_type(), PacketType::Lighting4);
//! assert_eq!(packet.class(), PacketClass::Control);
//! assert_eq!(packet.id_string(), "0e6c3b");
//! ```

mod lighting;
mod sensor;
mod status;

pub use lighting::{Lighting1, Lighting2, Lighting4, Rfy};
pub use sensor::{HumidityStatus, SensorPacket};
pub use status::{
    InterfaceStatus, RECEIVE_MODES, get_status_packet, receive_mode_bit, reset_packet,
    set_mode_packet,
};

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::command::DeviceCommand;
use crate::error::{DecodeError, DeviceError};

/// Broad classification of a parsed packet.
///
/// Decides which kind of event the codec produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PacketClass {
    /// Periodic measurement (temperature, humidity, ...).
    Sensor,
    /// Interface response from the transceiver itself.
    Status,
    /// Remote control / switch command.
    Control,
}

/// Packet type byte of the supported packet families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum PacketType {
    /// Interface response (0x01).
    InterfaceStatus = 0x01,
    /// X10, ARC, ELRO and similar (0x10).
    Lighting1 = 0x10,
    /// AC, HomeEasy EU, ANSLUT (0x11).
    Lighting2 = 0x11,
    /// PT2262 and compatibles (0x13).
    Lighting4 = 0x13,
    /// Somfy RTS blinds (0x1A).
    Rfy = 0x1A,
    /// Temperature sensors (0x50).
    Temperature = 0x50,
    /// Humidity sensors (0x51).
    Humidity = 0x51,
    /// Combined temperature and humidity sensors (0x52).
    TemperatureHumidity = 0x52,
}

impl PacketType {
    /// Looks up the packet type for a type byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(Self::InterfaceStatus),
            0x10 => Some(Self::Lighting1),
            0x11 => Some(Self::Lighting2),
            0x13 => Some(Self::Lighting4),
            0x1A => Some(Self::Rfy),
            0x50 => Some(Self::Temperature),
            0x51 => Some(Self::Humidity),
            0x52 => Some(Self::TemperatureHumidity),
            _ => None,
        }
    }

    /// Returns the type byte.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    /// Minimum frame size (length byte included) for this type.
    #[must_use]
    pub const fn min_frame_len(self) -> usize {
        match self {
            Self::InterfaceStatus => 10,
            Self::Lighting1 => 8,
            Self::Lighting2 => 12,
            Self::Lighting4 => 10,
            Self::Rfy => 13,
            Self::Temperature | Self::Humidity => 9,
            Self::TemperatureHumidity => 11,
        }
    }

    /// Human readable family name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::InterfaceStatus => "InterfaceStatus",
            Self::Lighting1 => "Lighting1",
            Self::Lighting2 => "Lighting2",
            Self::Lighting4 => "Lighting4",
            Self::Rfy => "Rfy",
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::TemperatureHumidity => "TemperatureHumidity",
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A decoded field value.
///
/// Packets report a mix of labels ("On", "Comfort"), integer readings and
/// fractional temperatures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Textual value such as a command name.
    Text(String),
    /// Integer reading.
    Integer(i64),
    /// Fractional reading.
    Float(f64),
}

impl Value {
    /// Returns the text, if this is a text value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float for any numeric value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Field values of a packet, keyed by their semantic name.
pub type Values = BTreeMap<String, Value>;

/// A parsed RFXtrx packet.
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Interface response.
    Status(InterfaceStatus),
    /// Lighting1 control packet.
    Lighting1(Lighting1),
    /// Lighting2 control packet.
    Lighting2(Lighting2),
    /// Lighting4 (PT2262) control packet.
    Lighting4(Lighting4),
    /// RFY blind control packet.
    Rfy(Rfy),
    /// Temperature and/or humidity reading.
    Sensor(SensorPacket),
}

impl Packet {
    /// Parses a complete frame, length byte included.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` if the frame is empty, its length byte does
    /// not match, the type is unsupported or the frame is too short.
    pub fn parse(data: &[u8]) -> Result<Self, DecodeError> {
        let (&len, rest) = data.split_first().ok_or(DecodeError::Empty)?;
        if usize::from(len) != rest.len() {
            return Err(DecodeError::LengthMismatch {
                declared: usize::from(len),
                actual: rest.len(),
            });
        }

        let type_byte = *rest.first().ok_or(DecodeError::Truncated {
            packet_type: 0,
            expected: 2,
            actual: data.len(),
        })?;
        let packet_type =
            PacketType::from_byte(type_byte).ok_or(DecodeError::UnknownPacketType(type_byte))?;

        if data.len() < packet_type.min_frame_len() {
            return Err(DecodeError::Truncated {
                packet_type: type_byte,
                expected: packet_type.min_frame_len(),
                actual: data.len(),
            });
        }

        let packet = match packet_type {
            PacketType::InterfaceStatus => Self::Status(InterfaceStatus::parse(data)),
            PacketType::Lighting1 => Self::Lighting1(Lighting1::parse(data)),
            PacketType::Lighting2 => Self::Lighting2(Lighting2::parse(data)),
            PacketType::Lighting4 => Self::Lighting4(Lighting4::parse(data)),
            PacketType::Rfy => Self::Rfy(Rfy::parse(data)),
            PacketType::Temperature | PacketType::Humidity | PacketType::TemperatureHumidity => {
                Self::Sensor(SensorPacket::parse(packet_type, data))
            }
        };
        Ok(packet)
    }

    /// Returns the packet family.
    #[must_use]
    pub fn packet_type(&self) -> PacketType {
        match self {
            Self::Status(_) => PacketType::InterfaceStatus,
            Self::Lighting1(_) => PacketType::Lighting1,
            Self::Lighting2(_) => PacketType::Lighting2,
            Self::Lighting4(_) => PacketType::Lighting4,
            Self::Rfy(_) => PacketType::Rfy,
            Self::Sensor(p) => p.packet_type(),
        }
    }

    /// Returns the sensor/status/control classification.
    #[must_use]
    pub fn class(&self) -> PacketClass {
        match self {
            Self::Status(_) => PacketClass::Status,
            Self::Sensor(_) => PacketClass::Sensor,
            Self::Lighting1(_) | Self::Lighting2(_) | Self::Lighting4(_) | Self::Rfy(_) => {
                PacketClass::Control
            }
        }
    }

    /// Returns the subtype byte.
    #[must_use]
    pub fn subtype(&self) -> u8 {
        match self {
            Self::Status(p) => p.subtype,
            Self::Lighting1(p) => p.subtype,
            Self::Lighting2(p) => p.subtype,
            Self::Lighting4(p) => p.subtype,
            Self::Rfy(p) => p.subtype,
            Self::Sensor(p) => p.subtype(),
        }
    }

    /// Returns the model name for the subtype.
    #[must_use]
    pub fn subtype_name(&self) -> &'static str {
        match self {
            Self::Status(_) => "Interface response",
            Self::Lighting1(p) => p.subtype_name(),
            Self::Lighting2(p) => p.subtype_name(),
            Self::Lighting4(_) => "PT2262",
            Self::Rfy(p) => p.subtype_name(),
            Self::Sensor(p) => p.subtype_name(),
        }
    }

    /// Returns the device identity as the transceiver reports it.
    ///
    /// Interface responses have no device and return an empty string.
    #[must_use]
    pub fn id_string(&self) -> String {
        match self {
            Self::Status(_) => String::new(),
            Self::Lighting1(p) => p.id_string(),
            Self::Lighting2(p) => p.id_string(),
            Self::Lighting4(p) => p.id_string(),
            Self::Rfy(p) => p.id_string(),
            Self::Sensor(p) => p.id_string(),
        }
    }

    /// Returns the semantic field values of the packet.
    #[must_use]
    pub fn values(&self) -> Values {
        match self {
            Self::Status(p) => p.values(),
            Self::Lighting1(p) => p.values(),
            Self::Lighting2(p) => p.values(),
            Self::Lighting4(p) => p.values(),
            Self::Rfy(p) => p.values(),
            Self::Sensor(p) => p.values(),
        }
    }

    /// Builds the outbound frame carrying `command` for this device.
    ///
    /// # Errors
    ///
    /// Returns `DeviceError::UnsupportedCommand` if the packet family has no
    /// encoding for the command.
    pub fn encode_command(&self, command: DeviceCommand, seq: u8) -> Result<Vec<u8>, DeviceError> {
        let frame = match self {
            Self::Lighting1(p) => p.encode(command, seq),
            Self::Lighting2(p) => p.encode(command, seq),
            Self::Rfy(p) => p.encode(command, seq),
            Self::Lighting4(_) | Self::Status(_) | Self::Sensor(_) => None,
        };

        frame.ok_or_else(|| DeviceError::UnsupportedCommand {
            family: self.packet_type().name().to_string(),
            command: command.to_string(),
        })
    }
}

/// Extracts the RSSI nibble stored in the high half of the last byte.
pub(crate) fn rssi(byte: u8) -> i64 {
    i64::from(byte >> 4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_empty_frame() {
        assert_eq!(Packet::parse(&[]), Err(DecodeError::Empty));
    }

    #[test]
    fn parse_rejects_length_mismatch() {
        let err = Packet::parse(&[0x09, 0x13, 0x00]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LengthMismatch {
                declared: 9,
                actual: 2
            }
        );
    }

    #[test]
    fn parse_rejects_unknown_type() {
        let err = Packet::parse(&[0x03, 0x7F, 0x00, 0x00]).unwrap_err();
        assert_eq!(err, DecodeError::UnknownPacketType(0x7F));
    }

    #[test]
    fn parse_rejects_truncated_frame() {
        let err = Packet::parse(&[0x04, 0x11, 0x00, 0x00, 0x01]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Truncated {
                packet_type: 0x11,
                expected: 12,
                actual: 5
            }
        ));
    }

    #[test]
    fn classification() {
        let status = Packet::parse(&[
            0x0D, 0x01, 0x00, 0x01, 0x02, 0x53, 0x45, 0x08, 0x00, 0x27, 0x01, 0x00, 0x00, 0x00,
        ])
        .unwrap();
        assert_eq!(status.class(), PacketClass::Status);
        assert!(status.id_string().is_empty());

        let sensor =
            Packet::parse(&[0x08, 0x50, 0x02, 0x11, 0x70, 0x02, 0x00, 0xA7, 0x89]).unwrap();
        assert_eq!(sensor.class(), PacketClass::Sensor);

        let control =
            Packet::parse(&[0x07, 0x10, 0x00, 0x2A, 0x45, 0x05, 0x01, 0x70]).unwrap();
        assert_eq!(control.class(), PacketClass::Control);
    }

    #[test]
    fn lighting4_cannot_encode_commands() {
        let packet =
            Packet::parse(&[0x09, 0x13, 0x00, 0x01, 0x0E, 0x6C, 0x3B, 0x01, 0x5E, 0x70]).unwrap();
        let err = packet.encode_command(DeviceCommand::On, 0).unwrap_err();
        assert_eq!(
            err,
            DeviceError::UnsupportedCommand {
                family: "Lighting4".to_string(),
                command: "on".to_string()
            }
        );
    }

    #[test]
    fn value_accessors() {
        assert_eq!(Value::from("On").as_str(), Some("On"));
        assert_eq!(Value::from(42).as_i64(), Some(42));
        assert_eq!(Value::from(42).as_f64(), Some(42.0));
        assert_eq!(Value::from(21.5).as_f64(), Some(21.5));
        assert_eq!(Value::from(21.5).to_string(), "21.5");
        assert!(Value::from("On").as_f64().is_none());
    }
}
