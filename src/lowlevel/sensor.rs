// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temperature and humidity sensor packets (types 0x50-0x52).

use super::{PacketType, Value, Values, rssi};

/// Comfort classification reported by humidity sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HumidityStatus {
    /// Below comfortable humidity.
    Dry,
    /// Comfortable.
    Comfort,
    /// Normal.
    Normal,
    /// Above comfortable humidity.
    Wet,
    /// Unassigned status code.
    Unknown(u8),
}

impl HumidityStatus {
    fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Self::Dry,
            0x01 => Self::Comfort,
            0x02 => Self::Normal,
            0x03 => Self::Wet,
            other => Self::Unknown(other),
        }
    }

    fn as_byte(self) -> u8 {
        match self {
            Self::Dry => 0x00,
            Self::Comfort => 0x01,
            Self::Normal => 0x02,
            Self::Wet => 0x03,
            Self::Unknown(b) => b,
        }
    }

    /// Returns the status label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Dry => "Dry",
            Self::Comfort => "Comfort",
            Self::Normal => "Normal",
            Self::Wet => "Wet",
            Self::Unknown(_) => "--??--",
        }
    }
}

/// A temperature and/or humidity reading.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorPacket {
    packet_type: PacketType,
    subtype: u8,
    /// Sequence number.
    pub seq: u8,
    /// Sensor id bytes.
    pub id: [u8; 2],
    /// Temperature in degrees Celsius, when reported.
    pub temperature: Option<f64>,
    /// Relative humidity in percent, when reported.
    pub humidity: Option<u8>,
    /// Humidity comfort status, when reported.
    pub humidity_status: Option<HumidityStatus>,
    /// Battery level nibble (0-9, 9 = full).
    pub battery: u8,
    /// Signal strength byte.
    pub rssi_byte: u8,
}

/// Decodes the sign-magnitude tenths-of-degree encoding.
fn temperature(high: u8, low: u8) -> f64 {
    let tenths = f64::from((u16::from(high & 0x7F) << 8) | u16::from(low)) / 10.0;
    if high & 0x80 == 0 { tenths } else { -tenths }
}

impl SensorPacket {
    pub(super) fn parse(packet_type: PacketType, data: &[u8]) -> Self {
        let id = [data[4], data[5]];
        let (temperature, humidity, humidity_status, battery_byte) = match packet_type {
            PacketType::Temperature => (Some(temperature(data[6], data[7])), None, None, data[8]),
            PacketType::Humidity => (
                None,
                Some(data[6]),
                Some(HumidityStatus::from_byte(data[7])),
                data[8],
            ),
            _ => (
                Some(temperature(data[6], data[7])),
                Some(data[8]),
                Some(HumidityStatus::from_byte(data[9])),
                data[10],
            ),
        };

        Self {
            packet_type,
            subtype: data[2],
            seq: data[3],
            id,
            temperature,
            humidity,
            humidity_status,
            battery: battery_byte & 0x0F,
            rssi_byte: battery_byte,
        }
    }

    /// Returns the packet family.
    #[must_use]
    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    /// Returns the subtype byte.
    #[must_use]
    pub fn subtype(&self) -> u8 {
        self.subtype
    }

    /// Returns the model name for the subtype.
    #[must_use]
    pub fn subtype_name(&self) -> &'static str {
        match (self.packet_type, self.subtype) {
            (PacketType::Temperature, 0x01) => "THR128/138, THC138",
            (PacketType::Temperature, 0x02) => "THC238/268, THN132, THWR288, THRN122, THN122, AW129/131",
            (PacketType::Temperature, 0x03) => "THWR800",
            (PacketType::Temperature, 0x04) => "RTHN318",
            (PacketType::Temperature, 0x05) => "La Crosse TX2, TX3, TX4, TX17",
            (PacketType::Temperature, 0x06) => "TS15C",
            (PacketType::Temperature, 0x07) => "Viking 02811",
            (PacketType::Temperature, 0x08) => "La Crosse WS2300",
            (PacketType::Temperature, 0x09) => "RUBiCSON",
            (PacketType::Temperature, 0x0A) => "TFA 30.3133",
            (PacketType::Humidity, 0x01) => "LaCrosse TX3",
            (PacketType::Humidity, 0x02) => "LaCrosse WS2300",
            (PacketType::Humidity, 0x03) => "Inovalley S80 plant humidity sensor",
            (PacketType::TemperatureHumidity, 0x01) => "THGN122/123, THGN132, THGR122/228/238/268",
            (PacketType::TemperatureHumidity, 0x02) => "THGR810, THGN800",
            (PacketType::TemperatureHumidity, 0x03) => "RTGR328",
            (PacketType::TemperatureHumidity, 0x04) => "THGR328",
            (PacketType::TemperatureHumidity, 0x05) => "WTGR800",
            (PacketType::TemperatureHumidity, 0x06) => "THGR918/928, THGRN228, THGN500",
            (PacketType::TemperatureHumidity, 0x07) => "TFA TS34C, Cresta",
            (PacketType::TemperatureHumidity, 0x08) => "WT260, WT260H, WT440H, WT450, WT450H",
            (PacketType::TemperatureHumidity, 0x09) => "Viking 02035, 02038",
            (PacketType::TemperatureHumidity, 0x0A) => "Rubicson",
            _ => "Unknown",
        }
    }

    /// Sensor id as `id1:id2` hex, e.g. `70:02`.
    #[must_use]
    pub fn id_string(&self) -> String {
        format!("{:02x}:{:02x}", self.id[0], self.id[1])
    }

    pub(super) fn values(&self) -> Values {
        let mut values = Values::new();
        if let Some(t) = self.temperature {
            values.insert("Temperature".to_string(), Value::Float(t));
        }
        if let Some(h) = self.humidity {
            values.insert("Humidity".to_string(), Value::Integer(i64::from(h)));
        }
        if let Some(status) = self.humidity_status {
            values.insert("Humidity status".to_string(), Value::from(status.label()));
            values.insert(
                "Humidity status numeric".to_string(),
                Value::Integer(i64::from(status.as_byte())),
            );
        }
        values.insert(
            "Battery numeric".to_string(),
            Value::Integer(i64::from(self.battery)),
        );
        values.insert(
            "Rssi numeric".to_string(),
            Value::Integer(rssi(self.rssi_byte)),
        );
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_packet() {
        let p = SensorPacket::parse(
            PacketType::Temperature,
            &[0x08, 0x50, 0x02, 0x11, 0x70, 0x02, 0x00, 0xA7, 0x89],
        );
        assert_eq!(p.id_string(), "70:02");
        assert_eq!(p.temperature, Some(16.7));
        assert_eq!(p.battery, 9);
        let values = p.values();
        assert_eq!(values["Temperature"], Value::Float(16.7));
        assert_eq!(values["Rssi numeric"], Value::Integer(8));
        assert!(!values.contains_key("Humidity"));
    }

    #[test]
    fn negative_temperature() {
        let p = SensorPacket::parse(
            PacketType::Temperature,
            &[0x08, 0x50, 0x01, 0x00, 0x01, 0x02, 0x80, 0x2D, 0x79],
        );
        assert_eq!(p.temperature, Some(-4.5));
    }

    #[test]
    fn temperature_humidity_packet() {
        let p = SensorPacket::parse(
            PacketType::TemperatureHumidity,
            &[0x0A, 0x52, 0x01, 0x05, 0xAB, 0x01, 0x00, 0xDC, 0x2D, 0x02, 0x69],
        );
        assert_eq!(p.id_string(), "ab:01");
        assert_eq!(p.temperature, Some(22.0));
        assert_eq!(p.humidity, Some(45));
        assert_eq!(p.humidity_status, Some(HumidityStatus::Normal));
        let values = p.values();
        assert_eq!(values["Humidity status"], Value::from("Normal"));
        assert_eq!(values["Battery numeric"], Value::Integer(9));
        assert_eq!(values["Rssi numeric"], Value::Integer(6));
    }

    #[test]
    fn humidity_only_packet() {
        let p = SensorPacket::parse(
            PacketType::Humidity,
            &[0x08, 0x51, 0x01, 0x00, 0x12, 0x34, 0x3C, 0x03, 0x59],
        );
        assert_eq!(p.temperature, None);
        assert_eq!(p.humidity, Some(60));
        assert_eq!(p.humidity_status, Some(HumidityStatus::Wet));
    }
}
