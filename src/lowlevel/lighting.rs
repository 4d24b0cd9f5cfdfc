// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Control packet families: Lighting1, Lighting2, Lighting4 and RFY.

use crate::command::DeviceCommand;
use crate::types::Dimmer;

use super::{PacketType, Value, Values, rssi};

const LIGHTING1_COMMANDS: [(u8, &str); 8] = [
    (0x00, "Off"),
    (0x01, "On"),
    (0x02, "Dim"),
    (0x03, "Bright"),
    (0x05, "All/group Off"),
    (0x06, "All/group On"),
    (0x07, "Chime"),
    (0xFF, "Illegal command"),
];

const LIGHTING2_COMMANDS: [(u8, &str); 6] = [
    (0x00, "Off"),
    (0x01, "On"),
    (0x02, "Set level"),
    (0x03, "Group off"),
    (0x04, "Group on"),
    (0x05, "Set group level"),
];

const RFY_COMMANDS: [(u8, &str); 3] = [(0x00, "Stop"), (0x01, "Up"), (0x03, "Down")];

fn command_name(table: &[(u8, &'static str)], code: u8) -> &'static str {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map_or("Unknown", |(_, name)| name)
}

fn control_values(command: &str, rssi_byte: u8) -> Values {
    let mut values = Values::new();
    values.insert("Command".to_string(), Value::from(command));
    values.insert("Rssi numeric".to_string(), Value::Integer(rssi(rssi_byte)));
    values
}

/// X10, ARC, ELRO and similar house/unit-code remotes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lighting1 {
    /// Model subtype.
    pub subtype: u8,
    /// Sequence number.
    pub seq: u8,
    /// House code as an ASCII letter.
    pub housecode: u8,
    /// Unit code.
    pub unitcode: u8,
    /// Command byte.
    pub cmnd: u8,
    /// Signal strength byte.
    pub rssi_byte: u8,
}

impl Lighting1 {
    pub(super) fn parse(data: &[u8]) -> Self {
        Self {
            subtype: data[2],
            seq: data[3],
            housecode: data[4],
            unitcode: data[5],
            cmnd: data[6],
            rssi_byte: data[7],
        }
    }

    /// Returns the model name for the subtype.
    #[must_use]
    pub fn subtype_name(&self) -> &'static str {
        match self.subtype {
            0x00 => "X10 lighting",
            0x01 => "ARC",
            0x02 => "ELRO AB400D (Flamingo)",
            0x03 => "Waveman",
            0x04 => "Chacon EMW200",
            0x05 => "IMPULS",
            0x06 => "RisingSun",
            0x07 => "Philips SBC",
            0x08 => "Energenie ENER010",
            0x09 => "Energenie 5-gang",
            0x0A => "COCO GDR2-2000R",
            _ => "Unknown",
        }
    }

    /// House letter followed by the unit number, e.g. `E5`.
    #[must_use]
    pub fn id_string(&self) -> String {
        format!("{}{}", char::from(self.housecode), self.unitcode)
    }

    /// Returns the command name.
    #[must_use]
    pub fn command(&self) -> &'static str {
        command_name(&LIGHTING1_COMMANDS, self.cmnd)
    }

    pub(super) fn values(&self) -> Values {
        control_values(self.command(), self.rssi_byte)
    }

    pub(super) fn encode(&self, command: DeviceCommand, seq: u8) -> Option<Vec<u8>> {
        let cmnd = match command {
            DeviceCommand::On => 0x01,
            DeviceCommand::Off => 0x00,
            _ => return None,
        };
        Some(vec![
            0x07,
            PacketType::Lighting1.as_byte(),
            self.subtype,
            seq,
            self.housecode,
            self.unitcode,
            cmnd,
            0x00,
        ])
    }
}

/// AC, HomeEasy EU, ANSLUT and Kambrook remotes with 26-bit ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lighting2 {
    /// Model subtype.
    pub subtype: u8,
    /// Sequence number.
    pub seq: u8,
    /// Device id bytes.
    pub id: [u8; 4],
    /// Unit code.
    pub unitcode: u8,
    /// Command byte.
    pub cmnd: u8,
    /// Dim level, 0-15.
    pub level: u8,
    /// Signal strength byte.
    pub rssi_byte: u8,
}

impl Lighting2 {
    pub(super) fn parse(data: &[u8]) -> Self {
        Self {
            subtype: data[2],
            seq: data[3],
            id: [data[4], data[5], data[6], data[7]],
            unitcode: data[8],
            cmnd: data[9],
            level: data[10],
            rssi_byte: data[11],
        }
    }

    /// Returns the model name for the subtype.
    #[must_use]
    pub fn subtype_name(&self) -> &'static str {
        match self.subtype {
            0x00 => "AC",
            0x01 => "HomeEasy EU",
            0x02 => "ANSLUT",
            0x03 => "Kambrook RF3672",
            _ => "Unknown",
        }
    }

    /// Combined id as 7 hex digits followed by the unit, e.g. `1b2c3d4:1`.
    #[must_use]
    pub fn id_string(&self) -> String {
        format!("{:07x}:{}", u32::from_be_bytes(self.id), self.unitcode)
    }

    /// Returns the command name.
    #[must_use]
    pub fn command(&self) -> &'static str {
        command_name(&LIGHTING2_COMMANDS, self.cmnd)
    }

    /// Returns the dim level as a percentage.
    #[must_use]
    pub fn dim_level(&self) -> Dimmer {
        Dimmer::from_level(self.level)
    }

    pub(super) fn values(&self) -> Values {
        let mut values = control_values(self.command(), self.rssi_byte);
        values.insert(
            "Dim level".to_string(),
            Value::Integer(i64::from(self.dim_level().value())),
        );
        values
    }

    pub(super) fn encode(&self, command: DeviceCommand, seq: u8) -> Option<Vec<u8>> {
        let (cmnd, level) = match command {
            DeviceCommand::On => (0x01, 0x00),
            DeviceCommand::Off => (0x00, 0x00),
            DeviceCommand::Dim(brightness) => {
                let level = Dimmer::from_brightness(brightness).to_level();
                if level == 0 { (0x00, 0x00) } else { (0x02, level) }
            }
            _ => return None,
        };
        Some(vec![
            0x0B,
            PacketType::Lighting2.as_byte(),
            self.subtype,
            seq,
            self.id[0],
            self.id[1],
            self.id[2],
            self.id[3],
            self.unitcode,
            cmnd,
            level,
            0x00,
        ])
    }
}

/// PT2262 encoders: a 24-bit code where address and data bits share the
/// last byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lighting4 {
    /// Model subtype.
    pub subtype: u8,
    /// Sequence number.
    pub seq: u8,
    /// The 24-bit code.
    pub code: [u8; 3],
    /// Pulse timing in microseconds.
    pub pulse: u16,
    /// Signal strength byte.
    pub rssi_byte: u8,
}

impl Lighting4 {
    pub(super) fn parse(data: &[u8]) -> Self {
        Self {
            subtype: data[2],
            seq: data[3],
            code: [data[4], data[5], data[6]],
            pulse: u16::from_be_bytes([data[7], data[8]]),
            rssi_byte: data[9],
        }
    }

    /// The code as six hex digits.
    #[must_use]
    pub fn id_string(&self) -> String {
        hex::encode(self.code)
    }

    pub(super) fn values(&self) -> Values {
        let mut values = Values::new();
        values.insert("Pulse".to_string(), Value::Integer(i64::from(self.pulse)));
        values.insert(
            "Rssi numeric".to_string(),
            Value::Integer(rssi(self.rssi_byte)),
        );
        values
    }
}

/// Somfy RTS blinds and awnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rfy {
    /// Model subtype.
    pub subtype: u8,
    /// Sequence number.
    pub seq: u8,
    /// Remote id bytes.
    pub id: [u8; 3],
    /// Unit code.
    pub unitcode: u8,
    /// Command byte.
    pub cmnd: u8,
    /// Signal strength byte (last reserved byte).
    pub rssi_byte: u8,
}

impl Rfy {
    pub(super) fn parse(data: &[u8]) -> Self {
        Self {
            subtype: data[2],
            seq: data[3],
            id: [data[4], data[5], data[6]],
            unitcode: data[7],
            cmnd: data[8],
            rssi_byte: data[12],
        }
    }

    /// Returns the model name for the subtype.
    #[must_use]
    pub fn subtype_name(&self) -> &'static str {
        match self.subtype {
            0x00 => "RFY",
            0x01 => "RFY ext",
            0x03 => "ASA",
            _ => "Unknown",
        }
    }

    /// Remote id as hex followed by the unit, e.g. `0a0b0c:1`.
    #[must_use]
    pub fn id_string(&self) -> String {
        format!("{}:{}", hex::encode(self.id), self.unitcode)
    }

    /// Returns the command name.
    #[must_use]
    pub fn command(&self) -> &'static str {
        command_name(&RFY_COMMANDS, self.cmnd)
    }

    pub(super) fn values(&self) -> Values {
        control_values(self.command(), self.rssi_byte)
    }

    pub(super) fn encode(&self, command: DeviceCommand, seq: u8) -> Option<Vec<u8>> {
        let cmnd = match command {
            DeviceCommand::Stop => 0x00,
            DeviceCommand::Open => 0x01,
            DeviceCommand::Close => 0x03,
            _ => return None,
        };
        Some(vec![
            0x0C,
            PacketType::Rfy.as_byte(),
            self.subtype,
            seq,
            self.id[0],
            self.id[1],
            self.id[2],
            self.unitcode,
            cmnd,
            0x00,
            0x00,
            0x00,
            0x00,
        ])
    }
}
