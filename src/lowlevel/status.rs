// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interface control: status responses and receive-mode selection.

use super::{Value, Values};

/// Receive modes the transceiver understands, with the index of the mode
/// message byte (0 = msg3, 1 = msg4, 2 = msg5) and the bit that enables it.
pub const RECEIVE_MODES: [(&str, usize, u8); 24] = [
    ("undecoded", 0, 0x80),
    ("imagintronix", 0, 0x40),
    ("byronsx", 0, 0x20),
    ("rsl", 0, 0x10),
    ("lighting4", 0, 0x08),
    ("fineoffset", 0, 0x04),
    ("rubicson", 0, 0x02),
    ("ae", 0, 0x01),
    ("blindst1", 1, 0x80),
    ("blindst0", 1, 0x40),
    ("proguard", 1, 0x20),
    ("fs20", 1, 0x10),
    ("lacrosse", 1, 0x08),
    ("hideki", 1, 0x04),
    ("ad", 1, 0x02),
    ("mertik", 1, 0x01),
    ("visonic", 2, 0x80),
    ("ati", 2, 0x40),
    ("oregon", 2, 0x20),
    ("meiantech", 2, 0x10),
    ("homeeasy", 2, 0x08),
    ("ac", 2, 0x04),
    ("arc", 2, 0x02),
    ("x10", 2, 0x01),
];

/// Offset of msg3 within an interface frame.
const MODE_OFFSET: usize = 7;

/// 433.92 MHz transceiver.
const FREQUENCY_433: u8 = 0x53;

/// Looks up the mode byte index and bit for a receive mode name.
///
/// Returns `None` for modes the transceiver does not know.
#[must_use]
pub fn receive_mode_bit(mode: &str) -> Option<(usize, u8)> {
    RECEIVE_MODES
        .iter()
        .find(|(name, _, _)| *name == mode)
        .map(|&(_, index, bit)| (index, bit))
}

/// Interface command that resets the receiver and flushes its buffers.
#[must_use]
pub fn reset_packet() -> Vec<u8> {
    vec![0x0D, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
}

/// Interface command that asks for an [`InterfaceStatus`] response.
#[must_use]
pub fn get_status_packet() -> Vec<u8> {
    vec![0x0D, 0, 0, 0x01, 0x02, 0, 0, 0, 0, 0, 0, 0, 0, 0]
}

/// Interface command enabling exactly the given receive modes.
///
/// Unknown names are skipped; configuration validation rejects them
/// before this is called.
#[must_use]
pub fn set_mode_packet<S: AsRef<str>>(modes: &[S]) -> Vec<u8> {
    let mut frame = vec![0x0D, 0, 0, 0x02, 0x03, FREQUENCY_433, 0, 0, 0, 0, 0, 0, 0, 0];
    for mode in modes {
        if let Some((index, bit)) = receive_mode_bit(mode.as_ref()) {
            frame[MODE_OFFSET + index] |= bit;
        }
    }
    frame
}

/// Response to an interface command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceStatus {
    /// Subtype (0x00 for interface responses).
    pub subtype: u8,
    /// Sequence number.
    pub seq: u8,
    /// Echo of the command that produced this response.
    pub cmnd: u8,
    /// Transceiver type code.
    pub transceiver_type: u8,
    /// Firmware version.
    pub firmware_version: u8,
    /// Raw mode bytes msg3..msg5.
    pub modes: [u8; 3],
}

impl InterfaceStatus {
    pub(super) fn parse(data: &[u8]) -> Self {
        Self {
            subtype: data[2],
            seq: data[3],
            cmnd: data[4],
            transceiver_type: data[5],
            firmware_version: data[6],
            modes: [data[7], data[8], data[9]],
        }
    }

    /// Names of the receive modes currently enabled.
    #[must_use]
    pub fn enabled_modes(&self) -> Vec<&'static str> {
        RECEIVE_MODES
            .iter()
            .filter(|(_, index, bit)| self.modes[*index] & bit != 0)
            .map(|(name, _, _)| *name)
            .collect()
    }

    /// Describes the transceiver frequency band.
    #[must_use]
    pub fn transceiver_name(&self) -> &'static str {
        match self.transceiver_type {
            0x50 => "310MHz",
            0x51 => "315MHz",
            0x52 => "433.92MHz receiver only",
            0x53 => "433.92MHz transceiver",
            0x55 => "868.00MHz",
            0x56 => "868.00MHz FSK",
            0x57 => "868.30MHz",
            0x58 => "868.30MHz FSK",
            0x59 => "868.35MHz",
            0x5A => "868.35MHz FSK",
            0x5B => "868.95MHz",
            _ => "Unknown",
        }
    }

    pub(super) fn values(&self) -> Values {
        let mut values = Values::new();
        values.insert(
            "Transceiver type".to_string(),
            Value::from(self.transceiver_name()),
        );
        values.insert(
            "Firmware version".to_string(),
            Value::Integer(i64::from(self.firmware_version)),
        );
        values.insert(
            "Enabled protocols".to_string(),
            Value::Text(self.enabled_modes().join(", ")),
        );
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_modes() {
        assert_eq!(receive_mode_bit("lighting4"), Some((0, 0x08)));
        assert_eq!(receive_mode_bit("x10"), Some((2, 0x01)));
        assert_eq!(receive_mode_bit("zigbee"), None);
    }

    #[test]
    fn set_mode_packet_sets_bits() {
        let frame = set_mode_packet(&["lighting4", "ac", "arc", "lacrosse"]);
        assert_eq!(frame.len(), 14);
        assert_eq!(frame[0], 0x0D);
        assert_eq!(frame[4], 0x03);
        assert_eq!(frame[7], 0x08);
        assert_eq!(frame[8], 0x08);
        assert_eq!(frame[9], 0x06);
    }

    #[test]
    fn interface_frames_are_well_formed() {
        for frame in [reset_packet(), get_status_packet()] {
            assert_eq!(usize::from(frame[0]), frame.len() - 1);
        }
    }

    #[test]
    fn status_reports_enabled_modes() {
        let status = InterfaceStatus::parse(&[
            0x0D, 0x01, 0x00, 0x01, 0x02, 0x53, 0x45, 0x08, 0x00, 0x27, 0x01, 0x00, 0x00, 0x00,
        ]);
        assert_eq!(status.transceiver_name(), "433.92MHz transceiver");
        assert_eq!(
            status.enabled_modes(),
            vec!["lighting4", "oregon", "ac", "arc", "x10"]
        );
        let values = status.values();
        assert_eq!(values["Firmware version"], Value::Integer(0x45));
    }
}
