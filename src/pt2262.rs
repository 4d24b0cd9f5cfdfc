// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PT2262 address matching.
//!
//! PT2262 encoders (Lighting4 packets) send a 24-bit code whose low
//! `data_bits` bits carry the button or sensor state and whose remaining
//! bits are the device address. One physical sensor therefore shows up
//! under several ids, one per command value.
//!
//! Matching happens on lowercase hex ids:
//!
//! ```
//! use rfxtrx_lib::pt2262;
//!
//! // Low 4 bits are the command, the rest is the address
//! assert_eq!(pt2262::mask_address("A1B2C3", 4).as_deref(), Some("a1b2c0"));
//! assert_eq!(pt2262::extract_command("A1B2C3", 4), Some(0x3));
//! ```

use std::sync::Arc;

use crate::device::Device;

/// Longest differing hex suffix still considered the same physical device.
pub const MAX_PROBABLE_SUFFIX: usize = 3;

/// Bits encoded by one hex digit.
pub const BITS_PER_HEX_DIGIT: usize = 4;

/// Mask selecting the low `data_bits` bits of the last byte.
fn data_mask(data_bits: u8) -> u8 {
    if data_bits >= 8 {
        0xFF
    } else {
        (1u8 << data_bits) - 1
    }
}

/// Clears the low `data_bits` bits of the last byte of a hex id.
///
/// Returns `None` if the id is not valid hex.
#[must_use]
pub fn mask_address(device_id: &str, data_bits: u8) -> Option<String> {
    let mut bytes = hex::decode(device_id).ok()?;
    if let Some(last) = bytes.last_mut() {
        *last &= !data_mask(data_bits);
    }
    Some(hex::encode(bytes))
}

/// Returns the low `data_bits` bits of the last byte of a hex id.
///
/// Returns `None` if the id is not valid hex or is empty.
#[must_use]
pub fn extract_command(device_id: &str, data_bits: u8) -> Option<u8> {
    let bytes = hex::decode(device_id).ok()?;
    bytes.last().map(|last| last & data_mask(data_bits))
}

/// Finds a registered Lighting4 device whose masked address equals the
/// masked form of `device_id`.
///
/// Devices without `data_bits` never match. The first match in
/// registration order wins.
#[must_use]
pub fn find_exact_match(device_id: &str, devices: &[Arc<Device>]) -> Option<Arc<Device>> {
    devices
        .iter()
        .filter(|device| device.is_lighting4())
        .find(|device| {
            let (Some(bits), Some(masked)) = (device.data_bits(), device.masked_id()) else {
                return false;
            };
            mask_address(device_id, bits).as_deref() == Some(masked)
        })
        .map(|device| {
            tracing::debug!(
                device_id = %device_id,
                matched = %device.canonical_id(),
                "PT2262 address match"
            );
            Arc::clone(device)
        })
}

/// Parameters suggested by [`find_probable_match`].
#[derive(Debug, Clone)]
pub struct ProbableMatch {
    /// The registered device that looks like the same sensor.
    pub device: Arc<Device>,
    /// Suggested `data_bits` value.
    pub data_bits: u8,
    /// Trailing hex digits of the registered id.
    pub command_on: String,
    /// Trailing hex digits of the received id.
    pub command_off: String,
}

/// Heuristically finds a registered Lighting4 binary sensor that differs
/// from `device_id` only in the last few hex digits.
///
/// For each candidate of the same length, the first position where the
/// ids disagree is located. If they already disagree in the first digit
/// the candidate is skipped; otherwise the differing suffix is accepted
/// when at most [`MAX_PROBABLE_SUFFIX`] digits long. The result is a
/// configuration hint and is logged; it never changes dispatch.
#[must_use]
pub fn find_probable_match(device_id: &str, devices: &[Arc<Device>]) -> Option<ProbableMatch> {
    let device_id = device_id.to_ascii_lowercase();

    for device in devices.iter().filter(|d| d.is_lighting4_binary_sensor()) {
        let known = device.canonical_id();
        if known.len() != device_id.len() {
            continue;
        }

        let agreeing = known
            .bytes()
            .zip(device_id.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        // Index of the last agreeing digit
        let Some(last) = agreeing.checked_sub(1) else {
            continue;
        };

        let suffix = known.len() - last - 1;
        if suffix > MAX_PROBABLE_SUFFIX {
            continue;
        }

        let data_bits = u8::try_from(suffix * BITS_PER_HEX_DIGIT).unwrap_or(u8::MAX);
        let command_on = known[known.len() - suffix..].to_string();
        let command_off = device_id[device_id.len() - suffix..].to_string();

        tracing::info!(
            device_id = %device_id,
            candidate = %known,
            data_bits,
            command_on = %command_on,
            command_off = %command_off,
            "Found possible matching device; add data_bits, command_on and command_off to its configuration"
        );

        return Some(ProbableMatch {
            device: Arc::clone(device),
            data_bits,
            command_on,
            command_off,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::device::{BinarySensorOptions, DeviceKind};

    fn lighting4_frame(code: &str) -> String {
        format!("0913000e{code}015e70")
    }

    fn sensor(code: &str, data_bits: Option<u8>) -> Arc<Device> {
        let event = codec::decode(&lighting4_frame(code)).unwrap();
        let options = BinarySensorOptions {
            data_bits,
            ..BinarySensorOptions::default()
        };
        Arc::new(Device::new(
            code,
            event,
            DeviceKind::BinarySensor(options),
            false,
            1,
        ))
    }

    #[test]
    fn mask_and_extract() {
        assert_eq!(mask_address("A1B2C3", 4).as_deref(), Some("a1b2c0"));
        assert_eq!(extract_command("A1B2C3", 4), Some(0x3));
        assert_eq!(mask_address("a1b2c3", 8).as_deref(), Some("a1b200"));
        assert_eq!(extract_command("a1b2c3", 8), Some(0xc3));
        assert_eq!(mask_address("a1b2c3", 1).as_deref(), Some("a1b2c2"));
        assert_eq!(extract_command("a1b2c3", 1), Some(0x1));
    }

    #[test]
    fn masking_is_idempotent() {
        for bits in 1..=8 {
            let once = mask_address("0e6c3b", bits).unwrap();
            assert_eq!(mask_address(&once, bits).unwrap(), once);
        }
    }

    #[test]
    fn mask_rejects_invalid_hex() {
        assert!(mask_address("xyz", 4).is_none());
        assert!(extract_command("", 4).is_none());
    }

    #[test]
    fn exact_match_by_masked_address() {
        let devices = vec![sensor("0e6c3b", None), sensor("a1b2c1", Some(4))];
        let found = find_exact_match("a1b2c7", &devices).unwrap();
        assert_eq!(found.canonical_id(), "a1b2c1");
        assert!(find_exact_match("a1b2d7", &devices).is_none());
    }

    #[test]
    fn exact_match_ignores_devices_without_data_bits() {
        let devices = vec![sensor("0e6c3b", None)];
        assert!(find_exact_match("0e6c3a", &devices).is_none());
    }

    #[test]
    fn probable_match_suggests_data_bits() {
        let devices = vec![sensor("f0f0f1", None)];
        let found = find_probable_match("f0f0f2", &devices).unwrap();
        assert_eq!(found.data_bits, 4);
        assert_eq!(found.command_on, "1");
        assert_eq!(found.command_off, "2");
        assert_eq!(found.device.canonical_id(), "f0f0f1");
    }

    #[test]
    fn probable_match_accepts_three_digit_suffix() {
        let devices = vec![sensor("f0f123", None)];
        let found = find_probable_match("F0F456", &devices).unwrap();
        assert_eq!(found.data_bits, 12);
        assert_eq!(found.command_on, "123");
        assert_eq!(found.command_off, "456");
    }

    #[test]
    fn probable_match_rejects_long_differences() {
        let devices = vec![sensor("a1b2c3", None)];
        assert!(find_probable_match("a1ffff", &devices).is_none());
        // Differs from the first digit on
        assert!(find_probable_match("1234c3", &devices).is_none());
        // Different length
        assert!(find_probable_match("a1b2c3d4", &devices).is_none());
    }

    #[test]
    fn probable_match_of_identical_id_has_empty_suffix() {
        let devices = vec![sensor("a1b2c3", None)];
        let found = find_probable_match("a1b2c3", &devices).unwrap();
        assert_eq!(found.data_bits, 0);
        assert!(found.command_on.is_empty());
    }
}
