// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `rfxtrx` library.
//!
//! Errors are split by where they surface:
//!
//! - [`DecodeError`] stays local to the codec. Garbage on the air is normal,
//!   so the public decode functions turn it into `None` and a log line.
//! - [`ConfigError`] is fatal and raised before the dispatcher starts.
//! - [`DeviceError`] and [`TransportError`] are returned from outbound
//!   command sends.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The gateway configuration is unusable.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The transport failed to send or close.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A packet could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The device cannot perform the requested operation.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// A value is outside its allowed range.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// No device is registered under the given canonical id.
    #[error("device not found: {0}")]
    DeviceNotFound(String),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },
}

/// Errors produced while turning hex strings or raw frames into packets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input contained no bytes.
    #[error("empty packet")]
    Empty,

    /// The input is not valid even-length hexadecimal.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// The leading length byte does not match the frame size.
    #[error("length byte says {declared} bytes follow, frame has {actual}")]
    LengthMismatch {
        /// Length declared by the first byte.
        declared: usize,
        /// Number of bytes actually following it.
        actual: usize,
    },

    /// The packet type is not handled by this library.
    #[error("unknown packet type 0x{0:02x}")]
    UnknownPacketType(u8),

    /// The frame is too short for its packet type.
    #[error("packet type 0x{packet_type:02x} needs {expected} bytes, got {actual}")]
    Truncated {
        /// The packet type byte.
        packet_type: u8,
        /// Minimum frame size for this type.
        expected: usize,
        /// Actual frame size.
        actual: usize,
    },
}

/// Fatal configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A receive mode is not known to the transceiver.
    #[error("recv_mode \"{0}\" is unknown to RFXtrx")]
    UnknownReceiveMode(String),

    /// `data_bits` must address bits of a single byte.
    #[error("data_bits {bits} for device {packet_id} is out of range [1, 8]")]
    InvalidDataBits {
        /// Packet id of the offending entry.
        packet_id: String,
        /// The configured value.
        bits: u8,
    },

    /// Signal repetitions must be positive.
    #[error("signal_repetitions must be at least 1")]
    InvalidSignalRepetitions,

    /// A configured sensor data type is not recognised.
    #[error("unknown sensor data type: {0}")]
    UnknownDataType(String),

    /// No device path was given and dummy mode is off.
    #[error("no device path configured")]
    MissingDevice,

    /// The configuration document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to device operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The device's packet family cannot carry this command.
    #[error("{family} devices cannot send {command}")]
    UnsupportedCommand {
        /// Packet family of the device, e.g. `Lighting1`.
        family: String,
        /// The rejected command.
        command: String,
    },

    /// The device kind lacks the capability the command needs.
    #[error("device {device_id} does not support {capability}")]
    MissingCapability {
        /// Canonical id of the device.
        device_id: String,
        /// The missing capability.
        capability: String,
    },
}

/// Errors related to the serial (or dummy) transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// An I/O operation on the underlying device failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The serial port could not be opened or configured.
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// The transport was closed.
    #[error("transport is closed")]
    Closed,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
