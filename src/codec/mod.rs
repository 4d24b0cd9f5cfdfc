// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Packet codec.
//!
//! Turns hex packet ids (from configuration) and raw frames (from the
//! transport) into [`DecodedEvent`]s, and encodes outbound commands.
//!
//! Malformed input is an expected condition: remotes send garbage and users
//! mistype configuration. [`decode`] and [`decode_bytes`] therefore never
//! fail loudly; they log and return `None`. Use [`try_decode`] when the
//! reason matters.
//!
//! # Examples
//!
//! ```
//! use rfxtrx_lib::codec;
//!
//! let event = codec::decode("0b1100cd0213c7f210010f70").unwrap();
//! assert_eq!(event.canonical_id(), "213c7f2_16");
//! assert_eq!(event.command(), Some("On"));
//!
//! assert!(codec::decode("").is_none());
//! assert!(codec::decode("xyz").is_none());
//! ```

mod send;

pub use send::encode_send;

use crate::error::DecodeError;
use crate::lowlevel::{Packet, PacketClass, PacketType, Value, Values};
use crate::types::Dimmer;

/// A packet decoded into its device identity and semantic values.
///
/// Built per received packet and consumed by the dispatcher. Devices keep
/// the event they were created from to encode outbound commands.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEvent {
    packet: Packet,
    raw: Vec<u8>,
    device_identity: String,
    values: Values,
}

impl DecodedEvent {
    /// Builds an event from a parsed packet and the frame it came from.
    #[must_use]
    pub fn new(packet: Packet, raw: Vec<u8>) -> Self {
        let device_identity = packet.id_string();
        let values = packet.values();
        Self {
            packet,
            raw,
            device_identity,
            values,
        }
    }

    /// The device identity as reported by the transceiver.
    #[must_use]
    pub fn device_identity(&self) -> &str {
        &self.device_identity
    }

    /// The registry key for this event's device.
    #[must_use]
    pub fn canonical_id(&self) -> String {
        canonical_id(&self.device_identity)
    }

    /// Returns `true` if the event names a device.
    ///
    /// Interface status responses do not.
    #[must_use]
    pub fn has_device(&self) -> bool {
        !self.device_identity.is_empty()
    }

    /// Sensor, status or control.
    #[must_use]
    pub fn class(&self) -> PacketClass {
        self.packet.class()
    }

    /// Packet family, e.g. `Lighting2`.
    #[must_use]
    pub fn packet_type(&self) -> PacketType {
        self.packet.packet_type()
    }

    /// Device class name, i.e. the packet family name.
    #[must_use]
    pub fn device_class(&self) -> &'static str {
        self.packet.packet_type().name()
    }

    /// Subtype byte.
    #[must_use]
    pub fn subtype(&self) -> u8 {
        self.packet.subtype()
    }

    /// Model name of the subtype.
    #[must_use]
    pub fn subtype_name(&self) -> &'static str {
        self.packet.subtype_name()
    }

    /// The parsed packet.
    #[must_use]
    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    /// The original frame bytes.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// The original frame as lowercase hex.
    #[must_use]
    pub fn packet_hex(&self) -> String {
        hex::encode(&self.raw)
    }

    /// All semantic values.
    #[must_use]
    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Looks up one value.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// The `"Command"` value, if the packet carries one.
    #[must_use]
    pub fn command(&self) -> Option<&str> {
        self.value("Command").and_then(Value::as_str)
    }

    /// The `"Dim level"` value as a percentage.
    #[must_use]
    pub fn dim_level(&self) -> Option<Dimmer> {
        self.value("Dim level")
            .and_then(Value::as_i64)
            .and_then(|v| u8::try_from(v).ok())
            .map(Dimmer::clamped)
    }

    /// Returns `true` for PT2262 / Lighting4 packets.
    #[must_use]
    pub fn is_lighting4(&self) -> bool {
        self.packet_type() == PacketType::Lighting4
    }
}

/// Decodes a hex packet id.
///
/// # Errors
///
/// Returns `DecodeError::Empty` or `DecodeError::InvalidHex` for bad input,
/// or the parser's error for frames it cannot classify.
pub fn try_decode(packet_id: &str) -> Result<DecodedEvent, DecodeError> {
    let raw = hex::decode(packet_id.trim()).map_err(|e| DecodeError::InvalidHex(e.to_string()))?;
    try_decode_bytes(&raw)
}

/// Decodes a raw frame.
///
/// # Errors
///
/// Returns `DecodeError` if the frame cannot be parsed.
pub fn try_decode_bytes(raw: &[u8]) -> Result<DecodedEvent, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::Empty);
    }
    let packet = Packet::parse(raw)?;
    Ok(DecodedEvent::new(packet, raw.to_vec()))
}

/// Decodes a hex packet id, logging and returning `None` on failure.
#[must_use]
pub fn decode(packet_id: &str) -> Option<DecodedEvent> {
    match try_decode(packet_id) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!(packet = %packet_id, error = %e, "Cannot decode packet id");
            None
        }
    }
}

/// Decodes a raw frame, logging and returning `None` on failure.
#[must_use]
pub fn decode_bytes(raw: &[u8]) -> Option<DecodedEvent> {
    match try_decode_bytes(raw) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::debug!(packet = %hex::encode(raw), error = %e, "Cannot decode frame");
            None
        }
    }
}

/// Normalizes a device identity into a registry key.
///
/// Lowercases and replaces every run of characters outside `[a-z0-9]` with
/// a single underscore, trimming underscores at the ends. Hex identities
/// pass through unchanged apart from case.
///
/// ```
/// use rfxtrx_lib::codec::canonical_id;
///
/// assert_eq!(canonical_id("A1B2C3"), "a1b2c3");
/// assert_eq!(canonical_id("70:02"), "70_02");
/// ```
#[must_use]
pub fn canonical_id(identity: &str) -> String {
    slugify(identity)
}

/// Lowercase slug used for canonical ids and entity ids.
pub(crate) fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

/// Left-pads an odd-length hex packet id with `0`.
#[must_use]
pub fn normalize_packet_id(packet_id: &str) -> String {
    if packet_id.len() % 2 == 1 {
        format!("0{packet_id}")
    } else {
        packet_id.to_string()
    }
}
