// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registered RF devices.
//!
//! A [`Device`] is created once, either from configuration or on first
//! sight of an unknown packet, and lives in the
//! [`DeviceRegistry`](crate::registry::DeviceRegistry) for the lifetime of
//! the gateway. Identity fields are immutable; the on/off state, brightness
//! and readings sit behind a lock and change as packets arrive or commands
//! are sent.
//!
//! # Examples
//!
//! ```
//! use rfxtrx_lib::codec;
//! use rfxtrx_lib::device::{Device, DeviceKind};
//!
//! let event = codec::decode("0b1100cd0213c7f210010f70").unwrap();
//! let device = Device::new("Kitchen Light", event, DeviceKind::Light, false, 1);
//!
//! assert_eq!(device.canonical_id(), "213c7f2_16");
//! assert_eq!(device.entity_id(), "light.kitchen_light");
//! assert!(!device.is_on());
//! ```

mod kind;

pub use kind::{BinarySensorOptions, DeviceKind};

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::capabilities::Capabilities;
use crate::codec::{self, DecodedEvent};
use crate::pt2262;
use crate::state::{DeviceState, StateChange};

/// An RF device known to the gateway.
#[derive(Debug)]
pub struct Device {
    name: String,
    canonical_id: String,
    entity_id: String,
    event: DecodedEvent,
    kind: DeviceKind,
    capabilities: Capabilities,
    fire_event: bool,
    signal_repetitions: u32,
    masked_id: Option<String>,
    state: RwLock<DeviceState>,
    off_delay_pending: AtomicBool,
}

impl Device {
    /// Creates a device from the event that identifies it.
    ///
    /// The event is kept as the template for outbound commands. For
    /// Lighting4 binary sensors with `data_bits`, the masked address is
    /// computed once here.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        event: DecodedEvent,
        kind: DeviceKind,
        fire_event: bool,
        signal_repetitions: u32,
    ) -> Self {
        let name = name.into();
        let canonical_id = event.canonical_id();
        let entity_id = format!("{}.{}", kind.domain(), codec::slugify(&name));
        let masked_id = kind
            .binary_sensor_options()
            .and_then(|options| options.data_bits)
            .filter(|_| event.is_lighting4())
            .and_then(|bits| pt2262::mask_address(&canonical_id, bits));

        Self {
            capabilities: Capabilities::for_kind(&kind),
            name,
            canonical_id,
            entity_id,
            event,
            kind,
            fire_event,
            signal_repetitions,
            masked_id,
            state: RwLock::new(DeviceState::new()),
            off_delay_pending: AtomicBool::new(false),
        }
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registry key.
    #[must_use]
    pub fn canonical_id(&self) -> &str {
        &self.canonical_id
    }

    /// Host entity id, `<domain>.<slug of name>`.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// The event this device was created from.
    #[must_use]
    pub fn event(&self) -> &DecodedEvent {
        &self.event
    }

    /// Device kind.
    #[must_use]
    pub fn kind(&self) -> &DeviceKind {
        &self.kind
    }

    /// Capabilities implied by the kind.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Whether received commands raise a button-pressed event.
    #[must_use]
    pub fn fire_event(&self) -> bool {
        self.fire_event
    }

    /// How many times each outbound command is transmitted.
    #[must_use]
    pub fn signal_repetitions(&self) -> u32 {
        self.signal_repetitions
    }

    /// PT2262 command bit count, for binary sensors that have one.
    #[must_use]
    pub fn data_bits(&self) -> Option<u8> {
        self.kind
            .binary_sensor_options()
            .and_then(|options| options.data_bits)
    }

    /// PT2262 address with the command bits cleared.
    #[must_use]
    pub fn masked_id(&self) -> Option<&str> {
        self.masked_id.as_deref()
    }

    /// Returns `true` if the device speaks PT2262 / Lighting4.
    #[must_use]
    pub fn is_lighting4(&self) -> bool {
        self.event.is_lighting4()
    }

    /// Returns `true` for Lighting4 devices registered as binary sensors.
    #[must_use]
    pub fn is_lighting4_binary_sensor(&self) -> bool {
        self.is_lighting4() && matches!(self.kind, DeviceKind::BinarySensor(_))
    }

    // =========================================================================
    // State
    // =========================================================================

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.state.read().clone()
    }

    /// Returns `true` if the device is on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.state.read().is_on()
    }

    /// Brightness (0-255), once known.
    #[must_use]
    pub fn brightness(&self) -> Option<u8> {
        self.state.read().brightness()
    }

    /// Applies a state change, returning `true` if anything changed.
    pub fn apply(&self, change: &StateChange) -> bool {
        self.state.write().apply(change)
    }

    /// Returns `true` while an off-delay timer is running.
    #[must_use]
    pub fn off_delay_pending(&self) -> bool {
        self.off_delay_pending.load(Ordering::Acquire)
    }

    /// Marks an off-delay timer as started.
    ///
    /// Returns `false` if one was already pending.
    pub(crate) fn begin_off_delay(&self) -> bool {
        self.off_delay_pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Clears the pending off-delay marker.
    pub(crate) fn finish_off_delay(&self) {
        self.off_delay_pending.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn pt2262_sensor(data_bits: Option<u8>) -> Device {
        let event = codec::decode("0913000e0e6c3b015e70").unwrap();
        let options = BinarySensorOptions {
            data_bits,
            off_delay: Some(Duration::from_secs(5)),
            ..BinarySensorOptions::default()
        };
        Device::new("Door", event, DeviceKind::BinarySensor(options), true, 1)
    }

    #[test]
    fn identity_fields() {
        let device = pt2262_sensor(Some(4));
        assert_eq!(device.canonical_id(), "0e6c3b");
        assert_eq!(device.entity_id(), "binary_sensor.door");
        assert_eq!(device.masked_id(), Some("0e6c30"));
        assert_eq!(device.data_bits(), Some(4));
        assert!(device.is_lighting4_binary_sensor());
        assert!(device.fire_event());
    }

    #[test]
    fn no_masked_id_without_data_bits() {
        let device = pt2262_sensor(None);
        assert_eq!(device.masked_id(), None);
        assert_eq!(device.data_bits(), None);
    }

    #[test]
    fn no_masked_id_for_other_families() {
        let event = codec::decode("0b1100cd0213c7f210010f70").unwrap();
        let options = BinarySensorOptions {
            data_bits: Some(4),
            ..BinarySensorOptions::default()
        };
        let device = Device::new("Remote", event, DeviceKind::BinarySensor(options), false, 1);
        assert_eq!(device.masked_id(), None);
        assert!(!device.is_lighting4_binary_sensor());
    }

    #[test]
    fn state_changes() {
        let device = pt2262_sensor(None);
        assert!(device.apply(&StateChange::power_on()));
        assert!(device.is_on());
        assert!(!device.apply(&StateChange::power_on()));
        assert_eq!(device.brightness(), None);
    }

    #[test]
    fn off_delay_marker_is_exclusive() {
        let device = pt2262_sensor(None);
        assert!(device.begin_off_delay());
        assert!(!device.begin_off_delay());
        assert!(device.off_delay_pending());
        device.finish_off_delay();
        assert!(!device.off_delay_pending());
        assert!(device.begin_off_delay());
    }

    #[test]
    fn capabilities_follow_kind() {
        let event = codec::decode("0b1100cd0213c7f210010f70").unwrap();
        let light = Device::new("Lamp", event, DeviceKind::Light, false, 3);
        assert!(light.capabilities().dimmer);
        assert_eq!(light.signal_repetitions(), 3);
    }
}
