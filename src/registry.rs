// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device registry.
//!
//! Maps canonical ids to devices. The registry is append-only: devices are
//! added from configuration at startup and, when automatic add is enabled,
//! by the dispatcher on first sight of an unknown id. Nothing is ever
//! removed while the gateway runs.
//!
//! Registration order is preserved. PT2262 matching walks devices in that
//! order and takes the first hit.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::codec::{self, DecodedEvent};
use crate::device::{Device, DeviceKind};
use crate::pt2262::{self, ProbableMatch};

/// One configured device, ready to be registered.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceEntry {
    /// Hex packet id identifying the device.
    pub packet_id: String,
    /// Display name.
    pub name: String,
    /// Raise button-pressed events for received commands.
    pub fire_event: bool,
    /// What the device is.
    pub kind: DeviceKind,
}

#[derive(Debug, Default)]
struct RegistryInner {
    devices: Vec<Arc<Device>>,
    index: HashMap<String, usize>,
}

impl RegistryInner {
    fn get(&self, canonical_id: &str) -> Option<Arc<Device>> {
        self.index
            .get(canonical_id)
            .map(|&i| Arc::clone(&self.devices[i]))
    }

    fn insert(&mut self, device: Device) -> Arc<Device> {
        if let Some(existing) = self.get(device.canonical_id()) {
            return existing;
        }
        let device = Arc::new(device);
        self.index
            .insert(device.canonical_id().to_string(), self.devices.len());
        self.devices.push(Arc::clone(&device));
        device
    }
}

/// Shared registry of known devices.
///
/// Cloning is cheap and yields a handle to the same registry.
///
/// # Examples
///
/// ```
/// use rfxtrx_lib::codec;
/// use rfxtrx_lib::registry::DeviceRegistry;
///
/// let registry = DeviceRegistry::new(1);
/// let event = codec::decode("0b1100cd0213c7f210010f70").unwrap();
///
/// // Disabled automatic add leaves unknown devices alone
/// assert!(registry.get_or_autocreate(&event, false).is_none());
///
/// let device = registry.get_or_autocreate(&event, true).unwrap();
/// assert_eq!(device.canonical_id(), "213c7f2_16");
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DeviceRegistry {
    inner: Arc<RwLock<RegistryInner>>,
    signal_repetitions: u32,
}

impl DeviceRegistry {
    /// Creates an empty registry.
    ///
    /// `signal_repetitions` is given to every device it creates.
    #[must_use]
    pub fn new(signal_repetitions: u32) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner::default())),
            signal_repetitions,
        }
    }

    /// Number of registered devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().devices.len()
    }

    /// Returns `true` if no device is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().devices.is_empty()
    }

    /// Looks up a device by canonical id.
    #[must_use]
    pub fn get(&self, canonical_id: &str) -> Option<Arc<Device>> {
        self.inner.read().get(canonical_id)
    }

    /// Returns `true` if a device is registered under `canonical_id`.
    #[must_use]
    pub fn contains(&self, canonical_id: &str) -> bool {
        self.inner.read().index.contains_key(canonical_id)
    }

    /// All devices in registration order.
    #[must_use]
    pub fn devices(&self) -> Vec<Arc<Device>> {
        self.inner.read().devices.clone()
    }

    /// Registers a device.
    ///
    /// If the id is already taken the existing device is kept and returned.
    pub fn register(&self, device: Device) -> Arc<Device> {
        self.inner.write().insert(device)
    }

    /// Registers configured devices.
    ///
    /// Entries whose packet id does not decode are logged and skipped; the
    /// rest are still registered. Ids already present are skipped too.
    /// Returns the devices created by this call, in entry order.
    pub fn register_from_config(&self, entries: &[DeviceEntry]) -> Vec<Arc<Device>> {
        let mut created = Vec::with_capacity(entries.len());
        let mut inner = self.inner.write();

        for entry in entries {
            let Some(event) = codec::decode(&entry.packet_id) else {
                tracing::error!(
                    packet_id = %entry.packet_id,
                    name = %entry.name,
                    "Invalid device in configuration"
                );
                continue;
            };

            let canonical_id = event.canonical_id();
            if inner.index.contains_key(&canonical_id) {
                tracing::debug!(device_id = %canonical_id, "Device already registered, skipping");
                continue;
            }

            let device = Device::new(
                entry.name.clone(),
                event,
                entry.kind.clone(),
                entry.fire_event,
                self.signal_repetitions,
            );
            tracing::debug!(
                device_id = %canonical_id,
                entity_id = %device.entity_id(),
                "Registered configured device"
            );
            created.push(inner.insert(device));
        }

        created
    }

    /// Returns the device for an event, creating it when allowed.
    ///
    /// A new device is created only if `automatic_add` is set, the event
    /// names a device, and a kind can be inferred. Such a device is named
    /// after the packet hex and does not fire events. Calling this twice
    /// for the same id returns the same instance.
    pub fn get_or_autocreate(
        &self,
        event: &DecodedEvent,
        automatic_add: bool,
    ) -> Option<Arc<Device>> {
        let canonical_id = event.canonical_id();
        if let Some(device) = self.get(&canonical_id) {
            return Some(device);
        }
        if !automatic_add || canonical_id.is_empty() {
            return None;
        }
        let kind = DeviceKind::infer(event)?;

        let device = Device::new(
            event.packet_hex(),
            event.clone(),
            kind,
            false,
            self.signal_repetitions,
        );
        tracing::info!(
            device_id = %canonical_id,
            device_class = %event.device_class(),
            entity_id = %device.entity_id(),
            "Automatically added device"
        );
        Some(self.inner.write().insert(device))
    }

    /// Finds a Lighting4 device by masked PT2262 address.
    #[must_use]
    pub fn lookup_pt2262_exact(&self, device_id: &str) -> Option<Arc<Device>> {
        pt2262::find_exact_match(device_id, &self.inner.read().devices)
    }

    /// Suggests a Lighting4 binary sensor that is probably the same
    /// physical device as `device_id`.
    #[must_use]
    pub fn lookup_pt2262_probable(&self, device_id: &str) -> Option<ProbableMatch> {
        pt2262::find_probable_match(device_id, &self.inner.read().devices)
    }
}
