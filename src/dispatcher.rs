// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event dispatcher.
//!
//! Single consumer of everything the transport receives. Each decoded
//! packet goes through these steps, in order, before the next one is
//! taken:
//!
//! 1. Resolve the device: exact id, then PT2262 masked address, then
//!    automatic creation when enabled.
//! 2. Apply the packet to the device's state.
//! 3. Raise a button-pressed event if the device has `fire_event`.
//! 4. Hand the packet to raw event subscribers.
//!
//! Off-delay timers feed back into the same queue, so a timer expiring
//! never races a packet for the same device.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::codec::{self, DecodedEvent};
use crate::device::{BinarySensorOptions, Device, DeviceKind};
use crate::event::{EventBus, GatewayEvent};
use crate::lowlevel::PacketClass;
use crate::pt2262::{self, ProbableMatch};
use crate::registry::DeviceRegistry;
use crate::state::StateChange;
use crate::subscription::CallbackRegistry;
use crate::transport::PacketSink;

/// Work items for the dispatcher task.
#[derive(Debug)]
pub(crate) enum DispatchMessage {
    /// A raw frame from the transport.
    Packet(Vec<u8>),
    /// An off-delay timer fired.
    OffDelayExpired {
        /// Canonical id of the sensor.
        device_id: String,
    },
}

/// Receiving end of the dispatcher queue.
#[derive(Debug)]
pub struct DispatchQueue {
    rx: mpsc::UnboundedReceiver<DispatchMessage>,
}

/// Routes decoded packets to devices, events and subscribers.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
///
/// use rfxtrx_lib::codec;
/// use rfxtrx_lib::dispatcher::EventDispatcher;
/// use rfxtrx_lib::event::EventBus;
/// use rfxtrx_lib::registry::DeviceRegistry;
/// use rfxtrx_lib::subscription::CallbackRegistry;
///
/// let registry = DeviceRegistry::new(1);
/// let (dispatcher, _queue) = EventDispatcher::new(
///     registry.clone(),
///     Arc::new(CallbackRegistry::new()),
///     EventBus::new(),
///     true,
/// );
///
/// let event = codec::decode("0b1100cd0213c7f210010f70").unwrap();
/// dispatcher.dispatch(&event);
///
/// let device = registry.get("213c7f2_16").unwrap();
/// assert!(device.is_on());
/// ```
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    registry: DeviceRegistry,
    subscribers: Arc<CallbackRegistry>,
    event_bus: EventBus,
    automatic_add: bool,
    queue: mpsc::UnboundedSender<DispatchMessage>,
}

impl EventDispatcher {
    /// Creates a dispatcher and its queue.
    ///
    /// Nothing is processed until [`run`](Self::run) is awaited with the
    /// queue; [`dispatch`](Self::dispatch) can be called directly.
    #[must_use]
    pub fn new(
        registry: DeviceRegistry,
        subscribers: Arc<CallbackRegistry>,
        event_bus: EventBus,
        automatic_add: bool,
    ) -> (Self, DispatchQueue) {
        let (queue, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            registry,
            subscribers,
            event_bus,
            automatic_add,
            queue,
        };
        (dispatcher, DispatchQueue { rx })
    }

    /// A sink feeding received frames into the queue.
    #[must_use]
    pub fn packet_sink(&self) -> PacketSink {
        let queue = self.queue.clone();
        PacketSink::new(move |frame| queue.send(DispatchMessage::Packet(frame)).is_ok())
    }

    /// Processes queued work until every sender is gone.
    pub async fn run(self, mut queue: DispatchQueue) {
        tracing::debug!("Dispatcher started");
        while let Some(message) = queue.rx.recv().await {
            match message {
                DispatchMessage::Packet(frame) => self.dispatch_packet(&frame),
                DispatchMessage::OffDelayExpired { device_id } => {
                    self.off_delay_expired(&device_id);
                }
            }
        }
        tracing::debug!("Dispatcher stopped");
    }

    /// Decodes and dispatches a raw frame. Undecodable frames are dropped.
    pub fn dispatch_packet(&self, frame: &[u8]) {
        if let Some(event) = codec::decode_bytes(frame) {
            self.dispatch(&event);
        }
    }

    /// Dispatches one decoded packet through every step.
    pub fn dispatch(&self, event: &DecodedEvent) {
        tracing::debug!(
            packet = %event.packet_hex(),
            device_class = %event.device_class(),
            device_id = %event.device_identity(),
            "Received packet"
        );

        // Interface responses carry no device
        if event.has_device()
            && let Some(device) = self.resolve_device(event)
        {
            self.apply(&device, event);
            self.fire_button_event(&device, event);
        }

        self.subscribers.dispatch_raw(event);
    }

    // =========================================================================
    // Device resolution
    // =========================================================================

    fn resolve_device(&self, event: &DecodedEvent) -> Option<Arc<Device>> {
        let canonical_id = event.canonical_id();

        if let Some(device) = self.registry.get(&canonical_id) {
            return Some(device);
        }

        if event.is_lighting4() {
            if let Some(device) = self.registry.lookup_pt2262_exact(&canonical_id) {
                return Some(device);
            }
            if self.automatic_add {
                // Configuration hint only; the new id is still added below
                self.pt2262_hint(&canonical_id);
            }
        }

        let device = self.registry.get_or_autocreate(event, self.automatic_add)?;
        self.event_bus.publish(GatewayEvent::device_added(
            device.canonical_id(),
            true,
        ));
        Some(device)
    }

    /// Finds the configured PT2262 device an unknown code probably belongs to.
    fn pt2262_hint(&self, device_id: &str) -> Option<ProbableMatch> {
        let candidate = self.registry.lookup_pt2262_probable(device_id)?;
        tracing::debug!(
            device_id = %device_id,
            candidate = %candidate.device.canonical_id(),
            data_bits = candidate.data_bits,
            "Adding unknown PT2262 code despite probable match"
        );
        Some(candidate)
    }

    // =========================================================================
    // State application
    // =========================================================================

    fn apply(&self, device: &Arc<Device>, event: &DecodedEvent) {
        let change = match device.kind() {
            DeviceKind::BinarySensor(options) if event.is_lighting4() => {
                pt2262_change(options, &event.canonical_id())
            }
            DeviceKind::Sensor { data_types } => {
                if event.class() != PacketClass::Sensor {
                    return;
                }
                let readings = if data_types.is_empty() {
                    event
                        .values()
                        .iter()
                        .map(|(key, value)| StateChange::reading(key.as_str(), value.clone()))
                        .collect()
                } else {
                    data_types
                        .iter()
                        .filter_map(|dt| {
                            event
                                .value(dt.key())
                                .map(|value| StateChange::reading(dt.key(), value.clone()))
                        })
                        .collect()
                };
                Some(StateChange::Batch(readings))
            }
            _ => command_change(device.kind(), event),
        };

        if let Some(change) = change {
            self.apply_change(device, change);
        }

        if let Some(delay) = device
            .kind()
            .binary_sensor_options()
            .and_then(|options| options.off_delay)
            && device.is_on()
        {
            self.schedule_off_delay(device, delay);
        }
    }

    pub(crate) fn apply_change(&self, device: &Device, change: StateChange) {
        if !device.apply(&change) {
            return;
        }
        tracing::debug!(
            device_id = %device.canonical_id(),
            change = ?change,
            "State changed"
        );
        self.event_bus.publish(GatewayEvent::state_changed(
            device.canonical_id(),
            change,
            device.state(),
        ));
        self.subscribers.dispatch_state_changed(device);
    }

    fn fire_button_event(&self, device: &Device, event: &DecodedEvent) {
        if !device.fire_event() {
            return;
        }
        let Some(command) = event.command() else {
            return;
        };
        let state = command.to_lowercase();
        tracing::info!(
            entity_id = %device.entity_id(),
            state = %state,
            "Button pressed"
        );
        self.event_bus.publish(GatewayEvent::ButtonPressed {
            device_id: device.canonical_id().to_string(),
            entity_id: device.entity_id().to_string(),
            state,
        });
    }

    // =========================================================================
    // Off-delay timers
    // =========================================================================

    fn schedule_off_delay(&self, device: &Device, delay: Duration) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                device_id = %device.canonical_id(),
                "No runtime for off-delay timer; sensor stays on"
            );
            return;
        };
        if !device.begin_off_delay() {
            return;
        }

        let queue = self.queue.clone();
        let device_id = device.canonical_id().to_string();
        tracing::debug!(device_id = %device_id, ?delay, "Off-delay timer started");
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = queue.send(DispatchMessage::OffDelayExpired { device_id });
        });
    }

    fn off_delay_expired(&self, device_id: &str) {
        let Some(device) = self.registry.get(device_id) else {
            return;
        };
        device.finish_off_delay();
        tracing::debug!(device_id = %device_id, "Off-delay expired");
        self.apply_change(&device, StateChange::power_off());
    }
}

/// State change for a Lighting4 binary sensor.
///
/// With `data_bits`, the command bits select on or off; unknown commands
/// change nothing. Without `data_bits`, any packet means on.
fn pt2262_change(options: &BinarySensorOptions, device_id: &str) -> Option<StateChange> {
    let Some(bits) = options.data_bits else {
        return Some(StateChange::power_on());
    };
    let command = pt2262::extract_command(device_id, bits)?;
    if options.command_on == Some(command) {
        Some(StateChange::power_on())
    } else if options.command_off == Some(command) {
        Some(StateChange::power_off())
    } else {
        None
    }
}

/// State change for a received control command.
///
/// "On" and "Off" set the state. "Set level" only applies to lights and
/// carries the brightness. Anything else, cover movements included,
/// changes nothing.
fn command_change(kind: &DeviceKind, event: &DecodedEvent) -> Option<StateChange> {
    match event.command()? {
        "On" => Some(StateChange::power_on()),
        "Off" if matches!(kind, DeviceKind::Light) => Some(StateChange::dimmed(false, 0)),
        "Off" => Some(StateChange::power_off()),
        "Set level" if matches!(kind, DeviceKind::Light) => {
            let brightness = event.dim_level()?.to_brightness();
            Some(StateChange::dimmed(brightness > 0, brightness))
        }
        _ => None,
    }
}
