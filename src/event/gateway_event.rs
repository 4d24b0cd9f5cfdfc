// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Gateway event types.

use serde::Serialize;

use crate::state::{DeviceState, StateChange};

/// Name of the host event raised when a device with `fire_event` receives
/// a command.
pub const EVENT_BUTTON_PRESSED: &str = "button_pressed";

/// Events emitted by the gateway.
///
/// # Examples
///
/// ```
/// use rfxtrx_lib::event::GatewayEvent;
///
/// let pressed = GatewayEvent::ButtonPressed {
///     device_id: "213c7f2_16".to_string(),
///     entity_id: "switch.hall".to_string(),
///     state: "on".to_string(),
/// };
/// assert_eq!(pressed.name(), "button_pressed");
/// assert_eq!(pressed.device_id(), "213c7f2_16");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GatewayEvent {
    /// A device was added to the registry.
    DeviceAdded {
        /// Canonical id of the added device.
        device_id: String,
        /// `true` if created from a received packet rather than configuration.
        automatic: bool,
    },

    /// A device's state changed.
    StateChanged {
        /// Canonical id of the device.
        device_id: String,
        /// The change that was applied.
        change: StateChange,
        /// The complete new state.
        new_state: DeviceState,
    },

    /// A device with `fire_event` received a command.
    ButtonPressed {
        /// Canonical id of the device.
        device_id: String,
        /// Host entity id of the device.
        entity_id: String,
        /// Lowercased command name, e.g. `on` or `set level`.
        state: String,
    },
}

impl GatewayEvent {
    /// Returns the canonical device id associated with this event.
    #[must_use]
    pub fn device_id(&self) -> &str {
        match self {
            Self::DeviceAdded { device_id, .. }
            | Self::StateChanged { device_id, .. }
            | Self::ButtonPressed { device_id, .. } => device_id,
        }
    }

    /// Event name as hosts know it.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::DeviceAdded { .. } => "device_added",
            Self::StateChanged { .. } => "state_changed",
            Self::ButtonPressed { .. } => EVENT_BUTTON_PRESSED,
        }
    }

    /// Returns `true` if this is a state change event.
    #[must_use]
    pub fn is_state_change(&self) -> bool {
        matches!(self, Self::StateChanged { .. })
    }

    /// Creates a device added event.
    #[must_use]
    pub fn device_added(device_id: impl Into<String>, automatic: bool) -> Self {
        Self::DeviceAdded {
            device_id: device_id.into(),
            automatic,
        }
    }

    /// Creates a state changed event.
    #[must_use]
    pub fn state_changed(
        device_id: impl Into<String>,
        change: StateChange,
        new_state: DeviceState,
    ) -> Self {
        Self::StateChanged {
            device_id: device_id.into(),
            change,
            new_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        assert_eq!(GatewayEvent::device_added("a", true).name(), "device_added");
        let changed =
            GatewayEvent::state_changed("a", StateChange::power_on(), DeviceState::new());
        assert_eq!(changed.name(), "state_changed");
        assert!(changed.is_state_change());
    }

    #[test]
    fn serializes_to_json() {
        let event = GatewayEvent::ButtonPressed {
            device_id: "e5".to_string(),
            entity_id: "switch.porch".to_string(),
            state: "off".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["ButtonPressed"]["entity_id"], "switch.porch");
        assert_eq!(json["ButtonPressed"]["state"], "off");
    }
}
