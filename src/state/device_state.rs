// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use serde::Serialize;

use crate::lowlevel::{Value, Values};

use super::StateChange;

/// Tracked state of an RFXtrx device.
///
/// Switches, lights and binary sensors use the on/off flag. Lights also
/// track brightness. Sensors keep their latest readings keyed by data type
/// name.
///
/// # Examples
///
/// ```
/// use rfxtrx_lib::state::{DeviceState, StateChange};
///
/// let mut state = DeviceState::new();
/// state.apply(&StateChange::dimmed(true, 127));
/// assert!(state.is_on());
/// assert_eq!(state.brightness(), Some(127));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceState {
    is_on: bool,
    brightness: Option<u8>,
    readings: Values,
}

impl DeviceState {
    /// Creates a new state: off, no brightness, no readings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the device is on.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Brightness (0-255), once known.
    #[must_use]
    pub fn brightness(&self) -> Option<u8> {
        self.brightness
    }

    /// Latest reading for a value key.
    #[must_use]
    pub fn reading(&self, key: &str) -> Option<&Value> {
        self.readings.get(key)
    }

    /// All readings.
    #[must_use]
    pub fn readings(&self) -> &Values {
        &self.readings
    }

    /// Applies a change, returning `true` if anything changed.
    pub fn apply(&mut self, change: &StateChange) -> bool {
        match change {
            StateChange::Power(on) => {
                let changed = self.is_on != *on;
                self.is_on = *on;
                changed
            }
            StateChange::Brightness(value) => {
                let changed = self.brightness != Some(*value);
                self.brightness = Some(*value);
                changed
            }
            StateChange::Reading { key, value } => {
                if self.readings.get(key) == Some(value) {
                    false
                } else {
                    self.readings.insert(key.clone(), value.clone());
                    true
                }
            }
            StateChange::Batch(changes) => changes
                .iter()
                .fold(false, |changed, c| self.apply(c) || changed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_off() {
        let state = DeviceState::new();
        assert!(!state.is_on());
        assert_eq!(state.brightness(), None);
        assert!(state.readings().is_empty());
    }

    #[test]
    fn apply_reports_changes() {
        let mut state = DeviceState::new();
        assert!(state.apply(&StateChange::power_on()));
        assert!(!state.apply(&StateChange::power_on()));
        assert!(state.apply(&StateChange::power_off()));
    }

    #[test]
    fn batch_applies_every_change() {
        let mut state = DeviceState::new();
        assert!(state.apply(&StateChange::dimmed(false, 0)));
        assert!(!state.is_on());
        assert_eq!(state.brightness(), Some(0));

        // Power unchanged, brightness changed
        assert!(state.apply(&StateChange::dimmed(false, 10)));
        assert!(!state.apply(&StateChange::dimmed(false, 10)));
    }

    #[test]
    fn readings_replace_previous_values() {
        let mut state = DeviceState::new();
        assert!(state.apply(&StateChange::reading("Temperature", Value::Float(21.5))));
        assert!(!state.apply(&StateChange::reading("Temperature", Value::Float(21.5))));
        assert!(state.apply(&StateChange::reading("Temperature", Value::Float(22.0))));
        assert_eq!(state.reading("Temperature"), Some(&Value::Float(22.0)));
    }
}
