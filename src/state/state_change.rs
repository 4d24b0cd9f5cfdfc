// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! State change representation.
//!
//! State changes are the building blocks for updating a device's
//! [`DeviceState`](super::DeviceState), whether from a received packet, an
//! outbound command or an expired off-delay timer.
//!
//! # Examples
//!
//! ```
//! use rfxtrx_lib::state::{DeviceState, StateChange};
//!
//! let mut state = DeviceState::new();
//!
//! // Apply returns true if the state actually changed
//! assert!(state.apply(&StateChange::power_on()));
//! assert!(!state.apply(&StateChange::power_on()));
//! ```

use serde::Serialize;

use crate::lowlevel::Value;

/// A change in device state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StateChange {
    /// The device turned on or off.
    Power(bool),

    /// Brightness changed (0-255).
    Brightness(u8),

    /// A sensor reading was updated.
    Reading {
        /// Value key, e.g. `Temperature`.
        key: String,
        /// The new reading.
        value: Value,
    },

    /// Several changes applied together.
    Batch(Vec<StateChange>),
}

impl StateChange {
    /// Creates a power-on change.
    #[must_use]
    pub fn power_on() -> Self {
        Self::Power(true)
    }

    /// Creates a power-off change.
    #[must_use]
    pub fn power_off() -> Self {
        Self::Power(false)
    }

    /// Creates a power change with a brightness.
    ///
    /// This is what "Set level" and outbound dim commands produce.
    #[must_use]
    pub fn dimmed(is_on: bool, brightness: u8) -> Self {
        Self::Batch(vec![Self::Power(is_on), Self::Brightness(brightness)])
    }

    /// Creates a reading change.
    #[must_use]
    pub fn reading(key: impl Into<String>, value: Value) -> Self {
        Self::Reading {
            key: key.into(),
            value,
        }
    }

    /// Returns `true` if this is an empty batch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Batch(changes) if changes.iter().all(Self::is_empty))
    }
}
