// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state management types.
//!
//! [`DeviceState`] holds what is known about a device; [`StateChange`]
//! describes one update to it. Devices apply changes under their own lock
//! and report whether anything changed, so the dispatcher only publishes
//! real transitions.

mod device_state;
mod state_change;

pub use device_state::DeviceState;
pub use state_change::StateChange;
