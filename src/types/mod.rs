// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for RFXtrx device control.
//!
//! - [`Dimmer`] - Dim level (0-100%) with conversions to 0-255 brightness
//!   and the 0-15 Lighting2 level
//! - [`DataType`] - Sensor readings a sensor entry can track

mod data_type;
mod dimmer;

pub use data_type::DataType;
pub use dimmer::Dimmer;
