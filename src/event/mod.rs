// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event system for gateway notifications.
//!
//! Devices being added, state transitions and button presses are published
//! on an [`EventBus`]. Hosts subscribe through
//! [`Gateway::subscribe`](crate::Gateway::subscribe). Raw decoded packets go
//! through the callback registry in [`subscription`](crate::subscription)
//! instead, since they are delivered synchronously.
//!
//! # Examples
//!
//! ```
//! use rfxtrx_lib::event::{EventBus, GatewayEvent};
//!
//! let bus = EventBus::new();
//! let mut rx = bus.subscribe();
//!
//! bus.publish(GatewayEvent::device_added("0e6c3b", true));
//! assert!(rx.try_recv().is_ok());
//! ```

mod event_bus;
mod gateway_event;

pub use event_bus::EventBus;
pub use gateway_event::{EVENT_BUTTON_PRESSED, GatewayEvent};
