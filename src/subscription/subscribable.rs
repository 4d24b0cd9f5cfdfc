// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for types that deliver callbacks.

use crate::codec::DecodedEvent;
use crate::device::Device;
use crate::subscription::SubscriptionId;

/// Trait for types that support callback subscriptions.
///
/// # Examples
///
/// ```no_run
/// use rfxtrx_lib::{Gateway, GatewayConfig};
/// use rfxtrx_lib::subscription::Subscribable;
///
/// # async fn example() -> rfxtrx_lib::Result<()> {
/// let gateway = Gateway::connect(GatewayConfig::new("/dev/ttyUSB0")).await?;
///
/// let sub_id = gateway.on_raw_event(|event| {
///     println!("{} from {}", event.device_class(), event.device_identity());
/// });
///
/// gateway.unsubscribe(sub_id);
/// # Ok(())
/// # }
/// ```
pub trait Subscribable {
    /// Subscribes to every decoded packet.
    ///
    /// The callback runs after the packet has been applied to its device.
    fn on_raw_event<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DecodedEvent) + Send + Sync + 'static;

    /// Subscribes to device state changes.
    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Device) + Send + Sync + 'static;

    /// Unsubscribes a callback by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
