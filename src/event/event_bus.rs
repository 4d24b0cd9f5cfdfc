// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast of gateway events.

use tokio::sync::broadcast;

use super::GatewayEvent;

/// Events buffered per receiver before it starts lagging.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Fans gateway events out to every host receiver.
///
/// A receiver that falls more than the capacity behind loses the oldest
/// events and sees `RecvError::Lagged` once. Publishing never blocks the
/// dispatcher.
///
/// Clones publish into the same channel.
///
/// # Examples
///
/// ```
/// use rfxtrx_lib::event::{EventBus, GatewayEvent};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(GatewayEvent::device_added("e5", true));
/// assert_eq!(rx.try_recv().unwrap().device_id(), "e5");
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<GatewayEvent>,
}

impl EventBus {
    /// Creates a bus buffering 256 events per receiver.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering `capacity` events per receiver.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns a receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event. Dropped if nobody listens.
    pub fn publish(&self, event: GatewayEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("No event receivers");
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
