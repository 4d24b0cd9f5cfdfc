// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for gateway subscriptions.
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry storing and dispatching callbacks

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::codec::DecodedEvent;
use crate::device::Device;

/// Unique identifier for a subscription.
///
/// Returned when subscribing and used to unsubscribe later. Ids increase
/// monotonically, so ordering by id is subscription order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Callback receiving every decoded packet.
type RawEventCallback = Arc<dyn Fn(&DecodedEvent) + Send + Sync>;

/// Callback receiving devices whose state changed.
type StateChangedCallback = Arc<dyn Fn(&Device) + Send + Sync>;

/// Registry of subscriber callbacks.
///
/// Callbacks run synchronously on the dispatcher task, in subscription
/// order. A panicking callback is caught and logged; the remaining
/// callbacks still run.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    raw_event_callbacks: RwLock<BTreeMap<SubscriptionId, RawEventCallback>>,
    state_changed_callbacks: RwLock<BTreeMap<SubscriptionId, StateChangedCallback>>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            raw_event_callbacks: RwLock::new(BTreeMap::new()),
            state_changed_callbacks: RwLock::new(BTreeMap::new()),
        }
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a callback for every decoded packet.
    pub fn on_raw_event<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&DecodedEvent) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.raw_event_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    /// Registers a callback for device state changes.
    pub fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Device) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.state_changed_callbacks
            .write()
            .insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a callback by its subscription ID.
    ///
    /// Returns `true` if a callback was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        if self.raw_event_callbacks.write().remove(&id).is_some() {
            return true;
        }
        self.state_changed_callbacks.write().remove(&id).is_some()
    }

    /// Clears all callbacks.
    pub fn clear(&self) {
        self.raw_event_callbacks.write().clear();
        self.state_changed_callbacks.write().clear();
    }

    // =========================================================================
    // Dispatch methods
    // =========================================================================

    /// Delivers a decoded packet to every raw event callback.
    ///
    /// Returns the number of callbacks that panicked.
    pub fn dispatch_raw(&self, event: &DecodedEvent) -> usize {
        // Snapshot so callbacks may (un)subscribe without deadlocking
        let callbacks: Vec<_> = self
            .raw_event_callbacks
            .read()
            .iter()
            .map(|(id, cb)| (*id, Arc::clone(cb)))
            .collect();

        callbacks
            .into_iter()
            .filter(|(id, callback)| {
                let failed = catch_unwind(AssertUnwindSafe(|| callback(event))).is_err();
                if failed {
                    tracing::error!(
                        subscription = %id,
                        packet = %event.packet_hex(),
                        "Event subscriber panicked"
                    );
                }
                failed
            })
            .count()
    }

    /// Delivers a state change to every state callback.
    ///
    /// Returns the number of callbacks that panicked.
    pub fn dispatch_state_changed(&self, device: &Device) -> usize {
        let callbacks: Vec<_> = self
            .state_changed_callbacks
            .read()
            .iter()
            .map(|(id, cb)| (*id, Arc::clone(cb)))
            .collect();

        callbacks
            .into_iter()
            .filter(|(id, callback)| {
                let failed = catch_unwind(AssertUnwindSafe(|| callback(device))).is_err();
                if failed {
                    tracing::error!(
                        subscription = %id,
                        device_id = %device.canonical_id(),
                        "State subscriber panicked"
                    );
                }
                failed
            })
            .count()
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered callbacks.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.raw_event_callbacks.read().len() + self.state_changed_callbacks.read().len()
    }

    /// Returns `true` if there are no registered callbacks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}
