// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback subscriptions.
//!
//! Raw packet subscribers receive every [`DecodedEvent`](crate::codec::DecodedEvent)
//! the dispatcher processes, in subscription order, synchronously on the
//! dispatcher task. Keep callbacks short; hand work off to a channel if it
//! takes time. For asynchronous consumption use
//! [`Gateway::subscribe`](crate::Gateway::subscribe) instead.
//!
//! - [`SubscriptionId`] - A unique identifier for a subscription, used to unsubscribe
//! - [`CallbackRegistry`] - Registry that stores and dispatches callbacks
//! - [`Subscribable`] - Trait for types that accept subscriptions

mod callback;
mod subscribable;

pub use callback::{CallbackRegistry, SubscriptionId};
pub use subscribable::Subscribable;
