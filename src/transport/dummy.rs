// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::{PacketSink, Transport};
use crate::error::TransportError;

#[derive(Debug, Default)]
struct DummyInner {
    sent: Mutex<Vec<Vec<u8>>>,
    sink: Mutex<Option<PacketSink>>,
    closed: AtomicBool,
}

/// Transport that talks to nothing.
///
/// Sent frames are recorded; received frames are injected by the caller.
/// Clones share the same state, so a test can keep a handle after giving
/// one to the gateway.
///
/// # Examples
///
/// ```
/// use rfxtrx_lib::transport::{DummyTransport, Transport};
///
/// # tokio_test_block_on(async {
/// let transport = DummyTransport::new();
/// transport.send(&[0x07, 0x10, 0x00, 0x00, 0x45, 0x05, 0x01, 0x00]).await.unwrap();
/// assert_eq!(transport.sent_frames().len(), 1);
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DummyTransport {
    inner: Arc<DummyInner>,
}

impl DummyTransport {
    /// Creates a new dummy transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames sent so far, oldest first.
    #[must_use]
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        self.inner.sent.lock().clone()
    }

    /// Forgets recorded frames.
    pub fn clear_sent(&self) {
        self.inner.sent.lock().clear();
    }

    /// Delivers a frame as if the transceiver had received it.
    ///
    /// Returns `false` if no sink is installed or the receiver is gone.
    pub fn inject(&self, frame: Vec<u8>) -> bool {
        let sink = self.inner.sink.lock().clone();
        sink.is_some_and(|sink| sink.deliver(frame))
    }

    /// Like [`inject`](Self::inject) with a hex string.
    ///
    /// Returns `false` for invalid hex.
    pub fn inject_hex(&self, packet: &str) -> bool {
        hex::decode(packet).is_ok_and(|frame| self.inject(frame))
    }

    /// Returns `true` once closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }
}

impl Transport for DummyTransport {
    fn set_packet_sink(&self, sink: PacketSink) {
        *self.inner.sink.lock() = Some(sink);
    }

    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::Closed);
        }
        tracing::trace!(packet = %hex::encode(frame), "Dummy send");
        self.inner.sent.lock().push(frame.to_vec());
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.inner.closed.store(true, Ordering::Release);
        self.inner.sink.lock().take();
        Ok(())
    }

    fn reset_settle_time(&self) -> Duration {
        Duration::ZERO
    }
}
