// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transports carrying frames to and from the transceiver.
//!
//! A transport sends outbound frames and hands every inbound frame to a
//! [`PacketSink`] installed by the gateway. It does not interpret frames.
//!
//! - [`StreamTransport`]: length-prefixed frames over any async byte
//!   stream, in production the serial device file
//! - [`DummyTransport`]: records sent frames and lets tests inject
//!   received ones
//! - [`Connection`]: either of the above, chosen from configuration

mod dummy;
mod stream;

pub use dummy::DummyTransport;
pub use stream::{BAUD_RATE, StreamTransport, read_frames};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::TransportError;

/// How long the transceiver needs after a reset before it accepts
/// commands.
pub const RESET_SETTLE_TIME: Duration = Duration::from_millis(300);

/// Receiver side of the transport: accepts inbound frames.
///
/// Cheap to clone. Delivery never blocks.
#[derive(Clone)]
pub struct PacketSink {
    deliver: Arc<dyn Fn(Vec<u8>) -> bool + Send + Sync>,
}

impl PacketSink {
    /// Creates a sink from a delivery function.
    ///
    /// The function returns `false` once the receiving side is gone.
    pub fn new<F>(deliver: F) -> Self
    where
        F: Fn(Vec<u8>) -> bool + Send + Sync + 'static,
    {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    /// Hands a frame to the receiver.
    ///
    /// Returns `false` if the receiver is gone.
    pub fn deliver(&self, frame: Vec<u8>) -> bool {
        (self.deliver)(frame)
    }
}

impl fmt::Debug for PacketSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PacketSink").finish_non_exhaustive()
    }
}

/// Trait for transports between the gateway and the transceiver.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Installs the sink receiving inbound frames.
    ///
    /// Called once by the gateway before interface commands are sent.
    fn set_packet_sink(&self, sink: PacketSink);

    /// Sends one complete frame.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the transport is closed or the write
    /// fails.
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError>;

    /// Closes the transport. Further sends fail.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if flushing or shutting down fails.
    async fn close(&self) -> Result<(), TransportError>;

    /// Time to wait after the reset command.
    fn reset_settle_time(&self) -> Duration {
        RESET_SETTLE_TIME
    }
}

/// The transport selected by configuration.
#[derive(Debug)]
pub enum Connection {
    /// In-memory transport for tests and dry runs.
    Dummy(DummyTransport),
    /// The serial device.
    Serial(StreamTransport<tokio_serial::SerialStream>),
}

impl Connection {
    /// Returns the dummy transport, if this is one.
    #[must_use]
    pub fn as_dummy(&self) -> Option<&DummyTransport> {
        match self {
            Self::Dummy(dummy) => Some(dummy),
            Self::Serial(_) => None,
        }
    }
}

impl Transport for Connection {
    fn set_packet_sink(&self, sink: PacketSink) {
        match self {
            Self::Dummy(t) => t.set_packet_sink(sink),
            Self::Serial(t) => t.set_packet_sink(sink),
        }
    }

    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        match self {
            Self::Dummy(t) => t.send(frame).await,
            Self::Serial(t) => t.send(frame).await,
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        match self {
            Self::Dummy(t) => t.close().await,
            Self::Serial(t) => t.close().await,
        }
    }

    fn reset_settle_time(&self) -> Duration {
        match self {
            Self::Dummy(t) => t.reset_settle_time(),
            Self::Serial(t) => t.reset_settle_time(),
        }
    }
}
