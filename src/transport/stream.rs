// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Byte stream transport.
//!
//! Frames on the wire are self-delimiting: the first byte counts the bytes
//! that follow. The reader task splits the stream on that length and
//! forwards each frame to the packet sink.

use std::fmt;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, SerialStream, StopBits};

use super::{PacketSink, Transport};
use crate::error::TransportError;

/// Line speed of the RFXtrx USB serial interface.
pub const BAUD_RATE: u32 = 38_400;

/// Transport over any async byte stream.
///
/// The production transport wraps the serial port, opened at 38400 baud
/// 8N1. Reads and writes are independent, so a send never waits for an
/// inbound frame.
pub struct StreamTransport<S> {
    reader: parking_lot::Mutex<Option<ReadHalf<S>>>,
    writer: tokio::sync::Mutex<Option<WriteHalf<S>>>,
    reader_task: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Wraps a byte stream.
    #[must_use]
    pub fn new(stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            reader: parking_lot::Mutex::new(Some(reader)),
            writer: tokio::sync::Mutex::new(Some(writer)),
            reader_task: parking_lot::Mutex::new(None),
        }
    }
}

impl StreamTransport<SerialStream> {
    /// Opens the serial port at `path`, 38400 baud 8N1.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Serial` if the port cannot be opened or
    /// configured.
    pub fn open(path: &str) -> Result<Self, TransportError> {
        let port = tokio_serial::new(path, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .open_native_async()?;
        tracing::info!(device = %path, baud = BAUD_RATE, "Opened RFXtrx device");
        Ok(Self::new(port))
    }
}

impl<S> fmt::Debug for StreamTransport<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamTransport")
            .field("reading", &self.reader_task.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    /// Spawns the reader task. Must be called within a tokio runtime.
    fn set_packet_sink(&self, sink: PacketSink) {
        let Some(reader) = self.reader.lock().take() else {
            tracing::warn!("Packet sink already installed, ignoring");
            return;
        };
        let task = tokio::spawn(read_frames(reader, sink));
        *self.reader_task.lock() = Some(task);
    }

    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        let writer = writer.as_mut().ok_or(TransportError::Closed)?;
        writer.write_all(frame).await?;
        writer.flush().await?;
        tracing::trace!(packet = %hex::encode(frame), "Sent frame");
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        if let Some(task) = self.reader_task.lock().take() {
            task.abort();
        }
        let writer = self.writer.lock().await.take();
        if let Some(mut writer) = writer {
            writer.shutdown().await?;
        }
        Ok(())
    }
}

impl<S> Drop for StreamTransport<S> {
    fn drop(&mut self) {
        if let Some(task) = self.reader_task.get_mut().take() {
            task.abort();
        }
    }
}

/// Reads length-prefixed frames until the stream ends or the sink is gone.
///
/// Zero-length prefixes are skipped. Read errors end the loop.
pub async fn read_frames<R>(mut reader: R, sink: PacketSink)
where
    R: AsyncRead + Unpin,
{
    loop {
        let len = match reader.read_u8().await {
            Ok(len) => len,
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                tracing::debug!("Transport stream ended");
                break;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Transport read failed");
                break;
            }
        };
        if len == 0 {
            continue;
        }

        let mut frame = vec![0u8; usize::from(len) + 1];
        frame[0] = len;
        if let Err(e) = reader.read_exact(&mut frame[1..]).await {
            tracing::warn!(error = %e, "Truncated frame on transport");
            break;
        }

        tracing::trace!(packet = %hex::encode(&frame), "Received frame");
        if !sink.deliver(frame) {
            tracing::debug!("Packet receiver gone, stopping reader");
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn channel_sink() -> (PacketSink, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (PacketSink::new(move |frame| tx.send(frame).is_ok()), rx)
    }

    #[tokio::test]
    async fn read_frames_splits_on_length_byte() {
        let bytes: &[u8] = &[
            0x00, // padding
            0x07, 0x10, 0x00, 0x2A, 0x45, 0x05, 0x01, 0x70, // Lighting1
            0x09, 0x13, 0x00, 0x01, 0x0E, 0x6C, 0x3B, 0x01, 0x5E, 0x70, // Lighting4
        ];
        let (sink, mut rx) = channel_sink();
        read_frames(bytes, sink).await;

        assert_eq!(rx.recv().await.unwrap().len(), 8);
        assert_eq!(rx.recv().await.unwrap()[1], 0x13);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn read_frames_drops_truncated_tail() {
        let bytes: &[u8] = &[0x07, 0x10, 0x00];
        let (sink, mut rx) = channel_sink();
        read_frames(bytes, sink).await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn stream_transport_round_trip() {
        let (ours, mut theirs) = tokio::io::duplex(64);
        let transport = StreamTransport::new(ours);
        let (sink, mut rx) = channel_sink();
        transport.set_packet_sink(sink);

        transport.send(&[0x02, 0xAA, 0xBB]).await.unwrap();
        let mut buf = [0u8; 3];
        theirs.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [0x02, 0xAA, 0xBB]);

        theirs.write_all(&[0x01, 0xCC]).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), vec![0x01, 0xCC]);

        transport.close().await.unwrap();
        assert!(matches!(
            transport.send(&[0x00]).await,
            Err(TransportError::Closed)
        ));
    }

    #[tokio::test]
    async fn send_completes_while_peer_is_silent() {
        let (ours, mut theirs) = tokio::io::duplex(64);
        let transport = StreamTransport::new(ours);
        let (sink, _rx) = channel_sink();
        transport.set_packet_sink(sink);
        tokio::task::yield_now().await;

        let frame = [
            0x0D, 0x00, 0x00, 0x01, 0x03, 0x53, 0x00, 0x00, 0x0C, 0x2F, 0x00, 0x00, 0x00, 0x00,
        ];
        tokio::time::timeout(Duration::from_secs(1), transport.send(&frame))
            .await
            .expect("send stalled behind the reader")
            .unwrap();

        let mut buf = [0u8; 14];
        theirs.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, frame);

        tokio::time::timeout(Duration::from_secs(1), transport.close())
            .await
            .expect("close stalled behind the reader")
            .unwrap();
    }

    #[tokio::test]
    async fn open_missing_port_fails() {
        let result = StreamTransport::open("/dev/rfxtrx-does-not-exist");
        assert!(matches!(result, Err(TransportError::Serial(_))));
    }
}
