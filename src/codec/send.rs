// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound command encoding.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::command::DeviceCommand;
use crate::device::Device;
use crate::error::Result;
use crate::transport::Transport;

/// Encodes `command` for `device` and transmits it `repetitions` times.
///
/// Repetitions are sent back to back, each with the next sequence number
/// from `sequence`. Nothing is sent if the device's packet family cannot
/// carry the command.
///
/// # Errors
///
/// Returns `DeviceError::UnsupportedCommand` for commands the family cannot
/// encode, or `TransportError` if a send fails. Repetitions after a failed
/// send are not attempted.
pub async fn encode_send<T>(
    transport: &T,
    device: &Device,
    command: DeviceCommand,
    repetitions: u32,
    sequence: &AtomicU8,
) -> Result<()>
where
    T: Transport,
{
    let packet = device.event().packet();
    // Validate before the first transmission
    packet.encode_command(command, 0)?;

    for attempt in 1..=repetitions {
        let seq = sequence.fetch_add(1, Ordering::Relaxed);
        let frame = packet.encode_command(command, seq)?;
        tracing::debug!(
            device_id = %device.canonical_id(),
            %command,
            attempt,
            repetitions,
            packet = %hex::encode(&frame),
            "Sending command"
        );
        transport.send(&frame).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::device::DeviceKind;
    use crate::error::{DeviceError, Error};
    use crate::transport::DummyTransport;

    fn light() -> Device {
        let event = codec::decode("0b1100cd0213c7f210010f70").unwrap();
        Device::new("Lamp", event, DeviceKind::Light, false, 3)
    }

    #[tokio::test]
    async fn sends_exactly_repetitions_frames() {
        let transport = DummyTransport::new();
        let sequence = AtomicU8::new(0);
        encode_send(&transport, &light(), DeviceCommand::On, 3, &sequence)
            .await
            .unwrap();

        let frames = transport.sent_frames();
        assert_eq!(frames.len(), 3);
        for (seq, frame) in frames.iter().enumerate() {
            assert_eq!(usize::from(frame[3]), seq);
            assert_eq!(frame[9], 0x01);
        }
    }

    #[tokio::test]
    async fn sequence_wraps() {
        let transport = DummyTransport::new();
        let sequence = AtomicU8::new(255);
        encode_send(&transport, &light(), DeviceCommand::Off, 2, &sequence)
            .await
            .unwrap();
        let frames = transport.sent_frames();
        assert_eq!(frames[0][3], 255);
        assert_eq!(frames[1][3], 0);
    }

    #[tokio::test]
    async fn unsupported_command_sends_nothing() {
        let transport = DummyTransport::new();
        let sequence = AtomicU8::new(0);
        let err = encode_send(&transport, &light(), DeviceCommand::Open, 2, &sequence)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Device(DeviceError::UnsupportedCommand { .. })
        ));
        assert!(transport.sent_frames().is_empty());
    }

    #[tokio::test]
    async fn dim_round_trips_through_decode() {
        let transport = DummyTransport::new();
        let sequence = AtomicU8::new(0);
        encode_send(&transport, &light(), DeviceCommand::Dim(117), 1, &sequence)
            .await
            .unwrap();
        let sent = codec::decode_bytes(&transport.sent_frames()[0]).unwrap();
        assert_eq!(sent.canonical_id(), "213c7f2_16");
        assert_eq!(sent.command(), Some("Set level"));
        assert_eq!(sent.dim_level().map(|d| d.to_brightness()), Some(117));
    }
}
