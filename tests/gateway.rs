// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests driving a gateway over the dummy and stream transports.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use rfxtrx_lib::command::DeviceCommand;
use rfxtrx_lib::config::{BinarySensorConfig, DeviceConfig, GatewayConfig, SensorConfig};
use rfxtrx_lib::error::{ConfigError, DeviceError, Error, TransportError};
use rfxtrx_lib::lowlevel::{get_status_packet, reset_packet, set_mode_packet};
use rfxtrx_lib::subscription::Subscribable;
use rfxtrx_lib::transport::{DummyTransport, StreamTransport};
use rfxtrx_lib::{Gateway, GatewayEvent};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::{broadcast, mpsc};

const LIGHTING1_ON: &str = "0710012a45050170";
const LIGHTING2_ON: &str = "0b1100cd0213c7f210010f70";
const LIGHTING2_DIM: &str = "0b11000a0213c7f2100207f0";
const PT2262_ON: &str = "0913000e0e6c3b015e70";
const PT2262_OFF: &str = "0913000f0e6c37015e70";
const RFY: &str = "0c1a00010a0b0c010300000050";
const TEMP_HUMIDITY: &str = "0a520105ab0100dc2d0269";
const STATUS: &str = "0d01000102534508002701000000";

// ============================================================================
// Helpers
// ============================================================================

async fn dummy_gateway(config: GatewayConfig) -> (Gateway<DummyTransport>, DummyTransport) {
    let transport = DummyTransport::new();
    let gateway = Gateway::start(config, transport.clone()).await.unwrap();
    (gateway, transport)
}

async fn next_event(rx: &mut broadcast::Receiver<GatewayEvent>) -> GatewayEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event bus closed")
}

async fn next_state_change(rx: &mut broadcast::Receiver<GatewayEvent>) -> GatewayEvent {
    loop {
        let event = next_event(rx).await;
        if event.is_state_change() {
            return event;
        }
    }
}

/// Raw packet hex strings, in delivery order.
fn raw_channel<T>(gateway: &Gateway<T>) -> mpsc::UnboundedReceiver<String>
where
    T: rfxtrx_lib::transport::Transport,
{
    let (tx, rx) = mpsc::unbounded_channel();
    gateway.subscribe_raw(move |event| {
        let _ = tx.send(event.packet_hex());
    });
    rx
}

async fn next_raw(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for packet")
        .expect("subscriber dropped")
}

fn drain(rx: &mut broadcast::Receiver<GatewayEvent>) -> Vec<GatewayEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

// ============================================================================
// Startup
// ============================================================================

mod startup {
    use super::*;

    #[tokio::test]
    async fn sends_reset_status_and_modes_in_order() {
        let config = GatewayConfig::dummy().with_recv_modes(["ac", "lighting4"]);
        let (_gateway, transport) = dummy_gateway(config).await;

        assert_eq!(
            transport.sent_frames(),
            vec![
                reset_packet(),
                get_status_packet(),
                set_mode_packet(&["ac", "lighting4"]),
            ]
        );
    }

    #[tokio::test]
    async fn no_set_mode_without_recv_modes() {
        let (_gateway, transport) = dummy_gateway(GatewayConfig::dummy()).await;
        assert_eq!(
            transport.sent_frames(),
            vec![reset_packet(), get_status_packet()]
        );
    }

    #[tokio::test]
    async fn invalid_config_fails_before_sending() {
        let transport = DummyTransport::new();
        let config = GatewayConfig::dummy().with_recv_modes(["zigbee"]);
        let err = Gateway::start(config, transport.clone()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::UnknownReceiveMode(_))
        ));
        assert!(transport.sent_frames().is_empty());

        let config = GatewayConfig::dummy().with_signal_repetitions(0);
        let err = Gateway::start(config, transport).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidSignalRepetitions)
        ));
    }

    #[tokio::test]
    async fn invalid_device_entries_are_skipped() {
        let config = GatewayConfig::dummy()
            .with_switch("zz", DeviceConfig::named("Broken"))
            .with_light(LIGHTING2_ON, DeviceConfig::named("Kitchen"));
        let (gateway, _) = dummy_gateway(config).await;
        assert_eq!(gateway.devices().len(), 1);
        assert_eq!(gateway.devices()[0].canonical_id(), "213c7f2_16");
    }

    #[tokio::test]
    async fn connect_uses_dummy_transport() {
        let gateway = Gateway::connect(GatewayConfig::dummy()).await.unwrap();
        assert!(gateway.transport().as_dummy().is_some());
        gateway.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn connect_without_device_is_a_config_error() {
        let err = Gateway::connect(GatewayConfig::default()).await.unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::MissingDevice)));
    }
}

// ============================================================================
// Inbound packets
// ============================================================================

mod inbound {
    use super::*;

    #[tokio::test]
    async fn configured_light_follows_packets() {
        let config =
            GatewayConfig::dummy().with_light(LIGHTING2_ON, DeviceConfig::named("Kitchen"));
        let (gateway, transport) = dummy_gateway(config).await;
        let mut events = gateway.subscribe();

        assert!(transport.inject_hex(LIGHTING2_ON));
        let event = next_state_change(&mut events).await;
        assert_eq!(event.device_id(), "213c7f2_16");
        let light = gateway.device("213c7f2_16").unwrap();
        assert!(light.is_on());

        assert!(transport.inject_hex(LIGHTING2_DIM));
        next_state_change(&mut events).await;
        assert_eq!(light.brightness(), Some(117));
        assert!(light.is_on());
    }

    #[tokio::test]
    async fn automatic_add_creates_device_once() {
        let (gateway, transport) =
            dummy_gateway(GatewayConfig::dummy().with_automatic_add(true)).await;
        let mut events = gateway.subscribe();
        let mut raw = raw_channel(&gateway);

        transport.inject_hex(LIGHTING2_ON);
        transport.inject_hex(LIGHTING2_ON);
        next_raw(&mut raw).await;
        next_raw(&mut raw).await;

        let added: Vec<_> = drain(&mut events)
            .into_iter()
            .filter(|e| matches!(e, GatewayEvent::DeviceAdded { .. }))
            .collect();
        assert_eq!(
            added,
            vec![GatewayEvent::device_added("213c7f2_16", true)]
        );
        assert_eq!(gateway.registry().len(), 1);
        assert!(gateway.devices().is_empty());

        let device = gateway.device("213c7f2_16").unwrap();
        assert_eq!(device.name(), LIGHTING2_ON);
        assert!(!device.fire_event());
        assert!(device.is_on());
    }

    #[tokio::test]
    async fn unknown_device_ignored_without_automatic_add() {
        let (gateway, transport) = dummy_gateway(GatewayConfig::dummy()).await;
        let mut raw = raw_channel(&gateway);

        transport.inject_hex(LIGHTING2_ON);
        assert_eq!(next_raw(&mut raw).await, LIGHTING2_ON);
        assert!(gateway.registry().is_empty());
    }

    #[tokio::test]
    async fn status_packets_reach_raw_subscribers_only() {
        let (gateway, transport) =
            dummy_gateway(GatewayConfig::dummy().with_automatic_add(true)).await;
        let mut events = gateway.subscribe();
        let mut raw = raw_channel(&gateway);

        transport.inject_hex(STATUS);
        assert_eq!(next_raw(&mut raw).await, STATUS);
        assert!(gateway.registry().is_empty());
        assert!(drain(&mut events).is_empty());
    }

    #[tokio::test]
    async fn fire_event_raises_button_pressed() {
        let config = GatewayConfig::dummy()
            .with_switch(LIGHTING1_ON, DeviceConfig::named("Porch").with_fire_event());
        let (gateway, transport) = dummy_gateway(config).await;
        let mut events = gateway.subscribe();
        // Registered first, so it has run once the channel sees the packet
        let raw_calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&raw_calls);
        gateway.on_raw_event(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mut raw = raw_channel(&gateway);

        transport.inject_hex(LIGHTING1_ON);
        assert_eq!(next_raw(&mut raw).await, LIGHTING1_ON);
        assert_eq!(raw_calls.load(Ordering::SeqCst), 1);
        assert!(gateway.device("e5").unwrap().is_on());

        let pressed: Vec<_> = drain(&mut events)
            .into_iter()
            .filter(|e| e.name() == "button_pressed")
            .collect();
        assert_eq!(
            pressed,
            vec![GatewayEvent::ButtonPressed {
                device_id: "e5".to_string(),
                entity_id: "switch.porch".to_string(),
                state: "on".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn sensor_readings_are_stored() {
        let config = GatewayConfig::dummy().with_sensor(
            TEMP_HUMIDITY,
            SensorConfig::named("Outside").with_data_type("Humidity"),
        );
        let (gateway, transport) = dummy_gateway(config).await;
        let mut raw = raw_channel(&gateway);

        transport.inject_hex(TEMP_HUMIDITY);
        next_raw(&mut raw).await;

        let state = gateway.device("ab_01").unwrap().state();
        assert_eq!(
            state.reading("Humidity").and_then(|v| v.as_i64()),
            Some(45)
        );
        assert!(state.reading("Temperature").is_none());
    }

    #[tokio::test]
    async fn pt2262_codes_resolve_to_one_sensor() {
        let config = GatewayConfig::dummy().with_automatic_add(true).with_binary_sensor(
            PT2262_ON,
            BinarySensorConfig::named("Door").with_pt2262(4, 0x0b, 0x07),
        );
        let (gateway, transport) = dummy_gateway(config).await;
        let mut raw = raw_channel(&gateway);
        let door = gateway.device("0e6c3b").unwrap();

        transport.inject_hex(PT2262_ON);
        next_raw(&mut raw).await;
        assert!(door.is_on());

        transport.inject_hex(PT2262_OFF);
        next_raw(&mut raw).await;
        assert!(!door.is_on());
        assert_eq!(gateway.registry().len(), 1);
    }

    #[tokio::test]
    async fn panicking_subscriber_does_not_stop_others() {
        let (gateway, transport) = dummy_gateway(GatewayConfig::dummy()).await;
        gateway.on_raw_event(|_| panic!("subscriber bug"));
        let mut raw = raw_channel(&gateway);

        transport.inject_hex(LIGHTING2_ON);
        transport.inject_hex(LIGHTING1_ON);
        assert_eq!(next_raw(&mut raw).await, LIGHTING2_ON);
        assert_eq!(next_raw(&mut raw).await, LIGHTING1_ON);
    }

    #[tokio::test]
    async fn unsubscribed_callbacks_stop_receiving() {
        let (gateway, transport) = dummy_gateway(GatewayConfig::dummy()).await;
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let id = gateway.on_raw_event(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let mut raw = raw_channel(&gateway);

        transport.inject_hex(LIGHTING2_ON);
        next_raw(&mut raw).await;
        assert!(gateway.unsubscribe(id));
        transport.inject_hex(LIGHTING2_ON);
        next_raw(&mut raw).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn off_delay_turns_sensor_off() {
        let config = GatewayConfig::dummy().with_binary_sensor(
            PT2262_ON,
            BinarySensorConfig::named("Motion").with_off_delay(2),
        );
        let (gateway, transport) = dummy_gateway(config).await;
        let mut events = gateway.subscribe();
        let motion = gateway.device("0e6c3b").unwrap();

        let start = tokio::time::Instant::now();
        transport.inject_hex(PT2262_ON);
        next_state_change(&mut events).await;
        assert!(motion.is_on());
        assert!(motion.off_delay_pending());

        next_state_change(&mut events).await;
        assert!(!motion.is_on());
        assert!(!motion.off_delay_pending());
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}

// ============================================================================
// Outbound commands
// ============================================================================

mod outbound {
    use super::*;

    #[tokio::test]
    async fn commands_repeat_with_fresh_sequence_numbers() {
        let config = GatewayConfig::dummy()
            .with_signal_repetitions(3)
            .with_light(LIGHTING2_ON, DeviceConfig::named("Kitchen"));
        let (gateway, transport) = dummy_gateway(config).await;
        transport.clear_sent();

        gateway
            .send_command("213c7f2_16", DeviceCommand::On)
            .await
            .unwrap();

        let frames = transport.sent_frames();
        assert_eq!(frames.len(), 3);
        let sequences: Vec<u8> = frames.iter().map(|f| f[3]).collect();
        assert_eq!(sequences, [0, 1, 2]);
        assert!(frames.iter().all(|f| f[9] == 0x01));
        assert!(gateway.device("213c7f2_16").unwrap().is_on());
    }

    #[tokio::test]
    async fn dim_updates_local_state_and_publishes() {
        let config =
            GatewayConfig::dummy().with_light(LIGHTING2_ON, DeviceConfig::named("Kitchen"));
        let (gateway, _transport) = dummy_gateway(config).await;
        let mut events = gateway.subscribe();

        gateway
            .send_command("213c7f2_16", DeviceCommand::Dim(200))
            .await
            .unwrap();
        let light = gateway.device("213c7f2_16").unwrap();
        assert_eq!(light.brightness(), Some(200));
        assert!(light.is_on());
        assert!(next_event(&mut events).await.is_state_change());

        gateway
            .send_command("213c7f2_16", DeviceCommand::Off)
            .await
            .unwrap();
        assert!(!light.is_on());
        assert_eq!(light.brightness(), Some(0));
    }

    #[tokio::test]
    async fn missing_capabilities_send_nothing() {
        let config = GatewayConfig::dummy()
            .with_switch(LIGHTING1_ON, DeviceConfig::named("Porch"))
            .with_light(LIGHTING2_ON, DeviceConfig::named("Kitchen"))
            .with_cover(RFY, DeviceConfig::named("Blind"));
        let (gateway, transport) = dummy_gateway(config).await;
        transport.clear_sent();

        let cases = [
            ("e5", DeviceCommand::Dim(10), "dimming"),
            ("213c7f2_16", DeviceCommand::Open, "cover"),
            ("0a0b0c_1", DeviceCommand::On, "on/off"),
        ];
        for (id, command, missing) in cases {
            let err = gateway.send_command(id, command).await.unwrap_err();
            assert!(
                matches!(
                    &err,
                    Error::Device(DeviceError::MissingCapability { capability, .. })
                        if capability == missing
                ),
                "{id}: {err}"
            );
        }
        assert!(transport.sent_frames().is_empty());
    }

    #[tokio::test]
    async fn cover_commands_leave_state_alone() {
        let config = GatewayConfig::dummy().with_cover(RFY, DeviceConfig::named("Blind"));
        let (gateway, transport) = dummy_gateway(config).await;
        transport.clear_sent();

        gateway
            .send_command("0a0b0c_1", DeviceCommand::Close)
            .await
            .unwrap();
        assert_eq!(transport.sent_frames().len(), 1);
        assert!(!gateway.device("0a0b0c_1").unwrap().is_on());
    }

    #[tokio::test]
    async fn unknown_device_is_rejected() {
        let (gateway, _) = dummy_gateway(GatewayConfig::dummy()).await;
        let err = gateway
            .send_command("213c7f2_16", DeviceCommand::On)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DeviceNotFound(_)));
    }

    #[tokio::test]
    async fn commands_fail_after_shutdown() {
        let config =
            GatewayConfig::dummy().with_light(LIGHTING2_ON, DeviceConfig::named("Kitchen"));
        let (gateway, transport) = dummy_gateway(config).await;
        gateway.shutdown().await.unwrap();
        assert!(transport.is_closed());

        let err = gateway
            .send_command("213c7f2_16", DeviceCommand::On)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::Closed)));
        assert!(!gateway.device("213c7f2_16").unwrap().is_on());
    }
}

// ============================================================================
// Stream transport
// ============================================================================

mod stream {
    use super::*;

    #[tokio::test]
    async fn gateway_over_duplex_stream() {
        let (ours, mut theirs) = tokio::io::duplex(256);
        let config =
            GatewayConfig::dummy().with_light(LIGHTING2_ON, DeviceConfig::named("Kitchen"));
        let gateway = Gateway::start(config, StreamTransport::new(ours))
            .await
            .unwrap();
        let mut events = gateway.subscribe();

        let mut init = vec![0u8; reset_packet().len() + get_status_packet().len()];
        theirs.read_exact(&mut init).await.unwrap();
        assert_eq!(init[..14], reset_packet()[..]);
        assert_eq!(init[14..], get_status_packet()[..]);

        theirs
            .write_all(&hex::decode(LIGHTING2_ON).unwrap())
            .await
            .unwrap();
        let event = next_state_change(&mut events).await;
        assert_eq!(event.device_id(), "213c7f2_16");

        gateway
            .send_command("213c7f2_16", DeviceCommand::Off)
            .await
            .unwrap();
        let mut frame = vec![0u8; 12];
        theirs.read_exact(&mut frame).await.unwrap();
        assert_eq!(frame[1], 0x11);
        assert_eq!(frame[9], 0x00);

        gateway.shutdown().await.unwrap();
    }
}
