// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RFXtrx gateway.
//!
//! The [`Gateway`] owns the transport, the device registry and the
//! dispatcher task. It is the host-facing surface: configured devices,
//! subscriptions, outbound commands and shutdown.

use std::sync::Arc;
use std::sync::atomic::AtomicU8;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::codec;
use crate::command::DeviceCommand;
use crate::config::GatewayConfig;
use crate::device::{Device, DeviceKind};
use crate::dispatcher::EventDispatcher;
use crate::error::{DeviceError, Error, Result};
use crate::event::{EventBus, GatewayEvent};
use crate::lowlevel;
use crate::registry::DeviceRegistry;
use crate::state::StateChange;
use crate::subscription::{CallbackRegistry, Subscribable, SubscriptionId};
use crate::transport::{Connection, DummyTransport, StreamTransport, Transport};

/// A running RFXtrx gateway.
///
/// # Examples
///
/// ```
/// use rfxtrx_lib::command::DeviceCommand;
/// use rfxtrx_lib::config::{DeviceConfig, GatewayConfig};
/// use rfxtrx_lib::Gateway;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> rfxtrx_lib::Result<()> {
/// let config = GatewayConfig::dummy()
///     .with_light("0b1100cd0213c7f210010f70", DeviceConfig::named("Kitchen"));
/// let gateway = Gateway::connect(config).await?;
///
/// gateway.send_command("213c7f2_16", DeviceCommand::Dim(128)).await?;
/// assert_eq!(gateway.device("213c7f2_16").unwrap().brightness(), Some(128));
///
/// gateway.shutdown().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Gateway<T: Transport = Connection> {
    transport: Arc<T>,
    registry: DeviceRegistry,
    subscribers: Arc<CallbackRegistry>,
    event_bus: EventBus,
    dispatcher: EventDispatcher,
    configured: Vec<Arc<Device>>,
    sequence: AtomicU8,
    dispatcher_task: Mutex<Option<JoinHandle<()>>>,
}

impl Gateway<Connection> {
    /// Opens the transport named by `config` and starts the gateway.
    ///
    /// With `dummy` set an in-memory [`DummyTransport`] is used, otherwise
    /// the serial device at `config.device` is opened.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an invalid configuration and
    /// `Error::Transport` if the device cannot be opened or initialised.
    pub async fn connect(config: GatewayConfig) -> Result<Self> {
        config.validate()?;
        let connection = if config.dummy {
            tracing::info!("Using dummy transport");
            Connection::Dummy(DummyTransport::new())
        } else {
            Connection::Serial(StreamTransport::open(&config.device)?)
        };
        Self::start(config, connection).await
    }
}

impl<T: Transport> Gateway<T> {
    /// Starts a gateway over an already opened transport.
    ///
    /// Steps, in order: validate the configuration, register configured
    /// devices, reset the interface and wait for it to settle, install the
    /// packet sink, request the interface status, set the receive modes
    /// if configured, and spawn the dispatcher task.
    ///
    /// Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an invalid configuration and
    /// `Error::Transport` if an interface command cannot be sent.
    pub async fn start(config: GatewayConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let entries = config.device_entries()?;

        let registry = DeviceRegistry::new(config.signal_repetitions);
        let configured = registry.register_from_config(&entries);
        tracing::info!(
            configured = configured.len(),
            skipped = entries.len() - configured.len(),
            automatic_add = config.automatic_add,
            "Registered configured devices"
        );

        let subscribers = Arc::new(CallbackRegistry::new());
        if config.debug {
            subscribers.on_raw_event(|event| {
                tracing::info!(
                    packet = %event.packet_hex(),
                    device_class = %event.device_class(),
                    device_id = %event.device_identity(),
                    "Raw frame"
                );
            });
        }
        let event_bus = EventBus::new();
        let (dispatcher, queue) = EventDispatcher::new(
            registry.clone(),
            Arc::clone(&subscribers),
            event_bus.clone(),
            config.automatic_add,
        );

        transport.send(&lowlevel::reset_packet()).await?;
        let settle = transport.reset_settle_time();
        if !settle.is_zero() {
            tokio::time::sleep(settle).await;
        }

        transport.set_packet_sink(dispatcher.packet_sink());
        transport.send(&lowlevel::get_status_packet()).await?;
        if let Some(modes) = &config.recv_modes {
            tracing::info!(?modes, "Setting receive modes");
            transport.send(&lowlevel::set_mode_packet(modes.as_slice())).await?;
        }

        let task = tokio::spawn(dispatcher.clone().run(queue));
        tracing::info!("RFXtrx gateway started");

        Ok(Self {
            transport: Arc::new(transport),
            registry,
            subscribers,
            event_bus,
            dispatcher,
            configured,
            sequence: AtomicU8::new(0),
            dispatcher_task: Mutex::new(Some(task)),
        })
    }

    // =========================================================================
    // Devices
    // =========================================================================

    /// Devices registered from configuration, in configuration order.
    #[must_use]
    pub fn devices(&self) -> &[Arc<Device>] {
        &self.configured
    }

    /// The registry, including automatically added devices.
    #[must_use]
    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Looks up a device by canonical id.
    #[must_use]
    pub fn device(&self, canonical_id: &str) -> Option<Arc<Device>> {
        self.registry.get(canonical_id)
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // =========================================================================
    // Subscription
    // =========================================================================

    /// Subscribes to gateway events.
    ///
    /// The receiver gets device additions, state changes and button
    /// presses.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.event_bus.subscribe()
    }

    /// Subscribes to every decoded packet. Same as
    /// [`on_raw_event`](Subscribable::on_raw_event).
    pub fn subscribe_raw<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&codec::DecodedEvent) + Send + Sync + 'static,
    {
        self.subscribers.on_raw_event(callback)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Sends a command to a registered device.
    ///
    /// The command is transmitted `signal_repetitions` times. Once every
    /// transmission succeeded, the device's local state follows the
    /// command: on, off, or dimmed to the given brightness. Cover commands
    /// leave the state alone.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` for unknown ids, `DeviceError` if
    /// the device cannot carry the command, and `TransportError` if a
    /// transmission fails.
    pub async fn send_command(&self, canonical_id: &str, command: DeviceCommand) -> Result<()> {
        let device = self
            .registry
            .get(canonical_id)
            .ok_or_else(|| Error::DeviceNotFound(canonical_id.to_string()))?;

        if let Some(capability) = device.capabilities().missing(command) {
            return Err(DeviceError::MissingCapability {
                device_id: canonical_id.to_string(),
                capability: capability.to_string(),
            }
            .into());
        }

        let result = codec::encode_send(
            self.transport.as_ref(),
            &device,
            command,
            device.signal_repetitions(),
            &self.sequence,
        )
        .await;
        if let Err(e) = &result {
            tracing::error!(
                device_id = %canonical_id,
                %command,
                packet = %device.event().packet_hex(),
                error = %e,
                "Failed to send command"
            );
        }
        result?;

        if let Some(change) = local_change(device.kind(), command) {
            self.dispatcher.apply_change(&device, change);
        }
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Returns `true` until [`shutdown`](Self::shutdown) is called.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.dispatcher_task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Stops the dispatcher, drops all callbacks and closes the transport.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if closing the transport fails.
    pub async fn shutdown(&self) -> Result<()> {
        if let Some(task) = self.dispatcher_task.lock().take() {
            task.abort();
        }
        self.subscribers.clear();
        self.transport.close().await?;
        tracing::info!("RFXtrx gateway stopped");
        Ok(())
    }
}

impl<T: Transport> Subscribable for Gateway<T> {
    fn on_raw_event<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&codec::DecodedEvent) + Send + Sync + 'static,
    {
        self.subscribers.on_raw_event(callback)
    }

    fn on_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Device) + Send + Sync + 'static,
    {
        self.subscribers.on_state_changed(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

impl<T: Transport> Drop for Gateway<T> {
    fn drop(&mut self) {
        if let Some(task) = self.dispatcher_task.get_mut().take() {
            task.abort();
        }
    }
}

/// State a device is assumed to be in after `command` was sent.
fn local_change(kind: &DeviceKind, command: DeviceCommand) -> Option<StateChange> {
    match command {
        DeviceCommand::On => Some(StateChange::power_on()),
        DeviceCommand::Off if matches!(kind, DeviceKind::Light) => {
            Some(StateChange::dimmed(false, 0))
        }
        DeviceCommand::Off => Some(StateChange::power_off()),
        DeviceCommand::Dim(brightness) => Some(StateChange::dimmed(brightness > 0, brightness)),
        DeviceCommand::Open | DeviceCommand::Close | DeviceCommand::Stop => None,
    }
}
