// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `RFXtrx` Lib - A Rust library bridging RFXtrx RF transceivers into a
//! home-automation event bus.
//!
//! The gateway reads packets from an RFXtrx433 over its serial device,
//! decodes them, resolves the sending device and keeps its state. Hosts
//! receive events and raw packets, and send commands back over the air.
//!
//! # Supported Features
//!
//! - **Decoding**: Lighting1, Lighting2, Lighting4 (PT2262), RFY and
//!   temperature/humidity sensors
//! - **Device registry**: configured devices plus optional automatic add
//! - **PT2262 resolution**: address/command bit separation for cheap
//!   433 MHz sensors, with configuration hints for unknown codes
//! - **Commands**: on/off, dimming and cover control, repeated per device
//! - **Events**: state changes, device additions and button presses
//!
//! # Quick Start
//!
//! ```no_run
//! use rfxtrx_lib::{Gateway, GatewayConfig};
//! use rfxtrx_lib::command::DeviceCommand;
//! use rfxtrx_lib::config::DeviceConfig;
//!
//! #[tokio::main]
//! async fn main() -> rfxtrx_lib::Result<()> {
//!     let config = GatewayConfig::new("/dev/ttyUSB0")
//!         .with_recv_modes(["ac", "lighting4", "oregon"])
//!         .with_automatic_add(true)
//!         .with_light("0b1100cd0213c7f210010f70", DeviceConfig::named("Kitchen"));
//!
//!     let gateway = Gateway::connect(config).await?;
//!
//!     let mut events = gateway.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("{}: {}", event.name(), event.device_id());
//!         }
//!     });
//!
//!     gateway.send_command("213c7f2_16", DeviceCommand::On).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Raw Packet Callbacks
//!
//! ```no_run
//! use rfxtrx_lib::{Gateway, GatewayConfig};
//! use rfxtrx_lib::subscription::Subscribable;
//!
//! #[tokio::main]
//! async fn main() -> rfxtrx_lib::Result<()> {
//!     let gateway = Gateway::connect(GatewayConfig::new("/dev/ttyUSB0")).await?;
//!
//!     gateway.on_raw_event(|event| {
//!         println!("{} {:?}", event.packet_hex(), event.values());
//!     });
//!
//!     gateway.on_state_changed(|device| {
//!         println!("{} is now {:?}", device.entity_id(), device.state());
//!     });
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(60)).await;
//!     gateway.shutdown().await
//! }
//! ```

mod capabilities;
pub mod codec;
pub mod command;
pub mod config;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod event;
mod gateway;
pub mod lowlevel;
pub mod pt2262;
pub mod registry;
pub mod state;
pub mod subscription;
pub mod transport;
pub mod types;

pub use capabilities::Capabilities;
pub use codec::DecodedEvent;
pub use command::DeviceCommand;
pub use config::GatewayConfig;
pub use device::{Device, DeviceKind};
pub use error::{ConfigError, DecodeError, DeviceError, Error, Result, TransportError, ValueError};
pub use event::{EventBus, GatewayEvent};
pub use gateway::Gateway;
pub use registry::DeviceRegistry;
pub use state::{DeviceState, StateChange};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId};
pub use types::{DataType, Dimmer};
