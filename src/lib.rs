// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `WebThings` Lib - A Rust client for `WebThings` gateways.
//!
//! This library provides async APIs to talk to a home-automation gateway
//! exposing the Web Thing API, over both its REST endpoints and its
//! streaming WebSocket channel.
//!
//! # Supported Features
//!
//! - **Discovery**: Find a local gateway and pick `http`/`https` from its redirect
//! - **Devices**: List devices, read and write properties, request actions
//! - **Live updates**: Property changes, action status, events, pairing progress
//! - **Subscriptions**: Ask the gateway to forward a device's events
//!
//! # Quick Start
//!
//! ## Reading and Writing Properties
//!
//! ```no_run
//! use webthings_lib::GatewayClient;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> webthings_lib::Result<()> {
//!     // Probe localhost and decide between plain and secure transport
//!     let client = GatewayClient::local("my-token").await?;
//!
//!     let lamp = client.get_device("lamp").await?;
//!     if let Some(on) = lamp.property("on") {
//!         on.set_value(json!(true)).await?;
//!         println!("on = {}", on.value().await?);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Known Gateway
//!
//! ```no_run
//! use webthings_lib::{ConnectionDescriptor, GatewayClient};
//!
//! #[tokio::main]
//! async fn main() -> webthings_lib::Result<()> {
//!     // Skip discovery when the address and scheme are already known
//!     let descriptor = ConnectionDescriptor::new("gateway.local", 4443, "my-token")
//!         .with_secure(true)
//!         .with_skip_cert_validation(true);
//!     let client = GatewayClient::new(descriptor)?;
//!
//!     for device in client.list_devices().await? {
//!         println!("{}", device.id());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Live Notifications
//!
//! ```no_run
//! use webthings_lib::{GatewayClient, subscription::Subscribable};
//!
//! #[tokio::main]
//! async fn main() -> webthings_lib::Result<()> {
//!     let client = GatewayClient::local("my-token").await?;
//!     let channel = client.channel();
//!
//!     channel.on_property_changed(|device, name, value| {
//!         println!("{device}.{name} = {value}");
//!     });
//!     channel.on_close(|| println!("channel closed"));
//!
//!     channel.connect().await?;
//!
//!     // Forward every event of the lamp
//!     let lamp = client.get_device("lamp").await?;
//!     channel.send(lamp.subscription_request()?).await?;
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(60)).await;
//!     channel.disconnect().await
//! }
//! ```

mod client;
pub mod discovery;
pub mod error;
pub mod event;
pub mod protocol;
pub mod subscription;
pub mod thing;

pub use client::GatewayClient;
pub use discovery::{ConnectionDescriptor, DiscoveryConfig};
pub use error::{Error, ParseError, ProtocolError, Result};
pub use event::{Notification, NotificationBus};
pub use protocol::{Channel, ChannelState, HttpClient, OutboundMessage, RequestSpec};
pub use subscription::{CallbackRegistry, Subscribable, SubscriptionId, SubscriptionRequest};
pub use thing::{Action, Device, Event, Property};
