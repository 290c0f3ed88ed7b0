// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Notifications received over the streaming channel.
//!
//! Inbound text frames are parsed into an [`InboundFrame`], expanded into
//! [`Notification`]s, and delivered to listeners registered on the
//! [`Channel`](crate::protocol::Channel) as well as to every
//! [`NotificationBus`] subscriber.
//!
//! # Examples
//!
//! ```
//! use webthings_lib::event::{InboundFrame, Notification};
//!
//! let frame = InboundFrame::parse(
//!     r#"{"id":"lamp","messageType":"propertyStatus","data":{"on":true}}"#,
//! )?;
//! let notifications = frame.into_notifications();
//!
//! assert_eq!(notifications[0].name(), "message");
//! assert_eq!(notifications[1].name(), "propertyChanged");
//! # Ok::<(), webthings_lib::ParseError>(())
//! ```

mod event_bus;
mod frame;
mod notification;

pub use event_bus::NotificationBus;
pub use frame::{InboundFrame, MessageType};
pub use notification::Notification;
