// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Listener registration and event subscriptions for the streaming channel.
//!
//! # Overview
//!
//! - [`SubscriptionId`] - A unique identifier for a listener, used to unsubscribe
//! - [`CallbackRegistry`] - Registry that stores listeners and dispatches notifications
//! - [`Subscribable`] - Trait for types that support listeners
//! - [`SubscriptionRequest`] - Outbound request for a device's events
//!
//! Listeners only fire while a [`Channel`](crate::protocol::Channel) is
//! connected; the HTTP side of the client is stateless and has none.

mod callback;
mod request;
mod subscribable;

pub use callback::{CallbackRegistry, SubscriptionId};
pub use request::SubscriptionRequest;
pub use subscribable::Subscribable;
