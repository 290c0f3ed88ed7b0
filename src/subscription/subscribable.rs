// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscribable trait for types that deliver channel notifications.

use serde_json::Value;

use crate::event::Notification;
use crate::subscription::SubscriptionId;

/// Trait for types that support notification listeners.
///
/// Implemented by [`Channel`](crate::protocol::Channel). Listeners run
/// synchronously on the task reading the socket, in wire order: every
/// notification of one frame is delivered before the next frame is read.
/// Long-running work should be handed off (for example to a spawned task)
/// rather than done inside a listener.
///
/// # Examples
///
/// ```no_run
/// use webthings_lib::GatewayClient;
/// use webthings_lib::subscription::Subscribable;
///
/// # async fn example() -> webthings_lib::Result<()> {
/// let client = GatewayClient::local("my-token").await?;
/// let channel = client.channel();
///
/// let sub_id = channel.on_property_changed(|device, name, value| {
///     println!("{device}.{name} = {value}");
/// });
///
/// channel.connect().await?;
///
/// // Later
/// channel.unsubscribe(sub_id);
/// # Ok(())
/// # }
/// ```
pub trait Subscribable {
    /// Subscribes to every notification, including unrecognized frames.
    fn on_notification<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Notification) + Send + Sync + 'static;

    /// Subscribes to the generic `message` event raised for every
    /// per-device frame, before the specific events of that frame.
    fn on_message<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &Value) + Send + Sync + 'static;

    /// Subscribes to property changes: `(device_id, property, value)`.
    fn on_property_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &str, &Value) + Send + Sync + 'static;

    /// Subscribes to action status updates: `(device_id, action, request)`.
    fn on_action_triggered<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &str, &Value) + Send + Sync + 'static;

    /// Subscribes to device events: `(device_id, event, description)`.
    fn on_event_raised<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &str, &Value) + Send + Sync + 'static;

    /// Subscribes to device reachability changes.
    fn on_connect_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &Value) + Send + Sync + 'static;

    /// Subscribes to device description changes.
    fn on_device_modified<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &Value) + Send + Sync + 'static;

    /// Subscribes to devices being added.
    fn on_device_added<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &Value) + Send + Sync + 'static;

    /// Subscribes to devices being removed.
    fn on_device_removed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &Value) + Send + Sync + 'static;

    /// Subscribes to pairing progress.
    fn on_pair<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Value) + Send + Sync + 'static;

    /// Subscribes to transport errors.
    fn on_error<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static;

    /// Subscribes to socket closure.
    fn on_close<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static;

    /// Unsubscribes a listener by its subscription ID.
    ///
    /// Returns `true` if the subscription was found and removed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}
