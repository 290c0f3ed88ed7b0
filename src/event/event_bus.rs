// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Broadcast bus for channel notifications.

use tokio::sync::broadcast;

use super::Notification;

/// Default channel capacity for the notification bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Bus broadcasting channel notifications to async subscribers.
///
/// Each subscriber receives its own copy of every notification published
/// after it subscribed, in publication order.
///
/// # Capacity
///
/// The bus has a fixed capacity (default 256). A subscriber that falls
/// further behind loses the oldest notifications and receives
/// `RecvError::Lagged` instead.
///
/// # Examples
///
/// ```
/// use webthings_lib::event::{Notification, NotificationBus};
///
/// let bus = NotificationBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(Notification::Close);
/// assert_eq!(rx.try_recv().unwrap(), Notification::Close);
/// ```
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    /// Creates a new bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a new bus with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to notifications published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes a notification to all subscribers.
    ///
    /// Without subscribers the notification is discarded.
    pub fn publish(&self, notification: Notification) {
        // No subscribers is not an error
        let _ = self.sender.send(notification);
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_bus_has_no_subscribers() {
        let bus = NotificationBus::new();
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn drop_subscriber_decrements_count() {
        let bus = NotificationBus::new();
        let rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);

        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn publish_preserves_order() {
        let bus = NotificationBus::new();
        let mut rx = bus.subscribe();

        bus.publish(Notification::Pair { value: json!(1) });
        bus.publish(Notification::Pair { value: json!(2) });

        assert_eq!(rx.recv().await.unwrap(), Notification::Pair { value: json!(1) });
        assert_eq!(rx.recv().await.unwrap(), Notification::Pair { value: json!(2) });
    }

    #[tokio::test]
    async fn publish_delivers_to_multiple_subscribers() {
        let bus = NotificationBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(Notification::Close);

        assert_eq!(rx1.recv().await.unwrap(), Notification::Close);
        assert_eq!(rx2.recv().await.unwrap(), Notification::Close);
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        let bus = NotificationBus::with_capacity(4);
        bus.publish(Notification::Close);
    }

    #[test]
    fn clone_shares_same_channel() {
        let bus1 = NotificationBus::new();
        let bus2 = bus1.clone();

        let _rx = bus1.subscribe();
        assert_eq!(bus2.subscriber_count(), 1);
    }
}
