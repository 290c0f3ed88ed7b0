// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Callback management for channel notifications.
//!
//! This module provides the core types for managing listeners:
//!
//! - [`SubscriptionId`] - Unique identifier for unsubscribing
//! - [`CallbackRegistry`] - Registry storing listeners and dispatching notifications

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use serde_json::Value;

use crate::event::Notification;

/// Unique identifier for a subscription.
///
/// Returned when registering a listener and accepted by `unsubscribe`.
/// IDs increase monotonically within a registry, so listeners of one kind
/// are invoked in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Creates a new subscription ID with the given value.
    #[must_use]
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Catch-all listener receiving every notification.
type NotificationCallback = dyn Fn(&Notification) + Send + Sync;

/// Listener receiving `(device_id, data)`.
type DeviceDataCallback = dyn Fn(&str, &Value) + Send + Sync;

/// Listener receiving `(device_id, name, value)`.
type NamedValueCallback = dyn Fn(&str, &str, &Value) + Send + Sync;

/// Listener receiving the pairing payload.
type PairCallback = dyn Fn(&Value) + Send + Sync;

/// Listener receiving a transport error description.
type ErrorCallback = dyn Fn(&str) + Send + Sync;

/// Listener for socket closure.
type CloseCallback = dyn Fn() + Send + Sync;

/// Listeners of one kind, ordered by subscription ID.
struct Listeners<C: ?Sized>(RwLock<BTreeMap<SubscriptionId, Arc<C>>>);

impl<C: ?Sized> Listeners<C> {
    fn new() -> Self {
        Self(RwLock::new(BTreeMap::new()))
    }

    fn insert(&self, id: SubscriptionId, callback: Arc<C>) {
        self.0.write().insert(id, callback);
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        self.0.write().remove(&id).is_some()
    }

    /// Clones the callbacks out so none run under the lock.
    fn snapshot(&self) -> Vec<Arc<C>> {
        self.0.read().values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.0.read().len()
    }

    fn clear(&self) {
        self.0.write().clear();
    }
}

/// Registry for channel notification listeners.
///
/// Listeners are invoked synchronously on the task dispatching
/// notifications. The lock guarding each listener map is released before
/// any listener runs, so a listener may subscribe or unsubscribe others.
///
/// # Thread Safety
///
/// The registry is fully thread-safe; registration may happen from any
/// task while notifications are being dispatched.
pub struct CallbackRegistry {
    /// Counter for generating unique subscription IDs.
    next_id: AtomicU64,
    notification: Listeners<NotificationCallback>,
    message: Listeners<DeviceDataCallback>,
    property_changed: Listeners<NamedValueCallback>,
    action_triggered: Listeners<NamedValueCallback>,
    event_raised: Listeners<NamedValueCallback>,
    connect_state_changed: Listeners<DeviceDataCallback>,
    device_modified: Listeners<DeviceDataCallback>,
    device_added: Listeners<DeviceDataCallback>,
    device_removed: Listeners<DeviceDataCallback>,
    pair: Listeners<PairCallback>,
    error: Listeners<ErrorCallback>,
    close: Listeners<CloseCallback>,
}

impl CallbackRegistry {
    /// Creates a new empty callback registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            notification: Listeners::new(),
            message: Listeners::new(),
            property_changed: Listeners::new(),
            action_triggered: Listeners::new(),
            event_raised: Listeners::new(),
            connect_state_changed: Listeners::new(),
            device_modified: Listeners::new(),
            device_added: Listeners::new(),
            device_removed: Listeners::new(),
            pair: Listeners::new(),
            error: Listeners::new(),
            close: Listeners::new(),
        }
    }

    /// Generates a new unique subscription ID.
    fn next_id(&self) -> SubscriptionId {
        SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // =========================================================================
    // Registration methods
    // =========================================================================

    /// Registers a listener for every notification, including unknown frames.
    pub fn on_notification<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.notification.insert(id, Arc::new(callback));
        id
    }

    /// Registers a listener for the generic per-device `message` event.
    pub fn on_message<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.message.insert(id, Arc::new(callback));
        id
    }

    /// Registers a listener for property changes.
    pub fn on_property_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &str, &Value) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.property_changed.insert(id, Arc::new(callback));
        id
    }

    /// Registers a listener for action status updates.
    pub fn on_action_triggered<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &str, &Value) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.action_triggered.insert(id, Arc::new(callback));
        id
    }

    /// Registers a listener for device events.
    pub fn on_event_raised<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &str, &Value) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.event_raised.insert(id, Arc::new(callback));
        id
    }

    /// Registers a listener for device reachability changes.
    pub fn on_connect_state_changed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.connect_state_changed.insert(id, Arc::new(callback));
        id
    }

    /// Registers a listener for device description changes.
    pub fn on_device_modified<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.device_modified.insert(id, Arc::new(callback));
        id
    }

    /// Registers a listener for added devices.
    pub fn on_device_added<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.device_added.insert(id, Arc::new(callback));
        id
    }

    /// Registers a listener for removed devices.
    pub fn on_device_removed<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str, &Value) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.device_removed.insert(id, Arc::new(callback));
        id
    }

    /// Registers a listener for pairing progress.
    pub fn on_pair<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.pair.insert(id, Arc::new(callback));
        id
    }

    /// Registers a listener for transport errors.
    pub fn on_error<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.error.insert(id, Arc::new(callback));
        id
    }

    /// Registers a listener for socket closure.
    pub fn on_close<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_id();
        self.close.insert(id, Arc::new(callback));
        id
    }

    // =========================================================================
    // Unsubscription
    // =========================================================================

    /// Unregisters a listener by its subscription ID.
    ///
    /// Returns `true` if a listener was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notification.remove(id)
            || self.message.remove(id)
            || self.property_changed.remove(id)
            || self.action_triggered.remove(id)
            || self.event_raised.remove(id)
            || self.connect_state_changed.remove(id)
            || self.device_modified.remove(id)
            || self.device_added.remove(id)
            || self.device_removed.remove(id)
            || self.pair.remove(id)
            || self.error.remove(id)
            || self.close.remove(id)
    }

    /// Clears all listeners.
    pub fn clear(&self) {
        self.notification.clear();
        self.message.clear();
        self.property_changed.clear();
        self.action_triggered.clear();
        self.event_raised.clear();
        self.connect_state_changed.clear();
        self.device_modified.clear();
        self.device_added.clear();
        self.device_removed.clear();
        self.pair.clear();
        self.error.clear();
        self.close.clear();
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatches a notification to the catch-all listeners, then to the
    /// listeners of its kind.
    ///
    /// `Unknown` notifications only reach catch-all listeners.
    pub fn dispatch(&self, notification: &Notification) {
        for callback in self.notification.snapshot() {
            callback(notification);
        }

        match notification {
            Notification::Message { device_id, data } => {
                Self::call_device_data(&self.message, device_id, data);
            }
            Notification::PropertyChanged {
                device_id,
                name,
                value,
            } => Self::call_named_value(&self.property_changed, device_id, name, value),
            Notification::ActionTriggered {
                device_id,
                name,
                value,
            } => Self::call_named_value(&self.action_triggered, device_id, name, value),
            Notification::EventRaised {
                device_id,
                name,
                value,
            } => Self::call_named_value(&self.event_raised, device_id, name, value),
            Notification::ConnectStateChanged { device_id, data } => {
                Self::call_device_data(&self.connect_state_changed, device_id, data);
            }
            Notification::DeviceModified { device_id, data } => {
                Self::call_device_data(&self.device_modified, device_id, data);
            }
            Notification::DeviceAdded { device_id, data } => {
                Self::call_device_data(&self.device_added, device_id, data);
            }
            Notification::DeviceRemoved { device_id, data } => {
                Self::call_device_data(&self.device_removed, device_id, data);
            }
            Notification::Pair { value } => {
                for callback in self.pair.snapshot() {
                    callback(value);
                }
            }
            Notification::Unknown { .. } => {}
            Notification::Error { reason } => {
                for callback in self.error.snapshot() {
                    callback(reason);
                }
            }
            Notification::Close => {
                for callback in self.close.snapshot() {
                    callback();
                }
            }
        }
    }

    fn call_device_data(listeners: &Listeners<DeviceDataCallback>, device_id: &str, data: &Value) {
        for callback in listeners.snapshot() {
            callback(device_id, data);
        }
    }

    fn call_named_value(
        listeners: &Listeners<NamedValueCallback>,
        device_id: &str,
        name: &str,
        value: &Value,
    ) {
        for callback in listeners.snapshot() {
            callback(device_id, name, value);
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Returns the total number of registered listeners.
    #[must_use]
    pub fn callback_count(&self) -> usize {
        self.notification.len()
            + self.message.len()
            + self.property_changed.len()
            + self.action_triggered.len()
            + self.event_raised.len()
            + self.connect_state_changed.len()
            + self.device_modified.len()
            + self.device_added.len()
            + self.device_removed.len()
            + self.pair.len()
            + self.error.len()
            + self.close.len()
    }

    /// Returns `true` if there are no registered listeners.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callback_count() == 0
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("callback_count", &self.callback_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::atomic::AtomicU32;

    fn property_changed(name: &str, value: Value) -> Notification {
        Notification::PropertyChanged {
            device_id: "lamp".to_string(),
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn subscription_id_display() {
        let id = SubscriptionId::new(42);
        assert_eq!(id.to_string(), "Sub(42)");
    }

    #[test]
    fn registry_new_is_empty() {
        let registry = CallbackRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.callback_count(), 0);
    }

    #[test]
    fn property_callback_and_unsubscribe() {
        let registry = CallbackRegistry::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();

        let id = registry.on_property_changed(move |device, name, value| {
            sink.lock()
                .push((device.to_string(), name.to_string(), value.clone()));
        });

        registry.dispatch(&property_changed("on", json!(true)));
        assert_eq!(
            *received.lock(),
            vec![("lamp".to_string(), "on".to_string(), json!(true))]
        );

        assert!(registry.unsubscribe(id));
        assert!(registry.is_empty());

        registry.dispatch(&property_changed("on", json!(false)));
        assert_eq!(received.lock().len(), 1);
    }

    #[test]
    fn catch_all_runs_before_specific() {
        let registry = CallbackRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let specific = order.clone();
        registry.on_pair(move |_| specific.lock().push("pair"));
        let generic = order.clone();
        registry.on_notification(move |_| generic.lock().push("any"));

        registry.dispatch(&Notification::Pair { value: json!("x") });
        assert_eq!(*order.lock(), vec!["any", "pair"]);
    }

    #[test]
    fn listeners_of_one_kind_run_in_registration_order() {
        let registry = CallbackRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = order.clone();
            registry.on_close(move || order.lock().push(label));
        }

        registry.dispatch(&Notification::Close);
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn unknown_reaches_only_catch_all() {
        let registry = CallbackRegistry::new();
        let generic = Arc::new(AtomicU32::new(0));
        let specific = Arc::new(AtomicU32::new(0));

        let g = generic.clone();
        registry.on_notification(move |_| {
            g.fetch_add(1, Ordering::SeqCst);
        });
        for _ in 0..3 {
            let s = specific.clone();
            registry.on_message(move |_, _| {
                s.fetch_add(1, Ordering::SeqCst);
            });
        }

        registry.dispatch(&Notification::Unknown {
            message_type: Some("mystery".to_string()),
            device_id: Some("lamp".to_string()),
            data: None,
        });

        assert_eq!(generic.load(Ordering::SeqCst), 1);
        assert_eq!(specific.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn device_lifecycle_callbacks() {
        let registry = CallbackRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));

        let c = counter.clone();
        registry.on_device_added(move |id, _| {
            assert_eq!(id, "new-thing");
            c.fetch_add(1, Ordering::SeqCst);
        });

        registry.dispatch(&Notification::DeviceAdded {
            device_id: "new-thing".to_string(),
            data: json!({}),
        });
        registry.dispatch(&Notification::DeviceRemoved {
            device_id: "new-thing".to_string(),
            data: json!({}),
        });

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn error_callback_receives_reason() {
        let registry = CallbackRegistry::new();
        let received = Arc::new(Mutex::new(String::new()));
        let sink = received.clone();

        registry.on_error(move |reason| *sink.lock() = reason.to_string());
        registry.dispatch(&Notification::Error {
            reason: "connection reset".to_string(),
        });

        assert_eq!(*received.lock(), "connection reset");
    }

    #[test]
    fn listener_may_unsubscribe_itself() {
        let registry = Arc::new(CallbackRegistry::new());
        let calls = Arc::new(AtomicU32::new(0));
        let slot = Arc::new(Mutex::new(None::<SubscriptionId>));

        let reg = Arc::downgrade(&registry);
        let slot_clone = slot.clone();
        let calls_clone = calls.clone();
        let id = registry.on_close(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            if let (Some(reg), Some(id)) = (reg.upgrade(), *slot_clone.lock()) {
                reg.unsubscribe(id);
            }
        });
        *slot.lock() = Some(id);

        registry.dispatch(&Notification::Close);
        registry.dispatch(&Notification::Close);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_unsubscribe_nonexistent() {
        let registry = CallbackRegistry::new();
        assert!(!registry.unsubscribe(SubscriptionId::new(999)));
    }

    #[test]
    fn registry_clear() {
        let registry = CallbackRegistry::new();

        registry.on_message(|_, _| {});
        registry.on_event_raised(|_, _, _| {});
        registry.on_close(|| {});
        assert_eq!(registry.callback_count(), 3);

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_unique_ids() {
        let registry = CallbackRegistry::new();

        let id1 = registry.on_pair(|_| {});
        let id2 = registry.on_error(|_| {});
        let id3 = registry.on_connect_state_changed(|_, _| {});

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert!(id1 < id2 && id2 < id3);
    }

    #[test]
    fn registry_debug() {
        let registry = CallbackRegistry::new();
        registry.on_action_triggered(|_, _, _| {});

        let debug = format!("{registry:?}");
        assert!(debug.contains("CallbackRegistry"));
        assert!(debug.contains("callback_count: 1"));
    }
}
